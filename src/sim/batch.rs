//! 批量调度
//!
//! `at_each` 按时间升序处理一串条目，但任何时刻只在堆中保留一个事件：
//! 当前条目的事件执行时才调度下一个条目。

use super::error::{Interrupt, Outcome, SimError};
use super::event::EventHandle;
use super::queue::EventQueue;
use super::time::Timestamp;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::trace;

/// 条目自带时间
pub trait Timed<T> {
    fn time(&self) -> T;
}

/// 条目回调：拿到队列、世界与条目本身
pub type ItemAction<W, T, I> = Box<dyn FnMut(&mut EventQueue<W, T>, &mut W, I) -> Outcome<T>>;

type Extract<I, T> = Box<dyn Fn(&I) -> Result<T, SimError<T>>>;

/// 从条目中取时间的规则
pub struct TimeRule<I, T: Timestamp> {
    extract: Extract<I, T>,
}

impl<I: 'static, T: Timestamp> TimeRule<I, T> {
    /// 用闭包取时间
    pub fn by_key(f: impl Fn(&I) -> T + 'static) -> Self {
        Self {
            extract: Box::new(move |item: &I| Ok(f(item))),
        }
    }

    /// 条目自身实现了 `Timed`
    pub fn intrinsic() -> Self
    where
        I: Timed<T>,
    {
        Self {
            extract: Box::new(|item: &I| Ok(item.time())),
        }
    }

    /// 按字段名取时间：条目序列化为 JSON 对象后读取该字段
    pub fn field(name: &str) -> Self
    where
        I: Serialize,
        T: DeserializeOwned,
    {
        let field = name.to_string();
        Self {
            extract: Box::new(move |item: &I| {
                let fail = |reason: String| SimError::TimeField {
                    field: field.clone(),
                    reason,
                };
                let value = serde_json::to_value(item).map_err(|e| fail(e.to_string()))?;
                let raw = value
                    .get(&field)
                    .cloned()
                    .ok_or_else(|| fail("no such field".to_string()))?;
                serde_json::from_value(raw).map_err(|e| fail(e.to_string()))
            }),
        }
    }

    fn time_of(&self, item: &I) -> Result<T, SimError<T>> {
        (self.extract)(item)
    }
}

impl<W: 'static, T: Timestamp> EventQueue<W, T> {
    /// 按条目时间依次调度回调。条目必须已按时间升序排列，这里不排序。
    ///
    /// 返回当前唯一待执行事件的句柄；空序列返回 `None`。
    pub fn at_each<I: 'static>(
        &mut self,
        items: impl IntoIterator<Item = I>,
        rule: TimeRule<I, T>,
        callback: Option<ItemAction<W, T, I>>,
    ) -> Result<Option<EventHandle<T>>, SimError<T>> {
        let callback = callback.ok_or(SimError::MissingCallback)?;
        let items: Vec<I> = items.into_iter().collect();
        trace!(items = items.len(), "批量调度");
        self.schedule_chain(items.into_iter(), rule, callback)
    }

    fn schedule_chain<I: 'static>(
        &mut self,
        mut rest: std::vec::IntoIter<I>,
        rule: TimeRule<I, T>,
        callback: ItemAction<W, T, I>,
    ) -> Result<Option<EventHandle<T>>, SimError<T>> {
        let Some(item) = rest.next() else {
            return Ok(None);
        };
        let at = rule.time_of(&item)?;
        let mut chain = Some((item, rest, rule, callback));
        let handle = self.schedule_at(at, move |q, w| {
            let Some((item, rest, rule, mut callback)) = chain.take() else {
                return Ok(());
            };
            let outcome = callback(q, w, item);
            if let Err(Interrupt::Failed(_)) = outcome {
                return outcome;
            }
            // 停止信号也先接上后续条目，便于之后继续运行
            q.schedule_chain(rest, rule, callback)?;
            outcome
        })?;
        Ok(Some(handle))
    }
}
