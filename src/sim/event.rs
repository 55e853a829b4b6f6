//! 事件与句柄
//!
//! 事件 = 时间 + 动作 + 身份。句柄只用于取消，按身份比较，与时间、内容无关。

use super::error::Outcome;
use super::queue::EventQueue;
use super::time::Timestamp;
use std::hash::{Hash, Hasher};

/// 事件动作：每次派发时拿到队列与世界的可变引用。
///
/// 动作是 `FnMut`，因为请求重复调度（`request_recur`）时同一个动作会被再次执行。
pub type Action<W, T> = Box<dyn FnMut(&mut EventQueue<W, T>, &mut W) -> Outcome<T>>;

/// 事件身份，每次调度调用分配一个新的值；重复调度沿用原值。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EventId(pub(crate) u64);

/// 已调度事件的句柄。
#[derive(Debug, Clone, Copy)]
pub struct EventHandle<T> {
    pub(crate) id: EventId,
    pub(crate) at: T,
}

impl<T: Timestamp> EventHandle<T> {
    pub fn id(&self) -> EventId {
        self.id
    }

    /// 事件首次被调度的时间
    pub fn at(&self) -> T {
        self.at
    }
}

impl<T> PartialEq for EventHandle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<T> Eq for EventHandle<T> {}

impl<T> Hash for EventHandle<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// 堆中的待执行事件
pub(crate) struct Scheduled<W, T: Timestamp> {
    pub(crate) id: EventId,
    pub(crate) action: Action<W, T>,
}
