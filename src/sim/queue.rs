//! 事件队列
//!
//! 维护虚拟时钟与待执行事件堆：调度、取消、重复调度、派发与推进到指定时间。

use super::error::{Interrupt, Outcome, SimError};
use super::event::{Action, EventHandle, EventId, Scheduled};
use super::heap::TimeHeap;
use super::time::{SimTime, Timestamp};
use std::collections::HashMap;
use tracing::{debug, trace};

/// 事件队列：虚拟时钟 + 按时间排序的待执行事件。
///
/// `W` 是每次派发时传给动作的世界（模型状态），`T` 是时间类型。
pub struct EventQueue<W = (), T: Timestamp = SimTime> {
    now: T,
    next_seq: u64,
    pending: TimeHeap<T, Scheduled<W, T>>,
    /// 重复事件的最新时间；句柄里的时间仍是首次调度时间
    recurring: HashMap<EventId, T>,
    /// 当前动作请求的重复间隔，每次派发结束后清空
    recur: Option<T>,
    dispatching: bool,
    dispatched: u64,
}

impl<W, T: Timestamp + Default> Default for EventQueue<W, T> {
    fn default() -> Self {
        Self::starting_at(T::default())
    }
}

impl<W, T: Timestamp + Default> EventQueue<W, T> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<W, T: Timestamp> EventQueue<W, T> {
    /// 时钟从 `now` 开始的空队列
    pub fn starting_at(now: T) -> Self {
        Self {
            now,
            next_seq: 0,
            pending: TimeHeap::new(),
            recurring: HashMap::new(),
            recur: None,
            dispatching: false,
            dispatched: 0,
        }
    }

    /// 获取当前仿真时间
    pub fn now(&self) -> T {
        self.now
    }

    /// 待执行事件数
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// 已派发的事件总数
    pub fn dispatched(&self) -> u64 {
        self.dispatched
    }

    /// 最早待执行事件的时间。在动作内调用时不包含正在执行的事件。
    pub fn peek_next_time(&self) -> Option<T> {
        self.pending.peek_key()
    }

    /// 调度动作在 `at` 执行
    pub fn schedule_at<F>(&mut self, at: T, action: F) -> Result<EventHandle<T>, SimError<T>>
    where
        F: FnMut(&mut EventQueue<W, T>, &mut W) -> Outcome<T> + 'static,
    {
        self.schedule_boxed(at, Box::new(action))
    }

    /// 调度动作在 `now + delay` 执行
    pub fn schedule_after<F>(&mut self, delay: T, action: F) -> Result<EventHandle<T>, SimError<T>>
    where
        F: FnMut(&mut EventQueue<W, T>, &mut W) -> Outcome<T> + 'static,
    {
        self.schedule_at(self.now + delay, action)
    }

    pub(crate) fn schedule_boxed(
        &mut self,
        at: T,
        action: Action<W, T>,
    ) -> Result<EventHandle<T>, SimError<T>> {
        if at < self.now {
            return Err(SimError::OutOfOrderScheduling {
                requested: at,
                now: self.now,
            });
        }
        let id = self.next_id();
        self.pending.push(at, Scheduled { id, action });
        trace!(now = ?self.now, ?at, id = id.0, queue_size = self.pending.len(), "调度事件");
        Ok(EventHandle { id, at })
    }

    fn next_id(&mut self) -> EventId {
        let id = EventId(self.next_seq);
        self.next_seq = self.next_seq.wrapping_add(1);
        id
    }

    /// 取消仍在等待中的事件；返回是否真的移除了。
    ///
    /// 依次弹出时间不晚于目标的事件，直到找到目标为止，其余的放回堆中。
    /// 已执行、正在执行或未知的句柄都是静默的空操作。
    /// 重复事件沿用同一身份，原句柄可以取消整个后续序列。
    pub fn cancel(&mut self, handle: EventHandle<T>) -> bool {
        let bound = match self.recurring.get(&handle.id) {
            Some(&at) => at,
            None => handle.at,
        };
        let mut set_aside = Vec::new();
        let mut found = false;
        while self.pending.peek_key().is_some_and(|at| at <= bound) {
            let Some((at, event)) = self.pending.pop() else {
                break;
            };
            if event.id == handle.id {
                found = true;
                break;
            }
            set_aside.push((at, event));
        }
        let scanned = set_aside.len();
        for (at, event) in set_aside {
            self.pending.push(at, event);
        }
        if found {
            self.recurring.remove(&handle.id);
        }
        debug!(id = handle.id.0, at = ?bound, found, scanned, "取消事件");
        found
    }

    /// 在动作内请求：本动作结束后于 `now + interval` 再次执行同一动作。
    ///
    /// 不在动作执行期间调用时没有效果。
    pub fn request_recur(&mut self, interval: T) -> Result<(), SimError<T>> {
        if !self.dispatching {
            trace!(?interval, "没有正在执行的事件，忽略重复调度请求");
            return Ok(());
        }
        if let Some(first) = self.recur {
            return Err(SimError::DoubleRecurrence {
                first,
                second: interval,
            });
        }
        let at = self.now + interval;
        if at < self.now {
            return Err(SimError::OutOfOrderScheduling {
                requested: at,
                now: self.now,
            });
        }
        self.recur = Some(interval);
        Ok(())
    }

    /// 从 `start` 开始每隔 `interval` 执行一次动作（无界，需由调用方停止）
    pub fn every<F>(
        &mut self,
        interval: T,
        start: T,
        mut action: F,
    ) -> Result<EventHandle<T>, SimError<T>>
    where
        F: FnMut(&mut EventQueue<W, T>, &mut W) -> Outcome<T> + 'static,
    {
        self.schedule_at(start, move |q, w| {
            action(q, w)?;
            q.request_recur(interval)?;
            Ok(())
        })
    }

    /// 派发最早的事件；队列为空时返回 `Ok(false)`。
    ///
    /// 事件在动作执行前已离开待执行集合，因此动作内取消自身是空操作，
    /// 动作出错时也不会重试。若动作请求了重复调度，事件以原身份直接写回堆根空洞。
    pub fn run_next(&mut self, world: &mut W) -> Result<bool, Interrupt<T>> {
        let Some((at, mut event)) = self.pending.take_root() else {
            return Ok(false);
        };
        self.now = at;
        self.dispatched += 1;
        debug!(
            event_num = self.dispatched,
            now = ?self.now,
            id = event.id.0,
            remaining_queue = self.pending.len(),
            "执行事件"
        );

        // 动作内可能嵌套调用 run_next，外层状态需要保存
        let outer_recur = self.recur.take();
        let outer_dispatching = std::mem::replace(&mut self.dispatching, true);
        let outcome = (event.action)(self, world);
        let recur = std::mem::replace(&mut self.recur, outer_recur);
        self.dispatching = outer_dispatching;

        match recur {
            Some(interval) if !matches!(outcome, Err(Interrupt::Failed(_))) => {
                let at = self.now + interval;
                trace!(?at, id = event.id.0, "重复调度");
                self.recurring.insert(event.id, at);
                self.pending.fill_root(at, event);
            }
            _ => {
                self.recurring.remove(&event.id);
                self.pending.close_hole();
            }
        }
        outcome?;
        Ok(true)
    }

    /// 推进到 `until`：执行所有时间不晚于 `until` 的事件，并让时钟恰好停在 `until`。
    ///
    /// `until` 早于当前时间时直接返回。
    #[tracing::instrument(skip(self, world), fields(now = ?self.now))]
    pub fn run_to(&mut self, until: T, world: &mut W) -> Result<(), Interrupt<T>> {
        if until < self.now {
            return Ok(());
        }
        self.schedule_at(until, |_, _| Ok(()))?;
        while self.pending.peek_key().is_some_and(|at| at <= until) {
            self.run_next(world)?;
        }
        Ok(())
    }

    /// 逐个派发事件，产出每次派发后的时间。存在无界重复事件时序列是无限的。
    pub fn each<'a>(&'a mut self, world: &'a mut W) -> Each<'a, W, T> {
        Each {
            queue: self,
            world,
            done: false,
        }
    }

    /// 丢弃所有待执行事件并把时钟设为 `now`
    pub fn reset(&mut self, now: T) {
        debug!(dropped = self.pending.len(), ?now, "重置事件队列");
        self.pending.clear();
        self.recurring.clear();
        self.recur = None;
        self.now = now;
    }
}

impl<W, T: Timestamp> std::fmt::Debug for EventQueue<W, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventQueue")
            .field("now", &self.now)
            .field("pending", &self.pending.len())
            .field("next", &self.peek_next_time())
            .field("dispatched", &self.dispatched)
            .finish()
    }
}

/// `EventQueue::each` 返回的迭代器；出错后不再产出。
pub struct Each<'a, W, T: Timestamp> {
    queue: &'a mut EventQueue<W, T>,
    world: &'a mut W,
    done: bool,
}

impl<W, T: Timestamp> Iterator for Each<'_, W, T> {
    type Item = Result<T, Interrupt<T>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.queue.run_next(self.world) {
            Ok(true) => Some(Ok(self.queue.now())),
            Ok(false) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}
