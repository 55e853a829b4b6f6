//! 共享队列能力
//!
//! 多个独立实体共用同一个外部事件队列（同一时钟、同一待执行集合）。
//! 实现者只需给出队列的引用，调度方法全部转发。

use super::batch::{ItemAction, TimeRule};
use super::error::{Outcome, SimError};
use super::event::EventHandle;
use super::model::Model;
use super::queue::EventQueue;
use super::simulation::Simulation;
use super::time::Timestamp;

pub trait SharedQueue {
    type World: 'static;
    type Time: Timestamp;

    fn event_queue(&self) -> &EventQueue<Self::World, Self::Time>;
    fn event_queue_mut(&mut self) -> &mut EventQueue<Self::World, Self::Time>;

    fn now(&self) -> Self::Time {
        self.event_queue().now()
    }

    fn schedule_at<F>(
        &mut self,
        at: Self::Time,
        action: F,
    ) -> Result<EventHandle<Self::Time>, SimError<Self::Time>>
    where
        F: FnMut(&mut EventQueue<Self::World, Self::Time>, &mut Self::World) -> Outcome<Self::Time>
            + 'static,
    {
        self.event_queue_mut().schedule_at(at, action)
    }

    fn schedule_after<F>(
        &mut self,
        delay: Self::Time,
        action: F,
    ) -> Result<EventHandle<Self::Time>, SimError<Self::Time>>
    where
        F: FnMut(&mut EventQueue<Self::World, Self::Time>, &mut Self::World) -> Outcome<Self::Time>
            + 'static,
    {
        self.event_queue_mut().schedule_after(delay, action)
    }

    fn at_each<I: 'static>(
        &mut self,
        items: impl IntoIterator<Item = I>,
        rule: TimeRule<I, Self::Time>,
        callback: Option<ItemAction<Self::World, Self::Time, I>>,
    ) -> Result<Option<EventHandle<Self::Time>>, SimError<Self::Time>> {
        self.event_queue_mut().at_each(items, rule, callback)
    }

    fn request_recur(&mut self, interval: Self::Time) -> Result<(), SimError<Self::Time>> {
        self.event_queue_mut().request_recur(interval)
    }

    fn every<F>(
        &mut self,
        interval: Self::Time,
        start: Self::Time,
        action: F,
    ) -> Result<EventHandle<Self::Time>, SimError<Self::Time>>
    where
        F: FnMut(&mut EventQueue<Self::World, Self::Time>, &mut Self::World) -> Outcome<Self::Time>
            + 'static,
    {
        self.event_queue_mut().every(interval, start, action)
    }
}

impl<W: 'static, T: Timestamp> SharedQueue for EventQueue<W, T> {
    type World = W;
    type Time = T;

    fn event_queue(&self) -> &EventQueue<W, T> {
        self
    }

    fn event_queue_mut(&mut self) -> &mut EventQueue<W, T> {
        self
    }
}

impl<W: 'static, T: Timestamp> SharedQueue for &mut EventQueue<W, T> {
    type World = W;
    type Time = T;

    fn event_queue(&self) -> &EventQueue<W, T> {
        self
    }

    fn event_queue_mut(&mut self) -> &mut EventQueue<W, T> {
        self
    }
}

impl<M: Model> SharedQueue for Simulation<M> {
    type World = M;
    type Time = M::Time;

    fn event_queue(&self) -> &EventQueue<M, M::Time> {
        self.queue()
    }

    fn event_queue_mut(&mut self) -> &mut EventQueue<M, M::Time> {
        self.queue_mut()
    }
}
