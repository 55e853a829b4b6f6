//! 仿真运行器
//!
//! 持有事件队列与模型，循环派发事件直到队列耗尽或动作发出停止信号。

use super::error::{Interrupt, SimError};
use super::model::Model;
use super::queue::EventQueue;
use serde::Serialize;
use tracing::{debug, info, warn};

/// 运行器状态。没有“暂停”：再次 `run` 会从当前待执行集合继续。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    NotStarted,
    Running,
    /// 队列已耗尽
    Exhausted,
    /// 收到停止信号
    Stopped,
    /// 动作返回了错误
    Failed,
}

/// 一次运行结束的原因
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    Exhausted,
    Signal,
    /// 到达 `run_to` 的时间上界
    Until,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RunSummary<T> {
    /// 本次运行派发的事件数
    pub events: u64,
    pub now: T,
    pub stop: StopReason,
}

/// 仿真：事件队列 + 模型
pub struct Simulation<M: Model> {
    queue: EventQueue<M, M::Time>,
    model: M,
    state: RunState,
}

impl<M: Model> Simulation<M>
where
    M::Time: Default,
{
    pub fn new(model: M) -> Self {
        Self::with_queue(EventQueue::new(), model)
    }
}

impl<M: Model> Simulation<M> {
    pub fn with_queue(queue: EventQueue<M, M::Time>, model: M) -> Self {
        Self {
            queue,
            model,
            state: RunState::NotStarted,
        }
    }

    pub fn now(&self) -> M::Time {
        self.queue.now()
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn queue(&self) -> &EventQueue<M, M::Time> {
        &self.queue
    }

    pub fn queue_mut(&mut self) -> &mut EventQueue<M, M::Time> {
        &mut self.queue
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    pub fn model_mut(&mut self) -> &mut M {
        &mut self.model
    }

    pub fn into_parts(self) -> (EventQueue<M, M::Time>, M) {
        (self.queue, self.model)
    }

    /// 队列为空（全新或已耗尽）时调用模型的 `start` 放入初始事件。
    pub fn start(&mut self) -> Result<(), SimError<M::Time>> {
        if !self.queue.is_empty() {
            return Ok(());
        }
        debug!(now = ?self.queue.now(), "队列为空，调用 start");
        self.model.start(&mut self.queue).inspect_err(|_| {
            self.state = RunState::Failed;
        })
    }

    /// 运行直到队列耗尽或收到停止信号。
    pub fn run(&mut self) -> Result<RunSummary<M::Time>, SimError<M::Time>> {
        self.run_with(|_, _| {})
    }

    /// 同 `run`，每个事件成功派发后调用 `on_event(模型, 当前时间)`。
    #[tracing::instrument(skip(self, on_event))]
    pub fn run_with(
        &mut self,
        mut on_event: impl FnMut(&M, M::Time),
    ) -> Result<RunSummary<M::Time>, SimError<M::Time>> {
        self.start()?;
        self.state = RunState::Running;
        info!("▶️  开始运行仿真");
        debug!(now = ?self.queue.now(), queue_size = self.queue.len(), "初始状态");

        let mut events = 0;
        let stop = loop {
            match self.queue.run_next(&mut self.model) {
                Ok(true) => {
                    events += 1;
                    self.model.on_tick(&self.queue);
                    on_event(&self.model, self.queue.now());
                }
                Ok(false) => break StopReason::Exhausted,
                Err(Interrupt::Stop) => {
                    events += 1;
                    break StopReason::Signal;
                }
                Err(Interrupt::Failed(e)) => {
                    warn!(now = ?self.queue.now(), error = %e, "动作失败，仿真中止");
                    self.state = RunState::Failed;
                    return Err(e);
                }
            }
        };

        self.state = match stop {
            StopReason::Signal => RunState::Stopped,
            _ => RunState::Exhausted,
        };
        info!(
            total_events = events,
            final_time = ?self.queue.now(),
            ?stop,
            "✅ 仿真完成"
        );
        Ok(RunSummary {
            events,
            now: self.queue.now(),
            stop,
        })
    }

    /// 推进到 `until`；停止信号在这里被捕获。
    pub fn run_to(&mut self, until: M::Time) -> Result<StopReason, SimError<M::Time>> {
        self.state = RunState::Running;
        match self.queue.run_to(until, &mut self.model) {
            Ok(()) => Ok(StopReason::Until),
            Err(Interrupt::Stop) => {
                self.state = RunState::Stopped;
                Ok(StopReason::Signal)
            }
            Err(Interrupt::Failed(e)) => {
                self.state = RunState::Failed;
                Err(e)
            }
        }
    }
}

impl<M: Model + std::fmt::Debug> std::fmt::Debug for Simulation<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Simulation")
            .field("queue", &self.queue)
            .field("model", &self.model)
            .field("state", &self.state)
            .finish()
    }
}
