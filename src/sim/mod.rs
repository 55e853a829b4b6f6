//! 仿真核心模块
//!
//! 此模块包含离散事件调度的核心组件：仿真时间、最小时间堆、事件队列、
//! 批量调度、运行器与共享队列能力。

// 子模块声明
mod batch;
mod error;
mod event;
mod heap;
mod model;
mod queue;
mod shared;
mod simulation;
mod time;

// 重新导出公共接口
pub use batch::{ItemAction, TimeRule, Timed};
pub use error::{Interrupt, Outcome, SimError, stop};
pub use event::{Action, EventHandle, EventId};
pub use heap::TimeHeap;
pub use model::Model;
pub use queue::{Each, EventQueue};
pub use shared::SharedQueue;
pub use simulation::{RunState, RunSummary, Simulation, StopReason};
pub use time::{Seconds, SimTime, Timestamp};
