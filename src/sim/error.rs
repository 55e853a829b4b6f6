//! 调度错误与停止信号

use super::time::Timestamp;
use crate::random::RandomError;
use thiserror::Error;

/// 调度器错误。
#[derive(Debug, Error)]
pub enum SimError<T: Timestamp> {
    /// 请求的时间早于当前时钟
    #[error("cannot schedule at {requested:?}: clock is already at {now:?}")]
    OutOfOrderScheduling { requested: T, now: T },

    /// 同一次动作执行内重复请求重复调度
    #[error("recurrence already requested with interval {first:?} (second request: {second:?})")]
    DoubleRecurrence { first: T, second: T },

    /// 批量调度没有提供回调
    #[error("at_each requires a callback")]
    MissingCallback,

    /// 无法从条目中取出时间字段
    #[error("cannot extract time field `{field}`: {reason}")]
    TimeField { field: String, reason: String },

    #[error(transparent)]
    Random(#[from] RandomError),

    /// 用户动作返回的错误
    #[error("action failed: {0}")]
    Action(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// 动作执行的中断：停止信号或错误。
///
/// 停止信号不是错误，只在运行循环边界（`Simulation::run`）被捕获。
#[derive(Debug, Error)]
pub enum Interrupt<T: Timestamp> {
    #[error("simulation stop requested")]
    Stop,
    #[error(transparent)]
    Failed(#[from] SimError<T>),
}

impl<T: Timestamp> Interrupt<T> {
    /// 把任意用户错误包装为动作失败
    pub fn fail(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Interrupt::Failed(SimError::Action(err.into()))
    }

    pub fn is_stop(&self) -> bool {
        matches!(self, Interrupt::Stop)
    }
}

impl<T: Timestamp> From<RandomError> for Interrupt<T> {
    fn from(err: RandomError) -> Self {
        Interrupt::Failed(SimError::Random(err))
    }
}

/// 动作的返回值
pub type Outcome<T> = Result<(), Interrupt<T>>;

/// 在动作中请求停止外层运行循环
pub fn stop<T: Timestamp>() -> Outcome<T> {
    Err(Interrupt::Stop)
}
