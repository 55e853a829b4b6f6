//! 模型 trait
//!
//! 定义仿真模型（世界）接口。

use super::error::SimError;
use super::queue::EventQueue;
use super::time::Timestamp;

/// 仿真模型：由业务层实现，作为每个动作的世界参数。
pub trait Model: Sized + 'static {
    type Time: Timestamp;

    /// 运行开始且队列为空时调用，用来放入最初的事件。
    fn start(
        &mut self,
        _queue: &mut EventQueue<Self, Self::Time>,
    ) -> Result<(), SimError<Self::Time>> {
        Ok(())
    }

    /// 每个事件成功派发后调用
    fn on_tick(&mut self, _queue: &EventQueue<Self, Self::Time>) {}
}
