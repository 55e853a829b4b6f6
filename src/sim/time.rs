//! 仿真时间类型
//!
//! 定义仿真时间及其单位转换，以及调度器对时间类型的最小要求。

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt::Debug;
use std::ops::Add;

/// 调度器可用的时间戳：全序、可复制、可与非负延迟相加。
///
/// 对所有满足约束的类型自动实现（`SimTime`、`Seconds`、`u64`、`i64` 等）。
pub trait Timestamp: Copy + Ord + Debug + Add<Output = Self> + 'static {}

impl<T> Timestamp for T where T: Copy + Ord + Debug + Add<Output = T> + 'static {}

/// 仿真时间（纳秒）。
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct SimTime(pub u64);

impl SimTime {
    pub const ZERO: SimTime = SimTime(0);
    pub fn from_micros(us: u64) -> SimTime {
        SimTime(us.saturating_mul(1_000))
    }
    pub fn from_millis(ms: u64) -> SimTime {
        SimTime(ms.saturating_mul(1_000_000))
    }
    pub fn from_secs(s: u64) -> SimTime {
        SimTime(s.saturating_mul(1_000_000_000))
    }
}

impl Add for SimTime {
    type Output = SimTime;

    // 饱和加法：远未来的事件停在 u64::MAX，而不是回绕到过去
    fn add(self, rhs: SimTime) -> SimTime {
        SimTime(self.0.saturating_add(rhs.0))
    }
}

/// 浮点秒。按 `f64::total_cmp` 全序比较，NaN 排在所有正数之后。
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Seconds(pub f64);

impl PartialEq for Seconds {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Seconds {}

impl Ord for Seconds {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl PartialOrd for Seconds {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Add for Seconds {
    type Output = Seconds;

    fn add(self, rhs: Seconds) -> Seconds {
        Seconds(self.0 + rhs.0)
    }
}
