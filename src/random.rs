//! 随机源
//!
//! 动作经常需要随机延迟。模型通过 `RandomSource` 注入随机数，
//! 测试时可以临时换成一段预先写好的序列（`Randomness::script`），
//! 用完后 `restore` 回原来的随机源。

use rand::{Rng, SeedableRng, rngs::StdRng};
use std::collections::VecDeque;
use thiserror::Error;
use tracing::trace;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RandomError {
    /// 预置序列已用完
    #[error("scripted random sequence exhausted after {consumed} values")]
    Exhausted { consumed: usize },
    /// 预置值不在 [0, 1) 内
    #[error("scripted random value {0} is outside [0, 1)")]
    OutOfRange(f64),
}

/// 随机数来源
pub trait RandomSource {
    /// `[0, 1)` 上的均匀值
    fn uniform(&mut self) -> Result<f64, RandomError>;

    /// `[0, n)` 上的整数：`floor(uniform() * n)`
    fn below(&mut self, n: u64) -> Result<u64, RandomError> {
        let v = self.uniform()?;
        // n 接近 u64::MAX 时 f64 会向上取整，结果仍限制在 n - 1 以内
        Ok(((v * n as f64).floor() as u64).min(n.saturating_sub(1)))
    }
}

/// 基于 `StdRng` 的可复现随机源
#[derive(Debug, Clone)]
pub struct StdRandom {
    rng: StdRng,
}

impl StdRandom {
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl RandomSource for StdRandom {
    fn uniform(&mut self) -> Result<f64, RandomError> {
        Ok(self.rng.random::<f64>())
    }
}

/// 有限的预置序列，耗尽后报错
#[derive(Debug, Clone, Default)]
pub struct ScriptedRandom {
    values: VecDeque<f64>,
    consumed: usize,
}

impl ScriptedRandom {
    pub fn new(values: impl IntoIterator<Item = f64>) -> Result<Self, RandomError> {
        let values: VecDeque<f64> = values.into_iter().collect();
        if let Some(&bad) = values.iter().find(|v| !(0.0..1.0).contains(*v)) {
            return Err(RandomError::OutOfRange(bad));
        }
        Ok(Self {
            values,
            consumed: 0,
        })
    }

    /// 剩余未消费的值个数
    pub fn remaining(&self) -> usize {
        self.values.len()
    }
}

impl RandomSource for ScriptedRandom {
    fn uniform(&mut self) -> Result<f64, RandomError> {
        let v = self.values.pop_front().ok_or(RandomError::Exhausted {
            consumed: self.consumed,
        })?;
        self.consumed += 1;
        Ok(v)
    }
}

/// 可注入、可临时替换的随机源。
///
/// 每个模型实例持有自己的 `Randomness`；`script` 只影响该实例。
pub struct Randomness {
    base: Box<dyn RandomSource>,
    scripted: Option<ScriptedRandom>,
}

impl Randomness {
    pub fn new(base: impl RandomSource + 'static) -> Self {
        Self {
            base: Box::new(base),
            scripted: None,
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRandom::seeded(seed))
    }

    /// 用预置序列覆盖原随机源，直到 `restore`
    pub fn script(&mut self, values: impl IntoIterator<Item = f64>) -> Result<(), RandomError> {
        let scripted = ScriptedRandom::new(values)?;
        trace!(values = scripted.remaining(), "安装预置随机序列");
        self.scripted = Some(scripted);
        Ok(())
    }

    /// 撤销 `script`，恢复原随机源
    pub fn restore(&mut self) {
        self.scripted = None;
    }

    pub fn is_scripted(&self) -> bool {
        self.scripted.is_some()
    }
}

impl std::fmt::Debug for Randomness {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Randomness")
            .field("scripted", &self.scripted)
            .finish_non_exhaustive()
    }
}

impl RandomSource for Randomness {
    fn uniform(&mut self) -> Result<f64, RandomError> {
        match self.scripted.as_mut() {
            Some(scripted) => scripted.uniform(),
            None => self.base.uniform(),
        }
    }
}
