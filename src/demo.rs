//! 演示模型
//!
//! 单服务台排队系统：顾客按随机间隔到达，服务台一次服务一位顾客，
//! 其余顾客先到先服务地排队。完全由事件队列驱动。

use crate::random::{RandomError, RandomSource, Randomness};
use crate::sim::{EventQueue, Model, Outcome, SimError, SimTime, stop};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use tracing::trace;

/// 单服务台排队配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueueOpts {
    /// 到达顾客总数上限；`None` 表示一直到达
    pub customers: Option<u64>,
    /// 到达间隔 = (1 + below(arrival_spread)) 个 tick
    pub arrival_spread: u64,
    /// 服务时长 = (1 + below(service_spread)) 个 tick
    pub service_spread: u64,
    /// 一个 tick 的纳秒数
    pub tick_ns: u64,
    /// 服务完这么多顾客后发出停止信号
    pub stop_after_served: Option<u64>,
    pub seed: u64,
}

impl Default for QueueOpts {
    fn default() -> Self {
        Self {
            customers: Some(100),
            arrival_spread: 10,
            service_spread: 8,
            tick_ns: 1_000,
            stop_after_served: None,
            seed: 1,
        }
    }
}

/// 单个顾客的时间线
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CustomerRecord {
    pub id: u64,
    pub arrival: SimTime,
    pub service_begin: Option<SimTime>,
    pub service_end: Option<SimTime>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct QueueStats {
    pub arrived: u64,
    pub served: u64,
    pub max_waiting: usize,
    /// 已开始服务顾客的平均等待时间（纳秒）
    pub mean_wait_ns: f64,
}

#[derive(Debug)]
pub struct SingleServerQueue {
    opts: QueueOpts,
    rng: Randomness,
    waiting: VecDeque<u64>,
    in_service: Option<u64>,
    arrived: u64,
    served: u64,
    max_waiting: usize,
    records: Vec<CustomerRecord>,
}

impl SingleServerQueue {
    pub fn new(opts: QueueOpts) -> Self {
        let rng = Randomness::seeded(opts.seed);
        Self::with_random(opts, rng)
    }

    pub fn with_random(opts: QueueOpts, rng: Randomness) -> Self {
        Self {
            opts,
            rng,
            waiting: VecDeque::new(),
            in_service: None,
            arrived: 0,
            served: 0,
            max_waiting: 0,
            records: Vec::new(),
        }
    }

    pub fn opts(&self) -> &QueueOpts {
        &self.opts
    }

    pub fn rng_mut(&mut self) -> &mut Randomness {
        &mut self.rng
    }

    pub fn records(&self) -> &[CustomerRecord] {
        &self.records
    }

    pub fn stats(&self) -> QueueStats {
        let waits: Vec<u64> = self
            .records
            .iter()
            .filter_map(|r| r.service_begin.map(|b| b.0 - r.arrival.0))
            .collect();
        let mean_wait_ns = if waits.is_empty() {
            0.0
        } else {
            waits.iter().sum::<u64>() as f64 / waits.len() as f64
        };
        QueueStats {
            arrived: self.arrived,
            served: self.served,
            max_waiting: self.max_waiting,
            mean_wait_ns,
        }
    }

    fn draw(&mut self, spread: u64) -> Result<SimTime, RandomError> {
        let n = self.rng.below(spread.max(1))?.saturating_add(1);
        Ok(SimTime(self.opts.tick_ns.saturating_mul(n)))
    }

    fn record_mut(&mut self, id: u64) -> Option<&mut CustomerRecord> {
        // 顾客编号从 1 开始，与记录下标一一对应
        self.records.get_mut(id.checked_sub(1)? as usize)
    }
}

impl Model for SingleServerQueue {
    type Time = SimTime;

    fn start(&mut self, queue: &mut EventQueue<Self, SimTime>) -> Result<(), SimError<SimTime>> {
        queue.schedule_at(queue.now(), arrival)?;
        Ok(())
    }
}

fn arrival(q: &mut EventQueue<SingleServerQueue>, m: &mut SingleServerQueue) -> Outcome<SimTime> {
    m.arrived += 1;
    let id = m.arrived;
    m.records.push(CustomerRecord {
        id,
        arrival: q.now(),
        service_begin: None,
        service_end: None,
    });
    trace!(id, now = ?q.now(), "顾客到达");

    if m.opts.customers.is_none_or(|max| m.arrived < max) {
        let gap = m.draw(m.opts.arrival_spread)?;
        q.schedule_after(gap, arrival)?;
    }
    if m.in_service.is_none() {
        begin_service(q, m, id)
    } else {
        m.waiting.push_back(id);
        m.max_waiting = m.max_waiting.max(m.waiting.len());
        Ok(())
    }
}

fn begin_service(
    q: &mut EventQueue<SingleServerQueue>,
    m: &mut SingleServerQueue,
    id: u64,
) -> Outcome<SimTime> {
    m.in_service = Some(id);
    let now = q.now();
    if let Some(r) = m.record_mut(id) {
        r.service_begin = Some(now);
    }
    let service = m.draw(m.opts.service_spread)?;
    q.schedule_after(service, move |q, m| end_service(q, m, id))?;
    Ok(())
}

fn end_service(
    q: &mut EventQueue<SingleServerQueue>,
    m: &mut SingleServerQueue,
    id: u64,
) -> Outcome<SimTime> {
    let now = q.now();
    if let Some(r) = m.record_mut(id) {
        r.service_end = Some(now);
    }
    m.in_service = None;
    m.served += 1;
    trace!(id, ?now, served = m.served, "服务结束");

    if m.opts.stop_after_served.is_some_and(|n| m.served >= n) {
        return stop();
    }
    match m.waiting.pop_front() {
        Some(next) => begin_service(q, m, next),
        None => Ok(()),
    }
}
