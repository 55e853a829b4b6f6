//! 单服务台排队仿真
//!
//! 运行 demo 中的单服务台排队模型，输出每位顾客的时间线与汇总统计

use clap::Parser;
use evsched_rs::demo::{QueueOpts, SingleServerQueue};
use evsched_rs::sim::{SimTime, Simulation};
use serde_json::json;
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(name = "queue-sim", about = "单服务台排队仿真（离散事件调度器示例）")]
struct Args {
    /// JSON 配置文件（字段同 QueueOpts，命令行参数优先）
    #[arg(long)]
    config: Option<PathBuf>,
    /// 到达顾客总数
    #[arg(long)]
    customers: Option<u64>,
    #[arg(long)]
    arrival_spread: Option<u64>,
    #[arg(long)]
    service_spread: Option<u64>,
    /// 一个 tick 的纳秒数
    #[arg(long)]
    tick_ns: Option<u64>,
    /// 服务完这么多顾客后停止
    #[arg(long)]
    stop_after_served: Option<u64>,
    #[arg(long)]
    seed: Option<u64>,
    /// 只运行到多少微秒
    #[arg(long)]
    until_us: Option<u64>,
    /// 打印每位顾客的时间线
    #[arg(long)]
    customers_log: bool,
    /// 以 JSON 输出汇总
    #[arg(long)]
    json: bool,
}

impl Args {
    fn opts(&self) -> QueueOpts {
        let mut opts = match &self.config {
            Some(path) => {
                let raw = fs::read_to_string(path).expect("read config json");
                serde_json::from_str(&raw).expect("parse config json")
            }
            None => QueueOpts::default(),
        };
        if let Some(v) = self.customers {
            opts.customers = Some(v);
        }
        if let Some(v) = self.arrival_spread {
            opts.arrival_spread = v;
        }
        if let Some(v) = self.service_spread {
            opts.service_spread = v;
        }
        if let Some(v) = self.tick_ns {
            opts.tick_ns = v;
        }
        if let Some(v) = self.stop_after_served {
            opts.stop_after_served = Some(v);
        }
        if let Some(v) = self.seed {
            opts.seed = v;
        }
        opts
    }
}

fn main() -> ExitCode {
    // 初始化 tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_file(true)
        .with_line_number(true)
        .with_target(true)
        .init();

    let args = Args::parse();
    let opts = args.opts();
    let mut sim = Simulation::new(SingleServerQueue::new(opts));

    let result = match args.until_us {
        Some(us) => sim
            .start()
            .and_then(|()| sim.run_to(SimTime::from_micros(us)))
            .map(|stop| json!({ "stop": stop, "now": sim.now() })),
        None => sim.run().map(|summary| {
            json!({
                "stop": summary.stop,
                "now": summary.now,
                "events": summary.events,
            })
        }),
    };
    let run = match result {
        Ok(run) => run,
        Err(e) => {
            eprintln!("simulation failed: {e}");
            return ExitCode::FAILURE;
        }
    };

    let model = sim.model();
    let stats = model.stats();
    if args.json {
        let out = json!({
            "run": run,
            "stats": stats,
            "customers": model.records(),
        });
        println!("{out}");
        return ExitCode::SUCCESS;
    }

    if args.customers_log {
        for r in model.records() {
            println!(
                "customer id={} arrival={:?} begin={:?} end={:?}",
                r.id, r.arrival, r.service_begin, r.service_end
            );
        }
    }
    println!(
        "done @ {:?}, arrived={}, served={}, max_waiting={}, mean_wait_ns={:.1}",
        sim.now(),
        stats.arrived,
        stats.served,
        stats.max_waiting,
        stats.mean_wait_ns
    );
    ExitCode::SUCCESS
}
