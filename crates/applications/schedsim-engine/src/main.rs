//! Schedsim CLI
//!
//! Command-line interface for comparing CPU-scheduling policies on a
//! synthetic (or JSON-supplied) workload.

use std::fs;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use schedsim_engine::{
    SchedulingPolicy, Task,
    policies::{BIG_STRIDE, DEFAULT_QUANTUM, DEFAULT_SEED, LEVEL, PolicyConfig, PolicyKind},
    simulator::Simulator,
    workload::WorkloadGenerator,
};

#[derive(Parser, Debug)]
#[command(name = "schedsim")]
#[command(about = "Compare CPU-scheduling policies by average turnaround time", long_about = None)]
struct Args {
    /// Number of tasks to generate
    #[arg(short, long, default_value_t = 20)]
    tasks: usize,

    /// Workload RNG seed
    #[arg(short, long, default_value_t = 7)]
    seed: u64,

    /// Mean gap between arrivals (ticks)
    #[arg(long, default_value_t = 3.0)]
    mean_interarrival: f64,

    /// Shortest generated task (ticks)
    #[arg(long, default_value_t = 1)]
    min_length: u64,

    /// Longest generated task (ticks)
    #[arg(long, default_value_t = 10)]
    max_length: u64,

    /// Policies to compare (comma-separated: fcfs,sjf,rr,feedback,lottery,stride)
    #[arg(short, long, default_value = "fcfs,sjf,rr,feedback,lottery,stride")]
    policies: String,

    /// RR time quantum
    #[arg(long, default_value_t = DEFAULT_QUANTUM)]
    quantum: u64,

    /// FeedBack quantum at the top level
    #[arg(long, default_value_t = DEFAULT_QUANTUM)]
    base_quantum: u64,

    /// FeedBack level count
    #[arg(long, default_value_t = LEVEL)]
    levels: usize,

    /// Stride numerator
    #[arg(long, default_value_t = BIG_STRIDE)]
    big_stride: u64,

    /// Lottery draw seed
    #[arg(long, default_value_t = DEFAULT_SEED)]
    lottery_seed: u64,

    /// Read tasks from a JSON file instead of generating them
    #[arg(short, long)]
    workload: Option<String>,

    /// Output JSON file path (optional)
    #[arg(short, long)]
    output: Option<String>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "schedsim_engine=info,info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    println!("╔══════════════════════════════════════════════════════════╗");
    println!("║  Schedsim Policy Comparison                              ║");
    println!("╚══════════════════════════════════════════════════════════╝\n");

    let tasks = load_tasks(&args)?;

    let config = PolicyConfig {
        quantum: args.quantum,
        base_quantum: args.base_quantum,
        levels: args.levels,
        big_stride: args.big_stride,
        seed: args.lottery_seed,
    };

    println!("Configuration:");
    println!("  Tasks: {}", tasks.len());
    println!("  RR quantum: {}", config.quantum);
    println!("  FeedBack: base quantum {}, {} levels", config.base_quantum, config.levels);
    println!("  Stride numerator: {}", config.big_stride);
    println!("  Lottery seed: {}\n", config.seed);

    let policies = args
        .policies
        .split(',')
        .filter(|name| !name.trim().is_empty())
        .map(|name| -> anyhow::Result<Box<dyn SchedulingPolicy>> {
            let kind: PolicyKind = name.parse()?;
            Ok(kind.build(&config)?)
        })
        .collect::<anyhow::Result<Vec<_>>>()
        .context("Failed to build policies")?;

    let simulator = Simulator::new(tasks).context("Workload rejected")?;
    let results = simulator.compare(&policies).context("Simulation failed")?;

    println!("{:<12} {:>8} {:>20}", "Policy", "Tasks", "Avg turnaround");
    println!("{}", "-".repeat(42));
    for result in &results {
        println!(
            "{:<12} {:>8} {:>20}",
            result.policy_name, result.total_tasks, result.average_turnaround
        );
    }

    if let Some(best) = results.iter().min_by_key(|r| r.average_turnaround) {
        println!("\nLowest average turnaround: {} ({})", best.policy_name, best.average_turnaround);
    }

    if let Some(output_path) = args.output {
        let json = serde_json::to_string_pretty(&results)?;
        fs::write(&output_path, json)
            .with_context(|| format!("Failed to write {output_path}"))?;
        info!(path = %output_path, "results saved");
    }

    Ok(())
}

/// Read the workload from `--workload`, or generate one
fn load_tasks(args: &Args) -> anyhow::Result<Vec<Task>> {
    match &args.workload {
        Some(path) => {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("Failed to read workload {path}"))?;
            let tasks: Vec<Task> = serde_json::from_str(&raw)
                .with_context(|| format!("Failed to parse workload {path}"))?;
            info!(path = %path, tasks = tasks.len(), "loaded workload");
            Ok(tasks)
        }
        None => {
            let generator = WorkloadGenerator::new(
                args.tasks,
                args.mean_interarrival,
                args.min_length,
                args.max_length,
                args.seed,
            )?;
            let tasks = generator.generate();
            info!(tasks = tasks.len(), seed = args.seed, "generated workload");
            Ok(tasks)
        }
    }
}
