//! Scheduling policies
//!
//! Implements six policies to compare:
//! - FCFS: arrival order, run to completion
//! - SJF: shortest ready job first, run to completion
//! - RR: FIFO with a fixed time quantum
//! - FeedBack: multilevel feedback queues with doubling quanta
//! - Lottery: length-weighted random draw, run to completion
//! - Stride: lowest pass value first, run to completion

mod fcfs;
mod feedback;
mod lottery;
mod round_robin;
mod sjf;
mod stride;

pub use fcfs::Fcfs;
pub use feedback::Feedback;
pub use lottery::{Lottery, SeededTickets, TicketSource};
pub use round_robin::RoundRobin;
pub use sjf::Sjf;
pub use stride::Stride;

use std::fmt;
use std::str::FromStr;

use schedsim_core::{Result, SchedError, SchedulingPolicy, Ticks};
use serde::{Deserialize, Serialize};

/// Number of feedback levels
pub const LEVEL: usize = 4;

/// Upper bound on FeedBack levels; quanta saturate past level 63 anyway
pub const MAX_LEVELS: usize = 64;

/// Numerator used to derive a task's stride from its length
pub const BIG_STRIDE: Ticks = 10_000;

/// Seed for lottery draws
pub const DEFAULT_SEED: u64 = 42;

/// Default RR quantum and FeedBack base quantum
pub const DEFAULT_QUANTUM: Ticks = 2;

/// Which policy to run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PolicyKind {
    Fcfs,
    Sjf,
    #[serde(rename = "rr")]
    RoundRobin,
    Feedback,
    Lottery,
    Stride,
}

impl PolicyKind {
    pub const ALL: [PolicyKind; 6] = [
        PolicyKind::Fcfs,
        PolicyKind::Sjf,
        PolicyKind::RoundRobin,
        PolicyKind::Feedback,
        PolicyKind::Lottery,
        PolicyKind::Stride,
    ];

    /// Construct the policy with the parameters in `config`
    pub fn build(self, config: &PolicyConfig) -> Result<Box<dyn SchedulingPolicy>> {
        let policy: Box<dyn SchedulingPolicy> = match self {
            PolicyKind::Fcfs => Box::new(Fcfs::new()),
            PolicyKind::Sjf => Box::new(Sjf::new()),
            PolicyKind::RoundRobin => Box::new(RoundRobin::new(config.quantum)?),
            PolicyKind::Feedback => Box::new(Feedback::new(config.base_quantum, config.levels)?),
            PolicyKind::Lottery => Box::new(Lottery::new(config.seed)),
            PolicyKind::Stride => Box::new(Stride::new(config.big_stride)?),
        };
        Ok(policy)
    }

    /// Short name accepted on the command line
    pub fn as_str(self) -> &'static str {
        match self {
            PolicyKind::Fcfs => "fcfs",
            PolicyKind::Sjf => "sjf",
            PolicyKind::RoundRobin => "rr",
            PolicyKind::Feedback => "feedback",
            PolicyKind::Lottery => "lottery",
            PolicyKind::Stride => "stride",
        }
    }
}

impl fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PolicyKind {
    type Err = SchedError;

    fn from_str(s: &str) -> Result<Self> {
        let name = s.trim().to_ascii_lowercase();
        PolicyKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == name)
            .ok_or_else(|| SchedError::invalid_input(format!("unknown policy: {s}")))
    }
}

/// Tunables for the parameterised policies
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    /// RR time quantum
    pub quantum: Ticks,
    /// FeedBack quantum at level 0; doubles at each level below
    pub base_quantum: Ticks,
    /// FeedBack level count
    pub levels: usize,
    /// Stride numerator
    pub big_stride: Ticks,
    /// Lottery seed
    pub seed: u64,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        PolicyConfig {
            quantum: DEFAULT_QUANTUM,
            base_quantum: DEFAULT_QUANTUM,
            levels: LEVEL,
            big_stride: BIG_STRIDE,
            seed: DEFAULT_SEED,
        }
    }
}
