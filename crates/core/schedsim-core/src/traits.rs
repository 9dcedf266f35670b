//! Core traits for Schedsim
//!
//! The SchedulingPolicy trait defines the interface ALL policies implement.
//! The comparison runner works through this interface ONLY - never concrete types.

use crate::error::SchedError;
use crate::types::{Task, Ticks};

/// Result type for policy operations
pub type Result<T> = std::result::Result<T, SchedError>;

/// A CPU-scheduling policy
///
/// `run` simulates the workload to completion and returns the average
/// turnaround time, truncated toward zero. It takes the tasks by shared
/// reference, so the same workload can be fed to any number of policies.
pub trait SchedulingPolicy {
    /// Simulate `tasks` and return the average turnaround time
    fn run(&self, tasks: &[Task]) -> Result<Ticks>;

    /// Get policy name
    fn name(&self) -> &str;
}
