//! Schedsim Simulation Engine
//!
//! Discrete-event simulator for comparing CPU-scheduling policies by the
//! average turnaround time they produce over the same workload.

pub mod admission;
pub mod metrics;
pub mod policies;
pub mod simulator;
pub mod workload;

pub use schedsim_core::{Result, SchedError, SchedulingPolicy, Task, TaskId, Ticks};
