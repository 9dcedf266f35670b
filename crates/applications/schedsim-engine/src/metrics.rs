//! Turnaround accounting

use schedsim_core::{Result, SchedError, Task, Ticks};

/// Accumulates per-task turnaround and produces the truncated average
#[derive(Debug)]
pub struct TurnaroundAggregator {
    expected: usize,
    recorded: usize,
    total: u128,
}

impl TurnaroundAggregator {
    /// Create an aggregator for a workload of `expected` tasks
    pub fn new(expected: usize) -> Self {
        TurnaroundAggregator {
            expected,
            recorded: 0,
            total: 0,
        }
    }

    /// Record that `task` completed at `completion_time`
    ///
    /// Fails if the completion precedes the arrival, or if the turnaround is
    /// shorter than the task's own length.
    pub fn record(&mut self, task: &Task, completion_time: Ticks) -> Result<Ticks> {
        let turnaround = completion_time
            .checked_sub(task.arrival_time)
            .ok_or_else(|| {
                SchedError::invariant(format!(
                    "{task} completed at {completion_time}, before it arrived"
                ))
            })?;

        if turnaround < task.length {
            return Err(SchedError::invariant(format!(
                "{task} has turnaround {turnaround}, shorter than its length"
            )));
        }

        self.total += u128::from(turnaround);
        self.recorded += 1;
        Ok(turnaround)
    }

    pub fn recorded(&self) -> usize {
        self.recorded
    }

    /// Average turnaround, truncated toward zero
    pub fn finish(self) -> Result<Ticks> {
        if self.expected == 0 {
            return Err(SchedError::invalid_input("task list is empty"));
        }
        if self.recorded != self.expected {
            return Err(SchedError::invariant(format!(
                "{} of {} tasks completed",
                self.recorded, self.expected
            )));
        }

        let average = self.total / self.expected as u128;
        Ticks::try_from(average)
            .map_err(|_| SchedError::invariant("average turnaround overflows the clock"))
    }
}
