use std::collections::VecDeque;

use schedsim_core::{Result, SchedError, SchedulingPolicy, Task, Ticks};
use tracing::{debug, trace};

use crate::admission::{Arrivals, Clock, Job};
use crate::metrics::TurnaroundAggregator;

/// Round-robin with a fixed time quantum
#[derive(Debug, Clone, Copy)]
pub struct RoundRobin {
    quantum: Ticks,
}

impl RoundRobin {
    /// Fails if `quantum` is zero
    pub fn new(quantum: Ticks) -> Result<Self> {
        if quantum == 0 {
            return Err(SchedError::invalid_input("RR quantum must be positive"));
        }
        Ok(RoundRobin { quantum })
    }

    pub fn quantum(&self) -> Ticks {
        self.quantum
    }
}

impl SchedulingPolicy for RoundRobin {
    fn run(&self, tasks: &[Task]) -> Result<Ticks> {
        let mut arrivals = Arrivals::new(tasks)?;
        let mut clock = Clock::new();
        let mut turnaround = TurnaroundAggregator::new(arrivals.len());
        let mut budget = arrivals.step_budget("RR");
        let mut ready: VecDeque<Job> = VecDeque::new();
        debug!(
            policy = self.name(),
            quantum = self.quantum,
            tasks = arrivals.len(),
            "starting run"
        );

        while !arrivals.is_drained() || !ready.is_empty() {
            budget.step()?;
            if !arrivals.admit_or_jump(&mut clock, &mut ready)? {
                continue;
            }

            let Some(mut job) = ready.pop_front() else {
                continue;
            };
            let slice = job.run_slice(self.quantum);
            clock.advance(slice);
            trace!(task = job.task.id, slice, now = clock.now(), "ran slice");

            // Mid-slice arrivals queue ahead of the preempted job
            arrivals.admit(clock.now(), &mut ready);

            if job.is_finished() {
                turnaround.record(&job.task, clock.now())?;
            } else {
                ready.push_back(job);
            }
        }

        turnaround.finish()
    }

    fn name(&self) -> &str {
        "RR"
    }
}
