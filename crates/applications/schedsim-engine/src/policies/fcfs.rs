use schedsim_core::{Result, SchedulingPolicy, Task, Ticks};
use tracing::{debug, trace};

use crate::admission::{Arrivals, Clock};
use crate::metrics::TurnaroundAggregator;

/// First-come-first-served: arrival order, each task runs to completion
#[derive(Debug, Default, Clone, Copy)]
pub struct Fcfs;

impl Fcfs {
    pub fn new() -> Self {
        Fcfs
    }
}

impl SchedulingPolicy for Fcfs {
    fn run(&self, tasks: &[Task]) -> Result<Ticks> {
        let mut arrivals = Arrivals::new(tasks)?;
        let mut clock = Clock::new();
        let mut turnaround = TurnaroundAggregator::new(arrivals.len());
        debug!(policy = self.name(), tasks = arrivals.len(), "starting run");

        // The sorted sequence is the ready set
        while let Some(job) = arrivals.pop_next() {
            clock.jump_to(job.task.arrival_time);
            clock.advance(job.task.length);
            trace!(task = job.task.id, now = clock.now(), "completed");
            turnaround.record(&job.task, clock.now())?;
        }

        turnaround.finish()
    }

    fn name(&self) -> &str {
        "FCFS"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fcfs_scenario() {
        let tasks = vec![Task::new(1, 5, 0), Task::new(2, 3, 1), Task::new(3, 8, 2)];
        // Completions at 5, 8, 16 -> turnarounds 5, 7, 14
        assert_eq!(Fcfs::new().run(&tasks).unwrap(), 8);
    }

    #[test]
    fn test_fcfs_idle_gap() {
        let tasks = vec![Task::new(1, 2, 0), Task::new(2, 3, 10)];
        // Second task starts at its arrival, not at 2
        assert_eq!(Fcfs::new().run(&tasks).unwrap(), (2 + 3) / 2);
    }

    #[test]
    fn test_fcfs_ignores_input_order() {
        let sorted = vec![Task::new(1, 5, 0), Task::new(2, 3, 1), Task::new(3, 8, 2)];
        let shuffled = vec![sorted[2], sorted[0], sorted[1]];
        assert_eq!(
            Fcfs::new().run(&sorted).unwrap(),
            Fcfs::new().run(&shuffled).unwrap()
        );
    }

    #[test]
    fn test_fcfs_equal_arrivals_keep_input_order() {
        // Long task first: 10 and 11; short task first: 1 and 11
        let long_first = vec![Task::new(1, 10, 0), Task::new(2, 1, 0)];
        let short_first = vec![Task::new(2, 1, 0), Task::new(1, 10, 0)];
        assert_eq!(Fcfs::new().run(&long_first).unwrap(), 10);
        assert_eq!(Fcfs::new().run(&short_first).unwrap(), 6);
    }
}
