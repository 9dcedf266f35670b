use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use schedsim_core::{Result, SchedulingPolicy, Task, Ticks};
use tracing::{debug, trace};

use crate::admission::{Arrivals, Clock, Job, ReadySet};
use crate::metrics::TurnaroundAggregator;

/// Heap entry ordered by (length, arrival order)
#[derive(Debug)]
struct ByLength(Job);

impl ByLength {
    fn key(&self) -> (Ticks, usize) {
        (self.0.task.length, self.0.seq)
    }
}

impl Ord for ByLength {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}

impl PartialOrd for ByLength {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Eq for ByLength {}

impl PartialEq for ByLength {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

/// Min-heap on length (BinaryHeap is max-heap by default)
#[derive(Debug, Default)]
struct ShortestFirst(BinaryHeap<Reverse<ByLength>>);

impl ShortestFirst {
    fn pop(&mut self) -> Option<Job> {
        self.0.pop().map(|Reverse(ByLength(job))| job)
    }
}

impl ReadySet for ShortestFirst {
    fn admit(&mut self, job: Job) {
        self.0.push(Reverse(ByLength(job)));
    }

    fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Shortest-job-first, non-preemptive
///
/// Equal lengths run in arrival order.
#[derive(Debug, Default, Clone, Copy)]
pub struct Sjf;

impl Sjf {
    pub fn new() -> Self {
        Sjf
    }
}

impl SchedulingPolicy for Sjf {
    fn run(&self, tasks: &[Task]) -> Result<Ticks> {
        let mut arrivals = Arrivals::new(tasks)?;
        let mut clock = Clock::new();
        let mut turnaround = TurnaroundAggregator::new(arrivals.len());
        let mut budget = arrivals.step_budget("SJF");
        let mut ready = ShortestFirst::default();
        debug!(policy = self.name(), tasks = arrivals.len(), "starting run");

        while !arrivals.is_drained() || !ready.is_empty() {
            budget.step()?;
            if !arrivals.admit_or_jump(&mut clock, &mut ready)? {
                continue;
            }

            if let Some(job) = ready.pop() {
                clock.advance(job.task.length);
                trace!(task = job.task.id, now = clock.now(), "completed");
                turnaround.record(&job.task, clock.now())?;
            }
        }

        turnaround.finish()
    }

    fn name(&self) -> &str {
        "SJF"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policies::Fcfs;

    #[test]
    fn test_sjf_scenario() {
        let tasks = vec![Task::new(1, 5, 0), Task::new(2, 3, 1), Task::new(3, 8, 2)];
        // Task 1 is committed at t=0; then 2 before 3
        assert_eq!(Sjf::new().run(&tasks).unwrap(), 8);
    }

    #[test]
    fn test_sjf_picks_shortest_ready() {
        let tasks = vec![
            Task::new(1, 4, 0),
            Task::new(2, 9, 1),
            Task::new(3, 1, 2),
        ];
        // 1: 0..4 (4), 3: 4..5 (3), 2: 5..14 (13) -> 20 / 3
        assert_eq!(Sjf::new().run(&tasks).unwrap(), 6);
        // FCFS: 4, 12, 12 -> 28 / 3
        assert_eq!(Fcfs::new().run(&tasks).unwrap(), 9);
    }

    #[test]
    fn test_sjf_ties_run_in_arrival_order() {
        let tasks = vec![Task::new(1, 1, 0), Task::new(2, 3, 0), Task::new(3, 3, 0)];
        let mut ready = ShortestFirst::default();
        let mut arrivals = Arrivals::new(&tasks).unwrap();
        arrivals.admit(0, &mut ready);

        let ids: Vec<_> = std::iter::from_fn(|| ready.pop())
            .map(|job| job.task.id)
            .collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_sjf_jumps_over_idle_time() {
        let tasks = vec![Task::new(1, 2, 5), Task::new(2, 2, 20)];
        assert_eq!(Sjf::new().run(&tasks).unwrap(), 2);
    }
}
