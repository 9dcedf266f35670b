//! Clock and arrival admission shared by every policy
//!
//! Each policy drives its own event loop, but they all advance time and admit
//! arrivals the same way:
//! - tasks are stable-sorted by arrival time once, into a private working copy
//! - at every decision point, every task with `arrival_time <= now` is admitted
//!   into the policy's ready set, in arrival order, exactly once
//! - if the ready set is empty, the clock jumps to the next arrival (idle time
//!   is never simulated tick by tick)

use std::collections::VecDeque;

use schedsim_core::{Result, SchedError, Task, Ticks};
use tracing::{debug, warn};

/// Working copy of a task inside a single run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Job {
    pub task: Task,
    pub remaining: Ticks,
    /// Position in the arrival-sorted order; breaks ties deterministically
    pub seq: usize,
}

impl Job {
    fn new(task: Task, seq: usize) -> Self {
        Job {
            task,
            remaining: task.length,
            seq,
        }
    }

    /// Run for at most `quantum` ticks and return the slice actually used
    pub fn run_slice(&mut self, quantum: Ticks) -> Ticks {
        let slice = quantum.min(self.remaining);
        self.remaining -= slice;
        slice
    }

    pub fn is_finished(&self) -> bool {
        self.remaining == 0
    }
}

/// A policy's collection of arrived, unfinished jobs
pub trait ReadySet {
    /// Accept a newly admitted job
    fn admit(&mut self, job: Job);

    fn is_empty(&self) -> bool;
}

/// Plain FIFO ready set
impl ReadySet for VecDeque<Job> {
    fn admit(&mut self, job: Job) {
        self.push_back(job);
    }

    fn is_empty(&self) -> bool {
        VecDeque::is_empty(self)
    }
}

/// Check a workload before any policy touches it
///
/// Rejects empty task lists, zero-length tasks, and workloads whose horizon
/// (`max(arrival_time) + sum(length)`) would overflow the clock.
/// Returns the total CPU demand.
pub fn validate_workload(tasks: &[Task]) -> Result<Ticks> {
    if tasks.is_empty() {
        return Err(SchedError::invalid_input("task list is empty"));
    }

    let mut total_length: Ticks = 0;
    let mut last_arrival: Ticks = 0;
    for task in tasks {
        if task.length == 0 {
            return Err(SchedError::invalid_input(format!(
                "{task} has zero length"
            )));
        }
        total_length = total_length.checked_add(task.length).ok_or_else(|| {
            SchedError::invalid_input("total task length overflows the clock")
        })?;
        last_arrival = last_arrival.max(task.arrival_time);
    }

    last_arrival
        .checked_add(total_length)
        .ok_or_else(|| SchedError::invalid_input("workload horizon overflows the clock"))?;

    Ok(total_length)
}

/// Simulation clock; never moves backwards
#[derive(Debug, Default, Clone, Copy)]
pub struct Clock {
    now: Ticks,
}

impl Clock {
    pub fn new() -> Self {
        Clock { now: 0 }
    }

    pub fn now(&self) -> Ticks {
        self.now
    }

    /// Advance by an executed slice
    pub fn advance(&mut self, slice: Ticks) {
        // Bounded by the workload horizon checked in validate_workload
        self.now = self.now.saturating_add(slice);
    }

    /// Jump forward to `time`; a no-op if `time` is already in the past
    pub fn jump_to(&mut self, time: Ticks) {
        self.now = self.now.max(time);
    }
}

/// Upper bound on event-loop iterations for one run
///
/// Every iteration either executes at least one tick or performs one of at
/// most `n` time jumps, so `sum(length) + n + 1` iterations always suffice.
#[derive(Debug)]
pub struct StepBudget {
    policy: &'static str,
    remaining: u64,
}

impl StepBudget {
    /// Consume one iteration
    pub fn step(&mut self) -> Result<()> {
        if self.remaining == 0 {
            warn!(policy = self.policy, "event loop exceeded its step budget");
            return Err(SchedError::invariant(format!(
                "{} event loop did not terminate within its step budget",
                self.policy
            )));
        }
        self.remaining -= 1;
        Ok(())
    }
}

/// Arrival-sorted working copy of a workload plus the admission cursor
#[derive(Debug)]
pub struct Arrivals {
    pending: Vec<Task>,
    cursor: usize,
    total_length: Ticks,
}

impl Arrivals {
    /// Validate `tasks` and stable-sort a private copy by arrival time
    pub fn new(tasks: &[Task]) -> Result<Self> {
        let total_length = validate_workload(tasks)?;

        let mut pending = tasks.to_vec();
        // sort_by_key is stable: equal arrivals keep input order
        pending.sort_by_key(|task| task.arrival_time);

        Ok(Arrivals {
            pending,
            cursor: 0,
            total_length,
        })
    }

    /// Number of tasks in the workload
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// True once every task has been admitted
    pub fn is_drained(&self) -> bool {
        self.cursor == self.pending.len()
    }

    /// Arrival time of the next unadmitted task
    pub fn next_arrival(&self) -> Option<Ticks> {
        self.pending.get(self.cursor).map(|task| task.arrival_time)
    }

    pub fn step_budget(&self, policy: &'static str) -> StepBudget {
        StepBudget {
            policy,
            remaining: self
                .total_length
                .saturating_add(self.pending.len() as u64)
                .saturating_add(1),
        }
    }

    /// Take the next task in arrival order regardless of the clock
    pub fn pop_next(&mut self) -> Option<Job> {
        let task = *self.pending.get(self.cursor)?;
        let job = Job::new(task, self.cursor);
        self.cursor += 1;
        Some(job)
    }

    /// Admit every task that has arrived by `now`; returns how many were admitted
    pub fn admit<R: ReadySet + ?Sized>(&mut self, now: Ticks, ready: &mut R) -> usize {
        let mut admitted = 0;
        while self.next_arrival().is_some_and(|arrival| arrival <= now) {
            if let Some(job) = self.pop_next() {
                ready.admit(job);
                admitted += 1;
            }
        }
        admitted
    }

    /// Admit arrivals, then jump the clock if nothing is ready
    ///
    /// Returns `Ok(true)` when the ready set holds at least one job, and
    /// `Ok(false)` after a time jump (the caller re-enters its loop, which
    /// admits the tasks that arrive at the new time).
    pub fn admit_or_jump<R: ReadySet + ?Sized>(
        &mut self,
        clock: &mut Clock,
        ready: &mut R,
    ) -> Result<bool> {
        self.admit(clock.now(), ready);
        if !ready.is_empty() {
            return Ok(true);
        }

        match self.next_arrival() {
            Some(arrival) => {
                debug!(from = clock.now(), to = arrival, "ready set empty, jumping clock");
                clock.jump_to(arrival);
                Ok(false)
            }
            None => Err(SchedError::invariant(
                "ready set is empty and no arrivals remain",
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenario() -> Vec<Task> {
        vec![Task::new(1, 5, 0), Task::new(2, 3, 1), Task::new(3, 8, 2)]
    }

    #[test]
    fn test_validate_rejects_empty() {
        let err = validate_workload(&[]).unwrap_err();
        assert!(matches!(err, SchedError::InvalidInput(_)));
    }

    #[test]
    fn test_validate_rejects_zero_length() {
        let tasks = vec![Task::new(1, 4, 0), Task::new(2, 0, 3)];
        let err = validate_workload(&tasks).unwrap_err();
        assert!(matches!(err, SchedError::InvalidInput(_)));
    }

    #[test]
    fn test_validate_rejects_horizon_overflow() {
        let tasks = vec![Task::new(1, Ticks::MAX, 0), Task::new(2, 1, 1)];
        assert!(matches!(
            validate_workload(&tasks),
            Err(SchedError::InvalidInput(_))
        ));

        let tasks = vec![Task::new(1, 2, Ticks::MAX - 1)];
        assert!(matches!(
            validate_workload(&tasks),
            Err(SchedError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_validate_returns_total_length() {
        assert_eq!(validate_workload(&scenario()).unwrap(), 16);
    }

    #[test]
    fn test_arrivals_stable_sort() {
        let tasks = vec![
            Task::new(10, 1, 4),
            Task::new(11, 1, 0),
            Task::new(12, 1, 4),
            Task::new(13, 1, 0),
        ];
        let mut arrivals = Arrivals::new(&tasks).unwrap();

        let order: Vec<_> = std::iter::from_fn(|| arrivals.pop_next())
            .map(|job| (job.task.id, job.seq))
            .collect();
        assert_eq!(order, vec![(11, 0), (13, 1), (10, 2), (12, 3)]);
    }

    #[test]
    fn test_admit_only_arrived_tasks() {
        let mut arrivals = Arrivals::new(&scenario()).unwrap();
        let mut ready: VecDeque<Job> = VecDeque::new();

        assert_eq!(arrivals.admit(0, &mut ready), 1);
        assert_eq!(arrivals.admit(0, &mut ready), 0, "never re-admits");
        assert_eq!(arrivals.admit(5, &mut ready), 2);
        assert!(arrivals.is_drained());

        let ids: Vec<_> = ready.iter().map(|job| job.task.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_admit_or_jump() {
        let tasks = vec![Task::new(1, 2, 7), Task::new(2, 2, 9)];
        let mut arrivals = Arrivals::new(&tasks).unwrap();
        let mut ready: VecDeque<Job> = VecDeque::new();
        let mut clock = Clock::new();

        assert!(!arrivals.admit_or_jump(&mut clock, &mut ready).unwrap());
        assert_eq!(clock.now(), 7);

        assert!(arrivals.admit_or_jump(&mut clock, &mut ready).unwrap());
        assert_eq!(ready.len(), 1);
    }

    #[test]
    fn test_admit_or_jump_with_nothing_left() {
        let mut arrivals = Arrivals::new(&[Task::new(1, 1, 0)]).unwrap();
        let mut ready: VecDeque<Job> = VecDeque::new();
        let mut clock = Clock::new();

        arrivals.admit(0, &mut ready);
        ready.clear();
        let err = arrivals.admit_or_jump(&mut clock, &mut ready).unwrap_err();
        assert!(matches!(err, SchedError::InternalInvariantViolation(_)));
    }

    #[test]
    fn test_clock_never_moves_backwards() {
        let mut clock = Clock::new();
        clock.advance(5);
        clock.jump_to(3);
        assert_eq!(clock.now(), 5);
        clock.jump_to(9);
        assert_eq!(clock.now(), 9);
    }

    #[test]
    fn test_job_run_slice() {
        let mut job = Job::new(Task::new(1, 5, 0), 0);
        assert_eq!(job.run_slice(2), 2);
        assert_eq!(job.remaining, 3);
        assert_eq!(job.run_slice(10), 3);
        assert!(job.is_finished());
    }

    #[test]
    fn test_step_budget_exhaustion() {
        let arrivals = Arrivals::new(&[Task::new(1, 1, 0)]).unwrap();
        let mut budget = arrivals.step_budget("test");

        // 1 tick + 1 task + 1
        for _ in 0..3 {
            budget.step().unwrap();
        }
        let err = budget.step().unwrap_err();
        assert!(matches!(err, SchedError::InternalInvariantViolation(_)));
    }
}
