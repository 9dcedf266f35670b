use std::collections::VecDeque;

use schedsim_core::{Result, SchedError, SchedulingPolicy, Task, Ticks};
use tracing::{debug, trace};

use super::MAX_LEVELS;
use crate::admission::{Arrivals, Clock, Job, ReadySet};
use crate::metrics::TurnaroundAggregator;

/// One FIFO per level; new arrivals always land on level 0
#[derive(Debug)]
struct LevelQueues {
    levels: Vec<VecDeque<Job>>,
}

impl LevelQueues {
    fn new(levels: usize) -> Self {
        LevelQueues {
            levels: (0..levels).map(|_| VecDeque::new()).collect(),
        }
    }

    /// Pop from the highest-priority non-empty level
    fn pop(&mut self) -> Option<(usize, Job)> {
        self.levels
            .iter_mut()
            .enumerate()
            .find_map(|(level, queue)| queue.pop_front().map(|job| (level, job)))
    }

    /// Requeue at `level`, clamped to the bottom level
    fn push(&mut self, level: usize, job: Job) {
        let bottom = self.levels.len() - 1;
        self.levels[level.min(bottom)].push_back(job);
    }
}

impl ReadySet for LevelQueues {
    fn admit(&mut self, job: Job) {
        self.push(0, job);
    }

    fn is_empty(&self) -> bool {
        self.levels.iter().all(VecDeque::is_empty)
    }
}

/// Multilevel feedback queue
///
/// Level `L` runs with quantum `base_quantum * 2^L`. A job that exhausts its
/// quantum without finishing moves one level down; jobs on the bottom level
/// stay there.
#[derive(Debug, Clone, Copy)]
pub struct Feedback {
    base_quantum: Ticks,
    levels: usize,
}

impl Feedback {
    /// Fails if `base_quantum` or `levels` is zero, or `levels` exceeds [`MAX_LEVELS`]
    pub fn new(base_quantum: Ticks, levels: usize) -> Result<Self> {
        if base_quantum == 0 {
            return Err(SchedError::invalid_input(
                "FeedBack base quantum must be positive",
            ));
        }
        if levels == 0 {
            return Err(SchedError::invalid_input(
                "FeedBack needs at least one level",
            ));
        }
        if levels > MAX_LEVELS {
            return Err(SchedError::invalid_input(format!(
                "FeedBack supports at most {MAX_LEVELS} levels, got {levels}"
            )));
        }
        Ok(Feedback {
            base_quantum,
            levels,
        })
    }

    /// Quantum granted at `level`, saturating at `Ticks::MAX`
    pub fn quantum(&self, level: usize) -> Ticks {
        u32::try_from(level)
            .ok()
            .and_then(|shift| 1u64.checked_shl(shift))
            .map_or(Ticks::MAX, |factor| self.base_quantum.saturating_mul(factor))
    }
}

impl SchedulingPolicy for Feedback {
    fn run(&self, tasks: &[Task]) -> Result<Ticks> {
        let mut arrivals = Arrivals::new(tasks)?;
        let mut clock = Clock::new();
        let mut turnaround = TurnaroundAggregator::new(arrivals.len());
        let mut budget = arrivals.step_budget("FeedBack");
        let mut queues = LevelQueues::new(self.levels);
        debug!(
            policy = self.name(),
            base_quantum = self.base_quantum,
            levels = self.levels,
            tasks = arrivals.len(),
            "starting run"
        );

        while !arrivals.is_drained() || !queues.is_empty() {
            budget.step()?;
            if !arrivals.admit_or_jump(&mut clock, &mut queues)? {
                continue;
            }

            let Some((level, mut job)) = queues.pop() else {
                continue;
            };
            let slice = job.run_slice(self.quantum(level));
            clock.advance(slice);
            trace!(task = job.task.id, level, slice, now = clock.now(), "ran slice");

            arrivals.admit(clock.now(), &mut queues);

            if job.is_finished() {
                turnaround.record(&job.task, clock.now())?;
            } else {
                queues.push(level + 1, job);
            }
        }

        turnaround.finish()
    }

    fn name(&self) -> &str {
        "FeedBack"
    }
}
