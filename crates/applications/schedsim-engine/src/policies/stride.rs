use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use schedsim_core::{Result, SchedError, SchedulingPolicy, Task, Ticks};
use tracing::{debug, trace};

use crate::admission::{Arrivals, Clock, Job, ReadySet};
use crate::metrics::TurnaroundAggregator;

/// Ready job plus its stride bookkeeping
#[derive(Debug)]
struct StrideEntry {
    job: Job,
    stride: Ticks,
    pass: Ticks,
}

impl StrideEntry {
    fn key(&self) -> (Ticks, usize) {
        (self.pass, self.job.seq)
    }
}

// Ordered by (pass, arrival order)
impl Ord for StrideEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}

impl PartialOrd for StrideEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Eq for StrideEntry {}

impl PartialEq for StrideEntry {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

/// Min-heap on pass; stride is fixed when a job is admitted
#[derive(Debug)]
struct PassQueue {
    big_stride: Ticks,
    heap: BinaryHeap<Reverse<StrideEntry>>,
}

impl PassQueue {
    fn new(big_stride: Ticks) -> Self {
        PassQueue {
            big_stride,
            heap: BinaryHeap::new(),
        }
    }

    fn pop(&mut self) -> Option<StrideEntry> {
        self.heap.pop().map(|Reverse(entry)| entry)
    }
}

impl ReadySet for PassQueue {
    fn admit(&mut self, job: Job) {
        let stride = self.big_stride / job.task.length.max(1);
        self.heap.push(Reverse(StrideEntry {
            job,
            stride,
            pass: 0,
        }));
    }

    fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}

/// Stride scheduling
///
/// The ready job with the lowest pass runs next, to completion. Every job
/// enters with pass 0 and stride `big_stride / length`; since a job leaves
/// the queue when it runs, its pass is advanced but never compared again.
#[derive(Debug, Clone, Copy)]
pub struct Stride {
    big_stride: Ticks,
}

impl Stride {
    /// Fails if `big_stride` is zero
    pub fn new(big_stride: Ticks) -> Result<Self> {
        if big_stride == 0 {
            return Err(SchedError::invalid_input("Stride numerator must be positive"));
        }
        Ok(Stride { big_stride })
    }

    pub fn big_stride(&self) -> Ticks {
        self.big_stride
    }
}

impl SchedulingPolicy for Stride {
    fn run(&self, tasks: &[Task]) -> Result<Ticks> {
        let mut arrivals = Arrivals::new(tasks)?;
        let mut clock = Clock::new();
        let mut turnaround = TurnaroundAggregator::new(arrivals.len());
        let mut budget = arrivals.step_budget("Stride");
        let mut queue = PassQueue::new(self.big_stride);
        debug!(
            policy = self.name(),
            big_stride = self.big_stride,
            tasks = arrivals.len(),
            "starting run"
        );

        while !arrivals.is_drained() || !queue.is_empty() {
            budget.step()?;
            if !arrivals.admit_or_jump(&mut clock, &mut queue)? {
                continue;
            }

            let Some(mut entry) = queue.pop() else {
                continue;
            };
            clock.advance(entry.job.task.length);
            turnaround.record(&entry.job.task, clock.now())?;

            entry.pass = entry.pass.saturating_add(entry.stride);
            trace!(
                task = entry.job.task.id,
                stride = entry.stride,
                pass = entry.pass,
                now = clock.now(),
                "completed"
            );
        }

        turnaround.finish()
    }

    fn name(&self) -> &str {
        "Stride"
    }
}
