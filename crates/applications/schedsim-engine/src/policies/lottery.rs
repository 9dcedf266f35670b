use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use schedsim_core::{Result, SchedError, SchedulingPolicy, Task, Ticks};
use tracing::{debug, trace, warn};

use crate::admission::{Arrivals, Clock, Job, ReadySet};
use crate::metrics::TurnaroundAggregator;

/// Uniform source of lottery draws
pub trait TicketSource {
    /// Draw a ticket uniformly from `0..tickets`
    fn draw(&mut self, tickets: u64) -> u64;
}

/// Seed-deterministic ticket source backed by `StdRng`
#[derive(Debug, Clone)]
pub struct SeededTickets {
    rng: StdRng,
}

impl SeededTickets {
    pub fn new(seed: u64) -> Self {
        SeededTickets {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl TicketSource for SeededTickets {
    fn draw(&mut self, tickets: u64) -> u64 {
        self.rng.gen_range(0..tickets)
    }
}

/// Unordered ready set; every job holds one ticket per tick of length
#[derive(Debug, Default)]
struct TicketPool {
    jobs: Vec<Job>,
}

impl TicketPool {
    fn tickets(&self) -> u64 {
        self.jobs.iter().map(|job| job.task.length).sum()
    }

    /// Remove and return the job holding `ticket`
    fn take_winner(&mut self, ticket: u64) -> Option<Job> {
        let mut upper = 0;
        let index = self.jobs.iter().position(|job| {
            upper += job.task.length;
            ticket < upper
        })?;
        Some(self.jobs.remove(index))
    }
}

impl ReadySet for TicketPool {
    fn admit(&mut self, job: Job) {
        self.jobs.push(job);
    }

    fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }
}

/// Lottery scheduling
///
/// Each decision draws one ticket from the ready jobs, weighted by task
/// length, and the winner runs to completion. Draws come from a fresh
/// [`SeededTickets`] per run, so equal inputs give equal results.
#[derive(Debug, Clone, Copy)]
pub struct Lottery {
    seed: u64,
}

impl Lottery {
    pub fn new(seed: u64) -> Self {
        Lottery { seed }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Run with an injected ticket source instead of the seeded one
    pub fn run_with_source<S: TicketSource + ?Sized>(
        &self,
        tasks: &[Task],
        source: &mut S,
    ) -> Result<Ticks> {
        let mut arrivals = Arrivals::new(tasks)?;
        let mut clock = Clock::new();
        let mut turnaround = TurnaroundAggregator::new(arrivals.len());
        let mut budget = arrivals.step_budget("Lottery");
        let mut pool = TicketPool::default();
        debug!(policy = self.name(), tasks = arrivals.len(), "starting run");

        while !arrivals.is_drained() || !pool.is_empty() {
            budget.step()?;
            if !arrivals.admit_or_jump(&mut clock, &mut pool)? {
                continue;
            }

            let tickets = pool.tickets();
            let ticket = source.draw(tickets);
            let Some(job) = pool.take_winner(ticket) else {
                warn!(ticket, tickets, "ticket source drew out of range");
                return Err(SchedError::invariant(format!(
                    "drew ticket {ticket} from a pool of {tickets}"
                )));
            };

            clock.advance(job.task.length);
            trace!(task = job.task.id, ticket, tickets, now = clock.now(), "completed");
            turnaround.record(&job.task, clock.now())?;
        }

        turnaround.finish()
    }
}

impl SchedulingPolicy for Lottery {
    fn run(&self, tasks: &[Task]) -> Result<Ticks> {
        self.run_with_source(tasks, &mut SeededTickets::new(self.seed))
    }

    fn name(&self) -> &str {
        "Lottery"
    }
}
