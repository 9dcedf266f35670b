//! Synthetic workload generation
//!
//! Models a task stream as:
//! - exponential inter-arrival gaps (Poisson arrivals), floored to whole ticks
//! - uniformly distributed CPU bursts
//! - a seeded RNG, so the same parameters always give the same workload

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Exp};

use schedsim_core::{Result, SchedError, Task, Ticks};

/// Seeded generator for arrival-ordered task sets
#[derive(Debug, Clone)]
pub struct WorkloadGenerator {
    tasks: usize,
    interarrival: Exp<f64>,
    min_length: Ticks,
    max_length: Ticks,
    seed: u64,
}

impl WorkloadGenerator {
    /// Create a new workload generator
    ///
    /// # Arguments
    /// * `tasks` - Number of tasks to generate (> 0)
    /// * `mean_interarrival` - Mean gap between arrivals in ticks (finite, > 0)
    /// * `min_length` / `max_length` - Inclusive burst length range (0 < min <= max)
    /// * `seed` - RNG seed
    pub fn new(
        tasks: usize,
        mean_interarrival: f64,
        min_length: Ticks,
        max_length: Ticks,
        seed: u64,
    ) -> Result<Self> {
        if tasks == 0 {
            return Err(SchedError::invalid_input("workload needs at least one task"));
        }
        if !mean_interarrival.is_finite() || mean_interarrival <= 0.0 {
            return Err(SchedError::invalid_input(format!(
                "mean inter-arrival must be a positive number, got {mean_interarrival}"
            )));
        }
        if min_length == 0 || min_length > max_length {
            return Err(SchedError::invalid_input(format!(
                "invalid task length range {min_length}..={max_length}"
            )));
        }

        let interarrival = Exp::new(1.0 / mean_interarrival)
            .map_err(|e| SchedError::invalid_input(format!("inter-arrival distribution: {e}")))?;

        Ok(WorkloadGenerator {
            tasks,
            interarrival,
            min_length,
            max_length,
            seed,
        })
    }

    /// Generate the workload
    ///
    /// The first task arrives at tick 0; ids run from 1 in arrival order.
    pub fn generate(&self) -> Vec<Task> {
        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut clock = 0.0_f64;

        (1..=self.tasks as u64)
            .map(|id| {
                if id > 1 {
                    clock += self.interarrival.sample(&mut rng);
                }
                let length = rng.gen_range(self.min_length..=self.max_length);
                Task::new(id, length, clock.floor() as Ticks)
            })
            .collect()
    }
}
