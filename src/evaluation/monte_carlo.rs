//! Monte-Carlo robustness analysis.
//!
//! Repeats the stochastic evaluator many times on the same plan. Each
//! repetition owns its generator, seeded `seed + i`, so results are
//! reproducible and independent of how rayon distributes the work.

use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{Trajectory, TrajectoryEvaluator};
use crate::error::Result;
use crate::models::{Event, TransitionOracle};
use crate::scheduler::TimedScheduler;

/// Monte-Carlo settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MonteCarloConfig {
    /// Number of independent repetitions.
    pub repetitions: usize,
    /// Standard deviation of the jitter added to each re-armed duration.
    pub std_dev: f64,
    /// Base seed; repetition `i` uses `seed.wrapping_add(i)`.
    pub seed: u64,
}

impl MonteCarloConfig {
    /// Creates a configuration.
    pub fn new(repetitions: usize, std_dev: f64) -> Self {
        Self {
            repetitions,
            std_dev,
            ..Self::default()
        }
    }

    /// Sets the base seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

impl Default for MonteCarloConfig {
    fn default() -> Self {
        Self {
            repetitions: 100,
            std_dev: 1.0,
            seed: 42,
        }
    }
}

/// Runs `config.repetitions` stochastic evaluations of `sequence` in parallel.
///
/// Results are returned in repetition order. Failed repetitions are kept
/// as `Err` so the caller can count infeasible outcomes.
pub fn monte_carlo<O>(
    evaluator: &TrajectoryEvaluator<'_, O>,
    scheduler: &TimedScheduler,
    sequence: &[Event],
    config: &MonteCarloConfig,
) -> Vec<Result<Trajectory>>
where
    O: TransitionOracle + Sync + ?Sized,
{
    debug!(
        repetitions = config.repetitions,
        std_dev = config.std_dev,
        seed = config.seed,
        "monte-carlo start"
    );
    (0..config.repetitions)
        .into_par_iter()
        .map(|i| {
            let mut rng = StdRng::seed_from_u64(config.seed.wrapping_add(i as u64));
            evaluator.evaluate_stochastic(scheduler, sequence, &mut rng, config.std_dev)
        })
        .collect()
}
