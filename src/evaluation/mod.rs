//! Trajectory evaluation.
//!
//! Replays a candidate plan (a sequence of controllable decisions)
//! against the supervisor while uncontrollable events fire on their own
//! as their timers elapse, and reports completion time and the realized
//! event trace.
//!
//! # Forced-event order
//!
//! When no decision applies and several uncontrollable events are ready
//! at once, the one with the **lowest event id** fires first.
//!
//! # Usage
//!
//! ```
//! use u_timed_des::evaluation::TrajectoryEvaluator;
//! use u_timed_des::models::{Event, State, TimingTable, TransitionTable};
//! use u_timed_des::scheduler::TimedScheduler;
//!
//! let (idle, busy) = (State::leaf(0), State::leaf_with_tasks(1, 1));
//! let (start, finish) = (Event::controllable(1), Event::uncontrollable(2));
//! let table = TransitionTable::new()
//!     .with_transition(idle.clone(), start, busy.clone())
//!     .with_transition(busy, finish, idle.clone());
//! let scheduler = TimedScheduler::with_defaults(
//!     [start, finish],
//!     TimingTable::new().with_entry(start, finish, 7.0),
//! );
//!
//! let evaluator = TrajectoryEvaluator::new(&table, idle.clone(), idle);
//! let trajectory = evaluator.evaluate_controllable(&scheduler, &[start]).unwrap();
//! assert_eq!(trajectory.time, 7.0);
//! assert_eq!(trajectory.events(), vec![start, finish]);
//! ```
//!
//! # Components
//!
//! - [`monte_carlo()`]: parallel repetitions of the stochastic evaluator
//! - [`RobustnessSummary`]: completion-time statistics over repetitions

mod monte_carlo;
mod robustness;
mod trajectory;

pub use monte_carlo::{monte_carlo, MonteCarloConfig};
pub use robustness::RobustnessSummary;
pub use trajectory::{Trajectory, TrajectoryEvaluator, TrajectoryStep};

use serde::{Deserialize, Serialize};

/// Default upper bound on fired transitions per trajectory.
pub const DEFAULT_MAX_STEPS: usize = 1_000_000;

/// Evaluator settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluatorConfig {
    /// Maximum transitions fired before giving up. `None` = unbounded.
    ///
    /// A supervisor cycle made only of always-enabled events would
    /// otherwise never terminate.
    pub max_steps: Option<usize>,
}

impl EvaluatorConfig {
    /// Sets the step budget.
    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = Some(max_steps);
        self
    }

    /// Configuration without a step budget.
    pub fn unbounded() -> Self {
        Self { max_steps: None }
    }
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        Self {
            max_steps: Some(DEFAULT_MAX_STEPS),
        }
    }
}
