//! Error types for trajectory evaluation.
//!
//! Evaluation is deterministic, so every failure is final: there is
//! nothing to retry. Callers distinguish an infeasible plan
//! ([`EvaluationError::is_infeasible`]) from misuse of the scheduler or
//! quota API, which cannot happen when `enabled()` is checked first.

use thiserror::Error;

use crate::models::{Event, State};

/// Result type alias for evaluation operations.
pub type Result<T> = std::result::Result<T, EvaluationError>;

/// Errors raised while updating schedulers, quotas, or replaying a plan.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvaluationError {
    /// Update requested on an event whose countdown is undefined or infinite.
    #[error("Event {event} is not allowed: no finite countdown")]
    InvalidEvent {
        /// The rejected event.
        event: Event,
    },

    /// No remaining production budget for a controllable event.
    #[error("Quota exceeded for event {event}")]
    QuotaExceeded {
        /// The event without remaining quota.
        event: Event,
    },

    /// The trajectory stopped in a state other than the target.
    #[error("The target state ({target}) was not reached: stopped at {reached} after {consumed} decisions")]
    UnreachableTarget {
        /// Expected final state.
        target: State,
        /// State the trajectory actually ended in.
        reached: State,
        /// Decision-sequence entries consumed before stopping.
        consumed: usize,
    },

    /// A complete event sequence named an event with no transition at its state.
    #[error("No transition for event {event} at state {state}")]
    UndefinedTransition {
        /// The event without a transition.
        event: Event,
        /// State the event was applied to.
        state: State,
    },

    /// The evaluator fired more transitions than its configured budget.
    #[error("Step budget exhausted after {steps} transitions")]
    StepBudgetExhausted {
        /// Number of transitions fired.
        steps: usize,
    },
}

impl EvaluationError {
    /// Whether the error means "this plan does not reach the target"
    /// rather than a programming error.
    pub fn is_infeasible(&self) -> bool {
        matches!(
            self,
            Self::UnreachableTarget { .. } | Self::StepBudgetExhausted { .. }
        )
    }
}
