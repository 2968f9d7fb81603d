//! Timed supervisory scheduling for discrete-event manufacturing systems.
//!
//! Given a synthesized supervisor (a deterministic transition structure),
//! a controllable/uncontrollable classification of its events, a timing
//! table saying how firing one event arms a delayed follow-up, and
//! per-event production quotas, this crate answers: how long does a
//! partial plan of controllable decisions take to reach the target state,
//! and through which realized event trace?
//!
//! Supervisor synthesis and plant topologies are out of scope; the
//! supervisor is consumed as a pre-built transition oracle.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `Event`, `State`, `TransitionTable`,
//!   `TimingTable`
//! - **`scheduler`**: `TimedScheduler` (countdowns) and `QuotaTracker`
//! - **`evaluation`**: Deterministic and stochastic trajectory replay,
//!   Monte-Carlo repetitions, robustness statistics
//! - **`problem`**: `SchedulingProblem` trait and configurable `ProblemDefinition`
//! - **`validation`**: Input integrity checks (undeclared events, bad durations)
//! - **`error`**: `EvaluationError`
//!
//! # References
//!
//! - Ramadge & Wonham (1989), "The control of discrete event systems"
//! - Brandin & Wonham (1994), "Supervisory control of timed discrete-event systems"
//! - Cassandras & Lafortune (2008), "Introduction to Discrete Event Systems"

pub mod error;
pub mod evaluation;
pub mod models;
pub mod problem;
pub mod scheduler;
pub mod stopwatch;
pub mod validation;

#[cfg(test)]
mod fixtures;

pub use error::{EvaluationError, Result};
