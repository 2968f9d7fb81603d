//! Timed scheduler and production quotas.
//!
//! Both are immutable value objects evolving by pure functional update
//! along a trajectory: `update` returns a new instance.
//!
//! # Algorithm
//!
//! `TimedScheduler` keeps a countdown per event. Controllable events sit
//! at 0 until armed otherwise; uncontrollable events sit at +∞ until a
//! triggering event re-arms them through the timing table. Simulated time
//! advances by the countdown of each fired event.
//!
//! `QuotaTracker` bounds how many times each controllable event may fire.
//!
//! # Reference
//! Brandin & Wonham (1994), "Supervisory control of timed discrete-event systems"

mod jitter;
mod quota;
mod timed;

pub use jitter::normal_sample;
pub use quota::QuotaTracker;
pub use timed::TimedScheduler;
