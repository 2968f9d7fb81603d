//! Supervisor domain models.
//!
//! Data types describing the synthesized supervisor and its timing.
//! Supervisor construction (plant/requirement composition and
//! synthesis) happens outside this crate; these types only carry its
//! result.
//!
//! # Domain Mappings
//!
//! | u-timed-des | Manufacturing | Meaning |
//! |-------------|---------------|---------|
//! | Controllable `Event` | Start operation | Scheduler decides |
//! | Uncontrollable `Event` | Operation finishes | Plant decides |
//! | `State` | Cell configuration | Tuple of machine/buffer states |
//! | `TimingEntry` | Processing time | Start arms finish after `duration` |

mod event;
mod state;
mod timing;
mod transition;

pub use event::{Controllability, Event};
pub use state::State;
pub use timing::{TimingEntry, TimingTable};
pub use transition::{Transition, TransitionOracle, TransitionTable};
