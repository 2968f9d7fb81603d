//! Event model.
//!
//! Events label the transitions of the supervisor. Each event is either
//! controllable (the scheduler decides when it fires, e.g. "start
//! operation") or uncontrollable (the plant fires it on its own once its
//! timer elapses, e.g. "operation finishes").
//!
//! # Reference
//! Ramadge & Wonham (1989), "The control of discrete event systems"

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Controllability classification of an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Controllability {
    /// The controller may enable or disable the event.
    Controllable,
    /// The plant fires the event; it cannot be prevented once armed.
    Uncontrollable,
}

/// A supervisor event.
///
/// Identity is the integer `id`; two events with the same id are the
/// same event. Ordering is by id, which is also the deterministic
/// tie-break order for forced uncontrollable firings.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Event {
    /// Stable event identifier.
    pub id: u32,
    /// Controllability tag.
    pub controllability: Controllability,
}

impl Event {
    /// Creates an event.
    pub const fn new(id: u32, controllability: Controllability) -> Self {
        Self {
            id,
            controllability,
        }
    }

    /// Creates a controllable event.
    pub const fn controllable(id: u32) -> Self {
        Self::new(id, Controllability::Controllable)
    }

    /// Creates an uncontrollable event.
    pub const fn uncontrollable(id: u32) -> Self {
        Self::new(id, Controllability::Uncontrollable)
    }

    /// Whether the controller decides when this event fires.
    pub fn is_controllable(&self) -> bool {
        self.controllability == Controllability::Controllable
    }
}

impl PartialEq for Event {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Event {}

impl Hash for Event {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl PartialOrd for Event {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Event {
    fn cmp(&self, other: &Self) -> Ordering {
        self.id.cmp(&other.id)
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_controllable() {
            write!(f, "e{}", self.id)
        } else {
            write!(f, "e{}!", self.id)
        }
    }
}
