//! Production quotas.
//!
//! Bounds how many times each controllable event may still fire, which
//! bounds the production volume of one plan. An event with no entry has
//! quota 0.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

use crate::error::{EvaluationError, Result};
use crate::models::Event;

/// Remaining fireable count per event. Immutable value type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<(Event, u32)>", into = "Vec<(Event, u32)>")]
pub struct QuotaTracker {
    remaining: HashMap<Event, u32>,
}

impl QuotaTracker {
    /// Creates a tracker from `(event, quota)` pairs.
    pub fn new(initial: impl IntoIterator<Item = (Event, u32)>) -> Self {
        Self {
            remaining: initial.into_iter().collect(),
        }
    }

    /// Creates a tracker allowing each event as often as it occurs in
    /// `sequence`. With `only_controllable`, uncontrollable entries are ignored.
    pub fn from_sequence(sequence: &[Event], only_controllable: bool) -> Self {
        let mut remaining: HashMap<Event, u32> = HashMap::new();
        for e in sequence
            .iter()
            .filter(|e| !only_controllable || e.is_controllable())
        {
            *remaining.entry(*e).or_insert(0) += 1;
        }
        Self { remaining }
    }

    /// Remaining quota of `event` (0 if absent).
    pub fn remaining(&self, event: &Event) -> u32 {
        self.remaining.get(event).copied().unwrap_or(0)
    }

    /// Events with remaining quota.
    pub fn enabled(&self) -> BTreeSet<Event> {
        self.remaining
            .iter()
            .filter(|&(_, &q)| q > 0)
            .map(|(&e, _)| e)
            .collect()
    }

    /// Sum of remaining quotas.
    pub fn total_remaining(&self) -> u64 {
        self.remaining.values().map(|&q| u64::from(q)).sum()
    }

    /// Consumes one unit of `event`'s quota.
    ///
    /// # Errors
    /// [`EvaluationError::QuotaExceeded`] if the quota is absent or 0.
    pub fn update(&self, event: &Event) -> Result<Self> {
        match self.remaining.get(event) {
            Some(&q) if q > 0 => {
                let mut remaining = self.remaining.clone();
                remaining.insert(*event, q - 1);
                Ok(Self { remaining })
            }
            _ => Err(EvaluationError::QuotaExceeded { event: *event }),
        }
    }
}

impl From<Vec<(Event, u32)>> for QuotaTracker {
    fn from(pairs: Vec<(Event, u32)>) -> Self {
        Self::new(pairs)
    }
}

impl From<QuotaTracker> for Vec<(Event, u32)> {
    fn from(tracker: QuotaTracker) -> Self {
        let mut pairs: Vec<(Event, u32)> = tracker.remaining.into_iter().collect();
        pairs.sort_by_key(|&(e, _)| e);
        pairs
    }
}
