//! Timing table: how firing one event arms delayed follow-up events.
//!
//! An entry `(trigger, follow, duration)` means "when `trigger` fires,
//! set the countdown of `follow` to `duration`". Typical use: a
//! controllable "start" event arms the uncontrollable "finish" event of
//! the same operation with the operation's processing time.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::Event;

/// One re-arm rule of the timing table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimingEntry {
    /// Event whose firing triggers the re-arm.
    pub trigger: Event,
    /// Event whose countdown is set.
    pub follow: Event,
    /// Countdown assigned to `follow` (model time units).
    pub duration: f64,
}

impl TimingEntry {
    /// Creates a timing entry.
    pub fn new(trigger: Event, follow: Event, duration: f64) -> Self {
        Self {
            trigger,
            follow,
            duration,
        }
    }
}

/// Fixed mapping `Event → [(follow, duration)]`, grouped by trigger.
///
/// Entries for the same trigger keep their insertion order; when the same
/// follow-up appears twice for one trigger, the later duration wins at
/// re-arm time.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "Vec<TimingEntry>", into = "Vec<TimingEntry>")]
pub struct TimingTable {
    rearms: HashMap<Event, Vec<(Event, f64)>>,
}

impl TimingTable {
    /// Creates an empty timing table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a table from `(trigger, follow, duration)` entries.
    pub fn from_entries(entries: impl IntoIterator<Item = TimingEntry>) -> Self {
        let mut table = Self::new();
        for entry in entries {
            table.add(entry.trigger, entry.follow, entry.duration);
        }
        table
    }

    /// Adds a re-arm rule.
    pub fn add(&mut self, trigger: Event, follow: Event, duration: f64) {
        self.rearms.entry(trigger).or_default().push((follow, duration));
    }

    /// Builder: adds a re-arm rule and returns self.
    pub fn with_entry(mut self, trigger: Event, follow: Event, duration: f64) -> Self {
        self.add(trigger, follow, duration);
        self
    }

    /// Follow-up events armed when `trigger` fires (empty if none).
    pub fn rearms(&self, trigger: &Event) -> &[(Event, f64)] {
        self.rearms.get(trigger).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Total number of entries.
    pub fn len(&self) -> usize {
        self.rearms.values().map(Vec::len).sum()
    }

    /// Whether the table has no entries.
    pub fn is_empty(&self) -> bool {
        self.rearms.is_empty()
    }

    /// All entries, ordered by trigger id, insertion order within a trigger.
    pub fn entries(&self) -> Vec<TimingEntry> {
        let mut triggers: Vec<&Event> = self.rearms.keys().collect();
        triggers.sort();
        triggers
            .into_iter()
            .flat_map(|trigger| {
                self.rearms[trigger]
                    .iter()
                    .map(move |&(follow, duration)| TimingEntry::new(*trigger, follow, duration))
            })
            .collect()
    }
}

impl From<Vec<TimingEntry>> for TimingTable {
    fn from(entries: Vec<TimingEntry>) -> Self {
        Self::from_entries(entries)
    }
}

impl From<TimingTable> for Vec<TimingEntry> {
    fn from(table: TimingTable) -> Self {
        table.entries()
    }
}
