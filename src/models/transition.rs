//! Supervisor transition structure.
//!
//! The supervisor is synthesized elsewhere; this crate only consumes it
//! as a deterministic partial function `state × event → state`.
//! [`TransitionOracle`] is the seam, [`TransitionTable`] the in-memory
//! implementation built from transition triples.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use super::{Event, State};

/// A single supervisor transition `origin --event--> destination`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    /// Source state.
    pub origin: State,
    /// Triggering event.
    pub event: Event,
    /// Target state.
    pub destination: State,
}

impl Transition {
    /// Creates a transition.
    pub fn new(origin: State, event: Event, destination: State) -> Self {
        Self {
            origin,
            event,
            destination,
        }
    }
}

/// Deterministic transition oracle.
///
/// Undefined `(state, event)` pairs mean the transition is absent and
/// the event can never fire from that state.
pub trait TransitionOracle {
    /// Destination of `event` from `state`, if the transition exists.
    fn destination(&self, state: &State, event: &Event) -> Option<&State>;

    /// Events with a defined transition from `state`, in ascending id order.
    fn events_at(&self, state: &State) -> Vec<Event>;
}

/// In-memory transition table: `State → (Event → State)`.
///
/// Outgoing transitions are kept sorted by event id so that iteration
/// order is deterministic.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "Vec<Transition>", into = "Vec<Transition>")]
pub struct TransitionTable {
    table: HashMap<State, BTreeMap<Event, State>>,
    /// Triples whose destination was replaced by a conflicting insert.
    conflicts: Vec<Transition>,
}

impl TransitionTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a table from transition triples.
    ///
    /// A later triple for the same `(origin, event)` replaces an earlier one
    /// and the replaced triple is kept in [`conflicts`](Self::conflicts);
    /// [`crate::validation::validate_problem`] rejects such input.
    pub fn from_transitions(transitions: impl IntoIterator<Item = Transition>) -> Self {
        let mut table = Self::new();
        for t in transitions {
            table.insert(t);
        }
        table
    }

    /// Adds a transition.
    ///
    /// Re-inserting an identical triple is a no-op. A different destination
    /// for an existing `(origin, event)` pair replaces it and records the
    /// replaced triple as a conflict.
    pub fn insert(&mut self, transition: Transition) {
        let Transition {
            origin,
            event,
            destination,
        } = transition;
        let out = self.table.entry(origin.clone()).or_default();
        if let Some(previous) = out.insert(event, destination.clone()) {
            if previous != destination {
                self.conflicts
                    .push(Transition::new(origin, event, previous));
            }
        }
    }

    /// Triples overridden by a later conflicting insert, in insertion order.
    ///
    /// Non-empty means the input was not a deterministic supervisor.
    pub fn conflicts(&self) -> &[Transition] {
        &self.conflicts
    }

    /// Builder: adds a transition and returns self.
    pub fn with_transition(mut self, origin: State, event: Event, destination: State) -> Self {
        self.insert(Transition::new(origin, event, destination));
        self
    }

    /// Whether `state` has any outgoing transition.
    pub fn contains_state(&self, state: &State) -> bool {
        self.table.contains_key(state)
    }

    /// Whether `state` is the origin or destination of some transition.
    pub fn mentions_state(&self, state: &State) -> bool {
        self.contains_state(state)
            || self
                .table
                .values()
                .any(|out| out.values().any(|dest| dest == state))
    }

    /// Number of states with outgoing transitions.
    pub fn state_count(&self) -> usize {
        self.table.len()
    }

    /// Total number of transitions.
    pub fn transition_count(&self) -> usize {
        self.table.values().map(BTreeMap::len).sum()
    }

    /// Iterates over all transitions (unordered across states).
    pub fn transitions(&self) -> impl Iterator<Item = Transition> + '_ {
        self.table.iter().flat_map(|(origin, out)| {
            out.iter()
                .map(move |(event, dest)| Transition::new(origin.clone(), *event, dest.clone()))
        })
    }
}

impl TransitionOracle for TransitionTable {
    fn destination(&self, state: &State, event: &Event) -> Option<&State> {
        self.table.get(state).and_then(|out| out.get(event))
    }

    fn events_at(&self, state: &State) -> Vec<Event> {
        self.table
            .get(state)
            .map(|out| out.keys().copied().collect())
            .unwrap_or_default()
    }
}

impl From<Vec<Transition>> for TransitionTable {
    fn from(transitions: Vec<Transition>) -> Self {
        Self::from_transitions(transitions)
    }
}

impl From<TransitionTable> for Vec<Transition> {
    fn from(table: TransitionTable) -> Self {
        let mut transitions: Vec<Transition> = table.transitions().collect();
        transitions.sort_by(|a, b| (&a.origin, a.event).cmp(&(&b.origin, b.event)));
        transitions
    }
}
