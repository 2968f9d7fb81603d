//! Supervisor state model.
//!
//! States are produced by the automata toolkit that synthesized the
//! supervisor. A state of a single component automaton is a leaf that
//! carries the number of tasks in progress; a state of a product
//! automaton is the ordered tuple of its component states.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A supervisor state.
///
/// Immutable value type. Equality and hashing are structural, so the
/// same composite state rebuilt from the same components compares equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum State {
    /// State of a single component automaton.
    Leaf {
        /// Stable state identifier within its component.
        id: u32,
        /// Number of tasks in progress in this state.
        tasks: u32,
    },
    /// Product state: one component state per automaton, in order.
    Composite(Vec<State>),
}

impl State {
    /// Creates a leaf state with no tasks in progress.
    pub fn leaf(id: u32) -> Self {
        Self::Leaf { id, tasks: 0 }
    }

    /// Creates a leaf state carrying `tasks` tasks in progress.
    pub fn leaf_with_tasks(id: u32, tasks: u32) -> Self {
        Self::Leaf { id, tasks }
    }

    /// Creates a product state from its components.
    pub fn composite(children: impl IntoIterator<Item = State>) -> Self {
        Self::Composite(children.into_iter().collect())
    }

    /// Number of tasks in progress, summed over all components.
    pub fn active_tasks(&self) -> u32 {
        match self {
            Self::Leaf { tasks, .. } => *tasks,
            Self::Composite(children) => children.iter().map(State::active_tasks).sum(),
        }
    }

    /// Component states (empty for a leaf).
    pub fn components(&self) -> &[State] {
        match self {
            Self::Leaf { .. } => &[],
            Self::Composite(children) => children,
        }
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Leaf { id, .. } => write!(f, "{id}"),
            Self::Composite(children) => {
                for (i, child) in children.iter().enumerate() {
                    if i > 0 {
                        write!(f, "|")?;
                    }
                    write!(f, "{child}")?;
                }
                Ok(())
            }
        }
    }
}
