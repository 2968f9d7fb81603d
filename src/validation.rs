//! Input validation for problem definitions.
//!
//! Checks structural integrity of a [`ProblemDefinition`] before it is
//! evaluated. Detects:
//! - Duplicate event IDs
//! - Transitions, timing entries or quotas naming undeclared events
//! - Nondeterministic transitions (same state and event, two destinations)
//! - Events whose controllability tag differs from the declared one
//! - Initial or target state missing from the transition structure
//! - Negative or non-finite re-arm durations
//! - Quotas on uncontrollable events
//!
//! Supervisor properties (controllability, nonblocking) are not checked;
//! the supervisor is trusted as synthesized.

use std::collections::HashMap;
use thiserror::Error;

use crate::models::{Event, State, Transition};
use crate::problem::ProblemDefinition;

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}")]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Two events share the same ID.
    DuplicateId,
    /// A transition, timing entry or quota references an undeclared event.
    UnknownEvent,
    /// The same `(state, event)` pair leads to two different states.
    Nondeterministic,
    /// An event is used with a different controllability than declared.
    InconsistentControllability,
    /// The initial or target state does not occur in any transition.
    UnknownState,
    /// A re-arm duration is negative, NaN or infinite.
    InvalidDuration,
    /// A quota is set on an uncontrollable event.
    UncontrollableQuota,
}

impl ValidationError {
    fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Validates a problem definition.
///
/// Checks:
/// 1. No duplicate event IDs
/// 2. Every transition event is declared with the same controllability
/// 3. No `(state, event)` pair was given two destinations
/// 4. Initial and target states occur in the transition structure
/// 5. Every timing entry names declared events and a finite duration ≥ 0
/// 6. Every quota names a declared controllable event
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_problem(problem: &ProblemDefinition) -> ValidationResult {
    let mut errors = Vec::new();

    let mut declared: HashMap<u32, Event> = HashMap::new();
    for e in &problem.events {
        if declared.contains_key(&e.id) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate event ID: {}", e.id),
            ));
        } else {
            declared.insert(e.id, *e);
        }
    }

    for t in problem.transitions.transitions() {
        check_declared(&declared, &t.event, "Transition", &mut errors);
    }

    for t in problem.transitions.conflicts() {
        errors.push(ValidationError::new(
            ValidationErrorKind::Nondeterministic,
            format!(
                "Event {} at {} has two destinations (dropped {})",
                t.event, t.origin, t.destination
            ),
        ));
    }

    for (label, state) in [
        ("Initial", &problem.initial_state),
        ("Target", &problem.target_state),
    ] {
        if !problem.transitions.mentions_state(state) {
            errors.push(ValidationError::new(
                ValidationErrorKind::UnknownState,
                format!("{label} state {state} does not occur in any transition"),
            ));
        }
    }

    for entry in problem.timing.entries() {
        for e in [entry.trigger, entry.follow] {
            check_declared(&declared, &e, "Timing entry", &mut errors);
        }
        if !entry.duration.is_finite() || entry.duration < 0.0 {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidDuration,
                format!(
                    "Timing entry {} → {} has invalid duration {}",
                    entry.trigger, entry.follow, entry.duration
                ),
            ));
        }
    }

    for (e, _) in &problem.quota_per_product {
        if !check_declared(&declared, e, "Quota", &mut errors) {
            continue;
        }
        if let Some(d) = declared.get(&e.id).filter(|d| !d.is_controllable()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::UncontrollableQuota,
                format!("Quota set on uncontrollable event {d}"),
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Checks that `event` is declared with the same controllability.
/// Returns whether it is declared at all.
fn check_declared(
    declared: &HashMap<u32, Event>,
    event: &Event,
    context: &str,
    errors: &mut Vec<ValidationError>,
) -> bool {
    match declared.get(&event.id) {
        None => {
            errors.push(ValidationError::new(
                ValidationErrorKind::UnknownEvent,
                format!("{context} references undeclared event {event}"),
            ));
            false
        }
        Some(d) if d.controllability != event.controllability => {
            errors.push(ValidationError::new(
                ValidationErrorKind::InconsistentControllability,
                format!("{context} uses {event} but the event is declared as {d}"),
            ));
            true
        }
        Some(_) => true,
    }
}

/// Validates raw transition triples before they are folded into a
/// [`TransitionTable`](crate::models::TransitionTable), which would keep
/// only the last destination of a conflicting pair.
pub fn validate_transitions(transitions: &[Transition]) -> ValidationResult {
    let mut errors = Vec::new();
    let mut seen: HashMap<(&State, Event), &State> = HashMap::new();

    for t in transitions {
        if let Some(previous) = seen.insert((&t.origin, t.event), &t.destination) {
            if previous != &t.destination {
                errors.push(ValidationError::new(
                    ValidationErrorKind::Nondeterministic,
                    format!("Event {} at {} has two destinations", t.event, t.origin),
                ));
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
