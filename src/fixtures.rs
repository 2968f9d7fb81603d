//! Small supervisors shared by unit tests.

use crate::models::{Event, State};
use crate::problem::ProblemDefinition;

pub(crate) const START_M1: Event = Event::controllable(1);
pub(crate) const FINISH_M1: Event = Event::uncontrollable(2);
pub(crate) const START_M2: Event = Event::controllable(3);
pub(crate) const FINISH_M2: Event = Event::uncontrollable(4);

fn machine(busy: bool) -> State {
    if busy {
        State::leaf_with_tasks(1, 1)
    } else {
        State::leaf(0)
    }
}

/// Product state `(M1, M2, buffer)`.
pub(crate) fn factory_state(m1_busy: bool, m2_busy: bool, buffer_full: bool) -> State {
    State::composite([
        machine(m1_busy),
        machine(m2_busy),
        State::leaf(u32::from(buffer_full)),
    ])
}

/// Two machines feeding each other through a one-slot buffer.
///
/// M1 takes 10 units, M2 takes 5. The supervisor forbids starting M1
/// while the buffer is full and M2 while it is empty.
pub(crate) fn small_factory() -> ProblemDefinition {
    let s = factory_state;
    ProblemDefinition::new(
        "small-factory",
        s(false, false, false),
        s(false, false, false),
    )
    .with_events([START_M1, FINISH_M1, START_M2, FINISH_M2])
    .with_transition(s(false, false, false), START_M1, s(true, false, false))
    .with_transition(s(true, false, false), FINISH_M1, s(false, false, true))
    .with_transition(s(false, false, true), START_M2, s(false, true, false))
    .with_transition(s(false, true, false), START_M1, s(true, true, false))
    .with_transition(s(false, true, false), FINISH_M2, s(false, false, false))
    .with_transition(s(true, true, false), FINISH_M1, s(false, true, true))
    .with_transition(s(true, true, false), FINISH_M2, s(true, false, false))
    .with_transition(s(false, true, true), FINISH_M2, s(false, false, true))
    .with_timing(START_M1, FINISH_M1, 10.0)
    .with_timing(START_M2, FINISH_M2, 5.0)
    .with_quota(START_M1, 1)
    .with_quota(START_M2, 1)
    .with_depth(4)
}

/// Two independent machines without a buffer.
pub(crate) fn two_machines() -> ProblemDefinition {
    let s = |m1, m2| State::composite([machine(m1), machine(m2)]);
    ProblemDefinition::new("two-machines", s(false, false), s(false, false))
        .with_events([START_M1, FINISH_M1, START_M2, FINISH_M2])
        .with_transition(s(false, false), START_M1, s(true, false))
        .with_transition(s(false, false), START_M2, s(false, true))
        .with_transition(s(true, false), FINISH_M1, s(false, false))
        .with_transition(s(true, false), START_M2, s(true, true))
        .with_transition(s(false, true), START_M1, s(true, true))
        .with_transition(s(false, true), FINISH_M2, s(false, false))
        .with_transition(s(true, true), FINISH_M1, s(false, true))
        .with_transition(s(true, true), FINISH_M2, s(true, false))
        .with_timing(START_M1, FINISH_M1, 10.0)
        .with_timing(START_M2, FINISH_M2, 5.0)
        .with_depth(4)
}
