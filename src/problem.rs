//! Scheduling problem instances.
//!
//! A problem instance bundles everything the evaluator needs from the
//! outside world: the synthesized supervisor, the event set with
//! controllability tags, the timing table and the production quota per
//! product. [`ProblemDefinition`] is the serde-configurable in-memory
//! form; [`SchedulingProblem`] is the trait the evaluators work against.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::evaluation::{Trajectory, TrajectoryEvaluator};
use crate::models::{Event, State, TimingTable, Transition, TransitionOracle, TransitionTable};
use crate::scheduler::{QuotaTracker, TimedScheduler};

/// A timed scheduling problem over a synthesized supervisor.
///
/// The provided methods replay plans from the problem's own initial
/// state, initial scheduler and target state.
pub trait SchedulingProblem {
    /// Transition oracle type.
    type Oracle: TransitionOracle + ?Sized;

    /// All events of the problem.
    fn events(&self) -> &[Event];

    /// Supervisor transition structure.
    fn transitions(&self) -> &Self::Oracle;

    /// Number of events fired per produced unit.
    fn depth(&self) -> usize;

    /// Scheduler at time 0.
    fn initial_scheduler(&self) -> TimedScheduler;

    /// Supervisor initial state.
    fn initial_state(&self) -> &State;

    /// Marked state every successful trajectory must end in.
    fn target_state(&self) -> &State;

    /// Quota allowing `products` units to be produced.
    fn initial_quota(&self, products: u32) -> QuotaTracker;

    /// Evaluator bound to this problem's initial and target states.
    fn evaluator(&self) -> TrajectoryEvaluator<'_, Self::Oracle> {
        TrajectoryEvaluator::new(
            self.transitions(),
            self.initial_state().clone(),
            self.target_state().clone(),
        )
    }

    /// Replays `sequence` with forced uncontrollable firings.
    fn evaluate_controllable(&self, sequence: &[Event]) -> Result<Trajectory> {
        self.evaluator()
            .evaluate_controllable(&self.initial_scheduler(), sequence)
    }

    /// Replays `sequence` with Gaussian jitter on every re-armed duration.
    fn evaluate_stochastic<R: Rng + ?Sized>(
        &self,
        sequence: &[Event],
        rng: &mut R,
        std_dev: f64,
    ) -> Result<Trajectory> {
        self.evaluator()
            .evaluate_stochastic(&self.initial_scheduler(), sequence, rng, std_dev)
    }

    /// Total time of a complete event sequence.
    fn evaluate_time_only(&self, sequence: &[Event]) -> Result<f64> {
        self.evaluator()
            .evaluate_time_only(&self.initial_scheduler(), sequence)
    }

    /// Caller-defined metric accumulated along a complete event sequence.
    fn evaluate_metric<F>(&self, sequence: &[Event], cost: F) -> Result<f64>
    where
        F: FnMut(&State, &Event, &State) -> f64,
    {
        self.evaluator().evaluate_metric(sequence, cost)
    }
}

/// Configurable problem instance.
///
/// # Example
///
/// ```
/// use u_timed_des::models::{Event, State};
/// use u_timed_des::problem::{ProblemDefinition, SchedulingProblem};
///
/// let (idle, busy) = (State::leaf(0), State::leaf_with_tasks(1, 1));
/// let (start, finish) = (Event::controllable(1), Event::uncontrollable(2));
///
/// let problem = ProblemDefinition::new("single-machine", idle.clone(), idle.clone())
///     .with_events([start, finish])
///     .with_transition(idle.clone(), start, busy.clone())
///     .with_transition(busy, finish, idle)
///     .with_timing(start, finish, 4.0)
///     .with_quota(start, 1)
///     .with_depth(2);
///
/// let trajectory = problem.evaluate_controllable(&[start, start]).unwrap();
/// assert_eq!(trajectory.time, 8.0);
/// assert_eq!(problem.initial_quota(3).remaining(&start), 3);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProblemDefinition {
    /// Problem name.
    pub name: String,
    /// Events with their controllability.
    pub events: Vec<Event>,
    /// Supervisor transitions.
    pub transitions: TransitionTable,
    /// Initial state.
    pub initial_state: State,
    /// Target (marked) state.
    pub target_state: State,
    /// Re-arm rules.
    #[serde(default)]
    pub timing: TimingTable,
    /// Controllable events and how often each fires per produced unit.
    #[serde(default)]
    pub quota_per_product: Vec<(Event, u32)>,
    /// Events fired per produced unit.
    #[serde(default)]
    pub depth: usize,
}

impl ProblemDefinition {
    /// Creates an empty problem with the given initial and target states.
    pub fn new(name: impl Into<String>, initial_state: State, target_state: State) -> Self {
        Self {
            name: name.into(),
            events: Vec::new(),
            transitions: TransitionTable::new(),
            initial_state,
            target_state,
            timing: TimingTable::new(),
            quota_per_product: Vec::new(),
            depth: 0,
        }
    }

    /// Adds events.
    pub fn with_events(mut self, events: impl IntoIterator<Item = Event>) -> Self {
        self.events.extend(events);
        self
    }

    /// Adds a supervisor transition.
    pub fn with_transition(mut self, origin: State, event: Event, destination: State) -> Self {
        self.transitions
            .insert(Transition::new(origin, event, destination));
        self
    }

    /// Adds a re-arm rule.
    pub fn with_timing(mut self, trigger: Event, follow: Event, duration: f64) -> Self {
        self.timing.add(trigger, follow, duration);
        self
    }

    /// Allows `per_product` firings of `event` per produced unit.
    pub fn with_quota(mut self, event: Event, per_product: u32) -> Self {
        self.quota_per_product.push((event, per_product));
        self
    }

    /// Sets the number of events per produced unit.
    pub fn with_depth(mut self, depth: usize) -> Self {
        self.depth = depth;
        self
    }

    /// Expected trace length when producing `products` units.
    pub fn trace_length(&self, products: usize) -> usize {
        self.depth * products
    }
}

impl SchedulingProblem for ProblemDefinition {
    type Oracle = TransitionTable;

    fn events(&self) -> &[Event] {
        &self.events
    }

    fn transitions(&self) -> &TransitionTable {
        &self.transitions
    }

    fn depth(&self) -> usize {
        self.depth
    }

    fn initial_scheduler(&self) -> TimedScheduler {
        TimedScheduler::with_defaults(self.events.iter().copied(), self.timing.clone())
    }

    fn initial_state(&self) -> &State {
        &self.initial_state
    }

    fn target_state(&self) -> &State {
        &self.target_state
    }

    fn initial_quota(&self, products: u32) -> QuotaTracker {
        QuotaTracker::new(
            self.quota_per_product
                .iter()
                .map(|&(e, per_product)| (e, per_product.saturating_mul(products))),
        )
    }
}
