//! Timed event scheduler.
//!
//! Keeps one countdown per event and advances simulated time by firing
//! events. Uncontrollable events are physical: once armed they fire as
//! soon as their countdown elapses, so time can only advance up to the
//! nearest uncontrollable deadline.
//!
//! # Algorithm
//!
//! Firing event `e` with countdown `t`:
//! 1. Every other countdown `c` becomes `max(c − t, 0)`.
//! 2. `e` resets to 0 if controllable, +∞ if uncontrollable.
//! 3. Each `(follow, d)` in the timing table for `e` sets `follow` to `d`.
//! 4. Elapsed time grows by `t`.
//!
//! The scheduler is an immutable value: firing returns a new instance.

use rand::Rng;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use super::jitter::normal_sample;
use crate::error::{EvaluationError, Result};
use crate::models::{Event, TimingTable};

/// Per-event countdown clock with a fixed timing table.
///
/// # Example
///
/// ```
/// use u_timed_des::models::{Event, TimingTable};
/// use u_timed_des::scheduler::TimedScheduler;
///
/// let start = Event::controllable(1);
/// let finish = Event::uncontrollable(2);
/// let timing = TimingTable::new().with_entry(start, finish, 10.0);
/// let scheduler = TimedScheduler::with_defaults([start, finish], timing);
///
/// let (scheduler, dt) = scheduler.update(&start).unwrap();
/// assert_eq!(dt, 0.0);
/// assert_eq!(scheduler.countdown(&finish), 10.0);
///
/// let (scheduler, dt) = scheduler.update(&finish).unwrap();
/// assert_eq!(dt, 10.0);
/// assert_eq!(scheduler.elapsed_time(), 10.0);
/// ```
#[derive(Debug, Clone)]
pub struct TimedScheduler {
    countdowns: HashMap<Event, f64>,
    timing: Arc<TimingTable>,
    elapsed: f64,
}

impl TimedScheduler {
    /// Creates a scheduler from explicit initial countdowns.
    ///
    /// Events absent from `initial_countdowns` start disabled (+∞) until
    /// the timing table arms them.
    pub fn new(
        initial_countdowns: impl IntoIterator<Item = (Event, f64)>,
        timing: TimingTable,
    ) -> Self {
        Self {
            countdowns: initial_countdowns.into_iter().collect(),
            timing: Arc::new(timing),
            elapsed: 0.0,
        }
    }

    /// Creates a scheduler with the default arming: controllable events
    /// at 0, uncontrollable events at +∞.
    pub fn with_defaults(events: impl IntoIterator<Item = Event>, timing: TimingTable) -> Self {
        Self::new(
            events.into_iter().map(|e| {
                let countdown = if e.is_controllable() { 0.0 } else { f64::INFINITY };
                (e, countdown)
            }),
            timing,
        )
    }

    /// Current countdown of `event` (+∞ if unknown or disabled).
    pub fn countdown(&self, event: &Event) -> f64 {
        self.countdowns.get(event).copied().unwrap_or(f64::INFINITY)
    }

    /// Total simulated time consumed so far.
    pub fn elapsed_time(&self) -> f64 {
        self.elapsed
    }

    /// The fixed timing table.
    pub fn timing_table(&self) -> &TimingTable {
        &self.timing
    }

    /// Events ready to fire within the current time horizon.
    ///
    /// The horizon `m` is the smallest finite countdown over uncontrollable
    /// events (+∞ if none is armed). Every event with a finite countdown
    /// `≤ m` is returned.
    pub fn enabled(&self) -> BTreeSet<Event> {
        let horizon = self.horizon();
        self.countdowns
            .iter()
            .filter(|&(_, &c)| c.is_finite() && c <= horizon)
            .map(|(&e, _)| e)
            .collect()
    }

    /// Whether `event` is in [`enabled`](Self::enabled).
    pub fn is_enabled(&self, event: &Event) -> bool {
        let c = self.countdown(event);
        c.is_finite() && c <= self.horizon()
    }

    /// Fires `event`, returning the new scheduler and the time it consumed.
    ///
    /// # Errors
    /// [`EvaluationError::InvalidEvent`] if the countdown of `event` is
    /// undefined or infinite.
    pub fn update(&self, event: &Event) -> Result<(Self, f64)> {
        self.fire(event, |duration| duration)
    }

    /// Fires `event` like [`update`](Self::update), adding an independent
    /// `N(0, std_dev²)` sample to every re-armed duration (floored at 0).
    pub fn update_perturbed<R: Rng + ?Sized>(
        &self,
        event: &Event,
        rng: &mut R,
        std_dev: f64,
    ) -> Result<(Self, f64)> {
        self.fire(event, |duration| {
            (duration + normal_sample(&mut *rng, 0.0, std_dev)).max(0.0)
        })
    }

    fn horizon(&self) -> f64 {
        self.countdowns
            .iter()
            .filter(|&(e, &c)| !e.is_controllable() && c.is_finite())
            .map(|(_, &c)| c)
            .fold(f64::INFINITY, f64::min)
    }

    fn fire(&self, event: &Event, mut rearm: impl FnMut(f64) -> f64) -> Result<(Self, f64)> {
        let (&fired, &dt) = self
            .countdowns
            .get_key_value(event)
            .filter(|&(_, &c)| c.is_finite())
            .ok_or(EvaluationError::InvalidEvent { event: *event })?;

        let mut countdowns: HashMap<Event, f64> = self
            .countdowns
            .iter()
            .map(|(&e, &c)| (e, if c > dt { c - dt } else { 0.0 }))
            .collect();

        let reset = if fired.is_controllable() { 0.0 } else { f64::INFINITY };
        countdowns.insert(fired, reset);

        for &(follow, duration) in self.timing.rearms(&fired) {
            countdowns.insert(follow, rearm(duration));
        }

        let next = Self {
            countdowns,
            timing: Arc::clone(&self.timing),
            elapsed: self.elapsed + dt,
        };
        Ok((next, dt))
    }
}
