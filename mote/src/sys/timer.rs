//! Passive timers.
//!
//! A [`Timer`] is nothing but a start time and an interval. It never calls
//! back; its owner asks whether it has expired. All arithmetic wraps, so a
//! timer keeps working across a wraparound of the system clock as long as
//! its interval is shorter than half the clock range.

use core::cmp::Ordering;

use super::clock::{Clock, ClockTime};

#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Timer {
    start: ClockTime,
    interval: ClockTime,
}

impl Timer {
    pub const fn new() -> Self {
        Self {
            start: 0,
            interval: 0,
        }
    }

    /// Starts the timer now, expiring `interval` ticks from now.
    pub fn set<C: Clock + ?Sized>(&mut self, clock: &C, interval: ClockTime) {
        self.set_at(clock.now(), interval);
    }

    pub fn set_at(&mut self, now: ClockTime, interval: ClockTime) {
        self.start = now;
        self.interval = interval;
    }

    /// Restarts an expired timer exactly one interval after its previous
    /// start, so that a periodic timer does not drift even when it is
    /// serviced late.
    pub fn reset(&mut self) {
        self.start = self.start.wrapping_add(self.interval);
    }

    /// Like [`Timer::reset`], then continues with a new interval.
    pub fn reset_with_new_interval(&mut self, interval: ClockTime) {
        self.reset();
        self.interval = interval;
    }

    /// Starts the timer over from now with the same interval. Periodic use
    /// drifts by however late the timer is serviced.
    pub fn restart<C: Clock + ?Sized>(&mut self, clock: &C) {
        self.restart_at(clock.now());
    }

    pub fn restart_at(&mut self, now: ClockTime) {
        self.start = now;
    }

    /// Shifts the start of the timer by `delta` ticks.
    pub fn adjust(&mut self, delta: i32) {
        self.start = self.start.wrapping_add_signed(delta);
    }

    pub fn expired<C: Clock + ?Sized>(&self, clock: &C) -> bool {
        self.expired_at(clock.now())
    }

    /// Whether the timer has expired at `now`. A timer expires at the very
    /// tick its interval has passed.
    pub fn expired_at(&self, now: ClockTime) -> bool {
        // The +1 makes `now - start == interval` count as expired while
        // keeping the comparison unsigned.
        now.wrapping_sub(self.start).wrapping_add(1) > self.interval
    }

    /// Ticks left until expiry. Wraps to a large value once the timer has
    /// expired; reinterpret as `i32` to get a signed answer.
    pub fn remaining<C: Clock + ?Sized>(&self, clock: &C) -> ClockTime {
        self.remaining_at(clock.now())
    }

    pub fn remaining_at(&self, now: ClockTime) -> ClockTime {
        self.expiration_time().wrapping_sub(now)
    }

    pub fn expiration_time(&self) -> ClockTime {
        self.start.wrapping_add(self.interval)
    }

    pub fn start_time(&self) -> ClockTime {
        self.start
    }

    pub fn interval(&self) -> ClockTime {
        self.interval
    }

    /// Orders two timers by expiry as seen from `reference`.
    ///
    /// Timers expiring at or before `reference` are all equally due and
    /// compare equal.
    pub fn cmp_at(&self, other: &Timer, reference: ClockTime) -> Ordering {
        self.due_in(reference).cmp(&other.due_in(reference))
    }

    fn due_in(&self, reference: ClockTime) -> i32 {
        (self.expiration_time().wrapping_sub(reference) as i32).max(0)
    }
}
