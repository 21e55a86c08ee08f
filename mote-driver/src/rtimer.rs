//! Real-time clock ("rtimer") structures.
//!
//! The rtimer is the high-resolution hardware clock used for sub-millisecond
//! deadlines such as the ACK wait window. Its counter is a fixed-width
//! unsigned integer that wraps, so all comparisons go through the signed
//! difference of two [`RtimerClock`] values, see [`clock_lt`].

use crate::{const_config::RTIMER_CONF_SECOND, watchdog::Watchdog};

/// Raw rtimer ticks.
pub type RtimerClock = u32;

/// Rtimer ticks per second.
pub const RTIMER_SECOND: u32 = RTIMER_CONF_SECOND;

/// A duration measured in rtimer ticks.
pub type RtimerDuration = fugit::TimerDurationU32<RTIMER_SECOND>;

/// Access to the free-running high-resolution clock.
pub trait Rtimer {
    /// The current value of the free-running counter.
    fn now(&self) -> RtimerClock;
}

/// Whether `a` lies before `b`, tolerating wraparound of the counter.
pub const fn clock_lt(a: RtimerClock, b: RtimerClock) -> bool {
    clock_diff(a, b) < 0
}

/// Signed distance from `b` to `a`.
pub const fn clock_diff(a: RtimerClock, b: RtimerClock) -> i32 {
    a.wrapping_sub(b) as i32
}

/// Spins until `duration` has elapsed, servicing the watchdog on every
/// iteration.
pub fn busy_wait<T: Rtimer, W: Watchdog>(rtimer: &T, watchdog: &mut W, duration: RtimerDuration) {
    let deadline = rtimer.now().wrapping_add(duration.ticks());
    watchdog.periodic();
    while clock_lt(rtimer.now(), deadline) {
        watchdog.periodic();
    }
}
