//! The system clock.
//!
//! The system clock is a coarse tick counter, typically advanced
//! [`CLOCK_SECOND`] times per second from a periodic timer interrupt. It
//! drives [`Timer`](super::timer::Timer)s and event timers; the
//! high-resolution rtimer lives in the driver crate.

use portable_atomic::{AtomicU32, Ordering};

use crate::const_config::CLOCK_CONF_SECOND;

/// System clock ticks. The counter wraps.
pub type ClockTime = u32;

/// System clock ticks per second.
pub const CLOCK_SECOND: u32 = CLOCK_CONF_SECOND;

/// A duration measured in system clock ticks.
pub type ClockDuration = fugit::TimerDurationU32<CLOCK_SECOND>;

/// Source of the current system time.
pub trait Clock {
    fn now(&self) -> ClockTime;
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> ClockTime {
        (**self).now()
    }
}

/// A tick counter that may be advanced from interrupt context.
#[derive(Debug, Default)]
pub struct TickClock {
    ticks: AtomicU32,
}

impl TickClock {
    pub const fn new() -> Self {
        Self {
            ticks: AtomicU32::new(0),
        }
    }

    /// Advances the clock by one tick. Returns the new time.
    pub fn tick(&self) -> ClockTime {
        self.advance(1)
    }

    /// Advances the clock by `ticks`. Returns the new time.
    pub fn advance(&self, ticks: ClockTime) -> ClockTime {
        self.ticks
            .fetch_add(ticks, Ordering::AcqRel)
            .wrapping_add(ticks)
    }

    pub fn set(&self, now: ClockTime) {
        self.ticks.store(now, Ordering::Release);
    }
}

impl Clock for TickClock {
    fn now(&self) -> ClockTime {
        self.ticks.load(Ordering::Acquire)
    }
}
