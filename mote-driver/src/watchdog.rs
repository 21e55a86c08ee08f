//! Hardware watchdog access.

/// A hardware watchdog that resets the node unless serviced in time.
///
/// Every busy-wait loop SHALL call [`Watchdog::periodic`] on each iteration.
pub trait Watchdog {
    /// Restarts the watchdog countdown.
    fn periodic(&mut self);
}

/// For targets without a watchdog and for hosted builds.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoWatchdog;

impl Watchdog for NoWatchdog {
    fn periodic(&mut self) {}
}

impl<W: Watchdog + ?Sized> Watchdog for &mut W {
    fn periodic(&mut self) {
        (**self).periodic()
    }
}
