//! The state interrupt handlers share with the kernel.
//!
//! Interrupt handlers never touch the event queue or the event timer list.
//! They set a process' poll flag, or tell the kernel that the clock ticked,
//! and leave the rest to [`Kernel::run`](super::process::Kernel::run).

use core::cell::Cell;

use critical_section::Mutex;
use portable_atomic::{AtomicU32, Ordering};

use super::{clock::ClockTime, process::ProcessId};

/// Poll requests and the next event timer deadline.
///
/// Usually lives in a `static` so interrupt handlers can reach it.
pub struct Signals {
    polls: AtomicU32,
    next_expiry: Mutex<Cell<Option<ClockTime>>>,
}

impl Default for Signals {
    fn default() -> Self {
        Self::new()
    }
}

impl Signals {
    pub const fn new() -> Self {
        Self {
            polls: AtomicU32::new(0),
            next_expiry: Mutex::new(Cell::new(None)),
        }
    }

    /// Requests that the process be polled. Safe to call from interrupt
    /// context.
    pub fn poll(&self, id: ProcessId) {
        self.polls.fetch_or(id.mask(), Ordering::AcqRel);
    }

    /// To be called from the clock interrupt after the system clock advanced
    /// to `now`. Wakes the event timer process once the earliest event timer
    /// is due. Returns whether it did.
    pub fn on_clock_tick(&self, now: ClockTime) -> bool {
        let due = critical_section::with(|cs| {
            self.next_expiry
                .borrow(cs)
                .get()
                .is_some_and(|next| now.wrapping_sub(next) as i32 >= 0)
        });
        if due {
            self.poll(ProcessId::ETIMER);
        }
        due
    }

    /// The earliest event timer deadline, for a tickless idle loop.
    pub fn next_expiry(&self) -> Option<ClockTime> {
        critical_section::with(|cs| self.next_expiry.borrow(cs).get())
    }

    pub(crate) fn set_next_expiry(&self, next: Option<ClockTime>) {
        critical_section::with(|cs| self.next_expiry.borrow(cs).set(next));
    }

    pub(crate) fn polls_pending(&self) -> bool {
        self.polls.load(Ordering::Acquire) != 0
    }

    pub(crate) fn pending_poll_count(&self) -> usize {
        self.polls.load(Ordering::Acquire).count_ones() as usize
    }

    /// Clears the poll flag of `id`. Returns whether it was set.
    pub(crate) fn take_poll(&self, id: ProcessId) -> bool {
        self.polls.fetch_and(!id.mask(), Ordering::AcqRel) & id.mask() != 0
    }

    pub(crate) fn reset(&self) {
        self.polls.store(0, Ordering::Release);
        self.set_next_expiry(None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn poll_flags() {
        let signals = Signals::new();
        assert!(!signals.polls_pending());

        signals.poll(ProcessId::new(3));
        signals.poll(ProcessId::new(3));
        signals.poll(ProcessId::new(5));
        assert_eq!(signals.pending_poll_count(), 2);

        assert!(signals.take_poll(ProcessId::new(3)));
        assert!(!signals.take_poll(ProcessId::new(3)));
        assert!(signals.take_poll(ProcessId::new(5)));
        assert!(!signals.polls_pending());
    }

    #[test]
    fn clock_tick_wakes_event_timers_when_due() {
        let signals = Signals::new();
        assert!(!signals.on_clock_tick(1000));

        signals.set_next_expiry(Some(u32::MAX));
        assert!(!signals.on_clock_tick(u32::MAX - 1));
        assert!(!signals.polls_pending());

        assert!(signals.on_clock_tick(u32::MAX));
        assert!(signals.take_poll(ProcessId::ETIMER));

        // Still due after the clock wrapped.
        assert!(signals.on_clock_tick(3));
    }
}
