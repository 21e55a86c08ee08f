//! The kernel: clocks and timers, protothreads and the process scheduler.

pub mod clock;
pub mod etimer;
pub mod process;
pub mod pt;
pub mod signals;
pub mod timer;

pub use clock::{Clock, ClockDuration, ClockTime, TickClock, CLOCK_SECOND};
pub use etimer::EtimerId;
pub use process::{Context, Data, Event, Kernel, Process, ProcessId, ProcessState, Target};
pub use pt::{Lc, PtState};
pub use signals::Signals;
pub use timer::Timer;

/// Kernel errors.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The event queue is full. Queued events are untouched.
    EventQueueFull,
    /// No free slot in the process table.
    ProcessTableFull,
    /// All event timers have been handed out.
    EtimerPoolExhausted,
    /// An operation that acts on behalf of the current process was called
    /// outside of any process.
    NoCurrentProcess,
    /// The event timer handle was not handed out by this kernel.
    InvalidEtimer,
    /// Every event number above [`Event::MAX`] has been handed out.
    EventNumbersExhausted,
}

impl From<Error> for mote_util::Error {
    fn from(_: Error) -> Self {
        mote_util::Error
    }
}
