//! Protothread helpers.
//!
//! A protothread is a plain function that is re-entered from the top every
//! time its process receives an event. It finds its way back to where it
//! left off through a local continuation, [`Lc`], which stores the resume
//! position as a small state enum, and it keeps everything else that must
//! survive a suspension point in fields of its process struct:
//!
//! ```ignore
//! #[derive(Clone, Copy, Default)]
//! enum Blink { #[default] Start, Waiting }
//!
//! fn thread(&mut self, ctx: &mut Context<'_, '_>, ev: Event, _: Data) -> PtState {
//!     loop {
//!         match self.lc.get() {
//!             Blink::Start => {
//!                 ctx.etimer_set(self.timer, CLOCK_SECOND).ok();
//!                 return self.lc.wait(Blink::Waiting);
//!             }
//!             Blink::Waiting if ev == Event::TIMER => {
//!                 self.toggle();
//!                 self.lc.set(Blink::Start);
//!             }
//!             Blink::Waiting => return PtState::Waiting,
//!         }
//!     }
//! }
//! ```

/// What a protothread reports when it returns to the scheduler.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PtState {
    /// Blocked until a condition holds.
    Waiting,
    /// Gave up the processor voluntarily, wants to be resumed.
    Yielded,
    /// Terminated early.
    Exited,
    /// Ran to its end.
    Ended,
}

impl PtState {
    /// Whether the protothread has finished and its process exits.
    pub const fn is_done(self) -> bool {
        matches!(self, PtState::Exited | PtState::Ended)
    }
}

/// A local continuation: the position a protothread resumes at.
///
/// `S::default()` is the start of the thread.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Lc<S> {
    state: S,
}

impl<S: Copy + Default> Lc<S> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> S {
        self.state
    }

    pub fn set(&mut self, state: S) {
        self.state = state;
    }

    /// Suspends until the next event, resuming at `next`.
    pub fn wait(&mut self, next: S) -> PtState {
        self.state = next;
        PtState::Waiting
    }

    /// Yields to other processes, resuming at `next`.
    pub fn yield_to(&mut self, next: S) -> PtState {
        self.state = next;
        PtState::Yielded
    }

    /// Terminates the thread. It starts over when its process is started
    /// again.
    pub fn exit(&mut self) -> PtState {
        self.rewind();
        PtState::Exited
    }

    /// Runs off the end of the thread.
    pub fn end(&mut self) -> PtState {
        self.rewind();
        PtState::Ended
    }

    /// Starts over from the top on the next invocation.
    pub fn rewind(&mut self) {
        self.state = S::default();
    }
}
