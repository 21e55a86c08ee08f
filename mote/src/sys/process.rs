//! The cooperative process scheduler.
//!
//! Every application, protocol layer and driver bottom half runs as a
//! [`Process`]: a protothread that is invoked with an event, runs to its next
//! suspension point and returns. There is one logical thread of control. A
//! process is never preempted by another process, and it is never re-entered
//! while it is executing.
//!
//! Processes talk to each other through events:
//! - [`Kernel::post`] appends an event to a single FIFO queue. The queue is
//!   drained one event per call to [`Kernel::run`].
//! - [`Kernel::post_synch`] invokes the receiver right away.
//! - [`Kernel::poll`] (or [`Signals::poll`] from interrupt context) flags a
//!   process. Flagged processes receive [`Event::POLL`] before the next queued
//!   event is dispatched.
//!
//! Process code receives a [`Context`] which exposes the kernel's services
//! but not [`Kernel::run`], so the scheduler loop cannot be re-entered.

use heapless::Deque;
use mote_util::{debug, warn};

use super::{
    clock::{Clock, ClockTime},
    etimer::{EtimerId, EtimerPool, EtimerProcess},
    pt::PtState,
    signals::Signals,
    Error,
};
use crate::const_config::{PROCESS_CONF_MAX_PROCESSES, PROCESS_CONF_NUMEVENTS};

/// Maximum number of processes, including the event timer process.
pub const MAX_PROCESSES: usize = PROCESS_CONF_MAX_PROCESSES;
/// Capacity of the event queue.
pub const NUMEVENTS: usize = PROCESS_CONF_NUMEVENTS;

/// Handle of a registered process.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProcessId(u8);

impl ProcessId {
    /// The event timer process always occupies the first slot.
    pub const ETIMER: Self = Self(0);

    pub(crate) const fn new(index: u8) -> Self {
        Self(index)
    }

    pub const fn index(self) -> usize {
        self.0 as usize
    }

    pub(crate) const fn mask(self) -> u32 {
        1 << self.0
    }
}

/// An event number.
///
/// Numbers below `0x80` are free for applications. Further numbers above
/// [`Event::MAX`] can be handed out with [`Kernel::alloc_event`].
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Event(pub u8);

impl Event {
    pub const NONE: Self = Self(0x80);
    /// Delivered synchronously when a process is started.
    pub const INIT: Self = Self(0x81);
    /// Delivered to a polled process.
    pub const POLL: Self = Self(0x82);
    /// Tells a process that it is being stopped.
    pub const EXIT: Self = Self(0x83);
    pub const SERVICE_REMOVED: Self = Self(0x84);
    pub const CONTINUE: Self = Self(0x85);
    pub const MSG: Self = Self(0x86);
    /// Broadcast when a process has exited, with [`Data::Process`].
    pub const EXITED: Self = Self(0x87);
    /// An event timer fired, with [`Data::Etimer`].
    pub const TIMER: Self = Self(0x88);
    pub const COM: Self = Self(0x89);
    pub const MAX: Self = Self(0x8a);
}

/// The payload that travels with an event.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Data {
    #[default]
    None,
    Process(ProcessId),
    Etimer(EtimerId),
    Word(usize),
}

/// The receiver of a posted event.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Process(ProcessId),
    /// Every running process, in registration order.
    Broadcast,
}

#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum ProcessState {
    /// Registered but not started, or exited.
    #[default]
    None,
    /// Started and waiting for events.
    Running,
    /// Currently executing.
    Called,
}

/// A process body.
///
/// The struct implementing this trait holds the process' local continuation
/// and every value its thread needs across suspension points.
pub trait Process {
    fn name(&self) -> &'static str;

    /// Called right before the process is started. Rewind the local
    /// continuation here.
    fn reset(&mut self) {}

    /// Runs ahead of the thread whenever the process is polled.
    fn poll_handler(&mut self, _ctx: &mut Context<'_, '_>) {}

    /// Runs ahead of the thread when the process is stopped by someone else.
    fn exit_handler(&mut self, _ctx: &mut Context<'_, '_>) {}

    /// The protothread. Returning [`PtState::Exited`] or [`PtState::Ended`]
    /// exits the process.
    fn thread(&mut self, ctx: &mut Context<'_, '_>, ev: Event, data: Data) -> PtState;
}

pub(super) enum Body<'a> {
    Etimer(EtimerProcess),
    User(&'a mut dyn Process),
}

impl<'a> Body<'a> {
    fn process(&mut self) -> &mut (dyn Process + 'a) {
        match self {
            Body::Etimer(process) => process,
            Body::User(process) => &mut **process,
        }
    }
}

struct Slot<'a> {
    /// Taken out while the process executes.
    body: Option<Body<'a>>,
    state: ProcessState,
    name: &'static str,
}

impl Slot<'_> {
    const fn empty() -> Self {
        Self {
            body: None,
            state: ProcessState::None,
            name: "",
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct QueuedEvent {
    ev: Event,
    data: Data,
    target: Target,
}

/// The scheduler: the process table, the event queue and the event timers.
pub struct Kernel<'a> {
    pub(super) clock: &'a dyn Clock,
    pub(super) signals: &'a Signals,
    slots: [Slot<'a>; MAX_PROCESSES],
    nprocs: usize,
    events: Deque<QueuedEvent, NUMEVENTS>,
    pub(super) etimers: EtimerPool,
    pub(super) current: Option<ProcessId>,
    last_event: Event,
}

impl<'a> Kernel<'a> {
    /// Creates a kernel driven by `clock` whose interrupt-side state lives in
    /// `signals`, and starts the event timer process.
    pub fn new(clock: &'a dyn Clock, signals: &'a Signals) -> Self {
        signals.reset();
        let mut kernel = Self {
            clock,
            signals,
            slots: core::array::from_fn(|_| Slot::empty()),
            nprocs: 0,
            events: Deque::new(),
            etimers: EtimerPool::new(),
            current: None,
            last_event: Event::MAX,
        };
        kernel.install(Body::Etimer(EtimerProcess), EtimerProcess::NAME);
        kernel.start(ProcessId::ETIMER, Data::None);
        kernel
    }

    fn install(&mut self, body: Body<'a>, name: &'static str) -> Option<ProcessId> {
        let slot = self.slots.get_mut(self.nprocs)?;
        *slot = Slot {
            body: Some(body),
            state: ProcessState::None,
            name,
        };
        let id = ProcessId::new(self.nprocs as u8);
        self.nprocs += 1;
        Some(id)
    }

    /// Adds a process to the process table. It does not run until it is
    /// started.
    pub fn register(&mut self, process: &'a mut dyn Process) -> Result<ProcessId, Error> {
        let name = process.name();
        self.install(Body::User(process), name).ok_or_else(|| {
            warn!("process table full, cannot register '{}'", name);
            Error::ProcessTableFull
        })
    }

    /// Starts a registered process: its thread runs right away with
    /// [`Event::INIT`] and `data`. Does nothing if the process is already
    /// running.
    pub fn start(&mut self, id: ProcessId, data: Data) {
        let Some(slot) = self.slot_mut(id) else {
            warn!("cannot start unknown process {}", id.0);
            return;
        };
        if slot.state != ProcessState::None {
            return;
        }
        slot.state = ProcessState::Running;
        if let Some(body) = slot.body.as_mut() {
            body.process().reset();
        }
        debug!("starting process '{}'", slot.name);
        self.call_process(id, Event::INIT, data);
    }

    /// Stops a process.
    ///
    /// Every other running process receives [`Event::EXITED`] with
    /// [`Data::Process`] right away, then the process itself receives
    /// [`Event::EXIT`] unless it is the one calling. Stopping a process that
    /// isn't running does nothing.
    pub fn exit(&mut self, id: ProcessId) {
        let from = self.current;
        self.exit_process(id, from);
    }

    /// Appends an event to the queue.
    pub fn post(&mut self, target: Target, ev: Event, data: Data) -> Result<(), Error> {
        self.events
            .push_back(QueuedEvent { ev, data, target })
            .map_err(|_| {
                warn!("event queue full, dropping event {} to {:?}", ev.0, target);
                Error::EventQueueFull
            })
    }

    /// Delivers an event to a process right away, bypassing the queue.
    ///
    /// A process that is currently executing is not re-entered; the event is
    /// lost.
    pub fn post_synch(&mut self, id: ProcessId, ev: Event, data: Data) {
        self.call_process(id, ev, data);
    }

    /// Requests that a started process be polled.
    pub fn poll(&self, id: ProcessId) {
        if self.is_running(id) {
            self.signals.poll(id);
        }
    }

    /// Runs polled processes, then dispatches at most one queued event.
    /// Returns the number of events and polls still pending; the caller may
    /// put the node to sleep when it returns zero.
    pub fn run(&mut self) -> usize {
        if self.signals.polls_pending() {
            self.do_poll();
        }
        self.do_event();
        self.events.len() + self.signals.pending_poll_count()
    }

    /// Hands out an event number no other part of the system uses.
    pub fn alloc_event(&mut self) -> Result<Event, Error> {
        let Some(next) = self.last_event.0.checked_add(1) else {
            warn!("no event numbers left to allocate");
            return Err(Error::EventNumbersExhausted);
        };
        self.last_event = Event(next);
        Ok(self.last_event)
    }

    /// Whether the process has been started and has not exited.
    pub fn is_running(&self, id: ProcessId) -> bool {
        self.slot(id)
            .is_some_and(|slot| slot.state != ProcessState::None)
    }

    pub fn state(&self, id: ProcessId) -> Option<ProcessState> {
        self.slot(id).map(|slot| slot.state)
    }

    pub fn name(&self, id: ProcessId) -> Option<&'static str> {
        self.slot(id).map(|slot| slot.name)
    }

    /// The process currently executing, if any.
    pub fn current(&self) -> Option<ProcessId> {
        self.current
    }

    /// Number of events waiting in the queue.
    pub fn nevents(&self) -> usize {
        self.events.len()
    }

    pub fn now(&self) -> ClockTime {
        self.clock.now()
    }

    pub fn signals(&self) -> &'a Signals {
        self.signals
    }

    /// Runs `f` as if it were part of process `id`, e.g. to set an event
    /// timer on behalf of a process from outside its thread.
    pub fn with_context<R>(
        &mut self,
        id: ProcessId,
        f: impl FnOnce(&mut Context<'_, 'a>) -> R,
    ) -> R {
        let caller = self.current.replace(id);
        let result = f(&mut Context { kernel: self, id });
        self.current = caller;
        result
    }

    fn slot(&self, id: ProcessId) -> Option<&Slot<'a>> {
        self.slots[..self.nprocs].get(id.index())
    }

    fn slot_mut(&mut self, id: ProcessId) -> Option<&mut Slot<'a>> {
        self.slots[..self.nprocs].get_mut(id.index())
    }

    fn call_process(&mut self, id: ProcessId, ev: Event, data: Data) {
        let Some(slot) = self.slot_mut(id) else {
            return;
        };
        if slot.state != ProcessState::Running {
            return;
        }
        let Some(mut body) = slot.body.take() else {
            return;
        };
        slot.state = ProcessState::Called;

        let caller = self.current.replace(id);
        let mut ctx = Context { kernel: self, id };
        let process = body.process();
        match ev {
            Event::POLL => process.poll_handler(&mut ctx),
            Event::EXIT => process.exit_handler(&mut ctx),
            _ => {}
        }
        let ret = process.thread(&mut ctx, ev, data);

        let slot = &mut self.slots[id.index()];
        slot.body = Some(body);
        if ret.is_done() || ev == Event::EXIT {
            self.exit_process(id, Some(id));
        } else if slot.state == ProcessState::Called {
            slot.state = ProcessState::Running;
        }
        self.current = caller;
    }

    fn exit_process(&mut self, id: ProcessId, from: Option<ProcessId>) {
        let Some(slot) = self.slot_mut(id) else {
            return;
        };
        if slot.state == ProcessState::None {
            return;
        }
        slot.state = ProcessState::None;
        debug!("exiting process '{}'", slot.name);

        for other in 0..self.nprocs {
            if other != id.index() {
                self.call_process(ProcessId::new(other as u8), Event::EXITED, Data::Process(id));
            }
        }

        if from != Some(id) {
            if let Some(mut body) = self.slots[id.index()].body.take() {
                let caller = self.current.replace(id);
                let mut ctx = Context { kernel: self, id };
                let process = body.process();
                process.exit_handler(&mut ctx);
                process.thread(&mut ctx, Event::EXIT, Data::None);
                self.slots[id.index()].body = Some(body);
                self.current = caller;
            }
        }

        self.signals.take_poll(id);
    }

    fn do_poll(&mut self) {
        for index in 0..self.nprocs {
            let id = ProcessId::new(index as u8);
            if self.signals.take_poll(id) {
                self.call_process(id, Event::POLL, Data::None);
            }
        }
    }

    fn do_event(&mut self) {
        let Some(QueuedEvent { ev, data, target }) = self.events.pop_front() else {
            return;
        };
        match target {
            Target::Broadcast => {
                for index in 0..self.nprocs {
                    // Polls take priority, even in the middle of a broadcast.
                    if self.signals.polls_pending() {
                        self.do_poll();
                    }
                    self.call_process(ProcessId::new(index as u8), ev, data);
                }
            }
            Target::Process(id) => self.call_process(id, ev, data),
        }
    }
}

/// The kernel as seen from inside a process.
pub struct Context<'k, 'a> {
    pub(super) kernel: &'k mut Kernel<'a>,
    id: ProcessId,
}

impl<'a> Context<'_, 'a> {
    /// The process this context belongs to.
    pub fn id(&self) -> ProcessId {
        self.id
    }

    pub fn now(&self) -> ClockTime {
        self.kernel.now()
    }

    pub fn start(&mut self, id: ProcessId, data: Data) {
        self.kernel.start(id, data)
    }

    /// Stops `id`, which may be the calling process itself.
    pub fn exit(&mut self, id: ProcessId) {
        self.kernel.exit(id)
    }

    pub fn post(&mut self, target: Target, ev: Event, data: Data) -> Result<(), Error> {
        self.kernel.post(target, ev, data)
    }

    pub fn post_synch(&mut self, id: ProcessId, ev: Event, data: Data) {
        self.kernel.post_synch(id, ev, data)
    }

    pub fn poll(&self, id: ProcessId) {
        self.kernel.poll(id)
    }

    /// Posts [`Event::CONTINUE`] to the calling process so that it can give
    /// up the processor and resume once everything queued before has run.
    pub fn pause(&mut self) -> Result<(), Error> {
        self.kernel
            .post(Target::Process(self.id), Event::CONTINUE, Data::None)
    }

    pub fn alloc_event(&mut self) -> Result<Event, Error> {
        self.kernel.alloc_event()
    }

    pub fn is_running(&self, id: ProcessId) -> bool {
        self.kernel.is_running(id)
    }

    pub fn signals(&self) -> &'a Signals {
        self.kernel.signals()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use core::cell::RefCell;
    use std::vec::Vec;

    use super::*;
    use crate::sys::{clock::TickClock, pt::Lc};

    pub(crate) fn init_logger() {
        let _ = env_logger::builder()
            .is_test(true)
            .filter_level(log::LevelFilter::Debug)
            .try_init();
    }

    pub(crate) type Log = RefCell<Vec<(&'static str, Event, Data)>>;

    /// Records every event it receives and keeps waiting.
    pub(crate) struct Recorder<'l> {
        pub name: &'static str,
        pub log: &'l Log,
    }

    impl Process for Recorder<'_> {
        fn name(&self) -> &'static str {
            self.name
        }

        fn thread(&mut self, _ctx: &mut Context<'_, '_>, ev: Event, data: Data) -> PtState {
            self.log.borrow_mut().push((self.name, ev, data));
            PtState::Waiting
        }
    }

    fn events_of(log: &Log, name: &str) -> Vec<Event> {
        log.borrow()
            .iter()
            .filter(|(n, _, _)| *n == name)
            .map(|(_, ev, _)| *ev)
            .collect()
    }

    #[test]
    fn start_runs_init_synchronously() {
        init_logger();
        let clock = TickClock::new();
        let signals = Signals::new();
        let log = Log::default();
        let mut a = Recorder { name: "a", log: &log };

        let mut kernel = Kernel::new(&clock, &signals);
        let id = kernel.register(&mut a).unwrap();
        assert!(!kernel.is_running(id));
        assert_eq!(kernel.name(id), Some("a"));

        kernel.start(id, Data::Word(7));
        assert!(kernel.is_running(id));
        assert_eq!(log.borrow().as_slice(), &[("a", Event::INIT, Data::Word(7))]);

        // Starting twice is a no-op.
        kernel.start(id, Data::None);
        assert_eq!(log.borrow().len(), 1);
    }

    #[test]
    fn events_are_delivered_in_post_order() {
        let clock = TickClock::new();
        let signals = Signals::new();
        let log = Log::default();
        let mut a = Recorder { name: "a", log: &log };
        let mut b = Recorder { name: "b", log: &log };

        let mut kernel = Kernel::new(&clock, &signals);
        let a = kernel.register(&mut a).unwrap();
        let b = kernel.register(&mut b).unwrap();
        kernel.start(a, Data::None);
        kernel.start(b, Data::None);
        log.borrow_mut().clear();

        kernel.post(Target::Process(b), Event(1), Data::None).unwrap();
        kernel.post(Target::Process(a), Event(2), Data::None).unwrap();
        kernel.post(Target::Broadcast, Event(3), Data::None).unwrap();
        assert_eq!(kernel.nevents(), 3);

        assert_eq!(kernel.run(), 2);
        assert_eq!(kernel.run(), 1);
        assert_eq!(kernel.run(), 0);

        let delivered: Vec<_> = log.borrow().iter().map(|(n, ev, _)| (*n, ev.0)).collect();
        assert_eq!(delivered, [("b", 1), ("a", 2), ("a", 3), ("b", 3)]);
    }

    #[test]
    fn polls_run_before_queued_events() {
        let clock = TickClock::new();
        let signals = Signals::new();
        let log = Log::default();
        let mut a = Recorder { name: "a", log: &log };
        let mut b = Recorder { name: "b", log: &log };

        let mut kernel = Kernel::new(&clock, &signals);
        let a = kernel.register(&mut a).unwrap();
        let b = kernel.register(&mut b).unwrap();
        kernel.start(a, Data::None);
        kernel.start(b, Data::None);
        log.borrow_mut().clear();

        kernel.post(Target::Process(a), Event(1), Data::None).unwrap();
        kernel.post(Target::Process(a), Event(2), Data::None).unwrap();
        // As an interrupt handler would.
        signals.poll(b);

        kernel.run();
        assert_eq!(events_of(&log, "b"), [Event::POLL]);
        assert_eq!(events_of(&log, "a"), [Event(1)]);
        assert_eq!(log.borrow()[0].0, "b");

        kernel.poll(b);
        kernel.run();
        assert_eq!(events_of(&log, "b"), [Event::POLL, Event::POLL]);
        assert_eq!(log.borrow()[2].0, "b");
        assert_eq!(events_of(&log, "a"), [Event(1), Event(2)]);
    }

    #[test]
    fn poll_of_a_stopped_process_is_ignored() {
        let clock = TickClock::new();
        let signals = Signals::new();
        let log = Log::default();
        let mut a = Recorder { name: "a", log: &log };

        let mut kernel = Kernel::new(&clock, &signals);
        let a = kernel.register(&mut a).unwrap();

        kernel.poll(a);
        assert_eq!(kernel.run(), 0);
        signals.poll(a);
        kernel.run();
        assert!(log.borrow().is_empty());
        assert_eq!(kernel.run(), 0);
    }

    #[test]
    fn queue_overflow_keeps_earlier_events() {
        let clock = TickClock::new();
        let signals = Signals::new();
        let log = Log::default();
        let mut a = Recorder { name: "a", log: &log };

        let mut kernel = Kernel::new(&clock, &signals);
        let a = kernel.register(&mut a).unwrap();
        kernel.start(a, Data::None);
        log.borrow_mut().clear();

        for n in 0..NUMEVENTS {
            kernel.post(Target::Process(a), Event(n as u8), Data::None).unwrap();
        }
        assert_eq!(
            kernel.post(Target::Process(a), Event(0x7f), Data::None),
            Err(Error::EventQueueFull)
        );

        while kernel.run() > 0 {}
        let expected: Vec<_> = (0..NUMEVENTS).map(|n| Event(n as u8)).collect();
        assert_eq!(events_of(&log, "a"), expected);
    }

    #[test]
    fn process_table_full() {
        let clock = TickClock::new();
        let signals = Signals::new();
        let log = Log::default();
        let mut recorders: Vec<_> = (0..MAX_PROCESSES)
            .map(|_| Recorder { name: "r", log: &log })
            .collect();

        let mut kernel = Kernel::new(&clock, &signals);
        let mut results = Vec::new();
        for recorder in recorders.iter_mut() {
            results.push(kernel.register(recorder));
        }
        // The event timer process holds the first slot.
        assert!(results[..MAX_PROCESSES - 1].iter().all(Result::is_ok));
        assert_eq!(results[MAX_PROCESSES - 1], Err(Error::ProcessTableFull));
    }

    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
    enum Pos {
        #[default]
        Start,
        Second,
    }

    /// Ends after its second event.
    struct TwoShot<'l> {
        lc: Lc<Pos>,
        log: &'l Log,
    }

    impl Process for TwoShot<'_> {
        fn name(&self) -> &'static str {
            "two-shot"
        }

        fn reset(&mut self) {
            self.lc.rewind();
        }

        fn thread(&mut self, _ctx: &mut Context<'_, '_>, ev: Event, data: Data) -> PtState {
            self.log.borrow_mut().push((self.name(), ev, data));
            match self.lc.get() {
                Pos::Start => self.lc.wait(Pos::Second),
                Pos::Second => self.lc.end(),
            }
        }
    }

    #[test]
    fn ending_thread_exits_and_broadcasts_exited() {
        let clock = TickClock::new();
        let signals = Signals::new();
        let log = Log::default();
        let mut watcher = Recorder { name: "watcher", log: &log };
        let mut two_shot = TwoShot { lc: Lc::new(), log: &log };

        let mut kernel = Kernel::new(&clock, &signals);
        let watcher = kernel.register(&mut watcher).unwrap();
        let two_shot = kernel.register(&mut two_shot).unwrap();
        kernel.start(watcher, Data::None);
        kernel.start(two_shot, Data::None);

        kernel.post(Target::Process(two_shot), Event(1), Data::None).unwrap();
        kernel.run();
        assert!(!kernel.is_running(two_shot));
        assert!(log
            .borrow()
            .contains(&("watcher", Event::EXITED, Data::Process(two_shot))));
        // An exiting thread is not told to exit.
        assert!(!events_of(&log, "two-shot").contains(&Event::EXIT));

        // Restarting rewinds the continuation.
        kernel.start(two_shot, Data::None);
        assert!(kernel.is_running(two_shot));
        kernel.post_synch(two_shot, Event(1), Data::None);
        assert!(!kernel.is_running(two_shot));
    }

    #[test]
    fn exit_is_idempotent() {
        let clock = TickClock::new();
        let signals = Signals::new();
        let log = Log::default();
        let mut a = Recorder { name: "a", log: &log };
        let mut b = Recorder { name: "b", log: &log };

        let mut kernel = Kernel::new(&clock, &signals);
        let a = kernel.register(&mut a).unwrap();
        let b = kernel.register(&mut b).unwrap();
        kernel.start(a, Data::None);
        kernel.start(b, Data::None);
        log.borrow_mut().clear();

        kernel.exit(a);
        assert_eq!(
            log.borrow().as_slice(),
            &[
                ("b", Event::EXITED, Data::Process(a)),
                ("a", Event::EXIT, Data::None)
            ]
        );
        assert_eq!(kernel.state(a), Some(ProcessState::None));

        kernel.exit(a);
        assert_eq!(log.borrow().len(), 2);

        // Events to an exited process are dropped at dispatch.
        kernel.post(Target::Process(a), Event(1), Data::None).unwrap();
        kernel.run();
        assert_eq!(log.borrow().len(), 2);
    }

    /// Talks to the kernel from inside its thread.
    struct Chatty {
        peer: Option<ProcessId>,
        seen_self_running: Option<bool>,
        state_while_called: Option<ProcessState>,
    }

    impl Process for Chatty {
        fn name(&self) -> &'static str {
            "chatty"
        }

        fn thread(&mut self, ctx: &mut Context<'_, '_>, ev: Event, _data: Data) -> PtState {
            match ev {
                Event::INIT => {
                    self.seen_self_running = Some(ctx.is_running(ctx.id()));
                    self.state_while_called = ctx.kernel.state(ctx.id());
                    // Re-entering a process that is executing does nothing.
                    ctx.post_synch(ctx.id(), Event(9), Data::None);
                    PtState::Waiting
                }
                Event(1) => {
                    if let Some(peer) = self.peer {
                        ctx.post_synch(peer, Event(2), Data::Process(ctx.id()));
                    }
                    PtState::Waiting
                }
                Event(3) => {
                    let id = ctx.id();
                    ctx.exit(id);
                    PtState::Waiting
                }
                Event(9) => panic!("re-entered"),
                _ => PtState::Waiting,
            }
        }
    }

    #[test]
    fn synchronous_post_restores_current_process() {
        let clock = TickClock::new();
        let signals = Signals::new();
        let log = Log::default();
        let mut peer = Recorder { name: "peer", log: &log };
        let mut chatty = Chatty {
            peer: None,
            seen_self_running: None,
            state_while_called: None,
        };

        {
            let mut kernel = Kernel::new(&clock, &signals);
            let peer_id = kernel.register(&mut peer).unwrap();
            kernel.start(peer_id, Data::None);
            chatty.peer = Some(peer_id);
            let chatty_id = kernel.register(&mut chatty).unwrap();
            kernel.start(chatty_id, Data::None);
            assert_eq!(kernel.current(), None);

            kernel.post_synch(chatty_id, Event(1), Data::None);
            assert_eq!(kernel.current(), None);
            assert!(log
                .borrow()
                .contains(&("peer", Event(2), Data::Process(chatty_id))));

            // Exiting oneself: no EXIT delivered, stays stopped.
            kernel.post_synch(chatty_id, Event(3), Data::None);
            assert!(!kernel.is_running(chatty_id));
            assert!(log
                .borrow()
                .contains(&("peer", Event::EXITED, Data::Process(chatty_id))));
        }

        assert_eq!(chatty.seen_self_running, Some(true));
        assert_eq!(chatty.state_while_called, Some(ProcessState::Called));
    }

    #[test]
    fn alloc_event() {
        let clock = TickClock::new();
        let signals = Signals::new();
        let mut kernel = Kernel::new(&clock, &signals);
        let first = kernel.alloc_event().unwrap();
        assert!(first > Event::MAX);
        assert_ne!(kernel.alloc_event().unwrap(), first);

        for _ in first.0 + 1..u8::MAX - 1 {
            assert!(kernel.alloc_event().unwrap() > Event::MAX);
        }
        assert_eq!(kernel.alloc_event(), Ok(Event(u8::MAX)));
        // Never wraps around into application or system numbers.
        assert_eq!(kernel.alloc_event(), Err(Error::EventNumbersExhausted));
        assert_eq!(kernel.alloc_event(), Err(Error::EventNumbersExhausted));
    }

    /// Pauses once on every event.
    struct Pauser<'l> {
        log: &'l Log,
    }

    impl Process for Pauser<'_> {
        fn name(&self) -> &'static str {
            "pauser"
        }

        fn thread(&mut self, ctx: &mut Context<'_, '_>, ev: Event, data: Data) -> PtState {
            self.log.borrow_mut().push(("pauser", ev, data));
            if ev == Event(1) {
                ctx.pause().unwrap();
            }
            PtState::Waiting
        }
    }

    #[test]
    fn pause_lets_queued_events_run_first() {
        let clock = TickClock::new();
        let signals = Signals::new();
        let log = Log::default();
        let mut pauser = Pauser { log: &log };
        let mut other = Recorder { name: "other", log: &log };

        let mut kernel = Kernel::new(&clock, &signals);
        let pauser = kernel.register(&mut pauser).unwrap();
        let other = kernel.register(&mut other).unwrap();
        kernel.start(pauser, Data::None);
        kernel.start(other, Data::None);
        log.borrow_mut().clear();

        kernel.post(Target::Process(pauser), Event(1), Data::None).unwrap();
        kernel.post(Target::Process(other), Event(2), Data::None).unwrap();
        while kernel.run() > 0 {}

        let order: Vec<_> = log.borrow().iter().map(|(n, ev, _)| (*n, *ev)).collect();
        assert_eq!(
            order,
            [
                ("pauser", Event(1)),
                ("other", Event(2)),
                ("pauser", Event::CONTINUE)
            ]
        );
    }
}
