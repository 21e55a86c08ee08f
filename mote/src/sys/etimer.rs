//! Event timers.
//!
//! An event timer posts [`Event::TIMER`] to the process that set it once it
//! expires. Event timers live in a fixed pool inside the [`Kernel`] and are
//! addressed by [`EtimerId`] handles handed out by [`Kernel::etimer_alloc`].
//!
//! Pending timers form a single list ordered by expiry, earliest first. The
//! event timer process walks it from the head whenever it is polled, which
//! happens after every change to the list and from the clock interrupt via
//! [`Signals::on_clock_tick`](super::signals::Signals::on_clock_tick) once
//! the head is due.

use mote_util::{debug, warn};

use super::{
    clock::ClockTime,
    process::{Context, Data, Event, Kernel, Process, ProcessId, Target},
    pt::PtState,
    timer::Timer,
    Error,
};
use crate::const_config::ETIMER_CONF_MAX_TIMERS;

/// Number of event timers in the pool.
pub const MAX_ETIMERS: usize = ETIMER_CONF_MAX_TIMERS;

/// Handle of an event timer.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EtimerId(u8);

impl EtimerId {
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Default, Clone, Copy)]
struct Etimer {
    timer: Timer,
    /// `None` once the timer fired or was stopped.
    owner: Option<ProcessId>,
    next: Option<EtimerId>,
}

/// The event timer pool and the list of pending timers.
#[derive(Debug)]
pub struct EtimerPool {
    timers: [Etimer; MAX_ETIMERS],
    allocated: usize,
    head: Option<EtimerId>,
}

impl EtimerPool {
    pub(crate) fn new() -> Self {
        Self {
            timers: [Etimer::default(); MAX_ETIMERS],
            allocated: 0,
            head: None,
        }
    }

    fn alloc(&mut self) -> Option<EtimerId> {
        if self.allocated == MAX_ETIMERS {
            return None;
        }
        let id = EtimerId(self.allocated as u8);
        self.allocated += 1;
        Some(id)
    }

    fn get(&self, id: EtimerId) -> Option<&Etimer> {
        self.timers[..self.allocated].get(id.index())
    }

    fn get_mut(&mut self, id: EtimerId) -> Result<&mut Etimer, Error> {
        self.timers[..self.allocated]
            .get_mut(id.index())
            .ok_or(Error::InvalidEtimer)
    }

    /// Pending timers, earliest first.
    pub fn iter(&self) -> impl Iterator<Item = EtimerId> + '_ {
        core::iter::successors(self.head, |id| self.timers[id.index()].next)
    }

    pub fn pending(&self) -> bool {
        self.head.is_some()
    }

    pub fn next_expiration_time(&self) -> Option<ClockTime> {
        self.head
            .map(|id| self.timers[id.index()].timer.expiration_time())
    }

    fn unlink(&mut self, id: EtimerId) -> bool {
        let mut prev: Option<EtimerId> = None;
        let mut cursor = self.head;
        while let Some(current) = cursor {
            let next = self.timers[current.index()].next;
            if current == id {
                match prev {
                    Some(prev) => self.timers[prev.index()].next = next,
                    None => self.head = next,
                }
                self.timers[current.index()].next = None;
                return true;
            }
            prev = Some(current);
            cursor = next;
        }
        false
    }

    /// Inserts an unlinked timer in front of the first pending timer that
    /// doesn't expire before it.
    fn link(&mut self, id: EtimerId, now: ClockTime) {
        let timer = self.timers[id.index()].timer;
        let mut prev: Option<EtimerId> = None;
        let mut cursor = self.head;
        while let Some(current) = cursor {
            if timer.cmp_at(&self.timers[current.index()].timer, now).is_le() {
                break;
            }
            prev = Some(current);
            cursor = self.timers[current.index()].next;
        }
        self.timers[id.index()].next = cursor;
        match prev {
            Some(prev) => self.timers[prev.index()].next = Some(id),
            None => self.head = Some(id),
        }
    }

    /// Updates a timer with `f` and (re)inserts it on behalf of `owner`.
    fn arm(
        &mut self,
        id: EtimerId,
        owner: ProcessId,
        now: ClockTime,
        f: impl FnOnce(&mut Timer),
    ) -> Result<(), Error> {
        let etimer = self.get_mut(id)?;
        f(&mut etimer.timer);
        etimer.owner = Some(owner);
        self.unlink(id);
        self.link(id, now);
        Ok(())
    }

    fn stop(&mut self, id: EtimerId) -> Result<(), Error> {
        self.get_mut(id)?.owner = None;
        self.unlink(id);
        Ok(())
    }

    /// The head of the list if it is due at `now`.
    fn peek_expired(&self, now: ClockTime) -> Option<(EtimerId, ProcessId)> {
        let id = self.head?;
        let etimer = &self.timers[id.index()];
        if !etimer.timer.expired_at(now) {
            return None;
        }
        etimer.owner.map(|owner| (id, owner))
    }

    /// Removes every timer owned by `owner`.
    fn remove_process(&mut self, owner: ProcessId) {
        let mut cursor = self.head;
        while let Some(id) = cursor {
            cursor = self.timers[id.index()].next;
            if self.timers[id.index()].owner == Some(owner) {
                self.timers[id.index()].owner = None;
                self.unlink(id);
            }
        }
    }
}

/// The process that turns expired event timers into events.
pub(super) struct EtimerProcess;

impl EtimerProcess {
    pub(super) const NAME: &'static str = "Event timer";
}

impl Process for EtimerProcess {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn thread(&mut self, ctx: &mut Context<'_, '_>, ev: Event, data: Data) -> PtState {
        match (ev, data) {
            (Event::EXITED, Data::Process(owner)) => {
                ctx.kernel.etimers.remove_process(owner);
                ctx.kernel.etimers_changed();
            }
            (Event::POLL, _) => ctx.kernel.etimer_fire_expired(),
            _ => {}
        }
        PtState::Waiting
    }
}

impl Kernel<'_> {
    /// Takes an event timer out of the pool. Timers are never returned.
    pub fn etimer_alloc(&mut self) -> Result<EtimerId, Error> {
        self.etimers.alloc().ok_or_else(|| {
            warn!("event timer pool exhausted");
            Error::EtimerPoolExhausted
        })
    }

    /// Starts the timer so that it expires `interval` ticks from now and
    /// then posts [`Event::TIMER`] to the current process.
    pub fn etimer_set(&mut self, id: EtimerId, interval: ClockTime) -> Result<(), Error> {
        let now = self.now();
        self.etimer_arm(id, |timer| timer.set_at(now, interval))
    }

    /// Restarts an expired timer exactly one interval after its previous
    /// start.
    pub fn etimer_reset(&mut self, id: EtimerId) -> Result<(), Error> {
        self.etimer_arm(id, Timer::reset)
    }

    /// Like [`Kernel::etimer_reset`], then continues with a new interval.
    pub fn etimer_reset_with_new_interval(
        &mut self,
        id: EtimerId,
        interval: ClockTime,
    ) -> Result<(), Error> {
        self.etimer_arm(id, |timer| timer.reset_with_new_interval(interval))
    }

    /// Starts the timer over from now with its previous interval.
    pub fn etimer_restart(&mut self, id: EtimerId) -> Result<(), Error> {
        let now = self.now();
        self.etimer_arm(id, |timer| timer.restart_at(now))
    }

    /// Shifts a pending timer by `delta` ticks without changing its owner.
    pub fn etimer_adjust(&mut self, id: EtimerId, delta: i32) -> Result<(), Error> {
        let now = self.now();
        let etimer = self.etimers.get_mut(id)?;
        etimer.timer.adjust(delta);
        if let Some(owner) = etimer.owner {
            self.etimers.arm(id, owner, now, |_| {})?;
            self.etimers_changed();
        }
        Ok(())
    }

    /// Stops a timer without posting an event. It reads as expired
    /// afterwards.
    pub fn etimer_stop(&mut self, id: EtimerId) -> Result<(), Error> {
        self.etimers.stop(id)?;
        self.etimers_changed();
        Ok(())
    }

    /// Whether the timer has fired or was stopped, i.e. it no longer belongs
    /// to a process. Unknown handles read as expired.
    pub fn etimer_expired(&self, id: EtimerId) -> bool {
        self.etimers
            .get(id)
            .map_or(true, |etimer| etimer.owner.is_none())
    }

    pub fn etimer_expiration_time(&self, id: EtimerId) -> Option<ClockTime> {
        self.etimers.get(id).map(|etimer| etimer.timer.expiration_time())
    }

    pub fn etimer_start_time(&self, id: EtimerId) -> Option<ClockTime> {
        self.etimers.get(id).map(|etimer| etimer.timer.start_time())
    }

    /// Whether any event timer is pending.
    pub fn etimer_pending(&self) -> bool {
        self.etimers.pending()
    }

    pub fn etimer_next_expiration_time(&self) -> Option<ClockTime> {
        self.etimers.next_expiration_time()
    }

    pub fn etimers(&self) -> &EtimerPool {
        &self.etimers
    }

    fn etimer_arm(&mut self, id: EtimerId, f: impl FnOnce(&mut Timer)) -> Result<(), Error> {
        let Some(owner) = self.current else {
            warn!("event timer {} set outside of a process", id.0);
            return Err(Error::NoCurrentProcess);
        };
        let now = self.now();
        self.etimers.arm(id, owner, now, f)?;
        self.etimers_changed();
        Ok(())
    }

    /// Publishes the new deadline to the clock interrupt and lets the event
    /// timer process look at the list.
    fn etimers_changed(&mut self) {
        self.signals
            .set_next_expiry(self.etimers.next_expiration_time());
        self.signals.poll(ProcessId::ETIMER);
    }

    fn etimer_fire_expired(&mut self) {
        let now = self.now();
        while let Some((id, owner)) = self.etimers.peek_expired(now) {
            if self
                .post(Target::Process(owner), Event::TIMER, Data::Etimer(id))
                .is_err()
            {
                debug!("event queue full, retrying event timer {}", id.0);
                self.signals.poll(ProcessId::ETIMER);
                break;
            }
            // peek_expired() only returns allocated timers.
            let _ = self.etimers.stop(id);
        }
        self.signals
            .set_next_expiry(self.etimers.next_expiration_time());
    }
}

impl Context<'_, '_> {
    pub fn etimer_alloc(&mut self) -> Result<EtimerId, Error> {
        self.kernel.etimer_alloc()
    }

    pub fn etimer_set(&mut self, id: EtimerId, interval: ClockTime) -> Result<(), Error> {
        self.kernel.etimer_set(id, interval)
    }

    pub fn etimer_reset(&mut self, id: EtimerId) -> Result<(), Error> {
        self.kernel.etimer_reset(id)
    }

    pub fn etimer_reset_with_new_interval(
        &mut self,
        id: EtimerId,
        interval: ClockTime,
    ) -> Result<(), Error> {
        self.kernel.etimer_reset_with_new_interval(id, interval)
    }

    pub fn etimer_restart(&mut self, id: EtimerId) -> Result<(), Error> {
        self.kernel.etimer_restart(id)
    }

    pub fn etimer_adjust(&mut self, id: EtimerId, delta: i32) -> Result<(), Error> {
        self.kernel.etimer_adjust(id, delta)
    }

    pub fn etimer_stop(&mut self, id: EtimerId) -> Result<(), Error> {
        self.kernel.etimer_stop(id)
    }

    pub fn etimer_expired(&self, id: EtimerId) -> bool {
        self.kernel.etimer_expired(id)
    }

    pub fn etimer_expiration_time(&self, id: EtimerId) -> Option<ClockTime> {
        self.kernel.etimer_expiration_time(id)
    }
}
