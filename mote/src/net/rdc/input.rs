use core::cell::RefCell;

use mote_driver::frame::Packetbuf;
use mote_util::warn;

use super::Rdc;
use crate::sys::{Context, Data, Event, Process, PtState};

/// Bottom half of the radio's receive interrupt.
///
/// The interrupt handler only calls
/// [`Signals::poll`](crate::sys::Signals::poll) for this process. When
/// polled, the process reads every pending frame out of the radio and runs it
/// through the duty cycling layer, which passes it on to the MAC layer.
pub struct RadioInputProcess<'r, R> {
    rdc: &'r RefCell<R>,
    packetbuf: Packetbuf,
}

impl<'r, R: Rdc> RadioInputProcess<'r, R> {
    pub fn new(rdc: &'r RefCell<R>) -> Self {
        Self {
            rdc,
            packetbuf: Packetbuf::new(),
        }
    }
}

impl<R: Rdc> Process for RadioInputProcess<'_, R> {
    fn name(&self) -> &'static str {
        "Radio input"
    }

    fn poll_handler(&mut self, ctx: &mut Context<'_, '_>) {
        let Ok(mut rdc) = self.rdc.try_borrow_mut() else {
            warn!("radio input: duty cycling layer busy, retrying");
            ctx.poll(ctx.id());
            return;
        };
        while rdc.poll_input(&mut self.packetbuf) {}
    }

    fn thread(&mut self, _ctx: &mut Context<'_, '_>, _ev: Event, _data: Data) -> PtState {
        PtState::Waiting
    }
}
