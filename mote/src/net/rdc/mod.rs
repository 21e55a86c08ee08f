//! Radio duty cycling.
//!
//! The radio duty cycling (RDC) layer decides when the radio is on. It sits
//! between the MAC layer and the radio driver: outgoing frames get their
//! link-layer header from a [`Framer`](mote_driver::frame::Framer) here, and
//! incoming frames are parsed, filtered and handed to the
//! [`Mac`](super::Mac).

use mote_driver::frame::{Packetbuf, QueueBuf};

use super::MacTxStatus;

mod input;
mod mac_sequence;
mod nullrdc;

#[cfg(test)]
pub(crate) mod mock;

pub use input::RadioInputProcess;
pub use mac_sequence::{MacSequence, MAC_SEQUENCE_HISTORY};
pub use nullrdc::{AutoAck, NullRdc, NullRdcConfig, ACK_WAIT_TIME, AFTER_ACK_DETECTED_WAIT_TIME};

/// A radio duty cycling protocol.
///
/// `sent` callbacks receive the outcome of every frame and the number of
/// transmissions it took.
pub trait Rdc {
    /// Brings up the layer and the radio below.
    fn init(&mut self);

    /// Sends the frame in `packetbuf`.
    fn send(&mut self, packetbuf: &mut Packetbuf, sent: impl FnMut(MacTxStatus, u8));

    /// Sends the queued frames in order, using `packetbuf` as scratch space.
    /// Stops at the first frame that is not sent successfully.
    fn send_list(
        &mut self,
        packetbuf: &mut Packetbuf,
        bufs: &[QueueBuf],
        sent: impl FnMut(MacTxStatus, u8),
    );

    /// Processes a frame the radio received into `packetbuf`.
    fn input(&mut self, packetbuf: &mut Packetbuf);

    /// Reads one pending frame from the radio and processes it. Returns
    /// whether there was a frame.
    fn poll_input(&mut self, packetbuf: &mut Packetbuf) -> bool;

    /// Turns the radio on.
    fn on(&mut self) -> bool;

    /// Turns the radio off, unless `keep_radio_on` is set.
    fn off(&mut self, keep_radio_on: bool) -> bool;

    /// How often the channel is sampled, in system clock ticks. Zero for an
    /// always-on radio.
    fn channel_check_interval(&self) -> u16;
}
