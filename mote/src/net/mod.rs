//! Networking: the radio duty cycling layer and the interface of the MAC
//! layer above it.

use mote_driver::{frame::Packetbuf, radio::TxStatus};

pub mod rdc;

/// Outcome of a link-layer transmission, as reported to the MAC layer.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "fuzz", derive(arbitrary::Arbitrary))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MacTxStatus {
    /// Sent, and acknowledged if an acknowledgment was requested.
    Ok,
    /// The channel was busy or a frame other than the expected
    /// acknowledgment was received.
    Collision,
    /// No acknowledgment arrived.
    NoAck,
    /// The layer below postponed the transmission.
    Deferred,
    /// Transient error, the frame may be retried.
    Err,
    /// The frame can never be sent as is.
    ErrFatal,
}

impl From<TxStatus> for MacTxStatus {
    fn from(status: TxStatus) -> Self {
        match status {
            TxStatus::Ok => MacTxStatus::Ok,
            TxStatus::Collision => MacTxStatus::Collision,
            TxStatus::NoAck => MacTxStatus::NoAck,
            TxStatus::Err | TxStatus::ErrFatal => MacTxStatus::Err,
        }
    }
}

/// The MAC layer as seen from the radio duty cycling layer.
pub trait Mac {
    /// Delivers a received frame. The header has been parsed and stripped;
    /// addresses and attributes are set in the packet buffer.
    fn input(&mut self, packetbuf: &Packetbuf);
}

impl<M: Mac + ?Sized> Mac for &mut M {
    fn input(&mut self, packetbuf: &Packetbuf) {
        (**self).input(packetbuf)
    }
}
