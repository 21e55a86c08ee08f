//! Link-layer frames as seen by the radio duty cycling layer.
//!
//! The duty cycling layer never looks into MAC headers itself. It stamps
//! addresses and attributes into the shared [`Packetbuf`] and leaves header
//! construction and parsing to a [`Framer`]. The only frame it understands
//! bytewise is the 3-byte acknowledgment, see [`AckFrame`].

mod ack;
mod addr;
mod packetbuf;

pub use ack::*;
pub use addr::*;
pub use packetbuf::*;

/// IEEE 802.15.4 frame type of a beacon.
pub const FRAME_TYPE_BEACON: u8 = 0x00;
/// IEEE 802.15.4 frame type of a data frame.
pub const FRAME_TYPE_DATA: u8 = 0x01;
/// IEEE 802.15.4 frame type of an acknowledgment.
pub const FRAME_TYPE_ACK: u8 = 0x02;
/// IEEE 802.15.4 frame type of a MAC command.
pub const FRAME_TYPE_CMD: u8 = 0x03;

/// Reasons a framer refuses a frame.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FramerError {
    /// Not enough header space left in the packet buffer.
    NoHeaderSpace,
    /// The received bytes do not form a valid header.
    Malformed,
    /// Valid header, but a frame version or addressing mode the framer
    /// doesn't handle.
    Unsupported,
}

/// Builds and parses link-layer headers in place.
pub trait Framer {
    /// Prepends a header matching the addresses and attributes of the packet
    /// buffer. Returns the header length.
    fn create(&mut self, packetbuf: &mut Packetbuf) -> Result<usize, FramerError>;

    /// Parses the header at the start of the packet buffer's data, stores
    /// addresses and attributes and strips the header from the data. Returns
    /// the header length.
    fn parse(&mut self, packetbuf: &mut Packetbuf) -> Result<usize, FramerError>;
}

impl<F: Framer + ?Sized> Framer for &mut F {
    fn create(&mut self, packetbuf: &mut Packetbuf) -> Result<usize, FramerError> {
        (**self).create(packetbuf)
    }

    fn parse(&mut self, packetbuf: &mut Packetbuf) -> Result<usize, FramerError> {
        (**self).parse(packetbuf)
    }
}
