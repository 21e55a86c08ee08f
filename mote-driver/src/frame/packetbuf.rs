//! The shared packet buffer and queued copies of it.
//!
//! There is one [`Packetbuf`] per direction in a node's stack. A packet being
//! sent has its payload in the data area and protocol layers prepend their
//! headers into the header area in front of it, so header and data always
//! form one contiguous frame:
//!
//! ```text
//! |<------- HDR_SIZE ------->|<------------ SIZE ------------>|
//! [ free     | headers       | data            | free         ]
//!            ^ hdr_start     ^ data_start      ^ data_start + data_len
//! ```
//!
//! A received frame is read into the data area; the framer parses its header
//! and strips it with [`Packetbuf::hdr_reduce`].

use heapless::Vec;
use mote_util::{Error, Result};

use super::LinkAddr;
use crate::const_config::{PACKETBUF_CONF_HDR_SIZE, PACKETBUF_CONF_SIZE};

/// Capacity of the data area.
pub const PACKETBUF_SIZE: usize = PACKETBUF_CONF_SIZE;
/// Capacity of the header area.
pub const PACKETBUF_HDR_SIZE: usize = PACKETBUF_CONF_HDR_SIZE;
/// Largest frame a packet buffer can hold.
pub const PACKETBUF_TOTAL_SIZE: usize = PACKETBUF_HDR_SIZE + PACKETBUF_SIZE;

/// Numeric packet attributes.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(usize)]
pub enum PacketAttr {
    /// The frame type of the link-layer header.
    FrameType,
    Channel,
    Rssi,
    LinkQuality,
    /// The link-layer sequence number.
    MacSeqno,
    /// Non-zero if the frame requests an acknowledgment.
    MacAck,
    /// Non-zero if the sender has more frames pending.
    PendingFrame,
    MaxMacTransmissions,
    MacTransmissions,
}

impl PacketAttr {
    const COUNT: usize = PacketAttr::MacTransmissions as usize + 1;
}

/// Address attributes.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(usize)]
pub enum PacketAddr {
    Sender,
    Receiver,
}

impl PacketAddr {
    const COUNT: usize = PacketAddr::Receiver as usize + 1;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Attributes {
    values: [u16; PacketAttr::COUNT],
    addrs: [LinkAddr; PacketAddr::COUNT],
}

impl Attributes {
    const fn new() -> Self {
        Self {
            values: [0; PacketAttr::COUNT],
            addrs: [LinkAddr::NULL; PacketAddr::COUNT],
        }
    }
}

/// A frame under construction or just received, with its attributes.
#[derive(Debug, Clone)]
pub struct Packetbuf {
    buf: [u8; PACKETBUF_TOTAL_SIZE],
    hdr_start: usize,
    data_start: usize,
    data_len: usize,
    attrs: Attributes,
}

impl Default for Packetbuf {
    fn default() -> Self {
        Self::new()
    }
}

impl Packetbuf {
    pub const fn new() -> Self {
        Self {
            buf: [0; PACKETBUF_TOTAL_SIZE],
            hdr_start: PACKETBUF_HDR_SIZE,
            data_start: PACKETBUF_HDR_SIZE,
            data_len: 0,
            attrs: Attributes::new(),
        }
    }

    /// Empties the buffer and resets all attributes.
    pub fn clear(&mut self) {
        self.hdr_start = PACKETBUF_HDR_SIZE;
        self.data_start = PACKETBUF_HDR_SIZE;
        self.data_len = 0;
        self.attrs = Attributes::new();
    }

    /// Clears the buffer and copies `data` into the data area. Returns the
    /// number of bytes copied, which is less than `data.len()` if it didn't
    /// fit.
    pub fn copy_from(&mut self, data: &[u8]) -> usize {
        self.clear();
        let len = data.len().min(PACKETBUF_SIZE);
        self.buf[PACKETBUF_HDR_SIZE..PACKETBUF_HDR_SIZE + len].copy_from_slice(&data[..len]);
        self.data_len = len;
        len
    }

    /// Copies header and data into `to`. Returns the number of bytes copied.
    pub fn copy_to(&self, to: &mut [u8]) -> usize {
        let frame = self.hdr_and_data();
        let len = frame.len().min(to.len());
        to[..len].copy_from_slice(&frame[..len]);
        len
    }

    /// Extends the header by `len` bytes towards the front and returns the
    /// new header bytes for the caller to fill in.
    pub fn hdr_alloc(&mut self, len: usize) -> Result<&mut [u8]> {
        if len > self.hdr_start {
            return Err(Error);
        }
        self.hdr_start -= len;
        Ok(&mut self.buf[self.hdr_start..self.hdr_start + len])
    }

    /// Moves `len` bytes from the front of the data into the header, i.e.
    /// strips a parsed header off the data.
    pub fn hdr_reduce(&mut self, len: usize) -> Result<()> {
        if len > self.data_len {
            return Err(Error);
        }
        self.data_start += len;
        self.data_len -= len;
        Ok(())
    }

    pub fn hdr(&self) -> &[u8] {
        &self.buf[self.hdr_start..self.data_start]
    }

    pub fn hdr_len(&self) -> usize {
        self.data_start - self.hdr_start
    }

    pub fn data(&self) -> &[u8] {
        &self.buf[self.data_start..self.data_start + self.data_len]
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.buf[self.data_start..self.data_start + self.data_len]
    }

    /// The whole free data area, to receive a frame into. Call
    /// [`Packetbuf::set_datalen`] afterwards.
    pub fn data_buffer_mut(&mut self) -> &mut [u8] {
        &mut self.buf[self.data_start..]
    }

    pub fn datalen(&self) -> usize {
        self.data_len
    }

    /// Sets the data length, clamped to the free data area.
    pub fn set_datalen(&mut self, len: usize) {
        self.data_len = len.min(PACKETBUF_TOTAL_SIZE - self.data_start);
    }

    /// Header and data as one contiguous frame.
    pub fn hdr_and_data(&self) -> &[u8] {
        &self.buf[self.hdr_start..self.data_start + self.data_len]
    }

    pub fn totlen(&self) -> usize {
        self.hdr_len() + self.data_len
    }

    pub fn attr(&self, attr: PacketAttr) -> u16 {
        self.attrs.values[attr as usize]
    }

    pub fn set_attr(&mut self, attr: PacketAttr, value: u16) {
        self.attrs.values[attr as usize] = value;
    }

    pub fn addr(&self, addr: PacketAddr) -> &LinkAddr {
        &self.attrs.addrs[addr as usize]
    }

    pub fn set_addr(&mut self, addr: PacketAddr, value: LinkAddr) {
        self.attrs.addrs[addr as usize] = value;
    }

    /// Whether the packet is addressed to every node.
    pub fn holds_broadcast(&self) -> bool {
        self.addr(PacketAddr::Receiver).is_broadcast()
    }
}

/// A packet waiting in a queue: a copy of a packet buffer's frame and
/// attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueBuf {
    frame: Vec<u8, PACKETBUF_TOTAL_SIZE>,
    attrs: Attributes,
}

impl QueueBuf {
    /// Copies the frame and attributes currently held by `packetbuf`.
    pub fn from_packetbuf(packetbuf: &Packetbuf) -> Option<Self> {
        let frame = Vec::from_slice(packetbuf.hdr_and_data()).ok()?;
        Some(Self {
            frame,
            attrs: packetbuf.attrs,
        })
    }

    /// Restores the queued frame into `packetbuf` as its data, together with
    /// its attributes.
    pub fn to_packetbuf(&self, packetbuf: &mut Packetbuf) {
        packetbuf.copy_from(&self.frame);
        packetbuf.attrs = self.attrs;
    }

    pub fn frame(&self) -> &[u8] {
        &self.frame
    }

    pub fn attr(&self, attr: PacketAttr) -> u16 {
        self.attrs.values[attr as usize]
    }

    pub fn addr(&self, addr: PacketAddr) -> &LinkAddr {
        &self.attrs.addrs[addr as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headers_are_prepended() {
        let mut pb = Packetbuf::new();
        assert_eq!(pb.copy_from(b"payload"), 7);

        pb.hdr_alloc(2).unwrap().copy_from_slice(&[3, 4]);
        pb.hdr_alloc(2).unwrap().copy_from_slice(&[1, 2]);

        assert_eq!(pb.hdr(), &[1, 2, 3, 4]);
        assert_eq!(pb.hdr_and_data(), b"\x01\x02\x03\x04payload");
        assert_eq!(pb.totlen(), 11);
    }

    #[test]
    fn header_space_is_bounded() {
        let mut pb = Packetbuf::new();
        assert!(pb.hdr_alloc(PACKETBUF_HDR_SIZE + 1).is_err());
        assert!(pb.hdr_alloc(PACKETBUF_HDR_SIZE).is_ok());
        assert!(pb.hdr_alloc(1).is_err());
    }

    #[test]
    fn parsed_header_is_stripped() {
        let mut pb = Packetbuf::new();
        let rx = b"\x41\x88\x07payload";
        pb.data_buffer_mut()[..rx.len()].copy_from_slice(rx);
        pb.set_datalen(rx.len());

        pb.hdr_reduce(3).unwrap();
        assert_eq!(pb.data(), b"payload");
        assert_eq!(pb.hdr(), &[0x41, 0x88, 0x07]);
        assert!(pb.hdr_reduce(8).is_err());
    }

    #[test]
    fn oversized_copy_is_truncated() {
        let mut pb = Packetbuf::new();
        let big = [0xaa; PACKETBUF_SIZE + 10];
        assert_eq!(pb.copy_from(&big), PACKETBUF_SIZE);
        assert_eq!(pb.datalen(), PACKETBUF_SIZE);
    }

    #[test]
    fn clear_resets_attributes() {
        let mut pb = Packetbuf::new();
        pb.set_attr(PacketAttr::MacSeqno, 42);
        pb.set_addr(PacketAddr::Receiver, LinkAddr::new([1; super::super::LINKADDR_SIZE]));
        assert!(!pb.holds_broadcast());

        pb.clear();
        assert_eq!(pb.attr(PacketAttr::MacSeqno), 0);
        assert!(pb.holds_broadcast());
    }

    #[test]
    fn queuebuf_keeps_frame_and_attributes() {
        let mut pb = Packetbuf::new();
        pb.copy_from(b"hello");
        pb.set_attr(PacketAttr::MacSeqno, 9);
        let receiver = LinkAddr::new([2; super::super::LINKADDR_SIZE]);
        pb.set_addr(PacketAddr::Receiver, receiver);

        let queued = QueueBuf::from_packetbuf(&pb).unwrap();
        pb.clear();

        queued.to_packetbuf(&mut pb);
        assert_eq!(pb.data(), b"hello");
        assert_eq!(pb.attr(PacketAttr::MacSeqno), 9);
        assert_eq!(pb.addr(PacketAddr::Receiver), &receiver);
        assert_eq!(queued.attr(PacketAttr::MacSeqno), 9);
    }
}
