//! IEEE 802.15.4 data frames with PAN ID compression.
//!
//! Only what the demo puts on air is supported: data frames within one PAN,
//! short addresses for 2-byte link addresses and extended addresses
//! otherwise.

use mote::driver::frame::{
    Framer, FramerError, LinkAddr, PacketAddr, PacketAttr, Packetbuf, FRAME_TYPE_DATA,
    LINKADDR_SIZE,
};

pub const PAN_ID: u16 = 0xabcd;

const ACK_REQUEST: u16 = 1 << 5;
const PAN_ID_COMPRESSION: u16 = 1 << 6;
const ADDR_MODE_SHORT: u16 = 0b10;
const ADDR_MODE_EXTENDED: u16 = 0b11;
const ADDR_MODE: u16 = if LINKADDR_SIZE == 2 {
    ADDR_MODE_SHORT
} else {
    ADDR_MODE_EXTENDED
};

const HDR_LEN: usize = 2 + 1 + 2 + 2 * LINKADDR_SIZE;

#[derive(Debug, Default)]
pub struct Ieee802154Framer;

impl Ieee802154Framer {
    fn frame_control(ack: bool) -> u16 {
        let mut fc = FRAME_TYPE_DATA as u16 | PAN_ID_COMPRESSION;
        if ack {
            fc |= ACK_REQUEST;
        }
        fc | ADDR_MODE << 10 | ADDR_MODE << 14
    }
}

/// Addresses go on air least significant byte first.
fn write_addr(buf: &mut [u8], addr: &LinkAddr) {
    for (to, from) in buf.iter_mut().zip(addr.as_bytes().iter().rev()) {
        *to = *from;
    }
}

fn read_addr(buf: &[u8]) -> Option<LinkAddr> {
    let mut bytes = [0; LINKADDR_SIZE];
    for (to, from) in bytes.iter_mut().zip(buf.get(..LINKADDR_SIZE)?.iter().rev()) {
        *to = *from;
    }
    Some(LinkAddr::new(bytes))
}

impl Framer for Ieee802154Framer {
    fn create(&mut self, packetbuf: &mut Packetbuf) -> Result<usize, FramerError> {
        let receiver = *packetbuf.addr(PacketAddr::Receiver);
        let receiver = if receiver.is_broadcast() {
            LinkAddr::new([0xff; LINKADDR_SIZE])
        } else {
            receiver
        };
        let sender = *packetbuf.addr(PacketAddr::Sender);
        let ack = packetbuf.attr(PacketAttr::MacAck) != 0 && !receiver.is_broadcast();
        let seqno = packetbuf.attr(PacketAttr::MacSeqno) as u8;

        let hdr = packetbuf
            .hdr_alloc(HDR_LEN)
            .map_err(|_| FramerError::NoHeaderSpace)?;
        hdr[..2].copy_from_slice(&Self::frame_control(ack).to_le_bytes());
        hdr[2] = seqno;
        hdr[3..5].copy_from_slice(&PAN_ID.to_le_bytes());
        write_addr(&mut hdr[5..5 + LINKADDR_SIZE], &receiver);
        write_addr(&mut hdr[5 + LINKADDR_SIZE..], &sender);
        Ok(HDR_LEN)
    }

    fn parse(&mut self, packetbuf: &mut Packetbuf) -> Result<usize, FramerError> {
        let data = packetbuf.data();
        if data.len() < HDR_LEN {
            return Err(FramerError::Malformed);
        }
        let fc = u16::from_le_bytes([data[0], data[1]]);
        if fc & 0b111 != FRAME_TYPE_DATA as u16
            || fc & PAN_ID_COMPRESSION == 0
            || (fc >> 10) & 0b11 != ADDR_MODE
            || (fc >> 14) & 0b11 != ADDR_MODE
        {
            return Err(FramerError::Unsupported);
        }
        if u16::from_le_bytes([data[3], data[4]]) != PAN_ID {
            return Err(FramerError::Unsupported);
        }
        let seqno = data[2];
        let receiver = read_addr(&data[5..]).ok_or(FramerError::Malformed)?;
        let sender = read_addr(&data[5 + LINKADDR_SIZE..]).ok_or(FramerError::Malformed)?;

        packetbuf.set_attr(PacketAttr::FrameType, fc & 0b111);
        packetbuf.set_attr(PacketAttr::MacAck, (fc & ACK_REQUEST != 0) as u16);
        packetbuf.set_attr(PacketAttr::MacSeqno, seqno as u16);
        packetbuf.set_addr(PacketAddr::Receiver, receiver);
        packetbuf.set_addr(PacketAddr::Sender, sender);
        packetbuf
            .hdr_reduce(HDR_LEN)
            .map_err(|_| FramerError::Malformed)?;
        Ok(HDR_LEN)
    }
}
