//! Test doubles for everything around the radio duty cycling layer.

use core::cell::Cell;
use std::{collections::VecDeque, vec::Vec};

use mote_driver::{
    frame::{
        Framer, FramerError, LinkAddr, PacketAddr, PacketAttr, Packetbuf, FRAME_TYPE_DATA,
        LINKADDR_SIZE,
    },
    radio::{RadioDriver, TxStatus},
    rtimer::{Rtimer, RtimerClock},
    watchdog::Watchdog,
};

use crate::net::Mac;

pub fn addr(n: u8) -> LinkAddr {
    let mut bytes = [0; LINKADDR_SIZE];
    bytes[LINKADDR_SIZE - 1] = n;
    LinkAddr::new(bytes)
}

/// A radio whose answers are scripted by the test.
#[derive(Debug)]
pub struct MockRadio {
    pub is_on: bool,
    pub prepared: Option<Vec<u8>>,
    pub transmissions: usize,
    pub transmit_result: TxStatus,
    /// Results of consecutive `send()` calls, `Ok` once exhausted.
    pub send_results: VecDeque<TxStatus>,
    pub sent: Vec<Vec<u8>>,
    pub receiving: bool,
    pub channel_busy: bool,
    pub rx: VecDeque<Vec<u8>>,
    /// Received right after a successful `transmit()`, i.e. within the ACK
    /// wait window.
    pub reply: Option<Vec<u8>>,
}

impl Default for MockRadio {
    fn default() -> Self {
        Self {
            is_on: false,
            prepared: None,
            transmissions: 0,
            transmit_result: TxStatus::Ok,
            send_results: VecDeque::new(),
            sent: Vec::new(),
            receiving: false,
            channel_busy: false,
            rx: VecDeque::new(),
            reply: None,
        }
    }
}

impl RadioDriver for MockRadio {
    fn init(&mut self) -> bool {
        true
    }

    fn prepare(&mut self, payload: &[u8]) -> TxStatus {
        self.prepared = Some(payload.to_vec());
        TxStatus::Ok
    }

    fn transmit(&mut self, len: usize) -> TxStatus {
        assert_eq!(self.prepared.as_ref().map(Vec::len), Some(len));
        self.transmissions += 1;
        if self.transmit_result == TxStatus::Ok {
            if let Some(reply) = self.reply.take() {
                self.rx.push_back(reply);
            }
        }
        self.transmit_result
    }

    fn send(&mut self, payload: &[u8]) -> TxStatus {
        self.sent.push(payload.to_vec());
        self.send_results.pop_front().unwrap_or(TxStatus::Ok)
    }

    fn read(&mut self, buf: &mut [u8]) -> usize {
        match self.rx.pop_front() {
            Some(frame) if frame.len() <= buf.len() => {
                buf[..frame.len()].copy_from_slice(&frame);
                frame.len()
            }
            _ => 0,
        }
    }

    fn channel_clear(&mut self) -> bool {
        !self.channel_busy
    }

    fn receiving_packet(&mut self) -> bool {
        self.receiving
    }

    fn pending_packet(&mut self) -> bool {
        !self.rx.is_empty()
    }

    fn on(&mut self) -> bool {
        self.is_on = true;
        true
    }

    fn off(&mut self) -> bool {
        self.is_on = false;
        true
    }
}

/// A minimal framer: frame type, ACK request, sequence number, receiver,
/// sender.
#[derive(Debug, Default)]
pub struct MockFramer {
    pub fail_create: bool,
}

pub const MOCK_HDR_LEN: usize = 3 + 2 * LINKADDR_SIZE;

impl MockFramer {
    /// A frame as the framer would build it.
    pub fn frame(
        receiver: LinkAddr,
        sender: LinkAddr,
        seqno: u8,
        ack: bool,
        payload: &[u8],
    ) -> Vec<u8> {
        let mut frame = vec![FRAME_TYPE_DATA, ack as u8, seqno];
        frame.extend_from_slice(receiver.as_bytes());
        frame.extend_from_slice(sender.as_bytes());
        frame.extend_from_slice(payload);
        frame
    }
}

impl Framer for MockFramer {
    fn create(&mut self, packetbuf: &mut Packetbuf) -> Result<usize, FramerError> {
        if self.fail_create {
            return Err(FramerError::NoHeaderSpace);
        }
        let receiver = *packetbuf.addr(PacketAddr::Receiver);
        let sender = *packetbuf.addr(PacketAddr::Sender);
        let ack = packetbuf.attr(PacketAttr::MacAck) != 0 && !receiver.is_broadcast();
        let seqno = packetbuf.attr(PacketAttr::MacSeqno) as u8;

        let hdr = packetbuf
            .hdr_alloc(MOCK_HDR_LEN)
            .map_err(|_| FramerError::NoHeaderSpace)?;
        hdr[0] = FRAME_TYPE_DATA;
        hdr[1] = ack as u8;
        hdr[2] = seqno;
        hdr[3..3 + LINKADDR_SIZE].copy_from_slice(receiver.as_bytes());
        hdr[3 + LINKADDR_SIZE..].copy_from_slice(sender.as_bytes());
        Ok(MOCK_HDR_LEN)
    }

    fn parse(&mut self, packetbuf: &mut Packetbuf) -> Result<usize, FramerError> {
        if packetbuf.datalen() < MOCK_HDR_LEN {
            return Err(FramerError::Malformed);
        }
        let data = packetbuf.data();
        let frame_type = data[0];
        let ack = data[1];
        let seqno = data[2];
        let receiver =
            LinkAddr::from_slice(&data[3..3 + LINKADDR_SIZE]).ok_or(FramerError::Malformed)?;
        let sender = LinkAddr::from_slice(&data[3 + LINKADDR_SIZE..MOCK_HDR_LEN])
            .ok_or(FramerError::Malformed)?;

        packetbuf.set_attr(PacketAttr::FrameType, frame_type as u16);
        packetbuf.set_attr(PacketAttr::MacAck, ack as u16);
        packetbuf.set_attr(PacketAttr::MacSeqno, seqno as u16);
        packetbuf.set_addr(PacketAddr::Receiver, receiver);
        packetbuf.set_addr(PacketAddr::Sender, sender);
        packetbuf
            .hdr_reduce(MOCK_HDR_LEN)
            .map_err(|_| FramerError::Malformed)?;
        Ok(MOCK_HDR_LEN)
    }
}

/// Advances by one tick every time it is read.
#[derive(Debug, Default)]
pub struct MockRtimer(pub Cell<RtimerClock>);

impl Rtimer for MockRtimer {
    fn now(&self) -> RtimerClock {
        let now = self.0.get();
        self.0.set(now.wrapping_add(1));
        now
    }
}

#[derive(Debug, Default)]
pub struct CountingWatchdog(pub usize);

impl Watchdog for CountingWatchdog {
    fn periodic(&mut self) {
        self.0 += 1;
    }
}

/// Records the payload and sender of every frame delivered to it.
#[derive(Debug, Default)]
pub struct MockMac {
    pub received: Vec<(LinkAddr, Vec<u8>)>,
}

impl Mac for MockMac {
    fn input(&mut self, packetbuf: &Packetbuf) {
        self.received
            .push((*packetbuf.addr(PacketAddr::Sender), packetbuf.data().to_vec()));
    }
}
