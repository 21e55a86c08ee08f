//! A radio duty cycling layer that never turns the radio off.
//!
//! Outgoing frames go straight to the radio. Depending on
//! [`NullRdcConfig::autoack`] acknowledgments are not waited for, waited for
//! in software right after the transmission, or handled by the radio.

use mote_driver::{
    frame::{
        AckFrame, Framer, LinkAddr, PacketAddr, PacketAttr, Packetbuf, QueueBuf, ACK_LEN,
        FRAME_TYPE_DATA,
    },
    radio::{RadioDriver, TxStatus},
    rtimer::{busy_wait, Rtimer, RtimerDuration, RTIMER_SECOND},
    watchdog::Watchdog,
};
use mote_util::debug;

use super::{MacSequence, Rdc};
use crate::net::{Mac, MacTxStatus};

/// How long to wait for an acknowledgment after a unicast transmission.
pub const ACK_WAIT_TIME: RtimerDuration = RtimerDuration::from_ticks(RTIMER_SECOND / 400);
/// How long to keep waiting once the radio shows activity within the ACK
/// wait window.
pub const AFTER_ACK_DETECTED_WAIT_TIME: RtimerDuration =
    RtimerDuration::from_ticks(RTIMER_SECOND / 1000);

/// Who takes care of link-layer acknowledgments on transmission.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum AutoAck {
    /// Frames are sent without waiting for an acknowledgment.
    #[default]
    Off,
    /// The null RDC busy-waits for the acknowledgment after each unicast
    /// transmission and matches its sequence number.
    Software,
    /// The radio waits for acknowledgments and reports
    /// [`TxStatus::NoAck`].
    Hardware,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NullRdcConfig {
    /// Our link-layer address, stamped as sender on every outgoing frame.
    pub node_addr: LinkAddr,
    pub autoack: AutoAck,
    /// Drop received frames addressed neither to us nor to everybody.
    pub address_filter: bool,
    /// Drop received frames repeating their sender's last sequence number.
    pub duplicate_detection: bool,
    /// Acknowledge received unicast data frames in software.
    pub send_ack: bool,
    pub ack_wait_time: RtimerDuration,
    pub after_ack_detected_wait_time: RtimerDuration,
}

impl NullRdcConfig {
    pub const fn new(node_addr: LinkAddr) -> Self {
        Self {
            node_addr,
            autoack: AutoAck::Off,
            address_filter: true,
            duplicate_detection: true,
            send_ack: false,
            ack_wait_time: ACK_WAIT_TIME,
            after_ack_detected_wait_time: AFTER_ACK_DETECTED_WAIT_TIME,
        }
    }
}

impl Default for NullRdcConfig {
    fn default() -> Self {
        Self::new(LinkAddr::NULL)
    }
}

/// The null radio duty cycling layer.
pub struct NullRdc<R, F, T, W, M> {
    radio: R,
    framer: F,
    rtimer: T,
    watchdog: W,
    mac: M,
    config: NullRdcConfig,
    seqnos: MacSequence,
}

impl<R, F, T, W, M> NullRdc<R, F, T, W, M>
where
    R: RadioDriver,
    F: Framer,
    T: Rtimer,
    W: Watchdog,
    M: Mac,
{
    pub fn new(radio: R, framer: F, rtimer: T, watchdog: W, mac: M, config: NullRdcConfig) -> Self {
        Self {
            radio,
            framer,
            rtimer,
            watchdog,
            mac,
            config,
            seqnos: MacSequence::new(),
        }
    }

    pub fn config(&self) -> &NullRdcConfig {
        &self.config
    }

    pub fn radio(&self) -> &R {
        &self.radio
    }

    pub fn radio_mut(&mut self) -> &mut R {
        &mut self.radio
    }

    pub fn mac(&self) -> &M {
        &self.mac
    }

    pub fn mac_mut(&mut self) -> &mut M {
        &mut self.mac
    }

    /// Sends the frame in `packetbuf` once and reports the outcome to `sent`.
    /// Returns whether it went out successfully.
    fn send_one_packet(
        &mut self,
        packetbuf: &mut Packetbuf,
        sent: &mut impl FnMut(MacTxStatus, u8),
    ) -> bool {
        packetbuf.set_addr(PacketAddr::Sender, self.config.node_addr);
        if self.config.autoack != AutoAck::Off {
            packetbuf.set_attr(PacketAttr::MacAck, 1);
        }

        let status = match self.framer.create(packetbuf) {
            Err(err) => {
                debug!("nullrdc: send failed, cannot create header: {:?}", err);
                MacTxStatus::ErrFatal
            }
            Ok(_) => match self.config.autoack {
                AutoAck::Off => self.radio.send(packetbuf.hdr_and_data()).into(),
                AutoAck::Software => self.transmit_with_software_ack(packetbuf),
                AutoAck::Hardware => {
                    if self.radio_busy(packetbuf) {
                        MacTxStatus::Collision
                    } else {
                        self.radio.send(packetbuf.hdr_and_data()).into()
                    }
                }
            },
        };

        debug!(
            "nullrdc: sent seqno {}: {:?}",
            packetbuf.attr(PacketAttr::MacSeqno),
            status
        );
        sent(status, 1);
        status == MacTxStatus::Ok
    }

    /// Don't transmit over a frame on air, nor send a unicast frame while one
    /// waits in the RX buffer: its ACK would be lost behind it.
    fn radio_busy(&mut self, packetbuf: &Packetbuf) -> bool {
        self.radio.receiving_packet()
            || (!packetbuf.holds_broadcast() && self.radio.pending_packet())
    }

    fn transmit_with_software_ack(&mut self, packetbuf: &Packetbuf) -> MacTxStatus {
        let dsn = packetbuf.attr(PacketAttr::MacSeqno) as u8;
        let frame = packetbuf.hdr_and_data();
        let is_broadcast = packetbuf.holds_broadcast();

        self.radio.prepare(frame);
        if self.radio_busy(packetbuf) {
            return MacTxStatus::Collision;
        }

        match self.radio.transmit(frame.len()) {
            TxStatus::Ok if is_broadcast => MacTxStatus::Ok,
            TxStatus::Ok => self.wait_for_ack(dsn),
            TxStatus::Collision => MacTxStatus::Collision,
            _ => MacTxStatus::Err,
        }
    }

    fn wait_for_ack(&mut self, dsn: u8) -> MacTxStatus {
        busy_wait(&self.rtimer, &mut self.watchdog, self.config.ack_wait_time);

        let activity = self.radio.receiving_packet()
            || self.radio.pending_packet()
            || !self.radio.channel_clear();
        if !activity {
            return MacTxStatus::NoAck;
        }

        if self.config.after_ack_detected_wait_time.ticks() > 0 {
            busy_wait(
                &self.rtimer,
                &mut self.watchdog,
                self.config.after_ack_detected_wait_time,
            );
        }

        if !self.radio.pending_packet() {
            return MacTxStatus::NoAck;
        }
        let mut ackbuf = [0; ACK_LEN];
        let len = self.radio.read(&mut ackbuf);
        match ackbuf.get(..len) {
            Some(ack) if AckFrame::acknowledges(ack, dsn) => MacTxStatus::Ok,
            _ => MacTxStatus::Collision,
        }
    }
}

impl<R, F, T, W, M> Rdc for NullRdc<R, F, T, W, M>
where
    R: RadioDriver,
    F: Framer,
    T: Rtimer,
    W: Watchdog,
    M: Mac,
{
    fn init(&mut self) {
        self.on();
    }

    fn send(&mut self, packetbuf: &mut Packetbuf, mut sent: impl FnMut(MacTxStatus, u8)) {
        self.send_one_packet(packetbuf, &mut sent);
    }

    fn send_list(
        &mut self,
        packetbuf: &mut Packetbuf,
        bufs: &[QueueBuf],
        mut sent: impl FnMut(MacTxStatus, u8),
    ) {
        for buf in bufs {
            buf.to_packetbuf(packetbuf);
            if !self.send_one_packet(packetbuf, &mut sent) {
                return;
            }
        }
    }

    fn input(&mut self, packetbuf: &mut Packetbuf) {
        if self.config.autoack == AutoAck::Software && packetbuf.datalen() == ACK_LEN {
            debug!("nullrdc: ignored ack");
            return;
        }

        if let Err(err) = self.framer.parse(packetbuf) {
            debug!(
                "nullrdc: failed to parse {} bytes: {:?}",
                packetbuf.datalen(),
                err
            );
            return;
        }

        let receiver = *packetbuf.addr(PacketAddr::Receiver);
        let for_us = receiver == self.config.node_addr;
        if self.config.address_filter && !for_us && !packetbuf.holds_broadcast() {
            debug!("nullrdc: not for us");
            return;
        }

        let sender = *packetbuf.addr(PacketAddr::Sender);
        let seqno = packetbuf.attr(PacketAttr::MacSeqno) as u8;
        let mut duplicate = false;
        if self.config.duplicate_detection {
            duplicate = self.seqnos.is_duplicate(&sender, seqno);
            if duplicate {
                debug!("nullrdc: drop duplicate link layer packet {}", seqno);
            } else {
                self.seqnos.register(sender, seqno);
            }
        }

        // Duplicates are acknowledged too.
        if self.config.send_ack
            && for_us
            && packetbuf.attr(PacketAttr::FrameType) == FRAME_TYPE_DATA as u16
            && packetbuf.attr(PacketAttr::MacAck) != 0
        {
            self.radio.send(AckFrame::new(seqno).as_bytes());
        }

        if !duplicate {
            self.mac.input(packetbuf);
        }
    }

    fn poll_input(&mut self, packetbuf: &mut Packetbuf) -> bool {
        if !self.radio.pending_packet() {
            return false;
        }
        packetbuf.clear();
        let len = self.radio.read(packetbuf.data_buffer_mut());
        if len == 0 {
            return false;
        }
        packetbuf.set_datalen(len);
        self.input(packetbuf);
        true
    }

    fn on(&mut self) -> bool {
        self.radio.on()
    }

    fn off(&mut self, keep_radio_on: bool) -> bool {
        if keep_radio_on {
            self.radio.on()
        } else {
            self.radio.off()
        }
    }

    fn channel_check_interval(&self) -> u16 {
        0
    }
}
