use super::FRAME_TYPE_ACK;

/// Length of an acknowledgment frame without FCS.
pub const ACK_LEN: usize = 3;

/// Position of the sequence number inside an acknowledgment.
const ACK_SEQNO: usize = 2;

/// An IEEE 802.15.4 immediate acknowledgment: frame control (ACK type, no
/// flags) followed by the acknowledged sequence number.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AckFrame([u8; ACK_LEN]);

impl AckFrame {
    pub const fn new(seqno: u8) -> Self {
        Self([FRAME_TYPE_ACK, 0, seqno])
    }

    pub const fn seqno(&self) -> u8 {
        self.0[ACK_SEQNO]
    }

    pub const fn as_bytes(&self) -> &[u8; ACK_LEN] {
        &self.0
    }

    /// Whether `frame` acknowledges `seqno`.
    ///
    /// Only the length and the sequence number are checked. Anything of a
    /// different length is another frame that happened to be on air.
    pub fn acknowledges(frame: &[u8], seqno: u8) -> bool {
        frame.len() == ACK_LEN && frame[ACK_SEQNO] == seqno
    }
}
