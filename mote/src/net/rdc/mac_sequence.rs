use heapless::Vec;
use mote_driver::frame::LinkAddr;

use crate::const_config::MAC_SEQUENCE_CONF_HISTORY;

/// Number of senders whose last sequence number is remembered.
pub const MAC_SEQUENCE_HISTORY: usize = MAC_SEQUENCE_CONF_HISTORY;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Seen {
    sender: LinkAddr,
    seqno: u8,
}

/// Link-layer duplicate detection.
///
/// Keeps the last sequence number received from each of the `N` most recent
/// senders, most recent first. A frame is a duplicate if it repeats the last
/// sequence number of its sender.
#[derive(Debug, Clone, Default)]
pub struct MacSequence<const N: usize = MAC_SEQUENCE_HISTORY> {
    seen: Vec<Seen, N>,
}

impl<const N: usize> MacSequence<N> {
    pub const fn new() -> Self {
        Self { seen: Vec::new() }
    }

    pub fn is_duplicate(&self, sender: &LinkAddr, seqno: u8) -> bool {
        self.seen
            .iter()
            .find(|seen| seen.sender == *sender)
            .is_some_and(|seen| seen.seqno == seqno)
    }

    /// Remembers `seqno` as the last one of `sender` and moves the sender to
    /// the front, forgetting the least recent sender if full.
    pub fn register(&mut self, sender: LinkAddr, seqno: u8) {
        if N == 0 {
            return;
        }
        if let Some(pos) = self.seen.iter().position(|seen| seen.sender == sender) {
            self.seen.remove(pos);
        } else if self.seen.is_full() {
            self.seen.pop();
        }
        // There is room after the removal above.
        let _ = self.seen.insert(0, Seen { sender, seqno });
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}
