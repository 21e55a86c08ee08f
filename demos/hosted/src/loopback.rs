//! A radio that hears its own transmissions, and the host clocks the demo
//! runs on.

use std::{collections::VecDeque, time::Instant};

use mote::{
    driver::{
        radio::{RadioDriver, TxStatus},
        rtimer::{Rtimer, RtimerClock, RTIMER_SECOND},
    },
    sys::{ProcessId, Signals},
};

pub struct LoopbackRadio {
    signals: &'static Signals,
    rx_process: Option<ProcessId>,
    is_on: bool,
    tx: Vec<u8>,
    rx: VecDeque<Vec<u8>>,
}

impl LoopbackRadio {
    pub fn new(signals: &'static Signals) -> Self {
        Self {
            signals,
            rx_process: None,
            is_on: false,
            tx: Vec::new(),
            rx: VecDeque::new(),
        }
    }

    /// Sets the process polled whenever a frame arrives.
    pub fn set_rx_process(&mut self, id: ProcessId) {
        self.rx_process = Some(id);
    }

    // Stands in for the receive interrupt.
    fn rx_interrupt(&mut self, frame: &[u8]) {
        self.rx.push_back(frame.to_vec());
        if let Some(id) = self.rx_process {
            self.signals.poll(id);
        }
    }
}

impl RadioDriver for LoopbackRadio {
    fn init(&mut self) -> bool {
        true
    }

    fn prepare(&mut self, payload: &[u8]) -> TxStatus {
        self.tx.clear();
        self.tx.extend_from_slice(payload);
        TxStatus::Ok
    }

    fn transmit(&mut self, len: usize) -> TxStatus {
        if !self.is_on {
            return TxStatus::Err;
        }
        let Some(frame) = self.tx.get(..len) else {
            return TxStatus::ErrFatal;
        };
        let frame = frame.to_vec();
        self.rx_interrupt(&frame);
        TxStatus::Ok
    }

    fn send(&mut self, payload: &[u8]) -> TxStatus {
        self.prepare(payload);
        self.transmit(payload.len())
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
        true
    }

    fn receiving_packet(&mut self) -> bool {
        false
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

/// Radio timer backed by the host's monotonic clock.
pub struct HostRtimer {
    epoch: Instant,
}

impl HostRtimer {
    pub fn new() -> Self {
        Self {
            epoch: Instant::now(),
        }
    }
}

impl Rtimer for HostRtimer {
    fn now(&self) -> RtimerClock {
        let nanos = self.epoch.elapsed().as_nanos();
        (nanos * RTIMER_SECOND as u128 / 1_000_000_000) as RtimerClock
    }
}
