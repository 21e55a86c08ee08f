//! Build-time configuration.
//!
//! Override a constant by setting the environment variable of the same name
//! with the `MOTE_` prefix, e.g. `MOTE_PROCESS_CONF_NUMEVENTS=16`. Unit tests
//! always run with the fixed values below.

#![allow(dead_code)]
pub use customizable::*;

#[cfg(test)]
mod customizable {
    #![allow(dead_code)]

    pub const PROCESS_CONF_NUMEVENTS: usize = 8;
    pub const PROCESS_CONF_MAX_PROCESSES: usize = 8;
    pub const ETIMER_CONF_MAX_TIMERS: usize = 8;
    pub const CLOCK_CONF_SECOND: u32 = 128;
    pub const MAC_SEQUENCE_CONF_HISTORY: usize = 4;
}

#[cfg(not(test))]
mod customizable {
    #![allow(unused)]
    include!(concat!(env!("OUT_DIR"), "/config.rs"));
}

const _: () = assert!(
    PROCESS_CONF_MAX_PROCESSES >= 1 && PROCESS_CONF_MAX_PROCESSES <= 32,
    "the poll bitmap holds at most 32 processes"
);
const _: () = assert!(PROCESS_CONF_NUMEVENTS > 0);
const _: () = assert!(
    ETIMER_CONF_MAX_TIMERS <= u8::MAX as usize + 1,
    "event timer handles are 8 bits wide"
);
