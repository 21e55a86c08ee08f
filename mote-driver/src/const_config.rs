//! Build-time configuration.
//!
//! Every constant can be overridden by setting an environment variable with
//! the `MOTE_DRIVER_` prefix when building, e.g.
//! `MOTE_DRIVER_LINKADDR_CONF_SIZE=2`. Dependent crates see the same values,
//! so there is no separate test configuration here.

#![allow(dead_code)]

include!(concat!(env!("OUT_DIR"), "/config.rs"));

const _: () = assert!(
    LINKADDR_CONF_SIZE == 2 || LINKADDR_CONF_SIZE == 8,
    "link-layer addresses are either short (2) or extended (8) bytes"
);
