//! This crate provides everything the radio duty cycling layer consumes from
//! below:
//! - the generic radio driver interface and its transmission status codes,
//! - the high-resolution real-time clock ("rtimer") and watchdog interfaces,
//! - link-layer addresses, the shared packet buffer and queued packet
//!   buffers,
//! - the framer interface and the fixed IEEE 802.15.4 ACK layout.

#![cfg_attr(not(feature = "std"), no_std)]

pub mod const_config;
pub mod frame;
pub mod radio;
pub mod rtimer;
pub mod watchdog;
