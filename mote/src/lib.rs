//! A cooperative kernel for constrained wireless nodes and the null radio
//! duty cycling layer on top of it.
//!
//! - [`sys`]: the system clock, passive and event timers, protothread
//!   helpers and the process scheduler.
//! - [`net`]: the radio duty cycling layer between the MAC layer and the
//!   radio driver.
//!
//! Nothing is allocated dynamically. All capacities are fixed at build time,
//! see [`const_config`].

#![no_std]

#[cfg(any(feature = "std", test))]
#[macro_use]
extern crate std;

pub mod const_config;
pub mod net;
pub mod sys;

pub use mote_driver as driver;
