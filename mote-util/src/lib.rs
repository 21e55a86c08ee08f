//! Generic utilities the mote crates depend upon but which are not related to
//! scheduling or radio duty cycling.
//!
//! For now this is the logger-backend agnostic logging facade and a generic
//! error type.

#![cfg_attr(not(feature = "std"), no_std)]

pub mod log;

#[cfg(any(feature = "defmt", feature = "log"))]
pub use log::*;

/// A generic error.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Error;

/// A type alias for `Result<T, mote_util::Error>`.
pub type Result<T> = core::result::Result<T, Error>;
