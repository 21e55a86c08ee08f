//! Link-layer addresses.

use crate::const_config::LINKADDR_CONF_SIZE;

/// Length of a link-layer address in bytes.
pub const LINKADDR_SIZE: usize = LINKADDR_CONF_SIZE;

/// A link-layer address.
///
/// The all-zero address doubles as the broadcast address: a packet whose
/// receiver is [`LinkAddr::NULL`] goes to everybody.
#[cfg_attr(feature = "fuzz", derive(arbitrary::Arbitrary))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct LinkAddr([u8; LINKADDR_SIZE]);

impl LinkAddr {
    pub const NULL: Self = Self([0; LINKADDR_SIZE]);

    pub const fn new(bytes: [u8; LINKADDR_SIZE]) -> Self {
        Self(bytes)
    }

    /// Builds an address from a slice of exactly [`LINKADDR_SIZE`] bytes.
    pub fn from_slice(bytes: &[u8]) -> Option<Self> {
        bytes.try_into().ok().map(Self)
    }

    pub const fn as_bytes(&self) -> &[u8; LINKADDR_SIZE] {
        &self.0
    }

    pub fn is_null(&self) -> bool {
        *self == Self::NULL
    }

    /// Whether a frame sent to this address is meant for every node.
    pub fn is_broadcast(&self) -> bool {
        self.is_null() || self.0.iter().all(|b| *b == 0xff)
    }
}

impl AsRef<[u8]> for LinkAddr {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for LinkAddr {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "{=[u8]:x}", &self.0[..])
    }
}
