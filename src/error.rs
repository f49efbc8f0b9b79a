//! Error types
//!
//! Only [`Error::Bus`] indicates that the radio may be in an unknown state.
//! Everything else is either rejected before touching the bus or is an
//! expected condition of the poll loop.

use crate::registers::AddressSpace;

/// Errors returned by register access and configuration operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// The SPI transaction did not complete.
    ///
    /// Register contents are unknown afterwards; the caller should
    /// re-run the configuration sequence (see [`Mrf24j40::recover`](crate::Mrf24j40::recover)).
    Bus,
    /// The offset does not fit the addressed space
    InvalidAddress {
        /// Address space the offset was meant for
        space: AddressSpace,
        /// Rejected offset
        offset: u16,
    },
    /// A configuration value was rejected before any bus write was issued
    Configuration(ConfigError),
    /// A register value read from the device could not be decoded
    Deserialization,
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Error::Configuration(err)
    }
}

/// Invalid configuration values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Channel is outside of the 2.4 GHz channel page (11..=26)
    ChannelOutOfRange(u8),
}

/// Returned when dequeuing from an empty record queue.
///
/// This is the normal "nothing yet" signal of the poll loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EmptyQueue;

/// Inconsistencies observed while decoding a received frame.
///
/// Records carrying an anomaly are still queued.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DecodeAnomaly {
    /// Reported length is below the 11 byte MHR + FCS overhead
    FrameTooShort(u8),
    /// Reported length exceeds the 127 byte maximum PSDU
    FrameTooLong(u8),
}
