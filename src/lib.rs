#![no_std]
//! MRF24J40 Radio Driver
//!
//! This crate provides a type-safe interface for the Microchip MRF24J40
//! IEEE 802.15.4 2.4 GHz transceiver, together with a capture pipeline that
//! turns the radio into a live packet sniffer.
//!
//! # Features
//! - Short (6-bit) and long (10-bit) register spaces with their distinct
//!   SPI header encodings
//! - Burst reads of the RX FIFO using the radio's address auto-increment
//! - Configuration sequence for non-beacon operation, channels 11-26
//! - Interrupt status decoding into receive and transmit records
//! - Capture records for Wireshark (`LINKTYPE_IEEE802_15_4_WITHFCS`)
//! - Blocking (`embedded-hal`) and async (`embedded-hal-async`) SPI
//!
//! # Architecture
//! The driver is organized into several modules:
//!
//! - [`device`]: Register access layer
//!   - One SPI transaction per register read, write or burst
//!   - Typed register access through `regiface`
//!
//! - [`registers`]: Register definitions
//!   - [`registers::short`]: MAC, interrupt and baseband registers
//!   - [`registers::long`]: RF, sleep and FIFO registers
//!
//! - [`radio`]: Driver state
//!   - Configuration sequence and mutators
//!   - Interrupt polling and record queues
//!
//! - [`events`]: Receive and transmit records
//!
//! - [`capture`]: Forwarding of received frames to a capture sink
//!
//! # Usage
//! The radio is not interrupt driven: the host calls [`Mrf24j40::poll`] at
//! its own cadence and drains the queued records.
//!
//! 1. Create a [`Mrf24j40`] with your SPI device
//! 2. Call [`Mrf24j40::initialize`] with the operating channel
//! 3. Set PAN identifier, short address and filtering mode
//! 4. Poll, then take receive/transmit records
//! 5. On [`Error::Bus`], call [`Mrf24j40::recover`]
//!
//! # Example
//! ```no_run
//! use embedded_hal::spi::SpiDevice;
//! use mrf24j40::{Error, Mrf24j40, RxBuffering};
//!
//! fn configure_radio<SPI: SpiDevice>(spi: SPI) -> Result<Mrf24j40<SPI>, Error> {
//!     let mut radio = Mrf24j40::new(spi).with_buffering(RxBuffering::RAW_FRAME);
//!
//!     radio.initialize(12)?;
//!     radio.set_pan(0xCAFE)?;
//!     radio.set_short_address(0x0100)?;
//!     radio.set_promiscuous(true)?;
//!
//!     Ok(radio)
//! }
//! ```

#[cfg(feature = "std")]
extern crate std;

#[macro_use]
mod fmt;

pub mod capture;
pub mod device;
pub mod error;
pub mod events;
pub mod radio;
pub mod registers;

pub use capture::{CaptureError, CapturePipeline, CaptureSink, LinkType};
#[cfg(feature = "std")]
pub use capture::PcapWriter;
pub use device::Device;
pub use error::{ConfigError, DecodeAnomaly, EmptyQueue, Error};
pub use events::{ReceiveRecord, RxBuffering, TransmitRecord};
pub use radio::{Channel, Mrf24j40};
