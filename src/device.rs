//! MRF24J40 register access
//!
//! This module provides the register access layer of the driver. Every
//! method issues exactly one framed SPI transaction (chip select asserted
//! for its whole duration) and supports both synchronous and asynchronous
//! operation.
//!
//! The radio has two address spaces with different header encodings:
//!
//! | Space | Header | Write bit |
//! |-------|--------|-----------|
//! | short | `(offset << 1) \| w` | bit 0 |
//! | long  | `((1 << 11) \| (offset << 1) \| w) << 4`, big endian | bit 4 |
//!
//! # Example
//! ```no_run
//! use mrf24j40::{Device, registers::{ShortRegister, RfChannel}};
//! # fn example<SPI: embedded_hal::spi::SpiDevice>(spi: SPI) -> Result<(), mrf24j40::Error> {
//! let mut device = Device::new(spi);
//!
//! // Raw access
//! let status = device.read_short(ShortRegister::IntStat.offset())?;
//!
//! // Typed access, the space is picked from the register type
//! let channel: RfChannel = device.read_register()?;
//! # Ok(())
//! # }
//! ```

use core::convert::Infallible;

use embedded_hal::spi::Operation;
use regiface::{FromByteArray, ReadableRegister, ToByteArray, WritableRegister};

use crate::registers::{Access, RegisterAddress, RegisterId};
use crate::Error;

/// Register level interface to the MRF24J40.
///
/// This struct wraps an SPI device and provides short/long register reads
/// and writes, RX FIFO burst reads and typed register access.
pub struct Device<SPI> {
    spi: SPI,
}

impl<SPI> Device<SPI> {
    /// Creates a new Device instance wrapping the provided SPI device.
    ///
    /// The SPI device must be configured for mode 0, MSB first, at up to
    /// 10 MHz.
    pub fn new(spi: SPI) -> Self {
        Self { spi }
    }

    /// Releases the underlying SPI device.
    pub fn release(self) -> SPI {
        self.spi
    }
}

impl<SPI> Device<SPI>
where
    SPI: embedded_hal::spi::SpiDevice,
{
    /// Writes one byte to a short-space register.
    ///
    /// # Errors
    /// * `Error::InvalidAddress` - offset wider than 6 bits
    /// * `Error::Bus` - SPI communication failed
    pub fn write_short(&mut self, offset: u8, value: u8) -> Result<(), Error> {
        self.write(RegisterAddress::short(offset)?, value)
    }

    /// Reads one byte from a short-space register.
    ///
    /// # Errors
    /// * `Error::InvalidAddress` - offset wider than 6 bits
    /// * `Error::Bus` - SPI communication failed
    pub fn read_short(&mut self, offset: u8) -> Result<u8, Error> {
        self.read(RegisterAddress::short(offset)?)
    }

    /// Writes one byte to a long-space register.
    ///
    /// # Errors
    /// * `Error::InvalidAddress` - address wider than 10 bits
    /// * `Error::Bus` - SPI communication failed
    pub fn write_long(&mut self, address: u16, value: u8) -> Result<(), Error> {
        self.write(RegisterAddress::long(address)?, value)
    }

    /// Reads one byte from a long-space register.
    ///
    /// # Errors
    /// * `Error::InvalidAddress` - address wider than 10 bits
    /// * `Error::Bus` - SPI communication failed
    pub fn read_long(&mut self, address: u16) -> Result<u8, Error> {
        self.read(RegisterAddress::long(address)?)
    }

    /// Reads `bytes.len()` consecutive long-space bytes starting at `address`.
    ///
    /// The address is sent once; the radio advances its address pointer for
    /// every clocked byte, so `bytes[i]` holds the contents of `address + i`.
    ///
    /// # Errors
    /// * `Error::InvalidAddress` - the burst would run past the end of the space
    /// * `Error::Bus` - SPI communication failed
    pub fn read_long_bytes(&mut self, address: u16, bytes: &mut [u8]) -> Result<(), Error> {
        let start = burst_start(address, bytes.len())?;
        let header = start.header(Access::Read);

        self.spi
            .transaction(&mut [
                Operation::Write(header.as_slice()),
                Operation::Read(bytes),
            ])
            .map_err(|_| Error::Bus)
    }

    /// Writes one byte to a register in either space.
    ///
    /// # Errors
    /// * `Error::Bus` - SPI communication failed
    pub fn write(&mut self, address: RegisterAddress, value: u8) -> Result<(), Error> {
        trace!("write {} <- {}", address.offset(), value);
        let header = address.header(Access::Write);

        self.spi
            .transaction(&mut [
                Operation::Write(header.as_slice()),
                Operation::Write(&[value]),
            ])
            .map_err(|_| Error::Bus)
    }

    /// Reads one byte from a register in either space.
    ///
    /// # Errors
    /// * `Error::Bus` - SPI communication failed
    pub fn read(&mut self, address: RegisterAddress) -> Result<u8, Error> {
        let header = address.header(Access::Read);
        let mut value = [0u8];

        self.spi
            .transaction(&mut [
                Operation::Write(header.as_slice()),
                Operation::Read(&mut value),
            ])
            .map_err(|_| Error::Bus)?;

        Ok(value[0])
    }

    /// Reads a register value from the device.
    ///
    /// # Type Parameters
    /// * `R` - Single byte register; a `u8` id selects the short space,
    ///   a `u16` id the long space
    ///
    /// # Errors
    /// * `Error::Bus` - SPI communication failed
    /// * `Error::Deserialization` - Failed to parse register value
    pub fn read_register<R>(&mut self) -> Result<R, Error>
    where
        R: ReadableRegister + FromByteArray<Array = [u8; 1]>,
        R::IdType: RegisterId,
    {
        let value = self.read(R::id().address()?)?;
        R::from_bytes([value]).map_err(|_| Error::Deserialization)
    }

    /// Writes a value to a device register.
    ///
    /// # Errors
    /// * `Error::Bus` - SPI communication failed
    pub fn write_register<R>(&mut self, register: R) -> Result<(), Error>
    where
        R: WritableRegister + ToByteArray<Array = [u8; 1], Error = Infallible>,
        R::IdType: RegisterId,
    {
        let address = R::id().address()?;
        let Ok([value]) = register.to_bytes();
        self.write(address, value)
    }
}

impl<SPI> Device<SPI>
where
    SPI: embedded_hal_async::spi::SpiDevice,
{
    /// Asynchronously writes one byte to a short-space register.
    ///
    /// This is the async version of [`write_short`](Device::write_short).
    pub async fn write_short_async(&mut self, offset: u8, value: u8) -> Result<(), Error> {
        self.write_async(RegisterAddress::short(offset)?, value).await
    }

    /// Asynchronously reads one byte from a short-space register.
    ///
    /// This is the async version of [`read_short`](Device::read_short).
    pub async fn read_short_async(&mut self, offset: u8) -> Result<u8, Error> {
        self.read_async(RegisterAddress::short(offset)?).await
    }

    /// Asynchronously writes one byte to a long-space register.
    ///
    /// This is the async version of [`write_long`](Device::write_long).
    pub async fn write_long_async(&mut self, address: u16, value: u8) -> Result<(), Error> {
        self.write_async(RegisterAddress::long(address)?, value).await
    }

    /// Asynchronously reads one byte from a long-space register.
    ///
    /// This is the async version of [`read_long`](Device::read_long).
    pub async fn read_long_async(&mut self, address: u16) -> Result<u8, Error> {
        self.read_async(RegisterAddress::long(address)?).await
    }

    /// Asynchronously burst-reads consecutive long-space bytes.
    ///
    /// This is the async version of [`read_long_bytes`](Device::read_long_bytes).
    pub async fn read_long_bytes_async(
        &mut self,
        address: u16,
        bytes: &mut [u8],
    ) -> Result<(), Error> {
        let start = burst_start(address, bytes.len())?;
        let header = start.header(Access::Read);

        self.spi
            .transaction(&mut [
                embedded_hal_async::spi::Operation::Write(header.as_slice()),
                embedded_hal_async::spi::Operation::Read(bytes),
            ])
            .await
            .map_err(|_| Error::Bus)
    }

    /// Asynchronously writes one byte to a register in either space.
    ///
    /// This is the async version of [`write`](Device::write).
    pub async fn write_async(&mut self, address: RegisterAddress, value: u8) -> Result<(), Error> {
        trace!("write {} <- {}", address.offset(), value);
        let header = address.header(Access::Write);

        self.spi
            .transaction(&mut [
                embedded_hal_async::spi::Operation::Write(header.as_slice()),
                embedded_hal_async::spi::Operation::Write(&[value]),
            ])
            .await
            .map_err(|_| Error::Bus)
    }

    /// Asynchronously reads one byte from a register in either space.
    ///
    /// This is the async version of [`read`](Device::read).
    pub async fn read_async(&mut self, address: RegisterAddress) -> Result<u8, Error> {
        let header = address.header(Access::Read);
        let mut value = [0u8];

        self.spi
            .transaction(&mut [
                embedded_hal_async::spi::Operation::Write(header.as_slice()),
                embedded_hal_async::spi::Operation::Read(&mut value),
            ])
            .await
            .map_err(|_| Error::Bus)?;

        Ok(value[0])
    }

    /// Asynchronously reads a register value from the device.
    ///
    /// This is the async version of [`read_register`](Device::read_register).
    pub async fn read_register_async<R>(&mut self) -> Result<R, Error>
    where
        R: ReadableRegister + FromByteArray<Array = [u8; 1]>,
        R::IdType: RegisterId,
    {
        let value = self.read_async(R::id().address()?).await?;
        R::from_bytes([value]).map_err(|_| Error::Deserialization)
    }

    /// Asynchronously writes a value to a device register.
    ///
    /// This is the async version of [`write_register`](Device::write_register).
    pub async fn write_register_async<R>(&mut self, register: R) -> Result<(), Error>
    where
        R: WritableRegister + ToByteArray<Array = [u8; 1], Error = Infallible>,
        R::IdType: RegisterId,
    {
        let address = R::id().address()?;
        let Ok([value]) = register.to_bytes();
        self.write_async(address, value).await
    }
}

/// Validates that a burst of `len` bytes from `address` stays in the long space
fn burst_start(address: u16, len: usize) -> Result<RegisterAddress, Error> {
    let start = RegisterAddress::long(address)?;
    if len > 1 {
        let last = u16::try_from(len - 1).map_err(|_| Error::InvalidAddress {
            space: start.space(),
            offset: u16::MAX,
        })?;
        start.offset_by(last)?;
    }
    Ok(start)
}
