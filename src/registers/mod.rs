//! Register definitions for the MRF24J40
//!
//! The MRF24J40 exposes two independent register spaces:
//!
//! - [`short`]: 6-bit addresses holding the MAC and baseband registers.
//!   The bus header is a single byte `(offset << 1) | write`.
//! - [`long`]: 10-bit addresses holding the RF, security and sleep registers
//!   as well as the TX/RX FIFOs. The bus header is two bytes carrying a
//!   space-select bit, the address, the write bit and a 4-bit trailing pad.
//!
//! Typed register values use the register id type to select the space:
//! a `u8` id lives in the short space, a `u16` id in the long space.

/// Declares a closed table of named registers for one address space.
macro_rules! register_table {
    (
        $(#[$meta:meta])*
        pub enum $name:ident: $repr:ident in $space:ident {
            $( $(#[$vmeta:meta])* $variant:ident = $offset:literal => $label:literal, )*
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        #[cfg_attr(feature = "defmt", derive(defmt::Format))]
        #[repr($repr)]
        pub enum $name {
            $( $(#[$vmeta])* $variant = $offset, )*
        }

        impl $name {
            /// Every register of the table, in address order
            pub const ALL: &'static [$name] = &[$($name::$variant,)*];

            pub const fn offset(self) -> $repr {
                self as $repr
            }

            /// Datasheet name of the register
            pub const fn name(self) -> &'static str {
                match self {
                    $( $name::$variant => $label, )*
                }
            }

            pub const fn space(self) -> $crate::registers::AddressSpace {
                $crate::registers::AddressSpace::$space
            }

            pub const fn address(self) -> $crate::registers::RegisterAddress {
                $crate::registers::RegisterAddress::$space(self as $repr)
            }

            /// Looks up the named register at `offset`, if any
            pub fn from_offset(offset: $repr) -> Option<Self> {
                Self::ALL.iter().copied().find(|register| register.offset() == offset)
            }
        }
    };
}

pub mod long;
pub mod short;

pub use long::*;
pub use short::*;

use crate::Error;

/// Register address space
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AddressSpace {
    /// 6-bit MAC/baseband space
    Short,
    /// 10-bit RF/security/FIFO space
    Long,
}

impl AddressSpace {
    /// Width of an offset in this space, in bits
    pub const fn bit_width(self) -> u8 {
        match self {
            AddressSpace::Short => 6,
            AddressSpace::Long => 10,
        }
    }

    /// Largest valid offset in this space
    pub const fn max_offset(self) -> u16 {
        (1 << self.bit_width()) - 1
    }
}

/// Direction of a register transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Access {
    Read,
    Write,
}

/// A register address tagged with its address space.
///
/// Constructing through [`RegisterAddress::short`] or [`RegisterAddress::long`]
/// guarantees the offset fits the space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RegisterAddress {
    Short(u8),
    Long(u16),
}

impl RegisterAddress {
    /// Creates a short-space address
    ///
    /// # Errors
    /// * `Error::InvalidAddress` - offset does not fit in 6 bits
    pub const fn short(offset: u8) -> Result<Self, Error> {
        if offset as u16 > AddressSpace::Short.max_offset() {
            return Err(Error::InvalidAddress {
                space: AddressSpace::Short,
                offset: offset as u16,
            });
        }
        Ok(RegisterAddress::Short(offset))
    }

    /// Creates a long-space address
    ///
    /// # Errors
    /// * `Error::InvalidAddress` - offset does not fit in 10 bits
    pub const fn long(offset: u16) -> Result<Self, Error> {
        if offset > AddressSpace::Long.max_offset() {
            return Err(Error::InvalidAddress {
                space: AddressSpace::Long,
                offset,
            });
        }
        Ok(RegisterAddress::Long(offset))
    }

    pub const fn space(self) -> AddressSpace {
        match self {
            RegisterAddress::Short(_) => AddressSpace::Short,
            RegisterAddress::Long(_) => AddressSpace::Long,
        }
    }

    pub const fn offset(self) -> u16 {
        match self {
            RegisterAddress::Short(offset) => offset as u16,
            RegisterAddress::Long(offset) => offset,
        }
    }

    /// Address of the register `count` positions further in the same space.
    ///
    /// This is the register a burst read reaches after `count` clocked bytes.
    ///
    /// # Errors
    /// * `Error::InvalidAddress` - the result leaves the address space
    pub fn offset_by(self, count: u16) -> Result<Self, Error> {
        let space = self.space();
        let offset = self
            .offset()
            .checked_add(count)
            .filter(|offset| *offset <= space.max_offset())
            .ok_or(Error::InvalidAddress {
                space,
                offset: self.offset().saturating_add(count),
            })?;

        Ok(match space {
            AddressSpace::Short => RegisterAddress::Short(offset as u8),
            AddressSpace::Long => RegisterAddress::Long(offset),
        })
    }

    /// Encodes the bus header that opens a transaction on this address
    pub const fn header(self, access: Access) -> Header {
        let write = match access {
            Access::Read => 0,
            Access::Write => 1,
        };

        match self {
            RegisterAddress::Short(offset) => Header {
                bytes: [((offset & 0x3F) << 1) | write, 0],
                len: 1,
            },
            RegisterAddress::Long(offset) => {
                let raw = ((1u16 << 11) | ((offset & 0x3FF) << 1) | write as u16) << 4;
                Header {
                    bytes: raw.to_be_bytes(),
                    len: 2,
                }
            }
        }
    }
}

/// Encoded transaction header, one byte for short addresses, two for long
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    bytes: [u8; 2],
    len: usize,
}

impl Header {
    pub fn as_slice(&self) -> &[u8] {
        &self.bytes[..self.len]
    }
}

impl AsRef<[u8]> for Header {
    fn as_ref(&self) -> &[u8] {
        self.as_slice()
    }
}

/// Maps a register id type onto its address space.
///
/// Implemented for `u8` (short space) and `u16` (long space) so that
/// [`Device::read_register`](crate::Device::read_register) can pick the
/// right header encoding from the register type alone.
pub trait RegisterId: Copy {
    fn address(self) -> Result<RegisterAddress, Error>;
}

impl RegisterId for u8 {
    fn address(self) -> Result<RegisterAddress, Error> {
        RegisterAddress::short(self)
    }
}

impl RegisterId for u16 {
    fn address(self) -> Result<RegisterAddress, Error> {
        RegisterAddress::long(self)
    }
}
