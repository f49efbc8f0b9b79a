//! Long address space registers
//!
//! RF, sleep and security registers plus the TX/RX FIFOs. Burst reads in
//! this space auto-increment the address pointer, which is how frames are
//! pulled out of the RX FIFO.

use core::convert::Infallible;

use regiface::{register, FromByteArray, ReadableRegister, ToByteArray, WritableRegister};

/// TX normal FIFO (128 bytes)
pub const TX_NORMAL_FIFO: u16 = 0x000;
/// TX beacon FIFO (128 bytes)
pub const TX_BEACON_FIFO: u16 = 0x080;
/// TX GTS1 FIFO (128 bytes)
pub const TX_GTS1_FIFO: u16 = 0x100;
/// TX GTS2 FIFO (128 bytes)
pub const TX_GTS2_FIFO: u16 = 0x180;
/// Security key FIFO (64 bytes)
pub const SECURITY_KEY_FIFO: u16 = 0x280;
/// RX FIFO (144 bytes)
///
/// # FIFO Layout
/// - `0x300`: frame length `m + n + 2` (header, payload, FCS)
/// - `0x301..`: the frame, including the FCS
/// - then one LQI byte and one RSSI byte
pub const RX_FIFO: u16 = 0x300;

register_table! {
    /// Named registers of the long address space
    pub enum LongRegister: u16 in Long {
        RfCon0 = 0x200 => "RFCON0",
        RfCon1 = 0x201 => "RFCON1",
        RfCon2 = 0x202 => "RFCON2",
        RfCon3 = 0x203 => "RFCON3",
        RfCon5 = 0x205 => "RFCON5",
        RfCon6 = 0x206 => "RFCON6",
        RfCon7 = 0x207 => "RFCON7",
        RfCon8 = 0x208 => "RFCON8",
        SlpCal0 = 0x209 => "SLPCAL0",
        SlpCal1 = 0x20A => "SLPCAL1",
        SlpCal2 = 0x20B => "SLPCAL2",
        Rssi = 0x210 => "RSSI",
        SlpCon0 = 0x211 => "SLPCON0",
        SlpCon1 = 0x220 => "SLPCON1",
        WakeTimeL = 0x222 => "WAKETIMEL",
        WakeTimeH = 0x223 => "WAKETIMEH",
        RemCntL = 0x224 => "REMCNTL",
        RemCntH = 0x225 => "REMCNTH",
        MainCnt0 = 0x226 => "MAINCNT0",
        MainCnt1 = 0x227 => "MAINCNT1",
        MainCnt2 = 0x228 => "MAINCNT2",
        MainCnt3 = 0x229 => "MAINCNT3",
        TestMode = 0x22F => "TESTMODE",
        AssoEAdr0 = 0x230 => "ASSOEADR0",
        AssoEAdr1 = 0x231 => "ASSOEADR1",
        AssoEAdr2 = 0x232 => "ASSOEADR2",
        AssoEAdr3 = 0x233 => "ASSOEADR3",
        AssoEAdr4 = 0x234 => "ASSOEADR4",
        AssoEAdr5 = 0x235 => "ASSOEADR5",
        AssoEAdr6 = 0x236 => "ASSOEADR6",
        AssoEAdr7 = 0x237 => "ASSOEADR7",
        AssoSAdr0 = 0x238 => "ASSOSADR0",
        AssoSAdr1 = 0x239 => "ASSOSADR1",
        UpNonce0 = 0x240 => "UPNONCE0",
        UpNonce1 = 0x241 => "UPNONCE1",
        UpNonce2 = 0x242 => "UPNONCE2",
        UpNonce3 = 0x243 => "UPNONCE3",
        UpNonce4 = 0x244 => "UPNONCE4",
        UpNonce5 = 0x245 => "UPNONCE5",
        UpNonce6 = 0x246 => "UPNONCE6",
        UpNonce7 = 0x247 => "UPNONCE7",
        UpNonce8 = 0x248 => "UPNONCE8",
        UpNonce9 = 0x249 => "UPNONCE9",
        UpNonce10 = 0x24A => "UPNONCE10",
        UpNonce11 = 0x24B => "UPNONCE11",
        UpNonce12 = 0x24C => "UPNONCE12",
    }
}

/// RF control 0 register (address: 0x200)
///
/// Selects the operating channel.
///
/// # Register Format
/// - Bits 7:4: CHANNEL, `channel - 11`
/// - Bits 3:0: RFOPT, RF optimize control, must be 0x3
#[register(0x200u16)]
#[derive(Debug, Clone, Copy, PartialEq, ReadableRegister, WritableRegister)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RfChannel {
    /// Channel index relative to channel 11 (4 bits)
    pub index: u8,
    /// RF optimize control (4 bits)
    pub rf_optimize: u8,
}

impl RfChannel {
    pub const RF_OPTIMIZE: u8 = 0x03;

    pub const fn to_byte(self) -> u8 {
        ((self.index & 0x0F) << 4) | (self.rf_optimize & 0x0F)
    }
}

/// RF control 1 register (address: 0x201)
#[register(0x201u16)]
#[derive(Debug, Clone, Copy, PartialEq, ReadableRegister, WritableRegister)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RfControl1 {
    /// VCOOPT: VCO optimize control
    pub vco_optimize: u8,
}

impl RfControl1 {
    pub const fn to_byte(self) -> u8 {
        self.vco_optimize
    }
}

impl Default for RfControl1 {
    fn default() -> Self {
        Self { vco_optimize: 0x01 }
    }
}

/// RF control 2 register (address: 0x202)
#[register(0x202u16)]
#[derive(Debug, Clone, Copy, PartialEq, ReadableRegister, WritableRegister, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RfControl2 {
    /// PLLEN: enable the PLL. The radio cannot lock to a channel without it.
    pub pll_enable: bool,
}

impl RfControl2 {
    pub const fn to_byte(self) -> u8 {
        (self.pll_enable as u8) << 7
    }
}

/// RF control 6 register (address: 0x206)
#[register(0x206u16)]
#[derive(Debug, Clone, Copy, PartialEq, ReadableRegister, WritableRegister, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RfControl6 {
    /// TXFIL: TX filter control
    pub tx_filter: bool,
    /// 20MRECVR: fast recovery from sleep
    pub fast_recovery: bool,
}

impl RfControl6 {
    pub const fn to_byte(self) -> u8 {
        ((self.tx_filter as u8) << 7) | ((self.fast_recovery as u8) << 4)
    }
}

/// Sleep clock source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SleepClock {
    /// 32 kHz external crystal
    External32kHz,
    /// 100 kHz internal oscillator
    Internal100kHz,
}

/// Error type for invalid sleep clock selections
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InvalidSleepClock(pub u8);

impl SleepClock {
    pub fn from_bits(value: u8) -> Result<Self, InvalidSleepClock> {
        match value {
            0b01 => Ok(Self::External32kHz),
            0b10 => Ok(Self::Internal100kHz),
            invalid => Err(InvalidSleepClock(invalid)),
        }
    }

    pub const fn to_bits(self) -> u8 {
        match self {
            Self::External32kHz => 0b01,
            Self::Internal100kHz => 0b10,
        }
    }
}

/// RF control 7 register (address: 0x207)
#[register(0x207u16)]
#[derive(Debug, Clone, Copy, PartialEq, ReadableRegister, WritableRegister)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RfControl7 {
    /// SLPCLKSEL (bits 7:6)
    pub sleep_clock: SleepClock,
}

impl RfControl7 {
    pub const fn to_byte(self) -> u8 {
        self.sleep_clock.to_bits() << 6
    }
}

/// RF control 8 register (address: 0x208)
#[register(0x208u16)]
#[derive(Debug, Clone, Copy, PartialEq, ReadableRegister, WritableRegister, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RfControl8 {
    /// RFVCO: VCO control, recommended set
    pub rf_vco: bool,
}

impl RfControl8 {
    pub const fn to_byte(self) -> u8 {
        (self.rf_vco as u8) << 4
    }
}

/// Sleep clock control 1 register (address: 0x220)
#[register(0x220u16)]
#[derive(Debug, Clone, Copy, PartialEq, ReadableRegister, WritableRegister)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SleepControl1 {
    /// CLKOUTEN, active low: `true` disables the CLKOUT pin
    pub clock_out_disabled: bool,
    /// SLPCLKDIV: sleep clock divisor, `2^n` (5 bits)
    pub sleep_clock_divisor: u8,
}

impl SleepControl1 {
    pub const fn to_byte(self) -> u8 {
        ((self.clock_out_disabled as u8) << 5) | (self.sleep_clock_divisor & 0x1F)
    }
}

impl FromByteArray for RfChannel {
    type Error = Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self {
            index: bytes[0] >> 4,
            rf_optimize: bytes[0] & 0x0F,
        })
    }
}

impl ToByteArray for RfChannel {
    type Error = Infallible;
    type Array = [u8; 1];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([self.to_byte()])
    }
}

impl FromByteArray for RfControl1 {
    type Error = Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self {
            vco_optimize: bytes[0],
        })
    }
}

impl ToByteArray for RfControl1 {
    type Error = Infallible;
    type Array = [u8; 1];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([self.to_byte()])
    }
}

impl FromByteArray for RfControl2 {
    type Error = Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self {
            pll_enable: bytes[0] & 0x80 != 0,
        })
    }
}

impl ToByteArray for RfControl2 {
    type Error = Infallible;
    type Array = [u8; 1];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([self.to_byte()])
    }
}

impl FromByteArray for RfControl6 {
    type Error = Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self {
            tx_filter: bytes[0] & 0x80 != 0,
            fast_recovery: bytes[0] & 0x10 != 0,
        })
    }
}

impl ToByteArray for RfControl6 {
    type Error = Infallible;
    type Array = [u8; 1];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([self.to_byte()])
    }
}

impl FromByteArray for RfControl7 {
    type Error = InvalidSleepClock;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self {
            sleep_clock: SleepClock::from_bits(bytes[0] >> 6)?,
        })
    }
}

impl ToByteArray for RfControl7 {
    type Error = Infallible;
    type Array = [u8; 1];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([self.to_byte()])
    }
}

impl FromByteArray for RfControl8 {
    type Error = Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self {
            rf_vco: bytes[0] & 0x10 != 0,
        })
    }
}

impl ToByteArray for RfControl8 {
    type Error = Infallible;
    type Array = [u8; 1];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([self.to_byte()])
    }
}

impl FromByteArray for SleepControl1 {
    type Error = Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self {
            clock_out_disabled: bytes[0] & 0x20 != 0,
            sleep_clock_divisor: bytes[0] & 0x1F,
        })
    }
}

impl ToByteArray for SleepControl1 {
    type Error = Infallible;
    type Array = [u8; 1];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([self.to_byte()])
    }
}
