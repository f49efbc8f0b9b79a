//! Short address space registers
//!
//! MAC control, addressing, interrupt and baseband registers. Every register
//! in this space is a single byte at a 6-bit offset.

use core::convert::Infallible;

use bitflags::bitflags;
use regiface::{register, FromByteArray, ReadableRegister, ToByteArray, WritableRegister};

register_table! {
    /// Named registers of the short address space
    pub enum ShortRegister: u8 in Short {
        RxMcr = 0x00 => "RXMCR",
        PanIdL = 0x01 => "PANIDL",
        PanIdH = 0x02 => "PANIDH",
        SAdrL = 0x03 => "SADRL",
        SAdrH = 0x04 => "SADRH",
        EAdr0 = 0x05 => "EADR0",
        EAdr1 = 0x06 => "EADR1",
        EAdr2 = 0x07 => "EADR2",
        EAdr3 = 0x08 => "EADR3",
        EAdr4 = 0x09 => "EADR4",
        EAdr5 = 0x0A => "EADR5",
        EAdr6 = 0x0B => "EADR6",
        EAdr7 = 0x0C => "EADR7",
        RxFlush = 0x0D => "RXFLUSH",
        Order = 0x10 => "ORDER",
        TxMcr = 0x11 => "TXMCR",
        AckTmout = 0x12 => "ACKTMOUT",
        ESlotG1 = 0x13 => "ESLOTG1",
        SymTickL = 0x14 => "SYMTICKL",
        SymTickH = 0x15 => "SYMTICKH",
        PaCon0 = 0x16 => "PACON0",
        PaCon1 = 0x17 => "PACON1",
        PaCon2 = 0x18 => "PACON2",
        TxBCon0 = 0x1A => "TXBCON0",
        TxNCon = 0x1B => "TXNCON",
        TxG1Con = 0x1C => "TXG1CON",
        TxG2Con = 0x1D => "TXG2CON",
        ESlotG23 = 0x1E => "ESLOTG23",
        ESlotG45 = 0x1F => "ESLOTG45",
        ESlotG67 = 0x20 => "ESLOTG67",
        TxPend = 0x21 => "TXPEND",
        WakeCon = 0x22 => "WAKECON",
        FrmOffset = 0x23 => "FRMOFFSET",
        TxStat = 0x24 => "TXSTAT",
        TxBCon1 = 0x25 => "TXBCON1",
        GateClk = 0x26 => "GATECLK",
        TxTime = 0x27 => "TXTIME",
        HSymTmrL = 0x28 => "HSYMTMRL",
        HSymTmrH = 0x29 => "HSYMTMRH",
        SoftRst = 0x2A => "SOFTRST",
        SecCon0 = 0x2C => "SECCON0",
        SecCon1 = 0x2D => "SECCON1",
        TxStbl = 0x2E => "TXSTBL",
        RxSr = 0x30 => "RXSR",
        IntStat = 0x31 => "INTSTAT",
        IntCon = 0x32 => "INTCON",
        Gpio = 0x33 => "GPIO",
        TrisGpio = 0x34 => "TRISGPIO",
        SlpAck = 0x35 => "SLPACK",
        RfCtl = 0x36 => "RFCTL",
        SecCr2 = 0x37 => "SECCR2",
        BbReg0 = 0x38 => "BBREG0",
        BbReg1 = 0x39 => "BBREG1",
        BbReg2 = 0x3A => "BBREG2",
        BbReg3 = 0x3B => "BBREG3",
        BbReg4 = 0x3C => "BBREG4",
        BbReg6 = 0x3E => "BBREG6",
        CcaEdTh = 0x3F => "CCAEDTH",
    }
}

/// Receive MAC control register (address: 0x00)
///
/// Only the filtering bits used by the driver are modelled; writing this
/// register clears the remaining bits.
#[register(0x00u8)]
#[derive(Debug, Clone, Copy, PartialEq, ReadableRegister, WritableRegister, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ReceiveMacControl {
    /// PROMI: accept all frames with a valid CRC regardless of addressing
    pub promiscuous: bool,
    /// ERRPKT: accept frames with an invalid CRC as well
    pub accept_errors: bool,
}

impl ReceiveMacControl {
    pub const fn to_byte(self) -> u8 {
        (self.promiscuous as u8) | ((self.accept_errors as u8) << 1)
    }
}

/// PAN identifier low byte (address: 0x01)
#[register(0x01u8)]
#[derive(Debug, Clone, Copy, PartialEq, ReadableRegister, WritableRegister, Default)]
pub struct PanIdLow {
    pub value: u8,
}

/// PAN identifier high byte (address: 0x02)
#[register(0x02u8)]
#[derive(Debug, Clone, Copy, PartialEq, ReadableRegister, WritableRegister, Default)]
pub struct PanIdHigh {
    pub value: u8,
}

/// Short address low byte (address: 0x03)
#[register(0x03u8)]
#[derive(Debug, Clone, Copy, PartialEq, ReadableRegister, WritableRegister, Default)]
pub struct ShortAddressLow {
    pub value: u8,
}

/// Short address high byte (address: 0x04)
#[register(0x04u8)]
#[derive(Debug, Clone, Copy, PartialEq, ReadableRegister, WritableRegister, Default)]
pub struct ShortAddressHigh {
    pub value: u8,
}

/// Power amplifier control 2 register (address: 0x18)
///
/// # Important Notes
/// - FIFOEN must stay set, the datasheet requires it for normal operation
/// - The driver programs TXONTS = 6 symbols during initialization
#[register(0x18u8)]
#[derive(Debug, Clone, Copy, PartialEq, ReadableRegister, WritableRegister)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PaControl2 {
    /// FIFOEN: TX/RX FIFO output enable
    pub fifo_enable: bool,
    /// TXONTS: transmitter enable on time before the beginning of a packet,
    /// in symbol periods (4 bits)
    pub tx_on_time: u8,
}

impl PaControl2 {
    pub const fn to_byte(self) -> u8 {
        ((self.fifo_enable as u8) << 7) | ((self.tx_on_time & 0x0F) << 2)
    }
}

impl Default for PaControl2 {
    fn default() -> Self {
        Self {
            fifo_enable: true,
            tx_on_time: 0x06,
        }
    }
}

bitflags! {
    /// Error bits of the TX status register
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct TxErrors: u8 {
        /// TXNSTAT: normal FIFO transmission failed
        const NORMAL_FAILED = 1 << 0;
        /// TXG1STAT: GTS1 FIFO transmission failed
        const GTS1_FAILED = 1 << 1;
        /// TXG2STAT: GTS2 FIFO transmission failed
        const GTS2_FAILED = 1 << 2;
        /// TXG1FNT: GTS1 FIFO not transmitted (slot too short)
        const GTS1_NOT_SENT = 1 << 3;
        /// TXG2FNT: GTS2 FIFO not transmitted (slot too short)
        const GTS2_NOT_SENT = 1 << 4;
    }
}

/// TX status register (address: 0x24), read only
///
/// # Register Format
/// - Bits 7:6: TXNRETRY, retries of the most recent normal transmission
/// - Bit 5: CCAFAIL, channel was busy during clear channel assessment
/// - Bits 4:0: error bits, see [`TxErrors`]
#[register(0x24u8)]
#[derive(Debug, Clone, Copy, PartialEq, ReadableRegister)]
pub struct TxStatus {
    /// Retry count (0-3)
    pub retries: u8,
    /// Clear channel assessment failed
    pub cca_failure: bool,
    /// Failure bits of the last transmission
    pub errors: TxErrors,
}

impl TxStatus {
    pub const CCA_FAILURE: u8 = 1 << 5;

    pub fn from_byte(value: u8) -> Self {
        Self {
            retries: value >> 6,
            cca_failure: value & Self::CCA_FAILURE != 0,
            errors: TxErrors::from_bits_retain(value & 0x1F),
        }
    }

    /// No error bit is set in the low five bits
    pub fn succeeded(&self) -> bool {
        self.errors.is_empty()
    }
}

/// TX stabilization register (address: 0x2E)
#[register(0x2Eu8)]
#[derive(Debug, Clone, Copy, PartialEq, ReadableRegister, WritableRegister)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TxStabilization {
    /// RFSTBL: VCO stabilization period (4 bits), recommended 0x9
    pub rf_stabilization: u8,
    /// MSIFS: minimum SIFS period in symbols (4 bits)
    pub min_sifs: u8,
}

impl TxStabilization {
    pub const fn to_byte(self) -> u8 {
        ((self.rf_stabilization & 0x0F) << 4) | (self.min_sifs & 0x0F)
    }
}

impl Default for TxStabilization {
    fn default() -> Self {
        Self {
            rf_stabilization: 0x09,
            min_sifs: 0x05,
        }
    }
}

bitflags! {
    /// Interrupt sources reported by INTSTAT
    ///
    /// INTSTAT is cleared by reading it.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Interrupts: u8 {
        /// TXNIF: normal FIFO transmission finished
        const TX_NORMAL = 1 << 0;
        /// TXG1IF: GTS1 FIFO transmission finished
        const TX_GTS1 = 1 << 1;
        /// TXG2IF: GTS2 FIFO transmission finished
        const TX_GTS2 = 1 << 2;
        /// RXIF: a frame was received into the RX FIFO
        const RX = 1 << 3;
        /// SECIF: security key request
        const SECURITY = 1 << 4;
        /// HSYMTMRIF: half symbol timer expired
        const HALF_SYMBOL_TIMER = 1 << 5;
        /// WAKEIF: wake-up alert
        const WAKE = 1 << 6;
        /// SLPIF: sleep alert
        const SLEEP = 1 << 7;
    }
}

/// Interrupt status register (address: 0x31), read only, clear on read
#[register(0x31u8)]
#[derive(Debug, Clone, Copy, PartialEq, ReadableRegister)]
pub struct InterruptStatus {
    pub flags: Interrupts,
}

/// RF mode control register (address: 0x36)
#[register(0x36u8)]
#[derive(Debug, Clone, Copy, PartialEq, ReadableRegister, WritableRegister, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RfControl {
    /// RFRST: hold the RF state machine in reset
    ///
    /// The reset is performed by writing `true` followed by `false`.
    pub reset: bool,
}

impl RfControl {
    pub const fn to_byte(self) -> u8 {
        (self.reset as u8) << 2
    }
}

/// Baseband control 1 register (address: 0x39)
#[register(0x39u8)]
#[derive(Debug, Clone, Copy, PartialEq, ReadableRegister, WritableRegister, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BasebandControl1 {
    /// RXDECINV: stop the receiver from decoding packets, which keeps the
    /// RX FIFO stable while it is being read
    pub rx_decode_inhibit: bool,
}

impl BasebandControl1 {
    pub const fn to_byte(self) -> u8 {
        (self.rx_decode_inhibit as u8) << 2
    }
}

/// Error type for invalid CCA mode values
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InvalidCcaMode(pub u8);

/// Clear channel assessment mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CcaMode {
    /// Mode 2: carrier sense only
    CarrierSense,
    /// Mode 1: energy above threshold
    EnergyDetect,
    /// Mode 3: carrier sense with energy above threshold
    Combined,
}

impl CcaMode {
    /// Convert the two CCAMODE bits to a mode
    pub fn from_bits(value: u8) -> Result<Self, InvalidCcaMode> {
        match value {
            0b01 => Ok(Self::CarrierSense),
            0b10 => Ok(Self::EnergyDetect),
            0b11 => Ok(Self::Combined),
            invalid => Err(InvalidCcaMode(invalid)),
        }
    }

    pub const fn to_bits(self) -> u8 {
        match self {
            Self::CarrierSense => 0b01,
            Self::EnergyDetect => 0b10,
            Self::Combined => 0b11,
        }
    }
}

/// Baseband control 2 register (address: 0x3A)
#[register(0x3Au8)]
#[derive(Debug, Clone, Copy, PartialEq, ReadableRegister, WritableRegister)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BasebandControl2 {
    /// CCAMODE (bits 7:6)
    pub cca_mode: CcaMode,
    /// CCACSTH: carrier sense threshold (bits 5:2)
    pub carrier_sense_threshold: u8,
}

impl BasebandControl2 {
    pub const fn to_byte(self) -> u8 {
        (self.cca_mode.to_bits() << 6) | ((self.carrier_sense_threshold & 0x0F) << 2)
    }
}

/// Baseband control 6 register (address: 0x3E)
#[register(0x3Eu8)]
#[derive(Debug, Clone, Copy, PartialEq, ReadableRegister, WritableRegister, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BasebandControl6 {
    /// RSSIMODE2: append the RSSI of every received frame to the RX FIFO,
    /// right after the LQI byte
    pub append_rssi: bool,
}

impl BasebandControl6 {
    pub const fn to_byte(self) -> u8 {
        (self.append_rssi as u8) << 6
    }
}

/// CCA energy detect threshold register (address: 0x3F)
///
/// Recommended value is 0x60 (approximately -69 dBm).
#[register(0x3Fu8)]
#[derive(Debug, Clone, Copy, PartialEq, ReadableRegister, WritableRegister)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CcaEnergyThreshold {
    pub threshold: u8,
}

impl CcaEnergyThreshold {
    pub const fn to_byte(self) -> u8 {
        self.threshold
    }
}

impl Default for CcaEnergyThreshold {
    fn default() -> Self {
        Self { threshold: 0x60 }
    }
}

impl FromByteArray for ReceiveMacControl {
    type Error = Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self {
            promiscuous: bytes[0] & 0x01 != 0,
            accept_errors: bytes[0] & 0x02 != 0,
        })
    }
}

impl ToByteArray for ReceiveMacControl {
    type Error = Infallible;
    type Array = [u8; 1];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([self.to_byte()])
    }
}

impl FromByteArray for PanIdLow {
    type Error = Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self { value: bytes[0] })
    }
}

impl ToByteArray for PanIdLow {
    type Error = Infallible;
    type Array = [u8; 1];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([self.value])
    }
}

impl FromByteArray for PanIdHigh {
    type Error = Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self { value: bytes[0] })
    }
}

impl ToByteArray for PanIdHigh {
    type Error = Infallible;
    type Array = [u8; 1];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([self.value])
    }
}

impl FromByteArray for ShortAddressLow {
    type Error = Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self { value: bytes[0] })
    }
}

impl ToByteArray for ShortAddressLow {
    type Error = Infallible;
    type Array = [u8; 1];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([self.value])
    }
}

impl FromByteArray for ShortAddressHigh {
    type Error = Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self { value: bytes[0] })
    }
}

impl ToByteArray for ShortAddressHigh {
    type Error = Infallible;
    type Array = [u8; 1];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([self.value])
    }
}

impl FromByteArray for PaControl2 {
    type Error = Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self {
            fifo_enable: bytes[0] & 0x80 != 0,
            tx_on_time: (bytes[0] >> 2) & 0x0F,
        })
    }
}

impl ToByteArray for PaControl2 {
    type Error = Infallible;
    type Array = [u8; 1];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([self.to_byte()])
    }
}

impl FromByteArray for TxStatus {
    type Error = Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self::from_byte(bytes[0]))
    }
}

impl FromByteArray for TxStabilization {
    type Error = Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self {
            rf_stabilization: bytes[0] >> 4,
            min_sifs: bytes[0] & 0x0F,
        })
    }
}

impl ToByteArray for TxStabilization {
    type Error = Infallible;
    type Array = [u8; 1];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([self.to_byte()])
    }
}

impl FromByteArray for InterruptStatus {
    type Error = Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self {
            flags: Interrupts::from_bits_retain(bytes[0]),
        })
    }
}

impl FromByteArray for RfControl {
    type Error = Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self {
            reset: bytes[0] & 0x04 != 0,
        })
    }
}

impl ToByteArray for RfControl {
    type Error = Infallible;
    type Array = [u8; 1];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([self.to_byte()])
    }
}

impl FromByteArray for BasebandControl1 {
    type Error = Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self {
            rx_decode_inhibit: bytes[0] & 0x04 != 0,
        })
    }
}

impl ToByteArray for BasebandControl1 {
    type Error = Infallible;
    type Array = [u8; 1];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([self.to_byte()])
    }
}

impl FromByteArray for BasebandControl2 {
    type Error = InvalidCcaMode;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self {
            cca_mode: CcaMode::from_bits(bytes[0] >> 6)?,
            carrier_sense_threshold: (bytes[0] >> 2) & 0x0F,
        })
    }
}

impl ToByteArray for BasebandControl2 {
    type Error = Infallible;
    type Array = [u8; 1];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([self.to_byte()])
    }
}

impl FromByteArray for BasebandControl6 {
    type Error = Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self {
            append_rssi: bytes[0] & 0x40 != 0,
        })
    }
}

impl ToByteArray for BasebandControl6 {
    type Error = Infallible;
    type Array = [u8; 1];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([self.to_byte()])
    }
}

impl FromByteArray for CcaEnergyThreshold {
    type Error = Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self {
            threshold: bytes[0],
        })
    }
}

impl ToByteArray for CcaEnergyThreshold {
    type Error = Infallible;
    type Array = [u8; 1];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([self.to_byte()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_values_match_their_fields() {
        assert_eq!(PaControl2::default().to_byte(), 0x98);
        assert_eq!(TxStabilization::default().to_byte(), 0x95);
        assert_eq!(
            BasebandControl2 {
                cca_mode: CcaMode::EnergyDetect,
                carrier_sense_threshold: 0,
            }
            .to_byte(),
            0x80
        );
        assert_eq!(BasebandControl6 { append_rssi: true }.to_byte(), 0x40);
        assert_eq!(RfControl { reset: true }.to_byte(), 0x04);
        assert_eq!(BasebandControl1 { rx_decode_inhibit: true }.to_byte(), 0x04);
    }

    #[test]
    fn tx_status_with_one_retry_is_a_success() {
        let status = TxStatus::from_byte(0b0100_0000);
        assert!(status.succeeded());
        assert_eq!(status.retries, 1);
        assert!(!status.cca_failure);
    }

    #[test]
    fn tx_status_reports_busy_channel_and_errors() {
        let status = TxStatus::from_byte(0b1110_0001);
        assert!(!status.succeeded());
        assert_eq!(status.retries, 3);
        assert!(status.cca_failure);
        assert_eq!(status.errors, TxErrors::NORMAL_FAILED);
    }

    #[test]
    fn reserved_cca_mode_is_rejected() {
        assert_eq!(
            BasebandControl2::from_bytes([0x00]),
            Err(InvalidCcaMode(0))
        );
        let decoded = BasebandControl2::from_bytes([0xC8]).unwrap();
        assert_eq!(decoded.cca_mode, CcaMode::Combined);
        assert_eq!(decoded.carrier_sense_threshold, 0x02);
    }

    #[test]
    fn unknown_interrupt_bits_are_retained() {
        let status = InterruptStatus::from_bytes([0xFF]).unwrap();
        assert!(status.flags.contains(Interrupts::RX | Interrupts::TX_NORMAL));
        assert_eq!(status.flags.bits(), 0xFF);
    }
}
