//! MRF24J40 driver state and configuration
//!
//! [`Mrf24j40`] owns the register access layer together with everything the
//! driver remembers about the radio: operating channel, PAN identifier,
//! short address, filtering mode, receive state and the queues of decoded
//! receive/transmit records.
//!
//! # Configuration Sequence
//! [`Mrf24j40::initialize`] writes a fixed, ordered list of registers:
//!
//! 1. PACON2, TXSTBL (PA and stabilization timing)
//! 2. RFCON0/1/2/6/7/8, SLPCON1 (RF optimisation, VCO, PLL enable, filters,
//!    sleep clock)
//! 3. BBREG2, CCAEDTH, BBREG6 (CCA mode and threshold, RSSI append)
//! 4. RFCON0 with the requested channel
//! 5. RFCTL reset pulse
//!
//! The PLL and oscillator settings must be in place before the channel is
//! selected and the RF state machine is reset, otherwise the radio may not
//! lock to the channel.

mod poll;

use heapless::Deque;

use crate::device::Device;
use crate::events::{ReceiveRecord, RxBuffering, TransmitRecord};
use crate::registers::*;
use crate::{ConfigError, EmptyQueue, Error};

/// Number of receive records held before new ones are dropped
pub const RX_QUEUE_DEPTH: usize = 8;
/// Number of transmit records held before new ones are dropped
pub const TX_QUEUE_DEPTH: usize = 8;

/// Register writes issued by [`Mrf24j40::initialize`] before the channel
/// is selected, in order.
pub const INIT_SEQUENCE: [(RegisterAddress, u8); 12] = [
    (
        ShortRegister::PaCon2.address(),
        PaControl2 {
            fifo_enable: true,
            tx_on_time: 0x06,
        }
        .to_byte(),
    ),
    (
        ShortRegister::TxStbl.address(),
        TxStabilization {
            rf_stabilization: 0x09,
            min_sifs: 0x05,
        }
        .to_byte(),
    ),
    (
        LongRegister::RfCon0.address(),
        RfChannel {
            index: 0,
            rf_optimize: RfChannel::RF_OPTIMIZE,
        }
        .to_byte(),
    ),
    (
        LongRegister::RfCon1.address(),
        RfControl1 { vco_optimize: 0x01 }.to_byte(),
    ),
    (
        LongRegister::RfCon2.address(),
        RfControl2 { pll_enable: true }.to_byte(),
    ),
    (
        LongRegister::RfCon6.address(),
        RfControl6 {
            tx_filter: true,
            fast_recovery: true,
        }
        .to_byte(),
    ),
    (
        LongRegister::RfCon7.address(),
        RfControl7 {
            sleep_clock: SleepClock::Internal100kHz,
        }
        .to_byte(),
    ),
    (
        LongRegister::RfCon8.address(),
        RfControl8 { rf_vco: true }.to_byte(),
    ),
    (
        LongRegister::SlpCon1.address(),
        SleepControl1 {
            clock_out_disabled: true,
            sleep_clock_divisor: 0x01,
        }
        .to_byte(),
    ),
    (
        ShortRegister::BbReg2.address(),
        BasebandControl2 {
            cca_mode: CcaMode::EnergyDetect,
            carrier_sense_threshold: 0,
        }
        .to_byte(),
    ),
    (
        ShortRegister::CcaEdTh.address(),
        CcaEnergyThreshold { threshold: 0x60 }.to_byte(),
    ),
    (
        ShortRegister::BbReg6.address(),
        BasebandControl6 { append_rssi: true }.to_byte(),
    ),
];

/// An IEEE 802.15.4 channel on the 2.4 GHz page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Channel(u8);

impl Channel {
    pub const MIN: u8 = 11;
    pub const MAX: u8 = 26;

    /// Validates a channel number.
    ///
    /// # Arguments
    /// * `number` - IEEE 802.15.4 channel number
    ///
    /// # Errors
    /// * `ConfigError::ChannelOutOfRange` - channel outside 11..=26
    pub const fn new(number: u8) -> Result<Self, ConfigError> {
        if number < Self::MIN || number > Self::MAX {
            return Err(ConfigError::ChannelOutOfRange(number));
        }
        Ok(Self(number))
    }

    /// IEEE 802.15.4 channel number
    pub const fn number(self) -> u8 {
        self.0
    }

    /// RFCON0 contents selecting this channel: `((n - 11) << 4) | 0x03`
    pub const fn register(self) -> RfChannel {
        RfChannel {
            index: self.0 - Self::MIN,
            rf_optimize: RfChannel::RF_OPTIMIZE,
        }
    }

    /// Raw RFCON0 byte for this channel
    pub const fn register_value(self) -> u8 {
        self.register().to_byte()
    }
}

impl TryFrom<u8> for Channel {
    type Error = ConfigError;

    fn try_from(number: u8) -> Result<Self, Self::Error> {
        Self::new(number)
    }
}

/// MRF24J40 driver
///
/// Created once at startup and passed by reference to the poll loop.
/// All bus traffic goes through the wrapped [`Device`].
pub struct Mrf24j40<SPI> {
    device: Device<SPI>,
    channel: Channel,
    pan_id: u16,
    short_address: u16,
    promiscuous: bool,
    rx_enabled: bool,
    buffering: RxBuffering,
    rx_queue: Deque<ReceiveRecord, RX_QUEUE_DEPTH>,
    tx_queue: Deque<TransmitRecord, TX_QUEUE_DEPTH>,
    dropped_received: u32,
    dropped_transmitted: u32,
}

impl<SPI> Mrf24j40<SPI> {
    /// Wraps an SPI device. No bus traffic happens until
    /// [`initialize`](Mrf24j40::initialize) is called.
    ///
    /// The cached state mirrors the radio's power-on defaults: channel 11,
    /// PAN and short address zero, address filtering on, receive enabled.
    pub fn new(spi: SPI) -> Self {
        Self {
            device: Device::new(spi),
            channel: Channel(Channel::MIN),
            pan_id: 0,
            short_address: 0,
            promiscuous: false,
            rx_enabled: true,
            buffering: RxBuffering::empty(),
            rx_queue: Deque::new(),
            tx_queue: Deque::new(),
            dropped_received: 0,
            dropped_transmitted: 0,
        }
    }

    /// Sets which parts of received frames are copied out of the RX FIFO
    pub fn with_buffering(mut self, buffering: RxBuffering) -> Self {
        self.buffering = buffering;
        self
    }

    /// Changes which parts of received frames are copied out of the RX FIFO.
    ///
    /// Takes effect from the next received frame.
    ///
    /// # Arguments
    /// * `buffering` - Parts to copy; frame length, LQI and RSSI are always read
    pub fn set_buffering(&mut self, buffering: RxBuffering) {
        self.buffering = buffering;
    }

    /// Parts of received frames currently copied out of the RX FIFO
    pub fn buffering(&self) -> RxBuffering {
        self.buffering
    }

    /// Operating channel last written to the radio
    pub fn channel(&self) -> Channel {
        self.channel
    }

    /// PAN identifier last written to the radio.
    ///
    /// Use [`read_pan`](Mrf24j40::read_pan) to query the device itself.
    pub fn pan_id(&self) -> u16 {
        self.pan_id
    }

    /// Short address last written to the radio
    pub fn short_address(&self) -> u16 {
        self.short_address
    }

    /// Whether address filtering is off
    pub fn is_promiscuous(&self) -> bool {
        self.promiscuous
    }

    /// Whether the receiver is decoding frames into the RX FIFO
    pub fn is_receive_enabled(&self) -> bool {
        self.rx_enabled
    }

    /// Removes and returns the oldest receive record
    pub fn take_received(&mut self) -> Result<ReceiveRecord, EmptyQueue> {
        self.rx_queue.pop_front().ok_or(EmptyQueue)
    }

    /// Removes and returns the oldest transmit record
    pub fn take_transmitted(&mut self) -> Result<TransmitRecord, EmptyQueue> {
        self.tx_queue.pop_front().ok_or(EmptyQueue)
    }

    /// Number of receive records waiting to be taken
    pub fn pending_received(&self) -> usize {
        self.rx_queue.len()
    }

    /// Number of transmit records waiting to be taken
    pub fn pending_transmitted(&self) -> usize {
        self.tx_queue.len()
    }

    /// Receive records discarded because the receive queue was full
    pub fn dropped_received(&self) -> u32 {
        self.dropped_received
    }

    /// Transmit records discarded because the transmit queue was full
    pub fn dropped_transmitted(&self) -> u32 {
        self.dropped_transmitted
    }

    /// Direct register access, bypassing the cached state
    pub fn device_mut(&mut self) -> &mut Device<SPI> {
        &mut self.device
    }

    /// Releases the underlying SPI device.
    pub fn release(self) -> SPI {
        self.device.release()
    }

    fn queue_received(&mut self, record: ReceiveRecord) {
        if self.rx_queue.push_back(record).is_err() {
            self.dropped_received = self.dropped_received.wrapping_add(1);
            warn!("rx queue full, record dropped");
        }
    }

    fn queue_transmitted(&mut self, record: TransmitRecord) {
        if self.tx_queue.push_back(record).is_err() {
            self.dropped_transmitted = self.dropped_transmitted.wrapping_add(1);
            warn!("tx queue full, record dropped");
        }
    }
}

impl<SPI> Mrf24j40<SPI>
where
    SPI: embedded_hal::spi::SpiDevice,
{
    /// Brings the radio into operating state on `channel`.
    ///
    /// # Errors
    /// * `Error::Configuration` - channel outside 11..=26, nothing was written
    /// * `Error::Bus` - SPI communication failed
    pub fn initialize(&mut self, channel: u8) -> Result<(), Error> {
        let channel = Channel::new(channel)?;

        for (address, value) in INIT_SEQUENCE {
            self.device.write(address, value)?;
        }
        self.device.write_register(channel.register())?;
        self.channel = channel;
        self.reset_rf()?;

        info!("initialized on channel {}", channel.number());
        Ok(())
    }

    /// Re-runs the configuration sequence and re-applies the cached
    /// addressing and filtering state.
    ///
    /// This is the recovery path after an [`Error::Bus`]: register contents
    /// are unknown, so everything is written again.
    ///
    /// # Errors
    /// * `Error::Bus` - SPI communication failed again
    pub fn recover(&mut self) -> Result<(), Error> {
        warn!("reinitializing radio");
        self.initialize(self.channel.number())?;
        self.set_pan(self.pan_id)?;
        self.set_short_address(self.short_address)?;
        self.set_promiscuous(self.promiscuous)?;
        self.enable_receive()
    }

    /// Selects the operating channel.
    ///
    /// # Errors
    /// * `Error::Configuration` - channel outside 11..=26, nothing was written
    /// * `Error::Bus` - SPI communication failed
    pub fn set_channel(&mut self, channel: u8) -> Result<(), Error> {
        let channel = Channel::new(channel)?;
        self.device.write_register(channel.register())?;
        self.channel = channel;
        Ok(())
    }

    /// Sets the PAN identifier used for address filtering.
    ///
    /// PANIDH is written before PANIDL.
    ///
    /// # Arguments
    /// * `pan_id` - 16-bit PAN identifier
    ///
    /// # Errors
    /// * `Error::Bus` - SPI communication failed
    pub fn set_pan(&mut self, pan_id: u16) -> Result<(), Error> {
        let [high, low] = pan_id.to_be_bytes();
        self.device.write_register(PanIdHigh { value: high })?;
        self.device.write_register(PanIdLow { value: low })?;
        self.pan_id = pan_id;
        Ok(())
    }

    /// Reads the PAN identifier back from the radio
    ///
    /// # Errors
    /// * `Error::Bus` - SPI communication failed
    pub fn read_pan(&mut self) -> Result<u16, Error> {
        let high: PanIdHigh = self.device.read_register()?;
        let low: PanIdLow = self.device.read_register()?;
        Ok(u16::from_be_bytes([high.value, low.value]))
    }

    /// Sets the 16-bit short address used for address filtering.
    ///
    /// SADRH is written before SADRL.
    ///
    /// # Arguments
    /// * `address` - Short address of this node
    ///
    /// # Errors
    /// * `Error::Bus` - SPI communication failed
    pub fn set_short_address(&mut self, address: u16) -> Result<(), Error> {
        let [high, low] = address.to_be_bytes();
        self.device.write_register(ShortAddressHigh { value: high })?;
        self.device.write_register(ShortAddressLow { value: low })?;
        self.short_address = address;
        Ok(())
    }

    /// Reads the short address back from the radio
    ///
    /// # Errors
    /// * `Error::Bus` - SPI communication failed
    pub fn read_short_address(&mut self) -> Result<u16, Error> {
        let high: ShortAddressHigh = self.device.read_register()?;
        let low: ShortAddressLow = self.device.read_register()?;
        Ok(u16::from_be_bytes([high.value, low.value]))
    }

    /// Accept every frame with a valid CRC regardless of its addressing
    ///
    /// # Arguments
    /// * `enabled` - `true` turns address filtering off
    ///
    /// # Errors
    /// * `Error::Bus` - SPI communication failed
    pub fn set_promiscuous(&mut self, enabled: bool) -> Result<(), Error> {
        self.device.write_register(ReceiveMacControl {
            promiscuous: enabled,
            accept_errors: false,
        })?;
        self.promiscuous = enabled;
        Ok(())
    }

    /// Lets the radio decode new frames into the RX FIFO
    ///
    /// # Errors
    /// * `Error::Bus` - SPI communication failed
    pub fn enable_receive(&mut self) -> Result<(), Error> {
        self.device.write_register(BasebandControl1 {
            rx_decode_inhibit: false,
        })?;
        self.rx_enabled = true;
        Ok(())
    }

    /// Stops the radio from decoding new frames into the RX FIFO
    ///
    /// # Errors
    /// * `Error::Bus` - SPI communication failed
    pub fn disable_receive(&mut self) -> Result<(), Error> {
        self.device.write_register(BasebandControl1 {
            rx_decode_inhibit: true,
        })?;
        self.rx_enabled = false;
        Ok(())
    }

    fn reset_rf(&mut self) -> Result<(), Error> {
        self.device.write_register(RfControl { reset: true })?;
        self.device.write_register(RfControl { reset: false })
    }
}

impl<SPI> Mrf24j40<SPI>
where
    SPI: embedded_hal_async::spi::SpiDevice,
{
    /// Asynchronously brings the radio into operating state on `channel`.
    ///
    /// This is the async version of [`initialize`](Mrf24j40::initialize).
    pub async fn initialize_async(&mut self, channel: u8) -> Result<(), Error> {
        let channel = Channel::new(channel)?;

        for (address, value) in INIT_SEQUENCE {
            self.device.write_async(address, value).await?;
        }
        self.device.write_register_async(channel.register()).await?;
        self.channel = channel;
        self.device
            .write_register_async(RfControl { reset: true })
            .await?;
        self.device
            .write_register_async(RfControl { reset: false })
            .await?;

        info!("initialized on channel {}", channel.number());
        Ok(())
    }

    /// This is the async version of [`enable_receive`](Mrf24j40::enable_receive).
    pub async fn enable_receive_async(&mut self) -> Result<(), Error> {
        self.device
            .write_register_async(BasebandControl1 {
                rx_decode_inhibit: false,
            })
            .await?;
        self.rx_enabled = true;
        Ok(())
    }

    /// This is the async version of [`disable_receive`](Mrf24j40::disable_receive).
    pub async fn disable_receive_async(&mut self) -> Result<(), Error> {
        self.device
            .write_register_async(BasebandControl1 {
                rx_decode_inhibit: true,
            })
            .await?;
        self.rx_enabled = false;
        Ok(())
    }
}
