//! Interrupt status decoding
//!
//! The radio is serviced by polling: the host calls [`Mrf24j40::poll`] at
//! its own cadence. Each call reads INTSTAT once (which clears it) and
//! handles, in this order:
//!
//! 1. RXIF: receive is inhibited, the frame length, optional frame bytes,
//!    LQI and RSSI are read from the RX FIFO, the record is queued and
//!    receive is enabled again. A frame arriving while receive is inhibited
//!    is lost, so this window is kept as short as possible.
//! 2. TXNIF: TXSTAT is read and decoded into a [`TransmitRecord`].
//!
//! Other interrupt bits are returned to the caller but otherwise ignored.

use heapless::Vec;

use crate::events::{
    frame_anomaly, zeroed, ReceiveRecord, RxBuffering, TransmitRecord, FRAME_OVERHEAD, MAX_FRAME_LEN,
    MAX_PAYLOAD_LEN, MHR_LEN,
};
use crate::registers::{AddressSpace, InterruptStatus, Interrupts, TxStatus, RX_FIFO};
use crate::{DecodeAnomaly, Error};

use super::Mrf24j40;

/// First frame byte in the RX FIFO, right after the length byte
const RX_FRAME: u16 = RX_FIFO + 1;
/// Highest LQI address that leaves room for the RSSI byte
const LAST_LINK_QUALITY: u16 = AddressSpace::Long.max_offset() - 1;

/// Where the pieces of a received frame sit in the RX FIFO
struct FrameLayout {
    frame_length: u8,
    anomaly: Option<DecodeAnomaly>,
    /// Number of frame bytes that fit a record
    len: usize,
}

impl FrameLayout {
    fn new(frame_length: u8) -> Self {
        Self {
            frame_length,
            anomaly: frame_anomaly(frame_length),
            len: usize::from(frame_length).min(MAX_FRAME_LEN),
        }
    }

    /// LQI follows the reported frame length, RSSI follows the LQI.
    /// Pinned to the end of the long space for lengths that would overflow it.
    fn link_quality_address(&self) -> u16 {
        (RX_FRAME + u16::from(self.frame_length)).min(LAST_LINK_QUALITY)
    }

    /// Only frames within the PSDU bounds carry a payload
    fn payload_len(&self) -> Option<usize> {
        match self.anomaly {
            Some(_) => None,
            None => self.len.checked_sub(FRAME_OVERHEAD),
        }
    }

    fn payload_from_raw(&self, raw: &[u8]) -> Option<Vec<u8, MAX_PAYLOAD_LEN>> {
        let len = self.payload_len()?;
        Vec::from_slice(raw.get(MHR_LEN..MHR_LEN + len)?).ok()
    }

    fn record(
        &self,
        raw_frame: Option<Vec<u8, MAX_FRAME_LEN>>,
        payload: Option<Vec<u8, MAX_PAYLOAD_LEN>>,
        link_quality: u8,
        signal_strength: u8,
    ) -> ReceiveRecord {
        if self.anomaly.is_some() {
            warn!("rx frame length {} is inconsistent", self.frame_length);
        }
        debug!(
            "rx frame {} bytes, lqi {}, rssi {}",
            self.frame_length, link_quality, signal_strength
        );

        ReceiveRecord {
            raw_frame,
            payload,
            frame_length: self.frame_length,
            link_quality,
            signal_strength,
            anomaly: self.anomaly,
        }
    }
}

impl<SPI> Mrf24j40<SPI>
where
    SPI: embedded_hal::spi::SpiDevice,
{
    /// Services pending radio interrupts.
    ///
    /// Returns every interrupt flag that was read, including the ones the
    /// driver does not act on.
    ///
    /// # Errors
    /// * `Error::Bus` - SPI communication failed. Receive may be left
    ///   inhibited; call [`recover`](Mrf24j40::recover).
    pub fn poll(&mut self) -> Result<Interrupts, Error> {
        let InterruptStatus { flags } = self.device.read_register()?;

        if flags.contains(Interrupts::RX) {
            self.receive_frame()?;
        }

        if flags.contains(Interrupts::TX_NORMAL) {
            let status: TxStatus = self.device.read_register()?;
            self.queue_transmitted(TransmitRecord::from(status));
        }

        Ok(flags)
    }

    fn receive_frame(&mut self) -> Result<(), Error> {
        self.disable_receive()?;

        let layout = FrameLayout::new(self.device.read_long(RX_FIFO)?);

        let raw_frame = if self.buffering.contains(RxBuffering::RAW_FRAME) {
            let mut raw: Vec<u8, MAX_FRAME_LEN> = zeroed(layout.len);
            self.device.read_long_bytes(RX_FRAME, &mut raw)?;
            Some(raw)
        } else {
            None
        };

        let payload = match (&raw_frame, layout.payload_len()) {
            _ if !self.buffering.contains(RxBuffering::PAYLOAD) => None,
            (Some(raw), _) => layout.payload_from_raw(raw),
            (None, Some(len)) => {
                let mut payload: Vec<u8, MAX_PAYLOAD_LEN> = zeroed(len);
                self.device
                    .read_long_bytes(RX_FRAME + MHR_LEN as u16, &mut payload)?;
                Some(payload)
            }
            (None, None) => None,
        };

        let link_quality = self.device.read_long(layout.link_quality_address())?;
        let signal_strength = self.device.read_long(layout.link_quality_address() + 1)?;

        let record = layout.record(raw_frame, payload, link_quality, signal_strength);
        self.queue_received(record);

        self.enable_receive()
    }
}

impl<SPI> Mrf24j40<SPI>
where
    SPI: embedded_hal_async::spi::SpiDevice,
{
    /// Asynchronously services pending radio interrupts.
    ///
    /// This is the async version of [`poll`](Mrf24j40::poll).
    pub async fn poll_async(&mut self) -> Result<Interrupts, Error> {
        let InterruptStatus { flags } = self.device.read_register_async().await?;

        if flags.contains(Interrupts::RX) {
            self.receive_frame_async().await?;
        }

        if flags.contains(Interrupts::TX_NORMAL) {
            let status: TxStatus = self.device.read_register_async().await?;
            self.queue_transmitted(TransmitRecord::from(status));
        }

        Ok(flags)
    }

    async fn receive_frame_async(&mut self) -> Result<(), Error> {
        self.disable_receive_async().await?;

        let layout = FrameLayout::new(self.device.read_long_async(RX_FIFO).await?);

        let raw_frame = if self.buffering.contains(RxBuffering::RAW_FRAME) {
            let mut raw: Vec<u8, MAX_FRAME_LEN> = zeroed(layout.len);
            self.device.read_long_bytes_async(RX_FRAME, &mut raw).await?;
            Some(raw)
        } else {
            None
        };

        let payload = match (&raw_frame, layout.payload_len()) {
            _ if !self.buffering.contains(RxBuffering::PAYLOAD) => None,
            (Some(raw), _) => layout.payload_from_raw(raw),
            (None, Some(len)) => {
                let mut payload: Vec<u8, MAX_PAYLOAD_LEN> = zeroed(len);
                self.device
                    .read_long_bytes_async(RX_FRAME + MHR_LEN as u16, &mut payload)
                    .await?;
                Some(payload)
            }
            (None, None) => None,
        };

        let link_quality = self
            .device
            .read_long_async(layout.link_quality_address())
            .await?;
        let signal_strength = self
            .device
            .read_long_async(layout.link_quality_address() + 1)
            .await?;

        let record = layout.record(raw_frame, payload, link_quality, signal_strength);
        self.queue_received(record);

        self.enable_receive_async().await
    }
}
