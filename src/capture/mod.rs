//! Packet capture pipeline
//!
//! Forwards received frames to a capture serializer, one capture record per
//! frame, in the order the radio reported them. The serializer is anything
//! implementing [`CaptureSink`]; with the `std` feature [`PcapWriter`] writes
//! the libpcap format that Wireshark can read live from a named pipe.
//!
//! # Example
//! ```no_run
//! # #[cfg(feature = "std")]
//! # fn example<SPI: embedded_hal::spi::SpiDevice>(spi: SPI) -> Result<(), Box<dyn std::error::Error>> {
//! use mrf24j40::{CapturePipeline, LinkType, Mrf24j40, PcapWriter, RxBuffering};
//!
//! let mut radio = Mrf24j40::new(spi).with_buffering(RxBuffering::RAW_FRAME);
//! radio.initialize(12).map_err(|e| format!("{e:?}"))?;
//! radio.set_promiscuous(true).map_err(|e| format!("{e:?}"))?;
//!
//! let pipe = std::fs::OpenOptions::new().write(true).open("/tmp/wiresharkpipe")?;
//! let mut capture = CapturePipeline::new(PcapWriter::new(pipe, LinkType::Ieee802154WithFcs)?);
//!
//! loop {
//!     capture.service(&mut radio).map_err(|e| format!("{e:?}"))?;
//! }
//! # }
//! ```

#[cfg(feature = "std")]
mod pcap;

#[cfg(feature = "std")]
pub use pcap::PcapWriter;

use crate::{EmptyQueue, Error, Mrf24j40};

/// Link-layer header type tagging every capture record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkType {
    /// `LINKTYPE_IEEE802_15_4_WITHFCS`: frames include the 2 byte FCS
    Ieee802154WithFcs,
}

impl LinkType {
    /// Value registered with tcpdump.org
    pub const fn value(self) -> u32 {
        match self {
            LinkType::Ieee802154WithFcs => 195,
        }
    }
}

/// Destination for captured frames
pub trait CaptureSink {
    type Error;

    /// Appends one timestamped capture record holding `frame`
    fn write_frame(&mut self, link_type: LinkType, frame: &[u8]) -> Result<(), Self::Error>;
}

impl<T: CaptureSink + ?Sized> CaptureSink for &mut T {
    type Error = T::Error;

    fn write_frame(&mut self, link_type: LinkType, frame: &[u8]) -> Result<(), Self::Error> {
        (**self).write_frame(link_type, frame)
    }
}

/// Errors of the capture pipeline
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CaptureError<E> {
    /// No receive record is pending
    EmptyQueue,
    /// The dequeued record holds no raw frame; enable
    /// [`RxBuffering::RAW_FRAME`](crate::RxBuffering::RAW_FRAME)
    MissingFrame,
    /// Polling the radio failed
    Radio(Error),
    /// The sink rejected the record
    Sink(E),
}

impl<E> From<EmptyQueue> for CaptureError<E> {
    fn from(_: EmptyQueue) -> Self {
        CaptureError::EmptyQueue
    }
}

/// Drains receive records from the radio into a [`CaptureSink`]
pub struct CapturePipeline<S> {
    sink: S,
    link_type: LinkType,
    forwarded: u32,
    skipped: u32,
}

impl<S: CaptureSink> CapturePipeline<S> {
    /// Creates a pipeline tagging every record as
    /// [`LinkType::Ieee802154WithFcs`].
    ///
    /// # Arguments
    /// * `sink` - Destination for captured frames
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            link_type: LinkType::Ieee802154WithFcs,
            forwarded: 0,
            skipped: 0,
        }
    }

    /// Forwards the oldest pending receive record.
    ///
    /// The record is removed from the queue even if it cannot be forwarded.
    ///
    /// # Errors
    /// * `CaptureError::EmptyQueue` - nothing pending, try again later
    /// * `CaptureError::MissingFrame` - the record carried no raw frame
    /// * `CaptureError::Sink` - the sink failed
    pub fn forward_next<SPI>(
        &mut self,
        radio: &mut Mrf24j40<SPI>,
    ) -> Result<(), CaptureError<S::Error>> {
        let record = radio.take_received()?;
        let Some(frame) = record.raw_frame else {
            self.skipped = self.skipped.wrapping_add(1);
            return Err(CaptureError::MissingFrame);
        };

        self.sink
            .write_frame(self.link_type, &frame)
            .map_err(CaptureError::Sink)?;
        self.forwarded = self.forwarded.wrapping_add(1);
        Ok(())
    }

    /// Forwards every pending receive record and returns how many reached
    /// the sink. Records without a raw frame are skipped.
    ///
    /// # Errors
    /// * `CaptureError::Sink` - the sink failed; the failing record is lost,
    ///   later records stay queued
    pub fn drain<SPI>(
        &mut self,
        radio: &mut Mrf24j40<SPI>,
    ) -> Result<usize, CaptureError<S::Error>> {
        let mut count = 0;
        loop {
            match self.forward_next(radio) {
                Ok(()) => count += 1,
                Err(CaptureError::EmptyQueue) => return Ok(count),
                Err(CaptureError::MissingFrame) => {
                    debug!("rx record without raw frame skipped");
                }
                Err(err) => return Err(err),
            }
        }
    }

    /// Number of frames handed to the sink
    pub fn forwarded(&self) -> u32 {
        self.forwarded
    }

    /// Number of records dropped for lack of a raw frame
    pub fn skipped(&self) -> u32 {
        self.skipped
    }

    /// The sink frames are forwarded to
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Consumes the pipeline and returns its sink
    pub fn into_sink(self) -> S {
        self.sink
    }

    /// One iteration of the capture loop: poll the radio once, then drain
    /// every pending receive record into the sink.
    ///
    /// Transmit records are left queued for the caller.
    ///
    /// # Errors
    /// * `CaptureError::Radio` - polling failed; see
    ///   [`Mrf24j40::recover`](crate::Mrf24j40::recover)
    /// * `CaptureError::Sink` - the sink failed
    pub fn service<SPI>(
        &mut self,
        radio: &mut Mrf24j40<SPI>,
    ) -> Result<usize, CaptureError<S::Error>>
    where
        SPI: embedded_hal::spi::SpiDevice,
    {
        radio.poll().map_err(CaptureError::Radio)?;
        self.drain(radio)
    }

    /// This is the async version of [`service`](CapturePipeline::service).
    pub async fn service_async<SPI>(
        &mut self,
        radio: &mut Mrf24j40<SPI>,
    ) -> Result<usize, CaptureError<S::Error>>
    where
        SPI: embedded_hal_async::spi::SpiDevice,
    {
        radio.poll_async().await.map_err(CaptureError::Radio)?;
        self.drain(radio)
    }
}
