//! libpcap capture files
//!
//! Adapts [`pcap_file::pcap::PcapWriter`] to [`CaptureSink`]. The file header
//! is written little endian with version 2.4, snaplen 65535 and the link type
//! of the pipeline; every frame becomes one record stamped with the wall
//! clock time.

use std::io::Write;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use pcap_file::pcap::{PcapHeader, PcapPacket};
use pcap_file::{DataLink, Endianness, PcapError};

use super::{CaptureSink, LinkType};

impl From<LinkType> for DataLink {
    fn from(link_type: LinkType) -> Self {
        match link_type {
            LinkType::Ieee802154WithFcs => DataLink::IEEE802_15_4,
        }
    }
}

/// Writes capture records in the classic libpcap format.
///
/// The writer can target a file or a named pipe read by a live viewer.
/// Records go straight to `W`; wrap files in a `BufWriter` only when the
/// capture is not watched live.
pub struct PcapWriter<W: Write> {
    out: pcap_file::pcap::PcapWriter<W>,
    link_type: LinkType,
}

impl<W: Write> PcapWriter<W> {
    /// Writes the global header and returns the writer.
    ///
    /// # Arguments
    /// * `out` - Destination of the capture, e.g. a file or named pipe
    /// * `link_type` - Link type recorded in the file header
    ///
    /// # Errors
    /// * `PcapError::IoError` - the header could not be written
    pub fn new(out: W, link_type: LinkType) -> Result<Self, PcapError> {
        let header = PcapHeader {
            datalink: link_type.into(),
            endianness: Endianness::Little,
            ..Default::default()
        };

        Ok(Self {
            out: pcap_file::pcap::PcapWriter::with_header(out, header)?,
            link_type,
        })
    }

    /// Link type recorded in the file header
    pub fn link_type(&self) -> LinkType {
        self.link_type
    }

    /// Consumes the writer and returns the destination
    pub fn into_inner(self) -> W {
        self.out.into_writer()
    }

    fn write_record(&mut self, timestamp: Duration, frame: &[u8]) -> Result<(), PcapError> {
        let len = u32::try_from(frame.len())
            .map_err(|_| PcapError::InvalidField("frame exceeds snaplen"))?;
        self.out
            .write_packet(&PcapPacket::new(timestamp, len, frame))?;
        Ok(())
    }
}

impl<W: Write> CaptureSink for PcapWriter<W> {
    type Error = PcapError;

    fn write_frame(&mut self, link_type: LinkType, frame: &[u8]) -> Result<(), Self::Error> {
        if link_type != self.link_type {
            return Err(PcapError::InvalidField("link type differs from the file header"));
        }

        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default();
        self.write_record(timestamp, frame)
    }
}

#[cfg(test)]
mod tests {
    use std::vec::Vec;

    use super::*;

    #[test]
    fn global_header_layout() {
        let writer = PcapWriter::new(Vec::new(), LinkType::Ieee802154WithFcs).unwrap();
        let out = writer.into_inner();

        assert_eq!(out.len(), 24);
        assert_eq!(&out[0..4], &[0xd4, 0xc3, 0xb2, 0xa1]);
        assert_eq!(&out[4..8], &[2, 0, 4, 0]);
        assert_eq!(&out[16..20], &65535u32.to_le_bytes());
        assert_eq!(&out[20..24], &195u32.to_le_bytes());
    }

    #[test]
    fn record_header_carries_timestamp_and_lengths() {
        let mut writer = PcapWriter::new(Vec::new(), LinkType::Ieee802154WithFcs).unwrap();
        writer
            .write_record(Duration::new(1_700_000_000, 250_000_000), &[0x41, 0x88, 0x01])
            .unwrap();
        let out = writer.into_inner();

        let record = &out[24..];
        assert_eq!(&record[0..4], &1_700_000_000u32.to_le_bytes());
        assert_eq!(&record[4..8], &250_000u32.to_le_bytes());
        assert_eq!(&record[8..12], &3u32.to_le_bytes());
        assert_eq!(&record[12..16], &3u32.to_le_bytes());
        assert_eq!(&record[16..], &[0x41, 0x88, 0x01]);
    }

    #[test]
    fn frames_are_appended_in_order() {
        let mut writer = PcapWriter::new(Vec::new(), LinkType::Ieee802154WithFcs).unwrap();
        writer.write_frame(LinkType::Ieee802154WithFcs, &[1, 2]).unwrap();
        writer.write_frame(LinkType::Ieee802154WithFcs, &[3]).unwrap();
        let out = writer.into_inner();

        assert_eq!(out.len(), 24 + 16 + 2 + 16 + 1);
        assert_eq!(&out[40..42], &[1, 2]);
        assert_eq!(out[58], 3);
    }

    #[test]
    fn output_reads_back_with_the_frames() {
        let mut writer = PcapWriter::new(Vec::new(), LinkType::Ieee802154WithFcs).unwrap();
        writer.write_frame(LinkType::Ieee802154WithFcs, &[0x41, 0x88]).unwrap();
        let out = writer.into_inner();

        let mut reader = pcap_file::pcap::PcapReader::new(&out[..]).unwrap();
        assert_eq!(reader.header().datalink, DataLink::IEEE802_15_4);
        let packet = reader.next_packet().unwrap().unwrap();
        assert_eq!(&packet.data[..], &[0x41, 0x88]);
        assert!(reader.next_packet().is_none());
    }
}
