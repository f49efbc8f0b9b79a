//! Receive and transmit records
//!
//! Records are produced by [`Mrf24j40::poll`](crate::Mrf24j40::poll) and
//! queued until the host takes them.

use bitflags::bitflags;
use heapless::Vec;

use crate::registers::TxStatus;
use crate::DecodeAnomaly;

/// Length of the MAC header preceding the payload
pub const MHR_LEN: usize = 9;
/// Length of the frame check sequence trailing the payload
pub const FCS_LEN: usize = 2;
/// Fixed per-frame overhead included in the reported frame length
pub const FRAME_OVERHEAD: usize = MHR_LEN + FCS_LEN;
/// Largest PSDU an IEEE 802.15.4 frame can carry
pub const MAX_FRAME_LEN: usize = 127;
/// Largest payload left once the overhead is removed
pub const MAX_PAYLOAD_LEN: usize = MAX_FRAME_LEN - FRAME_OVERHEAD;

bitflags! {
    /// Which parts of a received frame are copied out of the RX FIFO
    ///
    /// Frame length, LQI and RSSI are always read.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct RxBuffering: u8 {
        /// Copy the whole frame, MHR and FCS included
        const RAW_FRAME = 1 << 0;
        /// Copy the payload between MHR and FCS
        const PAYLOAD = 1 << 1;
    }
}

/// One received frame
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ReceiveRecord {
    /// The frame as it sits in the RX FIFO, present with [`RxBuffering::RAW_FRAME`]
    pub raw_frame: Option<Vec<u8, MAX_FRAME_LEN>>,
    /// The frame without MHR and FCS, present with [`RxBuffering::PAYLOAD`]
    /// on frames long enough to carry one
    pub payload: Option<Vec<u8, MAX_PAYLOAD_LEN>>,
    /// Frame length reported by the radio, overhead included
    pub frame_length: u8,
    /// Link quality indication
    pub link_quality: u8,
    /// Received signal strength
    pub signal_strength: u8,
    /// Set when the reported length is inconsistent
    pub anomaly: Option<DecodeAnomaly>,
}

impl ReceiveRecord {
    /// Payload length implied by the reported frame length
    pub fn payload_len(&self) -> Option<usize> {
        usize::from(self.frame_length).checked_sub(FRAME_OVERHEAD)
    }
}

/// Checks a reported frame length against the fixed overhead and the
/// maximum PSDU size
pub fn frame_anomaly(frame_length: u8) -> Option<DecodeAnomaly> {
    match usize::from(frame_length) {
        len if len < FRAME_OVERHEAD => Some(DecodeAnomaly::FrameTooShort(frame_length)),
        len if len > MAX_FRAME_LEN => Some(DecodeAnomaly::FrameTooLong(frame_length)),
        _ => None,
    }
}

/// A zero-filled buffer of `len` bytes, capped at its capacity
pub(crate) fn zeroed<const N: usize>(len: usize) -> Vec<u8, N> {
    let mut buffer = Vec::new();
    buffer.extend(core::iter::repeat(0).take(len.min(N)));
    buffer
}

/// Outcome of one transmission from the normal TX FIFO
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TransmitRecord {
    pub succeeded: bool,
    /// Retries needed (0-3)
    pub retry_count: u8,
    /// Clear channel assessment reported a busy channel
    pub channel_was_busy: bool,
}

impl From<TxStatus> for TransmitRecord {
    fn from(status: TxStatus) -> Self {
        Self {
            succeeded: status.succeeded(),
            retry_count: status.retries,
            channel_was_busy: status.cca_failure,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_length_excludes_header_and_fcs() {
        let record = ReceiveRecord {
            raw_frame: None,
            payload: None,
            frame_length: 20,
            link_quality: 0xFF,
            signal_strength: 0x80,
            anomaly: None,
        };
        assert_eq!(record.payload_len(), Some(9));
    }

    #[test]
    fn lengths_outside_the_frame_bounds_are_anomalies() {
        assert_eq!(frame_anomaly(10), Some(DecodeAnomaly::FrameTooShort(10)));
        assert_eq!(frame_anomaly(11), None);
        assert_eq!(frame_anomaly(127), None);
        assert_eq!(frame_anomaly(128), Some(DecodeAnomaly::FrameTooLong(128)));
    }

    #[test]
    fn transmit_record_from_status_byte() {
        let record = TransmitRecord::from(TxStatus::from_byte(0b0100_0000));
        assert_eq!(
            record,
            TransmitRecord {
                succeeded: true,
                retry_count: 1,
                channel_was_busy: false,
            }
        );
    }

    #[test]
    fn zeroed_is_capped_at_capacity() {
        let buffer: Vec<u8, 4> = zeroed(10);
        assert_eq!(buffer.as_slice(), &[0, 0, 0, 0]);
    }
}
