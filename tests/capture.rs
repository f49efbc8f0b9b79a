mod common;

use common::{frame, SimulatedRadio};
use mrf24j40::{
    CaptureError, CapturePipeline, CaptureSink, LinkType, Mrf24j40, RxBuffering,
};

const RXIF: u8 = 0x08;
const TXNIF: u8 = 0x01;

#[derive(Default)]
struct RecordingSink {
    records: Vec<(LinkType, Vec<u8>)>,
    fail: bool,
}

#[derive(Debug, PartialEq)]
struct SinkFailed;

impl CaptureSink for RecordingSink {
    type Error = SinkFailed;

    fn write_frame(&mut self, link_type: LinkType, frame: &[u8]) -> Result<(), Self::Error> {
        if self.fail {
            return Err(SinkFailed);
        }
        self.records.push((link_type, frame.to_vec()));
        Ok(())
    }
}

fn receive(sim: &SimulatedRadio, radio: &mut Mrf24j40<SimulatedRadio>, bytes: &[u8]) {
    sim.load_frame(bytes, 0xFF, 0x80);
    sim.raise(RXIF);
    radio.poll().unwrap();
}

#[test]
fn frames_are_forwarded_in_order_one_record_each() {
    let sim = SimulatedRadio::new();
    let mut radio = Mrf24j40::new(sim.clone()).with_buffering(RxBuffering::RAW_FRAME);
    let frames = [frame(20, 1), frame(15, 2), frame(40, 3)];
    for bytes in &frames {
        receive(&sim, &mut radio, bytes);
    }

    let mut capture = CapturePipeline::new(RecordingSink::default());
    assert_eq!(capture.drain(&mut radio), Ok(3));
    assert_eq!(capture.forwarded(), 3);

    let records = &capture.sink().records;
    assert_eq!(records.len(), 3);
    for ((link_type, bytes), expected) in records.iter().zip(&frames) {
        assert_eq!(*link_type, LinkType::Ieee802154WithFcs);
        assert_eq!(bytes, expected);
    }
}

#[test]
fn forward_next_reports_an_empty_queue() {
    let sim = SimulatedRadio::new();
    let mut radio = Mrf24j40::new(sim.clone()).with_buffering(RxBuffering::RAW_FRAME);
    let mut capture = CapturePipeline::new(RecordingSink::default());

    assert_eq!(
        capture.forward_next(&mut radio),
        Err(CaptureError::EmptyQueue)
    );

    receive(&sim, &mut radio, &frame(20, 0));
    assert_eq!(capture.forward_next(&mut radio), Ok(()));
    assert_eq!(
        capture.forward_next(&mut radio),
        Err(CaptureError::EmptyQueue)
    );
}

#[test]
fn records_without_a_raw_frame_are_skipped() {
    let sim = SimulatedRadio::new();
    let mut radio = Mrf24j40::new(sim.clone()).with_buffering(RxBuffering::PAYLOAD);
    receive(&sim, &mut radio, &frame(20, 0));

    let mut capture = CapturePipeline::new(RecordingSink::default());
    assert_eq!(
        capture.forward_next(&mut radio),
        Err(CaptureError::MissingFrame)
    );

    receive(&sim, &mut radio, &frame(20, 0));
    radio.set_buffering(RxBuffering::RAW_FRAME);
    receive(&sim, &mut radio, &frame(25, 0));

    assert_eq!(capture.drain(&mut radio), Ok(1));
    assert_eq!(capture.skipped(), 2);
    assert_eq!(capture.sink().records[0].1.len(), 25);
}

#[test]
fn sink_failures_are_surfaced() {
    let sim = SimulatedRadio::new();
    let mut radio = Mrf24j40::new(sim.clone()).with_buffering(RxBuffering::RAW_FRAME);
    receive(&sim, &mut radio, &frame(20, 0));
    receive(&sim, &mut radio, &frame(21, 0));

    let mut capture = CapturePipeline::new(RecordingSink {
        fail: true,
        ..Default::default()
    });
    assert_eq!(capture.drain(&mut radio), Err(CaptureError::Sink(SinkFailed)));
    assert_eq!(radio.pending_received(), 1);
}

#[test]
fn service_polls_then_drains_receive_records() {
    let sim = SimulatedRadio::new();
    let mut radio = Mrf24j40::new(sim.clone()).with_buffering(RxBuffering::RAW_FRAME);
    let mut sink = RecordingSink::default();
    let mut capture = CapturePipeline::new(&mut sink);

    sim.load_frame(&frame(20, 9), 0xFF, 0x80);
    sim.raise(RXIF | TXNIF);
    assert_eq!(capture.service(&mut radio), Ok(1));
    assert_eq!(capture.service(&mut radio), Ok(0));

    assert_eq!(radio.pending_transmitted(), 1);
    assert_eq!(sink.records.len(), 1);
    assert_eq!(sink.records[0].1, frame(20, 9));
}

#[test]
fn service_reports_bus_failures() {
    let sim = SimulatedRadio::new();
    let mut radio = Mrf24j40::new(sim.clone()).with_buffering(RxBuffering::RAW_FRAME);
    let mut capture = CapturePipeline::new(RecordingSink::default());

    sim.fail_next();
    assert_eq!(
        capture.service(&mut radio),
        Err(CaptureError::Radio(mrf24j40::Error::Bus))
    );
}

#[tokio::test]
async fn service_async_forwards_frames() {
    let sim = SimulatedRadio::new();
    let mut radio = Mrf24j40::new(sim.clone()).with_buffering(RxBuffering::RAW_FRAME);
    let mut capture = CapturePipeline::new(RecordingSink::default());

    sim.load_frame(&frame(33, 4), 0xFF, 0x80);
    sim.raise(RXIF);
    assert_eq!(capture.service_async(&mut radio).await, Ok(1));
    assert_eq!(capture.into_sink().records[0].1, frame(33, 4));
}

#[cfg(feature = "std")]
#[test]
fn pcap_writer_records_every_frame() {
    let sim = SimulatedRadio::new();
    let mut radio = Mrf24j40::new(sim.clone()).with_buffering(RxBuffering::RAW_FRAME);
    receive(&sim, &mut radio, &frame(20, 1));
    receive(&sim, &mut radio, &frame(12, 2));

    let writer = mrf24j40::PcapWriter::new(Vec::new(), LinkType::Ieee802154WithFcs).unwrap();
    let mut capture = CapturePipeline::new(writer);
    assert_eq!(capture.drain(&mut radio).unwrap(), 2);

    let out = capture.into_sink().into_inner();
    assert_eq!(out.len(), 24 + (16 + 20) + (16 + 12));
    assert_eq!(&out[20..24], &195u32.to_le_bytes());
    assert_eq!(&out[24 + 16..24 + 16 + 20], &frame(20, 1)[..]);
}
