mod common;

use common::{frame, SimulatedRadio, Space, Transaction};
use mrf24j40::registers::{AddressSpace, InterruptStatus, Interrupts, RfChannel, ShortRegister};
use mrf24j40::{Device, Error};

#[test]
fn short_write_then_read_round_trips() {
    let sim = SimulatedRadio::new();
    let mut device = Device::new(sim.clone());

    device.write_short(0x18, 0x98).unwrap();
    assert_eq!(device.read_short(0x18).unwrap(), 0x98);
    assert_eq!(sim.short(0x18), 0x98);

    assert_eq!(
        sim.log(),
        vec![
            Transaction {
                space: Space::Short,
                address: 0x18,
                write: true,
                data: vec![0x98],
            },
            Transaction {
                space: Space::Short,
                address: 0x18,
                write: false,
                data: vec![0x98],
            },
        ]
    );
}

#[test]
fn long_write_lands_in_long_space_only() {
    let sim = SimulatedRadio::new();
    let mut device = Device::new(sim.clone());

    device.write_long(0x200, 0x03).unwrap();
    device.write_long(0x018, 0x55).unwrap();

    assert_eq!(sim.long(0x200), 0x03);
    assert_eq!(sim.long(0x018), 0x55);
    assert_eq!(sim.short(0x18), 0);
    assert_eq!(device.read_long(0x200).unwrap(), 0x03);
}

#[test]
fn burst_read_returns_consecutive_addresses() {
    let sim = SimulatedRadio::new();
    for (i, byte) in frame(32, 0x40).into_iter().enumerate() {
        sim.set_long(0x301 + i, byte);
    }
    let mut device = Device::new(sim.clone());

    let mut bytes = [0u8; 32];
    device.read_long_bytes(0x301, &mut bytes).unwrap();

    for (i, byte) in bytes.iter().enumerate() {
        assert_eq!(*byte, sim.long(0x301 + i));
    }
    // One header for the whole burst
    assert_eq!(sim.log().len(), 1);
}

#[test]
fn out_of_range_offsets_never_reach_the_bus() {
    let sim = SimulatedRadio::new();
    let mut device = Device::new(sim.clone());

    assert_eq!(
        device.write_short(0x40, 0),
        Err(Error::InvalidAddress {
            space: AddressSpace::Short,
            offset: 0x40
        })
    );
    assert!(device.read_long(0x400).is_err());

    let mut bytes = [0u8; 4];
    assert!(device.read_long_bytes(0x3FE, &mut bytes).is_err());
    assert!(sim.log().is_empty());
}

#[test]
fn typed_registers_pick_their_space() {
    let sim = SimulatedRadio::new();
    sim.raise(0x09);
    let mut device = Device::new(sim.clone());

    let status: InterruptStatus = device.read_register().unwrap();
    assert_eq!(status.flags, Interrupts::RX | Interrupts::TX_NORMAL);

    device
        .write_register(RfChannel {
            index: 4,
            rf_optimize: RfChannel::RF_OPTIMIZE,
        })
        .unwrap();
    assert_eq!(sim.long(0x200), 0x43);

    let log = sim.log();
    assert_eq!(log[0].space, Space::Short);
    assert_eq!(log[0].address, u16::from(ShortRegister::IntStat.offset()));
    assert_eq!(log[1].space, Space::Long);
}

#[test]
fn bus_failure_is_reported() {
    let sim = SimulatedRadio::new();
    let mut device = Device::new(sim.clone());

    sim.fail_next();
    assert_eq!(device.read_short(0x31), Err(Error::Bus));
    assert_eq!(device.read_short(0x31), Ok(0));
}

#[tokio::test]
async fn async_access_matches_blocking_access() {
    let sim = SimulatedRadio::new();
    let mut device = Device::new(sim.clone());

    device.write_short_async(0x01, 0xFE).await.unwrap();
    device.write_long_async(0x206, 0x90).await.unwrap();
    assert_eq!(device.read_short_async(0x01).await.unwrap(), 0xFE);
    assert_eq!(device.read_long_async(0x206).await.unwrap(), 0x90);

    let mut bytes = [0u8; 2];
    device.read_long_bytes_async(0x206, &mut bytes).await.unwrap();
    assert_eq!(bytes, [0x90, 0x00]);
}
