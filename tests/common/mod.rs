//! Simulated MRF24J40 for integration tests
//!
//! Decodes the short and long bus headers, keeps both register spaces in
//! memory and logs every transaction. Handles are cheap clones sharing the
//! same state, so a test keeps one while the driver owns the other.

#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use embedded_hal::spi::{ErrorKind, ErrorType, Operation};

pub const SHORT_SPACE: usize = 64;
pub const LONG_SPACE: usize = 1024;

pub const INTSTAT: usize = 0x31;
pub const TXSTAT: usize = 0x24;
pub const BBREG1: usize = 0x39;
pub const RX_FIFO: usize = 0x300;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Space {
    Short,
    Long,
}

/// One framed transaction as seen on the bus
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    pub space: Space,
    pub address: u16,
    pub write: bool,
    /// Bytes written, or bytes returned for reads
    pub data: Vec<u8>,
}

impl Transaction {
    pub fn is_write(&self, space: Space, address: u16, value: u8) -> bool {
        self.write && self.space == space && self.address == address && self.data == [value]
    }
}

struct State {
    short: [u8; SHORT_SPACE],
    long: [u8; LONG_SPACE],
    log: Vec<Transaction>,
    fail_next: bool,
}

#[derive(Clone)]
pub struct SimulatedRadio {
    state: Rc<RefCell<State>>,
}

impl SimulatedRadio {
    pub fn new() -> Self {
        Self {
            state: Rc::new(RefCell::new(State {
                short: [0; SHORT_SPACE],
                long: [0; LONG_SPACE],
                log: Vec::new(),
                fail_next: false,
            })),
        }
    }

    pub fn short(&self, offset: usize) -> u8 {
        self.state.borrow().short[offset]
    }

    pub fn long(&self, address: usize) -> u8 {
        self.state.borrow().long[address]
    }

    pub fn set_short(&self, offset: usize, value: u8) {
        self.state.borrow_mut().short[offset] = value;
    }

    pub fn set_long(&self, address: usize, value: u8) {
        self.state.borrow_mut().long[address] = value;
    }

    /// Places a received frame in the RX FIFO: length byte, frame, LQI, RSSI
    pub fn load_frame(&self, frame: &[u8], link_quality: u8, signal_strength: u8) {
        let mut state = self.state.borrow_mut();
        let len = frame.len();
        state.long[RX_FIFO] = len as u8;
        state.long[RX_FIFO + 1..RX_FIFO + 1 + len].copy_from_slice(frame);
        state.long[RX_FIFO + 1 + len] = link_quality;
        state.long[RX_FIFO + 2 + len] = signal_strength;
    }

    /// Raises interrupt flags; INTSTAT clears when read
    pub fn raise(&self, flags: u8) {
        self.state.borrow_mut().short[INTSTAT] |= flags;
    }

    pub fn fail_next(&self) {
        self.state.borrow_mut().fail_next = true;
    }

    pub fn log(&self) -> Vec<Transaction> {
        self.state.borrow().log.clone()
    }

    pub fn writes(&self) -> Vec<Transaction> {
        self.log().into_iter().filter(|t| t.write).collect()
    }

    pub fn clear_log(&self) {
        self.state.borrow_mut().log.clear();
    }

    fn execute(&mut self, operations: &mut [Operation<'_, u8>]) -> Result<(), ErrorKind> {
        let mut state = self.state.borrow_mut();
        if state.fail_next {
            state.fail_next = false;
            return Err(ErrorKind::Other);
        }

        let (header, rest) = operations.split_first_mut().ok_or(ErrorKind::Other)?;
        let Operation::Write(header) = header else {
            return Err(ErrorKind::Other);
        };
        let (space, address, write) = decode_header(*header)?;

        let mut transaction = Transaction {
            space,
            address,
            write,
            data: Vec::new(),
        };
        let mut cursor = usize::from(address);
        for operation in rest.iter_mut() {
            match operation {
                Operation::Write(bytes) => {
                    for byte in bytes.iter() {
                        *state.cell(space, cursor) = *byte;
                        transaction.data.push(*byte);
                        cursor += 1;
                    }
                }
                Operation::Read(bytes) => {
                    for byte in bytes.iter_mut() {
                        *byte = *state.cell(space, cursor);
                        transaction.data.push(*byte);
                        cursor += 1;
                    }
                }
                _ => return Err(ErrorKind::Other),
            }
        }

        if space == Space::Short && usize::from(address) == INTSTAT && !write {
            state.short[INTSTAT] = 0;
        }
        state.log.push(transaction);
        Ok(())
    }
}

impl State {
    fn cell(&mut self, space: Space, address: usize) -> &mut u8 {
        match space {
            Space::Short => &mut self.short[address % SHORT_SPACE],
            Space::Long => &mut self.long[address % LONG_SPACE],
        }
    }
}

fn decode_header(header: &[u8]) -> Result<(Space, u16, bool), ErrorKind> {
    match header {
        [byte] if byte & 0x80 == 0 => Ok((
            Space::Short,
            u16::from((byte >> 1) & 0x3F),
            byte & 0x01 == 1,
        )),
        [high, low] if high & 0x80 != 0 => {
            let raw = u16::from_be_bytes([*high, *low]);
            Ok((Space::Long, (raw >> 5) & 0x3FF, (raw >> 4) & 0x01 == 1))
        }
        _ => Err(ErrorKind::Other),
    }
}

impl ErrorType for SimulatedRadio {
    type Error = ErrorKind;
}

impl embedded_hal::spi::SpiDevice for SimulatedRadio {
    fn transaction(&mut self, operations: &mut [Operation<'_, u8>]) -> Result<(), Self::Error> {
        self.execute(operations)
    }
}

impl embedded_hal_async::spi::SpiDevice for SimulatedRadio {
    async fn transaction(
        &mut self,
        operations: &mut [Operation<'_, u8>],
    ) -> Result<(), Self::Error> {
        self.execute(operations)
    }
}

/// A frame of `len` bytes whose byte `i` is `seed + i`
pub fn frame(len: usize, seed: u8) -> Vec<u8> {
    (0..len).map(|i| seed.wrapping_add(i as u8)).collect()
}
