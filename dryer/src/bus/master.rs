// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Addressed-bus framing.
//!
//! ```text
//! write: [idle] START  addr+W  ACK  data ACK ... data ACK  STOP
//! read:  [idle] START  addr+R  ACK  data ACK ... data NACK STOP
//! ```
//!
//! Reads acknowledge every byte except the last, which is explicitly not-acknowledged so the
//! peripheral releases the data line before the stop. A frame that fails at any step is still
//! closed with a stop condition.

use super::{BusError, BusEvent, Direction, Step, Transaction, TwoWire};
use crate::wait::spin_until;

/// Blocking bus master over an event-level controller.
pub struct BusMaster<B> {
    bus: B,
    budget: u32,
}

impl<B: TwoWire> BusMaster<B> {
    /// `budget` is the number of polls allowed for each individual wait.
    pub fn new(bus: B, budget: u32) -> Self {
        Self { bus, budget }
    }

    pub fn free(self) -> B {
        self.bus
    }

    /// Write `bytes` to the peripheral at `address`.
    pub fn write(
        &mut self,
        address: u8,
        bytes: &[u8],
        transaction: Transaction,
    ) -> Result<(), BusError> {
        let result = self.write_frame(address, bytes, transaction);
        self.finish();
        result
    }

    /// Fill `buf` from the peripheral at `address`.
    pub fn read(
        &mut self,
        address: u8,
        buf: &mut [u8],
        transaction: Transaction,
    ) -> Result<(), BusError> {
        if buf.is_empty() {
            return Ok(());
        }
        let result = self.read_frame(address, buf, transaction);
        self.finish();
        result
    }

    fn write_frame(
        &mut self,
        address: u8,
        bytes: &[u8],
        transaction: Transaction,
    ) -> Result<(), BusError> {
        self.bus.start();
        self.wait(BusEvent::StartSent, transaction, Step::Start)?;

        self.bus.send_address(address, Direction::Write, bytes.len() as u8);
        self.wait(BusEvent::TransmitterSelected, transaction, Step::Address)?;

        for &byte in bytes {
            self.bus.write_byte(byte);
            self.wait(BusEvent::ByteTransmitted, transaction, Step::Transfer)?;
        }
        Ok(())
    }

    fn read_frame(
        &mut self,
        address: u8,
        buf: &mut [u8],
        transaction: Transaction,
    ) -> Result<(), BusError> {
        let budget = self.budget;
        let bus = &mut self.bus;
        spin_until(budget, || !bus.is_busy())
            .map_err(|_| BusError::new(transaction, Step::BusIdle))?;

        self.bus.start();
        self.wait(BusEvent::StartSent, transaction, Step::Start)?;

        self.bus.send_address(address, Direction::Read, buf.len() as u8);
        self.wait(BusEvent::ReceiverSelected, transaction, Step::Address)?;

        let last = buf.len() - 1;
        for (i, slot) in buf.iter_mut().enumerate() {
            // ACK configuration applies to the byte currently being clocked in.
            self.bus.set_ack(i != last);
            self.wait(BusEvent::ByteReceived, transaction, Step::Transfer)?;
            *slot = self.bus.read_byte();
        }
        Ok(())
    }

    fn wait(
        &mut self,
        event: BusEvent,
        transaction: Transaction,
        step: Step,
    ) -> Result<(), BusError> {
        let budget = self.budget;
        let bus = &mut self.bus;
        spin_until(budget, || bus.check(event)).map_err(|_| BusError::new(transaction, step))
    }

    fn finish(&mut self) {
        self.bus.stop();
        self.bus.clear_flags();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{BusOp, FakeBus};

    const ADDR: u8 = 0x38;

    #[test]
    fn write_frames_start_address_bytes_stop() {
        let mut master = BusMaster::new(FakeBus::new(), 50);
        master
            .write(ADDR, &[0xAC, 0x33, 0x00], Transaction::Trigger)
            .unwrap();

        let bus = master.free();
        assert_eq!(
            bus.ops,
            vec![
                BusOp::Start,
                BusOp::Address(ADDR, Direction::Write, 3),
                BusOp::Write(0xAC),
                BusOp::Write(0x33),
                BusOp::Write(0x00),
                BusOp::Stop,
            ]
        );
    }

    #[test]
    fn read_nacks_only_the_final_byte() {
        let mut bus = FakeBus::new();
        bus.rx.extend([1, 2, 3]);
        let mut master = BusMaster::new(bus, 50);
        let mut buf = [0u8; 3];
        master.read(ADDR, &mut buf, Transaction::Fetch).unwrap();
        assert_eq!(buf, [1, 2, 3]);

        let bus = master.free();
        assert_eq!(
            bus.ops,
            vec![
                BusOp::Start,
                BusOp::Address(ADDR, Direction::Read, 3),
                BusOp::Ack(true),
                BusOp::Ack(true),
                BusOp::Ack(false),
                BusOp::Stop,
            ]
        );
    }

    #[test]
    fn single_byte_read_is_nacked() {
        let mut bus = FakeBus::new();
        bus.rx.push_back(0x18);
        let mut master = BusMaster::new(bus, 50);
        let mut status = [0u8; 1];
        master.read(ADDR, &mut status, Transaction::StatusPoll).unwrap();
        assert_eq!(status, [0x18]);
        assert!(master.free().ops.contains(&BusOp::Ack(false)));
    }

    #[test]
    fn each_write_step_has_its_own_failure() {
        let cases = [
            (BusEvent::StartSent, Step::Start, 22),
            (BusEvent::TransmitterSelected, Step::Address, 23),
            (BusEvent::ByteTransmitted, Step::Transfer, 24),
        ];
        for (event, step, code) in cases {
            let mut master = BusMaster::new(FakeBus::failing(event), 100);
            let err = master
                .write(ADDR, &[0xAC, 0x33, 0x00], Transaction::Trigger)
                .unwrap_err();
            assert_eq!(err, BusError::new(Transaction::Trigger, step));
            assert_eq!(err.code(), code);

            let bus = master.free();
            assert_eq!(bus.ops.last(), Some(&BusOp::Stop));
            assert!(bus.polls <= 100 + 5, "wait exceeded its budget");
        }
    }

    #[test]
    fn each_read_step_has_its_own_failure() {
        let cases = [
            (None, Step::BusIdle, 31),
            (Some(BusEvent::StartSent), Step::Start, 32),
            (Some(BusEvent::ReceiverSelected), Step::Address, 33),
            (Some(BusEvent::ByteReceived), Step::Transfer, 34),
        ];
        for (event, step, code) in cases {
            let mut bus = match event {
                Some(event) => FakeBus::failing(event),
                None => FakeBus::stuck_busy(),
            };
            bus.rx.extend([0u8; 6]);
            let mut master = BusMaster::new(bus, 100);
            let mut buf = [0u8; 6];
            let err = master.read(ADDR, &mut buf, Transaction::Fetch).unwrap_err();
            assert_eq!(err.step, step);
            assert_eq!(err.code(), code);

            let bus = master.free();
            assert_eq!(bus.ops.last(), Some(&BusOp::Stop), "{step:?} left the bus held");
            assert!(bus.polls <= 100 + 10, "wait exceeded its budget");
        }
    }

    #[test]
    fn idle_timeout_still_issues_stop() {
        let mut master = BusMaster::new(FakeBus::stuck_busy(), 20);
        let mut status = [0u8; 1];
        let err = master
            .read(ADDR, &mut status, Transaction::StatusPoll)
            .unwrap_err();
        assert_eq!(err.code(), 11);
        assert_eq!(master.free().ops, vec![BusOp::Stop]);
    }

    #[test]
    fn empty_read_touches_nothing() {
        let mut master = BusMaster::new(FakeBus::new(), 10);
        master.read(ADDR, &mut [], Transaction::Fetch).unwrap();
        assert!(master.free().ops.is_empty());
    }
}
