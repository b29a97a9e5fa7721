// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # Two-Wire Bus
//!
//! Blocking master for an addressed two-wire (I2C) bus.
//!
//! The MCU-specific controller is hidden behind [`TwoWire`], a thin event-level interface: the
//! master issues a framing action (start, address, data byte, stop) and then polls for the
//! matching [`BusEvent`]. Every poll is bounded by a fixed iteration budget; a wait that runs out
//! becomes a [`BusError`] naming the transaction and the step, so each failure point has its own
//! stable number.
//!
//! ## Modules
//!
//! - [`master`] - Start/address/data/stop framing on top of [`TwoWire`].

pub mod master;

pub use master::BusMaster;

use thiserror::Error;

/// Transfer direction encoded in the address byte.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Direction {
    Write,
    Read,
}

impl Direction {
    /// 8-bit address header for a 7-bit peripheral address.
    #[inline]
    pub fn header(self, address: u8) -> u8 {
        match self {
            Direction::Write => address << 1,
            Direction::Read => (address << 1) | 1,
        }
    }
}

/// Controller conditions the master waits for.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BusEvent {
    /// Start condition is on the wire; the controller owns the bus.
    StartSent,
    /// Peripheral acknowledged its address for writing.
    TransmitterSelected,
    /// Peripheral acknowledged its address for reading.
    ReceiverSelected,
    /// A data byte was shifted out and acknowledged.
    ByteTransmitted,
    /// A data byte is waiting in the receive register.
    ByteReceived,
}

/// Event-level access to a two-wire bus controller.
///
/// Implementations must not block. Every method either performs one register action or reports
/// whether a condition currently holds.
pub trait TwoWire {
    /// Another transfer is still in progress on the bus.
    fn is_busy(&mut self) -> bool;

    /// Request a start condition.
    fn start(&mut self);

    /// Send the address header. `len` is the number of data bytes that follow, for controllers
    /// that need it up front.
    fn send_address(&mut self, address: u8, direction: Direction, len: u8);

    fn write_byte(&mut self, byte: u8);

    fn read_byte(&mut self) -> u8;

    /// Acknowledge (true) or not-acknowledge (false) the next received byte.
    fn set_ack(&mut self, ack: bool);

    /// Request a stop condition.
    fn stop(&mut self);

    /// Whether `event` has occurred.
    fn check(&mut self, event: BusEvent) -> bool;

    /// Clear sticky status left over from the last transfer.
    fn clear_flags(&mut self) {}
}

/// Sensor transaction a failure belongs to.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Transaction {
    /// Reset/wake command during initialization.
    Wake,
    /// One-byte status read while a measurement is in progress.
    StatusPoll,
    /// Three-byte measurement trigger.
    Trigger,
    /// Six-byte data read.
    Fetch,
}

impl Transaction {
    fn base(self) -> u8 {
        match self {
            Transaction::Wake => 0,
            Transaction::StatusPoll => 10,
            Transaction::Trigger => 20,
            Transaction::Fetch => 30,
        }
    }
}

/// Protocol step a failure occurred at.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Step {
    /// Bus never went idle before the start.
    BusIdle,
    /// Start condition was not confirmed.
    Start,
    /// Peripheral did not acknowledge its address.
    Address,
    /// A data byte was not transferred.
    Transfer,
    /// Peripheral still reported busy after the status-poll limit.
    Busy,
}

impl Step {
    fn offset(self) -> u8 {
        match self {
            Step::BusIdle => 1,
            Step::Start => 2,
            Step::Address => 3,
            Step::Transfer => 4,
            Step::Busy => 5,
        }
    }
}

/// A bus wait exceeded its budget at a specific step of a specific transaction.
#[derive(Copy, Clone, Debug, Error, PartialEq, Eq)]
#[error("{transaction:?} transaction failed at {step:?} step")]
pub struct BusError {
    pub transaction: Transaction,
    pub step: Step,
}

impl BusError {
    pub fn new(transaction: Transaction, step: Step) -> Self {
        Self { transaction, step }
    }

    /// Two-digit failure number shown on the display.
    #[inline]
    pub fn code(&self) -> u8 {
        self.transaction.base() + self.step.offset()
    }
}
