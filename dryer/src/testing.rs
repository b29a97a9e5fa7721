// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Host-side fakes shared by the unit tests.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::convert::Infallible;
use std::rc::Rc;

use embedded_hal::blocking::delay::DelayMs;
use embedded_hal::digital::v2::{InputPin, OutputPin};

use crate::bus::{BusEvent, Direction, TwoWire};
use crate::control::Actuators;
use crate::display::{DisplaySink, Indicator};
use crate::keys::KeyId;
use crate::settings::{EraseRegion, SettingsMedium, BLOCK_LEN, ERASED};

/// Ordered log of `(line id, level)` writes across several traced pins.
#[derive(Clone, Default)]
pub struct Trace {
    events: Rc<RefCell<Vec<(u8, bool)>>>,
}

impl Trace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<(u8, bool)> {
        self.events.borrow().clone()
    }

    pub fn clear(&self) {
        self.events.borrow_mut().clear();
    }
}

/// GPIO line whose level is shared with the test through [`FakePin::level`].
#[derive(Clone)]
pub struct FakePin {
    level: Rc<Cell<bool>>,
    trace: Option<(u8, Trace)>,
}

impl FakePin {
    pub fn new(high: bool) -> Self {
        Self {
            level: Rc::new(Cell::new(high)),
            trace: None,
        }
    }

    /// Output that appends every write to `trace` under `id`.
    pub fn traced(id: u8, trace: &Trace) -> Self {
        Self {
            level: Rc::new(Cell::new(false)),
            trace: Some((id, trace.clone())),
        }
    }

    pub fn level(&self) -> Rc<Cell<bool>> {
        self.level.clone()
    }

    fn drive(&mut self, high: bool) {
        self.level.set(high);
        if let Some((id, trace)) = &self.trace {
            trace.events.borrow_mut().push((*id, high));
        }
    }
}

impl InputPin for FakePin {
    type Error = Infallible;

    fn is_high(&self) -> Result<bool, Self::Error> {
        Ok(self.level.get())
    }

    fn is_low(&self) -> Result<bool, Self::Error> {
        Ok(!self.level.get())
    }
}

impl OutputPin for FakePin {
    type Error = Infallible;

    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.drive(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.drive(true);
        Ok(())
    }
}

/// Framing actions recorded by [`FakeBus`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BusOp {
    Start,
    Address(u8, Direction, u8),
    Write(u8),
    Ack(bool),
    Stop,
}

/// How [`FakeBus`] answers checks for one scripted event.
#[derive(Copy, Clone, Debug)]
enum Script {
    /// Never occurs.
    Never(BusEvent),
    /// Occurs for the first `n` checks, then never.
    After(BusEvent, u32),
    /// Does not occur for the first `n` checks, then always.
    Times(BusEvent, u32),
}

/// Scripted two-wire controller. Every event occurs immediately unless scripted otherwise.
pub struct FakeBus {
    pub ops: Vec<BusOp>,
    pub rx: VecDeque<u8>,
    /// Number of `check`/`is_busy` calls.
    pub polls: u32,
    busy: bool,
    script: Option<Script>,
}

impl FakeBus {
    pub fn new() -> Self {
        Self {
            ops: Vec::new(),
            rx: VecDeque::new(),
            polls: 0,
            busy: false,
            script: None,
        }
    }

    /// `event` never occurs.
    pub fn failing(event: BusEvent) -> Self {
        Self {
            script: Some(Script::Never(event)),
            ..Self::new()
        }
    }

    /// `event` occurs for its first `n` checks and never afterwards.
    pub fn failing_after(event: BusEvent, n: u32) -> Self {
        Self {
            script: Some(Script::After(event, n)),
            ..Self::new()
        }
    }

    /// `event` fails its first `n` checks and occurs afterwards.
    pub fn failing_times(event: BusEvent, n: u32) -> Self {
        Self {
            script: Some(Script::Times(event, n)),
            ..Self::new()
        }
    }

    /// The bus never goes idle.
    pub fn stuck_busy() -> Self {
        Self {
            busy: true,
            ..Self::new()
        }
    }
}

impl TwoWire for FakeBus {
    fn is_busy(&mut self) -> bool {
        self.polls += 1;
        self.busy
    }

    fn start(&mut self) {
        self.ops.push(BusOp::Start);
    }

    fn send_address(&mut self, address: u8, direction: Direction, len: u8) {
        self.ops.push(BusOp::Address(address, direction, len));
    }

    fn write_byte(&mut self, byte: u8) {
        self.ops.push(BusOp::Write(byte));
    }

    fn read_byte(&mut self) -> u8 {
        self.rx.pop_front().unwrap_or(0)
    }

    fn set_ack(&mut self, ack: bool) {
        self.ops.push(BusOp::Ack(ack));
    }

    fn stop(&mut self) {
        self.ops.push(BusOp::Stop);
    }

    fn check(&mut self, event: BusEvent) -> bool {
        self.polls += 1;
        match self.script.as_mut() {
            Some(Script::Never(e)) if *e == event => false,
            Some(Script::After(e, n)) if *e == event => {
                if *n == 0 {
                    false
                } else {
                    *n -= 1;
                    true
                }
            }
            Some(Script::Times(e, n)) if *e == event => {
                if *n == 0 {
                    true
                } else {
                    *n -= 1;
                    false
                }
            }
            _ => true,
        }
    }
}

/// Delay that only accumulates the requested time.
#[derive(Default)]
pub struct StepDelay {
    pub total_ms: u32,
}

impl DelayMs<u32> for StepDelay {
    fn delay_ms(&mut self, ms: u32) {
        self.total_ms += ms;
    }
}

impl DelayMs<u16> for StepDelay {
    fn delay_ms(&mut self, ms: u16) {
        self.total_ms += ms as u32;
    }
}

/// Last content pushed to [`RecordingDisplay`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Shown {
    Pair(u8, u8),
    Prefixed(u8, u16),
    Error(u8),
}

/// Display sink that keeps the logical state of the panel.
#[derive(Default)]
pub struct RecordingDisplay {
    pub shown: Option<Shown>,
    pub indicators: [bool; 6],
    pub backlight: bool,
    pub clears: u32,
}

impl RecordingDisplay {
    pub fn indicator(&self, indicator: Indicator) -> bool {
        self.indicators[Self::slot(indicator)]
    }

    fn slot(indicator: Indicator) -> usize {
        Indicator::ALL
            .iter()
            .position(|&i| i == indicator)
            .unwrap_or(0)
    }
}

impl DisplaySink for RecordingDisplay {
    fn clear(&mut self) {
        self.shown = None;
        self.indicators = [false; 6];
        self.clears += 1;
    }

    fn set_digit_pair(&mut self, left: u8, right: u8) {
        self.shown = Some(Shown::Pair(left, right));
    }

    fn set_indicator(&mut self, indicator: Indicator, on: bool) {
        self.indicators[Self::slot(indicator)] = on;
    }

    fn set_backlight(&mut self, on: bool) {
        self.backlight = on;
    }

    fn print_prefixed_number(&mut self, prefix: u8, number: u16) {
        self.shown = Some(Shown::Prefixed(prefix, number));
    }

    fn print_error(&mut self, code: u8) {
        self.clear();
        self.shown = Some(Shown::Error(code));
    }
}

/// Actuator outputs as plain flags.
#[derive(Default)]
pub struct FakeActuators {
    pub heater: bool,
    pub fan: bool,
    pub beeper: bool,
    pub indicators: [bool; 3],
    /// Number of beeper switch-on commands.
    pub beeps: u32,
}

impl Actuators for FakeActuators {
    fn set_heater(&mut self, on: bool) {
        self.heater = on;
    }

    fn set_fan(&mut self, on: bool) {
        self.fan = on;
    }

    fn set_beeper(&mut self, on: bool) {
        if on {
            self.beeps += 1;
        }
        self.beeper = on;
    }

    fn set_key_indicator(&mut self, key: KeyId, on: bool) {
        self.indicators[key.index()] = on;
    }
}

#[derive(Debug)]
pub struct MediumFault;

/// Settings medium backed by a byte array.
pub struct MemoryMedium {
    pub block: [u8; BLOCK_LEN],
    pub writes: u32,
    pub broken: bool,
}

impl MemoryMedium {
    pub fn new() -> Self {
        // Erased flash.
        Self::with_block([0xFF; BLOCK_LEN])
    }

    pub fn with_block(block: [u8; BLOCK_LEN]) -> Self {
        Self {
            block,
            writes: 0,
            broken: false,
        }
    }
}

impl SettingsMedium for MemoryMedium {
    type Error = MediumFault;

    fn read(&mut self, buf: &mut [u8; BLOCK_LEN]) -> Result<(), Self::Error> {
        if self.broken {
            return Err(MediumFault);
        }
        *buf = self.block;
        Ok(())
    }

    fn write(&mut self, block: &[u8; BLOCK_LEN]) -> Result<(), Self::Error> {
        if self.broken {
            return Err(MediumFault);
        }
        self.block = *block;
        self.writes += 1;
        Ok(())
    }
}

/// Erasable region backed by a byte vector. Programming ANDs into the stored bytes like flash.
pub struct MemoryRegion {
    pub bytes: Vec<u8>,
    pub erases: u32,
    /// Number of `read` calls.
    pub reads: u32,
}

impl MemoryRegion {
    pub fn new(len: usize) -> Self {
        Self {
            bytes: vec![ERASED; len],
            erases: 0,
            reads: 0,
        }
    }
}

impl EraseRegion for MemoryRegion {
    type Error = MediumFault;

    fn capacity(&self) -> usize {
        self.bytes.len()
    }

    fn read(&mut self, offset: usize, buf: &mut [u8]) -> Result<(), Self::Error> {
        self.reads += 1;
        let src = self.bytes.get(offset..offset + buf.len()).ok_or(MediumFault)?;
        buf.copy_from_slice(src);
        Ok(())
    }

    fn program(&mut self, offset: usize, bytes: &[u8]) -> Result<(), Self::Error> {
        let dst = self
            .bytes
            .get_mut(offset..offset + bytes.len())
            .ok_or(MediumFault)?;
        for (d, &b) in dst.iter_mut().zip(bytes) {
            *d &= b;
        }
        Ok(())
    }

    fn erase(&mut self) -> Result<(), Self::Error> {
        self.bytes.fill(ERASED);
        self.erases += 1;
        Ok(())
    }
}
