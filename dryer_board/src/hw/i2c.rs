// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! I2C1 controller as an event-level [`TwoWire`] bus, using direct PAC register access.
//!
//! The STM32F7 peripheral sends the start condition together with the address header and needs
//! the transfer length up front, so [`TwoWire::start`] only clears stale flags and the start bit is
//! raised in [`TwoWire::send_address`]. Receive NACK of the final byte is automatic once NBYTES is
//! reached, which makes [`TwoWire::set_ack`] a no-op.
//!
//! | Event | Condition |
//! | ----- | --------- |
//! | `StartSent` | bus not busy |
//! | `TransmitterSelected` | TXIS |
//! | `ReceiverSelected` | CR2.START cleared, no NACKF |
//! | `ByteTransmitted` | TXIS or TC |
//! | `ByteReceived` | RXNE |

use dryer::bus::{BusEvent, Direction, TwoWire};
use stm32f7xx_hal::pac;

use super::pins::I2c1Pins;

/// 400 kHz from a 16 MHz kernel clock (PRESC 1, SCLDEL 3, SDADEL 2, SCLH 3, SCLL 9).
const TIMING_400K_16MHZ: u32 = 0x1032_0309;

// ----- ISR bits -----
const ISR_TXIS: u32 = 1 << 1;
const ISR_RXNE: u32 = 1 << 2;
const ISR_NACKF: u32 = 1 << 4;
const ISR_TC: u32 = 1 << 6;
const ISR_BUSY: u32 = 1 << 15;

// ----- CR2 bits -----
const CR2_RD_WRN: u32 = 1 << 10;
const CR2_START: u32 = 1 << 13;
const CR2_STOP: u32 = 1 << 14;
const CR2_NBYTES_SHIFT: u32 = 16;

// ----- ICR bits -----
const ICR_NACKCF: u32 = 1 << 4;
const ICR_STOPCF: u32 = 1 << 5;

pub struct I2c1 {
    i2c: pac::I2C1,
    _pins: I2c1Pins,
}

impl I2c1 {
    /// Enable and configure I2C1 for 400 kHz standard addressing.
    pub fn new(i2c: pac::I2C1, pins: I2c1Pins) -> Self {
        let rcc = unsafe { &*pac::RCC::ptr() };
        rcc.apb1enr.modify(|_, w| w.i2c1en().set_bit());

        i2c.cr1.modify(|_, w| w.pe().clear_bit());
        i2c.timingr
            .write(|w| unsafe { w.bits(TIMING_400K_16MHZ) });
        i2c.cr1.modify(|_, w| w.pe().set_bit());

        Self { i2c, _pins: pins }
    }

    #[inline]
    fn isr(&self) -> u32 {
        self.i2c.isr.read().bits()
    }
}

impl TwoWire for I2c1 {
    fn is_busy(&mut self) -> bool {
        self.isr() & ISR_BUSY != 0
    }

    fn start(&mut self) {
        self.clear_flags();
    }

    fn send_address(&mut self, address: u8, direction: Direction, len: u8) {
        let mut cr2 = u32::from(direction.header(address))
            | (u32::from(len) << CR2_NBYTES_SHIFT)
            | CR2_START;
        if let Direction::Read = direction {
            cr2 |= CR2_RD_WRN;
        }
        self.i2c.cr2.write(|w| unsafe { w.bits(cr2) });
    }

    fn write_byte(&mut self, byte: u8) {
        self.i2c.txdr.write(|w| unsafe { w.bits(u32::from(byte)) });
    }

    fn read_byte(&mut self) -> u8 {
        self.i2c.rxdr.read().bits() as u8
    }

    fn set_ack(&mut self, _ack: bool) {}

    fn stop(&mut self) {
        if self.is_busy() {
            self.i2c
                .cr2
                .modify(|r, w| unsafe { w.bits(r.bits() | CR2_STOP) });
        }
    }

    fn check(&mut self, event: BusEvent) -> bool {
        let isr = self.isr();
        match event {
            BusEvent::StartSent => isr & ISR_BUSY == 0,
            BusEvent::TransmitterSelected => isr & ISR_TXIS != 0,
            BusEvent::ReceiverSelected => {
                self.i2c.cr2.read().bits() & CR2_START == 0 && isr & ISR_NACKF == 0
            }
            BusEvent::ByteTransmitted => isr & (ISR_TXIS | ISR_TC) != 0,
            BusEvent::ByteReceived => isr & ISR_RXNE != 0,
        }
    }

    fn clear_flags(&mut self) {
        self.i2c
            .icr
            .write(|w| unsafe { w.bits(ICR_NACKCF | ICR_STOPCF) });
    }
}
