// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Holtek TM1621 segment LCD controller.
//!
//! The controller is driven over three GPIO lines (CS, WR, DATA); a fourth output switches the
//! backlight. Data is clocked MSB first on the rising edge of WR while CS is low.
//!
//! Frame formats:
//!
//! ```text
//! command (12 bits): 1 0 0 | c8 .. c0
//! write   (13 bits): 1 0 1 | a5 .. a0 | d3 .. d0
//! ```
//!
//! The driver keeps an 18-nibble shadow of the display RAM and rewrites all of it after every
//! change. RAM layout on this panel:
//!
//! | Address | Bit 3 | Bit 2 | Bit 1 | Bit 0 |
//! | ------- | ----- | ----- | ----- | ----- |
//! | 0..=5, 13 | digit 0 | digit 1 | digit 2 | digit 3 |
//! | 14 | °C | % | TEMP | WORK |
//! | 15 | colon | TIME | - | - |
//!
//! Addresses 0..=5 carry segments a..f, address 13 carries segment g.

use embedded_hal::digital::v2::OutputPin;

use super::switch::Switch;
use crate::display::{glyph, DisplaySink, Indicator, BLANK};

pub mod cmd {
    pub const SYS_EN: u16 = 0b1000_0000_0010;
    pub const LCD_ON: u16 = 0b1000_0000_0110;
    pub const BIAS_1_2_4COM: u16 = 0b1000_0101_0000;
    pub const TNORMAL: u16 = 0b1001_1100_0110;
    pub const WRITE: u16 = 0b1_0100_0000_0000;
}

/// Number of 4-bit RAM addresses in use.
pub const RAM_NIBBLES: usize = 18;

/// Seven-segment bitmaps (`gfedcba`) for 0..=9.
pub const DIGITS: [u8; 10] = [
    0b011_1111, 0b000_0110, 0b101_1011, 0b100_1111, 0b110_0110, 0b110_1101, 0b111_1101, 0b000_0111,
    0b111_1111, 0b110_1111,
];

const SEGMENT_ADDRESS: [usize; 7] = [0, 1, 2, 3, 4, 5, 13];

const COMMAND_FLAG: u16 = 1 << 11;

pub struct Tm1621<CS, WR, DATA, BL>
where
    CS: OutputPin,
    WR: OutputPin,
    DATA: OutputPin,
    BL: OutputPin,
{
    cs: CS,
    wr: WR,
    data: DATA,
    backlight: Switch<BL>,
    ram: [u8; RAM_NIBBLES],
}

impl<CS, WR, DATA, BL> Tm1621<CS, WR, DATA, BL>
where
    CS: OutputPin,
    WR: OutputPin,
    DATA: OutputPin,
    BL: OutputPin,
{
    /// Take the lines (idle low) and a backlight switch. Call [`init`](Self::init) before use.
    pub fn new(mut cs: CS, mut wr: WR, mut data: DATA, backlight: Switch<BL>) -> Self {
        cs.set_low().ok();
        wr.set_low().ok();
        data.set_low().ok();
        Self {
            cs,
            wr,
            data,
            backlight,
            ram: [0; RAM_NIBBLES],
        }
    }

    /// Enable the oscillator and LCD bias generator.
    pub fn init(&mut self) {
        for command in [cmd::SYS_EN, cmd::LCD_ON, cmd::BIAS_1_2_4COM, cmd::TNORMAL] {
            self.send(command);
        }
    }

    /// Current shadow RAM contents.
    #[inline]
    pub fn ram(&self) -> &[u8; RAM_NIBBLES] {
        &self.ram
    }

    #[inline]
    pub fn backlight_on(&self) -> bool {
        self.backlight.is_on()
    }

    /// Place a segment bitmap into digit position `pos` (0 = leftmost) of the shadow RAM.
    pub fn put_segments(&mut self, pos: usize, segments: u8) {
        let mask = 1u8 << (3 - pos);
        for (bit, &addr) in SEGMENT_ADDRESS.iter().enumerate() {
            if segments & (1 << bit) != 0 {
                self.ram[addr] |= mask;
            } else {
                self.ram[addr] &= !mask;
            }
        }
    }

    /// Write the whole shadow RAM to the controller.
    pub fn flush(&mut self) {
        for addr in 0..RAM_NIBBLES {
            let frame = cmd::WRITE | (addr as u16) << 4 | self.ram[addr] as u16;
            self.send(frame);
        }
    }

    fn send(&mut self, frame: u16) {
        let top = if frame & COMMAND_FLAG != 0 { 11 } else { 12 };

        self.cs.set_low().ok();
        for bit in (0..=top).rev() {
            if frame & (1 << bit) != 0 {
                self.data.set_high().ok();
            } else {
                self.data.set_low().ok();
            }
            self.wr.set_low().ok();
            self.wr.set_high().ok();
        }
        self.data.set_high().ok();
        self.cs.set_high().ok();
    }
}

impl<CS, WR, DATA, BL> DisplaySink for Tm1621<CS, WR, DATA, BL>
where
    CS: OutputPin,
    WR: OutputPin,
    DATA: OutputPin,
    BL: OutputPin,
{
    fn clear(&mut self) {
        self.ram = [0; RAM_NIBBLES];
        self.flush();
    }

    fn set_digit_pair(&mut self, left: u8, right: u8) {
        let digits = [left / 10, left % 10, right / 10, right % 10];
        let start = if left == BLANK { 2 } else { 0 };
        let stop = if right == BLANK { 2 } else { 4 };

        for pos in start..stop {
            let segments = DIGITS.get(digits[pos] as usize).copied().unwrap_or(0);
            self.put_segments(pos, segments);
        }
        self.flush();
    }

    fn set_indicator(&mut self, indicator: Indicator, on: bool) {
        let (addr, bit) = match indicator {
            Indicator::Degree => (14, 3),
            Indicator::Percent => (14, 2),
            Indicator::TempLabel => (14, 1),
            Indicator::WorkLabel => (14, 0),
            Indicator::Colon => (15, 3),
            Indicator::TimeLabel => (15, 2),
        };
        if on {
            self.ram[addr] |= 1 << bit;
        } else {
            self.ram[addr] &= !(1 << bit);
        }
        self.flush();
    }

    fn set_backlight(&mut self, on: bool) {
        self.backlight.set(on);
    }

    fn print_prefixed_number(&mut self, prefix: u8, number: u16) {
        self.put_segments(0, prefix);

        if number > 999 {
            for pos in 1..4 {
                self.put_segments(pos, glyph::DASH);
            }
        } else {
            let hundreds = (number / 100) as usize;
            let tens = (number % 100 / 10) as usize;
            let ones = (number % 10) as usize;

            // Leading zeros are blanked, the last digit always shows.
            self.put_segments(1, if hundreds == 0 { 0 } else { DIGITS[hundreds] });
            self.put_segments(2, if hundreds == 0 && tens == 0 { 0 } else { DIGITS[tens] });
            self.put_segments(3, DIGITS[ones]);
        }
        self.flush();
    }

    fn print_error(&mut self, code: u8) {
        self.clear();

        self.put_segments(0, glyph::E);
        self.put_segments(1, glyph::R);
        if code < 99 {
            self.put_segments(2, DIGITS[(code / 10) as usize]);
            self.put_segments(3, DIGITS[(code % 10) as usize]);
        } else {
            self.put_segments(2, glyph::E);
            self.put_segments(3, glyph::R);
        }
        self.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakePin, Trace};

    const CS: u8 = 0;
    const WR: u8 = 1;
    const DATA: u8 = 2;

    type TestLcd = Tm1621<FakePin, FakePin, FakePin, FakePin>;

    fn lcd() -> (TestLcd, Trace, FakePin) {
        let trace = Trace::new();
        let backlight = FakePin::new(false);
        let backlight_pin = backlight.clone();
        let lcd = Tm1621::new(
            FakePin::traced(CS, &trace),
            FakePin::traced(WR, &trace),
            FakePin::traced(DATA, &trace),
            Switch::active_high(backlight),
        );
        trace.clear();
        (lcd, trace, backlight_pin)
    }

    /// Reassemble (bit count, value) frames from the recorded line activity.
    fn frames(trace: &Trace) -> Vec<(u8, u16)> {
        let mut out = Vec::new();
        let mut data = false;
        let mut current: Option<(u8, u16)> = None;
        for (line, level) in trace.events() {
            match (line, level) {
                (CS, false) => current = Some((0, 0)),
                (CS, true) => out.extend(current.take()),
                (DATA, level) => data = level,
                (WR, true) => {
                    if let Some((len, value)) = current.as_mut() {
                        *len += 1;
                        *value = (*value << 1) | data as u16;
                    }
                }
                _ => {}
            }
        }
        out
    }

    fn digit_at(ram: &[u8; RAM_NIBBLES], pos: usize) -> u8 {
        let mask = 1 << (3 - pos);
        SEGMENT_ADDRESS
            .iter()
            .enumerate()
            .filter(|&(_, &addr)| ram[addr] & mask != 0)
            .fold(0, |acc, (bit, _)| acc | 1 << bit)
    }

    #[test]
    fn init_sends_twelve_bit_commands() {
        let (mut lcd, trace, _) = lcd();
        lcd.init();
        assert_eq!(
            frames(&trace),
            vec![
                (12, cmd::SYS_EN),
                (12, cmd::LCD_ON),
                (12, cmd::BIAS_1_2_4COM),
                (12, cmd::TNORMAL),
            ]
        );
    }

    #[test]
    fn flush_writes_every_nibble_with_thirteen_bit_frames() {
        let (mut lcd, trace, _) = lcd();
        lcd.set_indicator(Indicator::Colon, true);

        let frames = frames(&trace);
        assert_eq!(frames.len(), RAM_NIBBLES);
        assert!(frames.iter().all(|&(len, _)| len == 13));
        assert_eq!(frames[15].1, cmd::WRITE | 15 << 4 | 0b1000);
        assert_eq!(frames[14].1, cmd::WRITE | 14 << 4);
    }

    #[test]
    fn digit_pair_renders_both_halves() {
        let (mut lcd, _, _) = lcd();
        lcd.set_digit_pair(45, 7);
        let ram = *lcd.ram();
        assert_eq!(digit_at(&ram, 0), DIGITS[4]);
        assert_eq!(digit_at(&ram, 1), DIGITS[5]);
        assert_eq!(digit_at(&ram, 2), DIGITS[0]);
        assert_eq!(digit_at(&ram, 3), DIGITS[7]);
    }

    #[test]
    fn blank_sentinel_leaves_pair_untouched() {
        let (mut lcd, _, _) = lcd();
        lcd.set_digit_pair(12, 34);
        lcd.set_digit_pair(BLANK, 56);
        let ram = *lcd.ram();
        assert_eq!(digit_at(&ram, 0), DIGITS[1]);
        assert_eq!(digit_at(&ram, 1), DIGITS[2]);
        assert_eq!(digit_at(&ram, 2), DIGITS[5]);
        assert_eq!(digit_at(&ram, 3), DIGITS[6]);
    }

    #[test]
    fn indicators_map_to_their_bits() {
        let (mut lcd, _, _) = lcd();
        for indicator in Indicator::ALL {
            lcd.set_indicator(indicator, true);
        }
        assert_eq!(lcd.ram()[14], 0b1111);
        assert_eq!(lcd.ram()[15], 0b1100);

        lcd.set_indicator(Indicator::Percent, false);
        assert_eq!(lcd.ram()[14], 0b1011);
    }

    #[test]
    fn prefixed_number_blanks_leading_zeros() {
        let (mut lcd, _, _) = lcd();
        lcd.print_prefixed_number(glyph::H, 7);
        let ram = *lcd.ram();
        assert_eq!(digit_at(&ram, 0), glyph::H);
        assert_eq!(digit_at(&ram, 1), 0);
        assert_eq!(digit_at(&ram, 2), 0);
        assert_eq!(digit_at(&ram, 3), DIGITS[7]);

        lcd.print_prefixed_number(glyph::H, 105);
        let ram = *lcd.ram();
        assert_eq!(digit_at(&ram, 1), DIGITS[1]);
        assert_eq!(digit_at(&ram, 2), DIGITS[0]);
        assert_eq!(digit_at(&ram, 3), DIGITS[5]);
    }

    #[test]
    fn prefixed_number_overflow_shows_dashes() {
        let (mut lcd, _, _) = lcd();
        lcd.print_prefixed_number(glyph::H, 1000);
        let ram = *lcd.ram();
        for pos in 1..4 {
            assert_eq!(digit_at(&ram, pos), glyph::DASH);
        }
    }

    #[test]
    fn error_codes() {
        let (mut lcd, _, _) = lcd();
        lcd.set_indicator(Indicator::WorkLabel, true);
        lcd.print_error(51);
        let ram = *lcd.ram();
        assert_eq!(digit_at(&ram, 0), glyph::E);
        assert_eq!(digit_at(&ram, 1), glyph::R);
        assert_eq!(digit_at(&ram, 2), DIGITS[5]);
        assert_eq!(digit_at(&ram, 3), DIGITS[1]);
        assert_eq!(ram[14], 0, "error screen clears indicators");

        lcd.print_error(99);
        let ram = *lcd.ram();
        assert_eq!(digit_at(&ram, 2), glyph::E);
        assert_eq!(digit_at(&ram, 3), glyph::R);
    }

    #[test]
    fn backlight_goes_through_switch() {
        let (mut lcd, _, backlight_pin) = lcd();
        lcd.set_backlight(true);
        assert!(backlight_pin.level().get());
        assert!(lcd.backlight_on());
        lcd.set_backlight(false);
        assert!(!backlight_pin.level().get());
    }
}
