// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Display sink used by the controller.
//!
//! The panel is a four-digit seven-segment LCD with a handful of fixed indicator glyphs and a
//! switchable backlight. Digits are addressed as two pairs (left and right).

/// Digit-pair value meaning "leave this pair blank".
pub const BLANK: u8 = 0xFF;

/// Segment bitmaps (`gfedcba`) for the leading glyph of [`DisplaySink::print_prefixed_number`].
pub mod glyph {
    pub const H: u8 = 0b111_0110;
    pub const E: u8 = 0b111_1001;
    pub const R: u8 = 0b101_0000;
    pub const DASH: u8 = 0b100_0000;
}

/// Fixed indicator glyphs on the panel.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Indicator {
    Degree,
    Percent,
    TempLabel,
    WorkLabel,
    Colon,
    TimeLabel,
}

impl Indicator {
    pub const ALL: [Indicator; 6] = [
        Indicator::Degree,
        Indicator::Percent,
        Indicator::TempLabel,
        Indicator::WorkLabel,
        Indicator::Colon,
        Indicator::TimeLabel,
    ];
}

/// Output side of the segment display.
pub trait DisplaySink {
    /// Blank every segment and indicator.
    fn clear(&mut self);

    /// Show two two-digit values; [`BLANK`] leaves that pair untouched.
    fn set_digit_pair(&mut self, left: u8, right: u8);

    fn set_indicator(&mut self, indicator: Indicator, on: bool);

    fn set_backlight(&mut self, on: bool);

    /// A custom leading glyph followed by up to three digits. Values of 1000 and above show dashes.
    fn print_prefixed_number(&mut self, prefix: u8, number: u16);

    /// `Er` followed by a two-digit code, or `ErEr` if the code does not fit.
    fn print_error(&mut self, code: u8);
}
