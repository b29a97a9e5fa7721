// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! On/off outputs (heater relay, fan, beeper, backlight, key indicators).
//!
//! A [`Switch`] remembers the board wiring polarity so callers only ever deal in logical on/off.

use embedded_hal::digital::v2::{InputPin, OutputPin};

/// Whether a line is driven/read active-high or active-low on the board wiring.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ActiveLevel {
    High,
    Low,
}

impl ActiveLevel {
    /// Logical state of an input pin under this polarity. Read errors count as inactive.
    pub fn is_asserted<PIN: InputPin>(self, pin: &PIN) -> bool {
        match self {
            ActiveLevel::High => pin.is_high().unwrap_or(false),
            ActiveLevel::Low => pin.is_low().unwrap_or(false),
        }
    }
}

/// Logical output that remembers its active level and last commanded state.
pub struct Switch<PIN: OutputPin> {
    pin: PIN,
    active: ActiveLevel,
    is_on: bool,
}

impl<PIN: OutputPin> Switch<PIN> {
    /// Create a switch, initializing it to OFF.
    pub fn new(mut pin: PIN, active: ActiveLevel) -> Self {
        match active {
            ActiveLevel::High => pin.set_low().ok(),
            ActiveLevel::Low => pin.set_high().ok(),
        };
        Self {
            pin,
            active,
            is_on: false,
        }
    }

    pub fn active_high(pin: PIN) -> Self {
        Self::new(pin, ActiveLevel::High)
    }

    pub fn active_low(pin: PIN) -> Self {
        Self::new(pin, ActiveLevel::Low)
    }

    /// Drive the output logically ON (true) or OFF (false).
    pub fn set(&mut self, on: bool) {
        match (self.active, on) {
            (ActiveLevel::High, true) => self.pin.set_high().ok(),
            (ActiveLevel::High, false) => self.pin.set_low().ok(),
            (ActiveLevel::Low, true) => self.pin.set_low().ok(),
            (ActiveLevel::Low, false) => self.pin.set_high().ok(),
        };
        self.is_on = on;
    }

    #[inline]
    pub fn on(&mut self) {
        self.set(true);
    }

    #[inline]
    pub fn off(&mut self) {
        self.set(false);
    }

    #[inline]
    pub fn is_on(&self) -> bool {
        self.is_on
    }
}
