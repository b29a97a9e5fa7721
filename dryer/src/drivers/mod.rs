// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # Device-Specific Drivers
//!
//! This module contains device-specific drivers that sit above the bus and pin abstractions and
//! below the control logic.
//!
//! ## Existing drivers
//!
//! - [`aht20`] – Aosong AHT20 temperature/humidity sensor on the two-wire bus
//! - [`tm1621`] – Holtek TM1621 segment LCD controller, bit-banged over three GPIO lines
//! - [`switch`] – Polarity-aware on/off outputs (heater, fan, beeper, key indicators)

pub mod aht20;
pub mod switch;
pub mod tm1621;

pub use aht20::{Aht20, SensorReading};
pub use switch::{ActiveLevel, Switch};
pub use tm1621::Tm1621;
