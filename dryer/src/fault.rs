// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Fault taxonomy.
//!
//! Every fault forces the heater off and shows a two-digit code on the display. Bus faults are
//! numbered per transaction and step (see [`BusError::code`]); limiter faults share code 51.

use thiserror::Error;

use crate::bus::BusError;
use crate::config::FAULT_PAUSE_MS;
use crate::thermal::ThermalError;

/// Display code for any thermal limiter failure.
pub const THERMAL_FAULT_CODE: u8 = 51;

/// What the main loop does after reporting a fault.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Severity {
    /// Stop for good; only a power cycle recovers.
    Halt,
    /// Hold the main loop for this many milliseconds, then carry on.
    Pause(u32),
}

#[derive(Copy, Clone, Debug, Error, PartialEq, Eq)]
pub enum Fault {
    #[error("sensor read failed: {0}")]
    Sensor(BusError),
    #[error("sensor initialisation failed: {0}")]
    SensorInit(BusError),
    #[error("thermal limiter: {0}")]
    Thermal(#[from] ThermalError),
}

impl Fault {
    pub fn code(&self) -> u8 {
        match self {
            Fault::Sensor(e) | Fault::SensorInit(e) => e.code(),
            Fault::Thermal(_) => THERMAL_FAULT_CODE,
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            Fault::Sensor(_) | Fault::SensorInit(_) => Severity::Halt,
            Fault::Thermal(_) => Severity::Pause(FAULT_PAUSE_MS),
        }
    }
}
