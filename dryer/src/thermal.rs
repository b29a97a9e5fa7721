// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Thermistor-based heater limiter.
//!
//! The heater thermistor sits on the ground side of a divider with a fixed series resistor to the
//! ADC reference:
//!
//! ```text
//! Vref ── R_series ──┬── NTC ── GND
//!                    └── ADC
//! ```
//!
//! A raw sample is turned into a voltage, the voltage into the thermistor resistance, and the
//! resistance into a temperature by linear interpolation on a [`CalibrationTable`]. Integer math
//! only, truncating division throughout.

use log::warn;
use thiserror::Error;

use crate::config::{ADC_FULL_SCALE, ADC_REFERENCE_MV, DIVIDER_SERIES_OHMS};

/// One (resistance, temperature) calibration point.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct CalPoint {
    pub ohms: u32,
    pub celsius: i16,
}

impl CalPoint {
    pub const fn new(ohms: u32, celsius: i16) -> Self {
        Self { ohms, celsius }
    }
}

/// Heater NTC curve, 15..=125 °C.
pub const HEATER_NTC: [CalPoint; 14] = [
    CalPoint::new(166_500, 15),
    CalPoint::new(128_475, 20),
    CalPoint::new(99_500, 25),
    CalPoint::new(75_530, 30),
    CalPoint::new(46_050, 40),
    CalPoint::new(31_070, 50),
    CalPoint::new(20_800, 60),
    CalPoint::new(14_490, 70),
    CalPoint::new(10_000, 80),
    CalPoint::new(7_160, 90),
    CalPoint::new(5_220, 100),
    CalPoint::new(3_860, 110),
    CalPoint::new(3_316, 120),
    CalPoint::new(2_873, 125),
];

#[derive(Copy, Clone, Debug, Error, PartialEq, Eq)]
pub enum CalibrationError {
    #[error("calibration table needs at least two points")]
    TooShort,
    #[error("calibration table is not monotonic at entry {0}")]
    NotMonotonic(usize),
}

#[derive(Copy, Clone, Debug, Error, PartialEq, Eq)]
pub enum ThermalError {
    #[error("no thermistor sample available")]
    NoSample,
    #[error("thermistor divider saturated")]
    Saturated,
    #[error("{0} ohm is outside the calibration range")]
    OutOfRange(u32),
}

/// Calibration points ordered by falling resistance and rising temperature.
#[derive(Copy, Clone, Debug)]
pub struct CalibrationTable {
    points: &'static [CalPoint],
}

impl CalibrationTable {
    /// Validate and wrap a table.
    pub fn new(points: &'static [CalPoint]) -> Result<Self, CalibrationError> {
        if points.len() < 2 {
            return Err(CalibrationError::TooShort);
        }
        for (i, pair) in points.windows(2).enumerate() {
            if pair[1].ohms >= pair[0].ohms || pair[1].celsius <= pair[0].celsius {
                return Err(CalibrationError::NotMonotonic(i + 1));
            }
        }
        Ok(Self { points })
    }

    /// Temperature at `ohms`.
    ///
    /// Both ends of every bracket are inclusive, so a value equal to any table entry returns that
    /// entry's temperature. Values outside the table are an error, never clamped.
    pub fn interpolate(&self, ohms: u32) -> Result<i16, ThermalError> {
        let pair = self
            .points
            .windows(2)
            .find(|pair| pair[0].ohms >= ohms && ohms >= pair[1].ohms)
            .ok_or(ThermalError::OutOfRange(ohms))?;

        let (hi, lo) = (pair[0], pair[1]);
        let d_r = lo.ohms as i64 - hi.ohms as i64;
        let d_t = (lo.celsius - hi.celsius) as i64;
        let offset = d_t * (ohms as i64 - hi.ohms as i64) / d_r;

        Ok(hi.celsius + offset as i16)
    }
}

impl Default for CalibrationTable {
    fn default() -> Self {
        Self {
            points: &HEATER_NTC,
        }
    }
}

/// Series-resistor divider in front of the ADC.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Divider {
    pub full_scale: u32,
    pub reference_mv: u32,
    pub series_ohms: u32,
}

impl Default for Divider {
    fn default() -> Self {
        Self {
            full_scale: ADC_FULL_SCALE,
            reference_mv: ADC_REFERENCE_MV,
            series_ohms: DIVIDER_SERIES_OHMS,
        }
    }
}

impl Divider {
    /// Millivolts at the ADC pin for a raw sample.
    #[inline]
    pub fn millivolts(&self, raw: u16) -> u32 {
        raw as u32 * self.reference_mv / self.full_scale
    }

    /// Thermistor resistance for a raw sample, `None` if the pin sits at the reference.
    pub fn resistance(&self, raw: u16) -> Option<u32> {
        let mv = self.millivolts(raw);
        if mv >= self.reference_mv {
            return None;
        }
        let ohms = self.series_ohms as u64 * mv as u64 / (self.reference_mv - mv) as u64;
        Some(ohms.min(u32::MAX as u64) as u32)
    }
}

/// Independent heater temperature reading used as a hard safety limit.
///
/// `Read` returns one raw ADC sample, or `None` if the conversion did not complete.
pub struct ThermalLimiter<Read> {
    read: Read,
    divider: Divider,
    table: CalibrationTable,
}

impl<Read> ThermalLimiter<Read>
where
    Read: FnMut() -> Option<u16>,
{
    pub fn new(read: Read) -> Self {
        Self {
            read,
            divider: Divider::default(),
            table: CalibrationTable::default(),
        }
    }

    pub fn with_divider(mut self, divider: Divider) -> Self {
        self.divider = divider;
        self
    }

    pub fn with_table(mut self, table: CalibrationTable) -> Self {
        self.table = table;
        self
    }

    /// Sample the thermistor and convert to °C.
    pub fn read_celsius(&mut self) -> Result<i16, ThermalError> {
        let raw = (self.read)().ok_or(ThermalError::NoSample)?;
        let ohms = self.divider.resistance(raw).ok_or(ThermalError::Saturated)?;
        self.table.interpolate(ohms).map_err(|e| {
            warn!("limiter: raw {} -> {} ohm: {}", raw, ohms, e);
            e
        })
    }
}
