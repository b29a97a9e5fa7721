// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Compile-time configuration and runtime tuning.
//!
//! All durations are in milliseconds, which is also the tick period of the scheduler interrupt.

/// Periodic interrupt rate.
pub const TICK_HZ: u32 = 1_000;

/// Ticks a key must be held before a long-press is reported.
pub const LONG_PRESS_TICKS: u16 = 2_000;

/// Period of the sensor poll / heater re-evaluation.
pub const SENSOR_POLL_MS: u32 = 1_000;

/// Period of the work-screen rotation.
pub const SCREEN_ROTATE_MS: u32 = 2_000;

/// Menu inactivity timeout before falling back to the work view.
pub const MENU_TIMEOUT_MS: u32 = 5_000;

/// Main loop pacing delay.
pub const MAIN_LOOP_DELAY_MS: u16 = 20;

pub const BEEP_SHORT_MS: u32 = 50;
pub const BEEP_LONG_MS: u32 = 500;

/// Spin iterations allowed for any single bus wait.
pub const BUS_WAIT_BUDGET: u32 = 0xFFFF;

/// Sensor initialization attempts before the fault becomes fatal.
pub const SENSOR_INIT_ATTEMPTS: u8 = 10;

/// Delay between busy-status polls of a triggered measurement.
pub const STATUS_POLL_DELAY_MS: u16 = 10;

/// Busy-status polls allowed before a measurement is abandoned.
pub const STATUS_POLL_LIMIT: u8 = 20;

/// Main-loop pause after a non-fatal fault.
pub const FAULT_PAUSE_MS: u32 = 5_000;

/// The thermal limiter trips at `setpoint + SAFETY_MARGIN_C`.
pub const SAFETY_MARGIN_C: i16 = 40;

/// Limiter value used when the thermistor sample cannot be converted.
pub const THERMAL_FALLBACK_C: i16 = 50;

/// Selectable temperature setpoints (°C).
pub const TEMPERATURE_SETPOINTS: [u8; 7] = [40, 45, 50, 55, 60, 65, 70];

/// Selectable run durations (hours).
pub const DURATION_SETPOINTS_H: [u8; 10] = [3, 4, 5, 6, 7, 8, 9, 10, 11, 12];

pub const MS_PER_HOUR: u32 = 3_600_000;
pub const MS_PER_MINUTE: u32 = 60_000;

/// Thermistor divider: ADC full scale in counts.
pub const ADC_FULL_SCALE: u32 = 4_096;
/// Thermistor divider: reference voltage in millivolts.
pub const ADC_REFERENCE_MV: u32 = 3_300;
/// Thermistor divider: fixed resistor on the supply side, in ohms.
pub const DIVIDER_SERIES_OHMS: u32 = 100_000;

/// Runtime tuning for the controller.
///
/// ```
/// use dryer::config::Tuning;
///
/// let tuning = Tuning::default().with_safety_margin(35);
/// assert_eq!(tuning.safety_margin_c, 35);
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Tuning {
    pub menu_timeout_ms: u32,
    pub screen_rotate_ms: u32,
    pub safety_margin_c: i16,
    pub thermal_fallback_c: i16,
    pub beep_short_ms: u32,
    pub beep_long_ms: u32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            menu_timeout_ms: MENU_TIMEOUT_MS,
            screen_rotate_ms: SCREEN_ROTATE_MS,
            safety_margin_c: SAFETY_MARGIN_C,
            thermal_fallback_c: THERMAL_FALLBACK_C,
            beep_short_ms: BEEP_SHORT_MS,
            beep_long_ms: BEEP_LONG_MS,
        }
    }
}

impl Tuning {
    /// Set the menu inactivity timeout.
    pub fn with_menu_timeout(mut self, ms: u32) -> Self {
        self.menu_timeout_ms = ms;
        self
    }

    /// Set the work-screen rotation period.
    pub fn with_screen_rotation(mut self, ms: u32) -> Self {
        self.screen_rotate_ms = ms;
        self
    }

    /// Set the limiter margin above the setpoint.
    pub fn with_safety_margin(mut self, celsius: i16) -> Self {
        self.safety_margin_c = celsius;
        self
    }

    /// Set the limiter fallback used when the thermistor reading is unusable.
    pub fn with_thermal_fallback(mut self, celsius: i16) -> Self {
        self.thermal_fallback_c = celsius;
        self
    }
}
