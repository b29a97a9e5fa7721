// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Heater decision.

/// Whether the heater should run.
///
/// The sensor must be below the setpoint and the limiter must be below `setpoint + margin`. The
/// limiter check always wins over the sensor request.
///
/// ```
/// use dryer::control::heater_demand;
///
/// assert!(heater_demand(50, 90, 55, 40));
/// assert!(!heater_demand(50, 95, 55, 40));
/// ```
#[inline]
pub fn heater_demand(sensor_c: i16, limiter_c: i16, setpoint_c: u8, margin_c: i16) -> bool {
    let setpoint = setpoint_c as i16;
    sensor_c < setpoint && limiter_c < setpoint + margin_c
}
