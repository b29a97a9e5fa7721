// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Appliance outputs.

use embedded_hal::digital::v2::OutputPin;

use crate::drivers::switch::Switch;
use crate::keys::KeyId;

/// Outputs driven by the controller.
pub trait Actuators {
    fn set_heater(&mut self, on: bool);

    fn set_fan(&mut self, on: bool);

    fn set_beeper(&mut self, on: bool);

    /// Indicator LED next to `key`.
    fn set_key_indicator(&mut self, key: KeyId, on: bool);
}

/// [`Actuators`] over board switches.
///
/// The heater relay is only written when its state changes.
pub struct SwitchBank<HEATER, FAN, BEEPER, LED>
where
    HEATER: OutputPin,
    FAN: OutputPin,
    BEEPER: OutputPin,
    LED: OutputPin,
{
    heater: Switch<HEATER>,
    fan: Switch<FAN>,
    beeper: Switch<BEEPER>,
    indicators: [Switch<LED>; 3],
}

impl<HEATER, FAN, BEEPER, LED> SwitchBank<HEATER, FAN, BEEPER, LED>
where
    HEATER: OutputPin,
    FAN: OutputPin,
    BEEPER: OutputPin,
    LED: OutputPin,
{
    /// `indicators` are in [`KeyId::index`] order.
    pub fn new(
        heater: Switch<HEATER>,
        fan: Switch<FAN>,
        beeper: Switch<BEEPER>,
        indicators: [Switch<LED>; 3],
    ) -> Self {
        Self {
            heater,
            fan,
            beeper,
            indicators,
        }
    }

    #[inline]
    pub fn heater_on(&self) -> bool {
        self.heater.is_on()
    }
}

impl<HEATER, FAN, BEEPER, LED> Actuators for SwitchBank<HEATER, FAN, BEEPER, LED>
where
    HEATER: OutputPin,
    FAN: OutputPin,
    BEEPER: OutputPin,
    LED: OutputPin,
{
    fn set_heater(&mut self, on: bool) {
        if self.heater.is_on() != on {
            self.heater.set(on);
        }
    }

    fn set_fan(&mut self, on: bool) {
        self.fan.set(on);
    }

    fn set_beeper(&mut self, on: bool) {
        self.beeper.set(on);
    }

    fn set_key_indicator(&mut self, key: KeyId, on: bool) {
        self.indicators[key.index()].set(on);
    }
}
