// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Appliance controller.
//!
//! Owns the control state and reacts to three kinds of input from the main loop:
//!
//! - [`Controller::handle_key`] for each debounced key event,
//! - [`Controller::advance`] with the current tick, driving the run countdown, menu timeout,
//!   screen rotation and beeper,
//! - [`Controller::regulate`] once per sensor poll, deciding the heater.
//!
//! Key map:
//!
//! | Key | Short press | Long press |
//! | --- | ----------- | ---------- |
//! | Power | toggle Off/On | toggle "start powered" and save |
//! | Mode | next menu view (On only) | save setpoint indices |
//! | Up | next setpoint in the current view (On only) | toggle beeper and save |
//!
//! Typical usage pattern:
//!
//! ```ignore
//! controller.boot(clock.now());
//!
//! loop {
//!     controller.advance(clock.now());
//!     match mailbox.take() {
//!         Some(press) => controller.handle_key(press),
//!         None => controller.idle(),
//!     }
//! }
//! ```

use log::{debug, error, info};

use super::actuators::Actuators;
use super::beeper::Beeper;
use super::heater::heater_demand;
use super::state::{MenuState, PowerState, Screen};
use crate::clock::elapsed;
use crate::config::{
    Tuning, DURATION_SETPOINTS_H, MS_PER_HOUR, MS_PER_MINUTE, TEMPERATURE_SETPOINTS,
};
use crate::display::{glyph, DisplaySink, Indicator, BLANK};
use crate::drivers::aht20::SensorReading;
use crate::fault::Fault;
use crate::keys::{KeyEvent, KeyId, KeyPress};
use crate::settings::{Settings, SettingsMedium, SettingsStore};

/// Added to a freshly selected duration so the menu shows whole hours (`06:00`, not `05:59`).
const DURATION_DISPLAY_PAD_MS: u32 = 100;

/// Rounding applied to the remaining time when stepping the duration setpoint.
const DURATION_ROUNDING_MS: u32 = 15_000;

pub struct Controller<D, A, M> {
    display: D,
    actuators: A,
    store: SettingsStore<M>,
    settings: Settings,
    tuning: Tuning,

    power: PowerState,
    menu: MenuState,
    screen: Screen,
    temperature_index: usize,
    duration_index: usize,

    /// Run time left while On.
    remaining_ms: u32,
    /// Time left before a setpoint view falls back to Work; 0 when inactive.
    menu_timer_ms: u32,
    /// Time accumulated towards the next screen rotation.
    rotation_ms: u32,
    last_tick: u32,
    beeper: Beeper,

    climate: SensorReading,
    limiter_c: i16,
    heater_on: bool,
}

impl<D, A, M> Controller<D, A, M>
where
    D: DisplaySink,
    A: Actuators,
    M: SettingsMedium,
{
    /// Load the persisted settings and start in the Off state. Nothing is driven until
    /// [`boot`](Self::boot).
    pub fn new(display: D, actuators: A, mut store: SettingsStore<M>, tuning: Tuning) -> Self {
        let settings = store.load();
        Self {
            display,
            actuators,
            store,
            settings,
            tuning,
            power: PowerState::Off,
            menu: MenuState::Work,
            screen: Screen::Climate,
            temperature_index: settings.temperature_index as usize,
            duration_index: settings.duration_index as usize,
            remaining_ms: 0,
            menu_timer_ms: 0,
            rotation_ms: 0,
            last_tick: 0,
            beeper: Beeper::new(),
            climate: SensorReading::default(),
            limiter_c: 0,
            heater_on: false,
        }
    }

    /// Enter the power state chosen by the persisted settings.
    pub fn boot(&mut self, now: u32) {
        self.last_tick = now;
        if self.settings.start_powered {
            info!("boot: resuming powered on");
            self.beep(self.tuning.beep_long_ms);
            self.power_on();
        } else {
            self.power_off();
        }
    }

    // ----- Accessors -----

    #[inline]
    pub fn power(&self) -> PowerState {
        self.power
    }

    #[inline]
    pub fn menu(&self) -> MenuState {
        self.menu
    }

    #[inline]
    pub fn screen(&self) -> Screen {
        self.screen
    }

    #[inline]
    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    #[inline]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    #[inline]
    pub fn remaining_ms(&self) -> u32 {
        self.remaining_ms
    }

    #[inline]
    pub fn heater_on(&self) -> bool {
        self.heater_on
    }

    #[inline]
    pub fn temperature_index(&self) -> usize {
        self.temperature_index
    }

    #[inline]
    pub fn duration_index(&self) -> usize {
        self.duration_index
    }

    /// Currently selected temperature setpoint (°C).
    #[inline]
    pub fn setpoint_c(&self) -> u8 {
        TEMPERATURE_SETPOINTS[self.temperature_index]
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    pub fn actuators(&self) -> &A {
        &self.actuators
    }

    pub fn store(&self) -> &SettingsStore<M> {
        &self.store
    }

    // ----- Inputs -----

    /// React to one debounced key event.
    pub fn handle_key(&mut self, press: KeyPress) {
        debug!("key {:?} {:?}", press.key, press.event);
        match press.event {
            KeyEvent::Pressed => {
                self.beep(self.tuning.beep_short_ms);
                self.actuators.set_key_indicator(press.key, true);
                match self.power {
                    PowerState::Off => self.short_press_off(press.key),
                    PowerState::On => self.short_press_on(press.key),
                }
            }
            KeyEvent::LongPressed => {
                self.beep(self.tuning.beep_long_ms);
                self.long_press(press.key);
            }
        }
    }

    /// Main-loop iteration without a key event: key indicators off and, in the work view, the
    /// current screen redrawn.
    pub fn idle(&mut self) {
        if self.power == PowerState::On && self.menu == MenuState::Work {
            self.show_work_screen();
        }
        for key in KeyId::ALL {
            self.actuators.set_key_indicator(key, false);
        }
    }

    /// Advance every timer to `now`.
    pub fn advance(&mut self, now: u32) {
        let dt = elapsed(self.last_tick, now);
        self.last_tick = now;

        if self.beeper.advance(dt) {
            self.actuators.set_beeper(false);
        }

        if self.power != PowerState::On {
            return;
        }

        if self.remaining_ms == 0 {
            info!("run finished");
            self.power_off();
            return;
        }
        self.remaining_ms = self.remaining_ms.saturating_sub(dt);

        if self.menu == MenuState::Work {
            self.rotation_ms += dt;
            let period = self.tuning.screen_rotate_ms.max(1);
            while self.rotation_ms >= period {
                self.rotation_ms -= period;
                self.screen = self.screen.next();
            }
        }

        if self.menu_timer_ms != 0 {
            self.menu_timer_ms = self.menu_timer_ms.saturating_sub(dt);
            if self.menu_timer_ms == 0 {
                self.menu_timed_out();
            }
        }
    }

    /// Apply a fresh sensor reading and limiter temperature.
    ///
    /// The heater is only switched while On; Off already forced it off.
    pub fn regulate(&mut self, reading: SensorReading, limiter_c: i16) {
        self.climate = reading;
        self.limiter_c = limiter_c;

        if self.power == PowerState::On {
            let demand = heater_demand(
                reading.temperature_c,
                limiter_c,
                self.setpoint_c(),
                self.tuning.safety_margin_c,
            );
            self.set_heater(demand);
        }
    }

    /// Heater off and the fault code on the display.
    pub fn report_fault(&mut self, fault: &Fault) {
        error!("fault {:02}: {}", fault.code(), fault);
        self.set_heater(false);
        self.display.print_error(fault.code());
    }

    // ----- Transitions -----

    fn short_press_off(&mut self, key: KeyId) {
        if key == KeyId::Power {
            self.power_on();
        }
    }

    fn short_press_on(&mut self, key: KeyId) {
        match key {
            KeyId::Power => self.power_off(),
            KeyId::Mode => self.next_menu(),
            KeyId::Up => self.step_setpoint(),
        }
    }

    fn long_press(&mut self, key: KeyId) {
        match key {
            KeyId::Power => {
                self.settings.start_powered = !self.settings.start_powered;
                self.persist();
            }
            KeyId::Mode => {
                self.settings.temperature_index = self.temperature_index as u8;
                self.settings.duration_index = self.duration_index as u8;
                self.persist();
            }
            KeyId::Up => {
                self.settings.use_beeper = !self.settings.use_beeper;
                self.persist();
                if self.settings.use_beeper {
                    self.beep(self.tuning.beep_long_ms);
                }
            }
        }
    }

    fn power_on(&mut self) {
        info!(
            "power on: {} C for {} h",
            self.setpoint_c(),
            DURATION_SETPOINTS_H[self.duration_index]
        );
        self.remaining_ms = DURATION_SETPOINTS_H[self.duration_index] as u32 * MS_PER_HOUR;
        self.menu = MenuState::Work;
        self.menu_timer_ms = 0;
        self.rotation_ms = 0;
        self.power = PowerState::On;

        self.display.set_backlight(true);
        self.display.set_indicator(Indicator::WorkLabel, true);
        self.actuators.set_fan(true);
    }

    fn power_off(&mut self) {
        info!("power off");
        self.power = PowerState::Off;
        self.menu_timer_ms = 0;

        self.display.clear();
        self.display.set_backlight(false);
        self.set_heater(false);
        self.actuators.set_fan(false);
    }

    fn next_menu(&mut self) {
        self.display.clear();
        self.menu = self.menu.next();
        self.menu_timer_ms = if self.menu.times_out() {
            self.tuning.menu_timeout_ms
        } else {
            0
        };

        match self.menu {
            MenuState::Temperature => self.show_temperature(),
            MenuState::Duration => self.show_remaining(),
            MenuState::Work => self.display.set_indicator(Indicator::WorkLabel, true),
        }
    }

    fn step_setpoint(&mut self) {
        match self.menu {
            MenuState::Temperature => {
                self.menu_timer_ms = self.tuning.menu_timeout_ms;
                self.temperature_index = (self.temperature_index + 1) % TEMPERATURE_SETPOINTS.len();
                self.show_temperature();
            }
            MenuState::Duration => {
                self.menu_timer_ms = self.tuning.menu_timeout_ms;
                self.duration_index = next_duration_index(self.remaining_ms);
                self.remaining_ms = DURATION_SETPOINTS_H[self.duration_index] as u32 * MS_PER_HOUR
                    + DURATION_DISPLAY_PAD_MS;
                self.show_remaining();
            }
            MenuState::Work => {}
        }
    }

    fn menu_timed_out(&mut self) {
        self.menu = MenuState::Work;
        for indicator in Indicator::ALL {
            self.display.set_indicator(indicator, false);
        }
        self.display.set_indicator(Indicator::WorkLabel, true);
        self.show_work_screen();
    }

    fn beep(&mut self, ms: u32) {
        if self.settings.use_beeper {
            self.beeper.start(ms);
            self.actuators.set_beeper(true);
        }
    }

    fn set_heater(&mut self, on: bool) {
        if self.heater_on != on {
            debug!("heater {}", if on { "on" } else { "off" });
        }
        self.heater_on = on;
        self.actuators.set_heater(on);
    }

    fn persist(&mut self) {
        if let Err(e) = self.store.save(&self.settings) {
            error!("settings: save failed ({:?})", e);
        }
    }

    // ----- Rendering -----

    fn show_work_screen(&mut self) {
        match self.screen {
            Screen::Climate => self.show_climate(),
            Screen::Remaining => self.show_remaining(),
            Screen::Limiter => self.show_limiter(),
        }
    }

    fn show_temperature(&mut self) {
        self.display.set_indicator(Indicator::TempLabel, true);
        self.display.set_indicator(Indicator::Degree, true);
        self.display.set_digit_pair(self.setpoint_c(), BLANK);
    }

    fn show_remaining(&mut self) {
        self.display.set_indicator(Indicator::TempLabel, false);
        self.display.set_indicator(Indicator::Degree, false);
        self.display.set_indicator(Indicator::Percent, false);
        if self.menu == MenuState::Duration {
            self.display.set_indicator(Indicator::TimeLabel, true);
        }
        self.display.set_indicator(Indicator::Colon, true);

        let minutes = self.remaining_ms / MS_PER_MINUTE;
        self.display
            .set_digit_pair((minutes / 60).min(99) as u8, (minutes % 60) as u8);
    }

    fn show_climate(&mut self) {
        self.display.set_indicator(Indicator::TimeLabel, false);
        self.display.set_indicator(Indicator::Colon, false);
        self.display.set_indicator(Indicator::WorkLabel, true);
        self.display.set_indicator(Indicator::Degree, true);
        self.display.set_indicator(Indicator::Percent, true);

        let temperature = self.climate.temperature_c.clamp(0, 99) as u8;
        let humidity = self.climate.humidity_pct.min(99);
        self.display.set_digit_pair(temperature, humidity);
    }

    fn show_limiter(&mut self) {
        for indicator in [
            Indicator::TimeLabel,
            Indicator::Colon,
            Indicator::Degree,
            Indicator::Percent,
        ] {
            self.display.set_indicator(indicator, false);
        }
        self.display.set_indicator(Indicator::WorkLabel, true);
        self.display
            .print_prefixed_number(glyph::H, self.limiter_c.max(0) as u16);
    }
}

/// Duration index selected by Up in the duration view.
///
/// The remaining time, rounded to the nearest hour, picks the first longer table entry. Past the
/// last entry it falls back to index 0.
pub fn next_duration_index(remaining_ms: u32) -> usize {
    let hours = (remaining_ms + DURATION_ROUNDING_MS) / MS_PER_HOUR;
    DURATION_SETPOINTS_H
        .iter()
        .position(|&h| h as u32 > hours)
        .unwrap_or(0)
}
