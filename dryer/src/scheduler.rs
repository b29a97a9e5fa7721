// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Two-level scheduler: one periodic interrupt and a cooperative main loop.
//!
//! State shared between the two lives in [`Shared`]:
//!
//! | Field | Writer | Reader |
//! | ----- | ------ | ------ |
//! | `clock` | tick interrupt | main loop |
//! | `keys` | tick interrupt (post) | main loop (take) |
//!
//! The debouncers themselves live in the [`Keypad`] owned by the interrupt. The interrupt body is
//! [`Shared::on_tick`]: one clock increment and one keypad poll, nothing that can block.
//!
//! Everything else runs in [`MainLoop::step`]:
//!
//! ```text
//! advance controller timers
//! every SENSOR_POLL_MS: measure → limiter → regulate heater
//! take key event → handle it, or idle-render
//! delay MAIN_LOOP_DELAY_MS
//! ```

use embedded_hal::blocking::delay::DelayMs;
use embedded_hal::digital::v2::InputPin;
use log::{error, info, warn};

use crate::bus::TwoWire;
use crate::clock::{MillisClock, Periodic};
use crate::config::{FAULT_PAUSE_MS, MAIN_LOOP_DELAY_MS, SENSOR_INIT_ATTEMPTS, SENSOR_POLL_MS};
use crate::control::{Actuators, Controller};
use crate::display::DisplaySink;
use crate::drivers::aht20::Aht20;
use crate::fault::{Fault, Severity};
use crate::keys::{KeyMailbox, Keypad};
use crate::settings::SettingsMedium;
use crate::thermal::ThermalLimiter;

/// Interrupt/main-loop shared context.
pub struct Shared {
    pub clock: MillisClock,
    pub keys: KeyMailbox,
}

impl Shared {
    pub const fn new() -> Self {
        Self {
            clock: MillisClock::new(),
            keys: KeyMailbox::new(),
        }
    }

    /// Tick interrupt body.
    #[inline]
    pub fn on_tick<PIN: InputPin, const N: usize>(&self, keypad: &mut Keypad<PIN, N>) {
        self.clock.tick();
        keypad.poll(&self.keys);
    }
}

impl Default for Shared {
    fn default() -> Self {
        Self::new()
    }
}

/// Main-loop side of the appliance.
pub struct MainLoop<'a, B, R, D, A, M> {
    shared: &'a Shared,
    sensor: Aht20<B>,
    limiter: ThermalLimiter<R>,
    controller: Controller<D, A, M>,
    poll: Periodic,
}

impl<'a, B, R, D, A, M> MainLoop<'a, B, R, D, A, M>
where
    B: TwoWire,
    R: FnMut() -> Option<u16>,
    D: DisplaySink,
    A: Actuators,
    M: SettingsMedium,
{
    pub fn new(
        shared: &'a Shared,
        sensor: Aht20<B>,
        limiter: ThermalLimiter<R>,
        controller: Controller<D, A, M>,
    ) -> Self {
        let now = shared.clock.now();
        Self {
            shared,
            sensor,
            limiter,
            controller,
            poll: Periodic::new(SENSOR_POLL_MS, now),
        }
    }

    pub fn controller(&self) -> &Controller<D, A, M> {
        &self.controller
    }

    /// Boot the controller and bring up the sensor.
    ///
    /// Every failed initialisation attempt is shown on the display followed by a pause. Returns
    /// the fault once all attempts are used up; the caller must halt.
    pub fn start<DL>(&mut self, delay: &mut DL) -> Result<(), Fault>
    where
        DL: DelayMs<u32>,
    {
        self.controller.boot(self.shared.clock.now());

        let controller = &mut self.controller;
        let result = self
            .sensor
            .init_with_retries(SENSOR_INIT_ATTEMPTS, |_, e| {
                controller.report_fault(&Fault::SensorInit(*e));
                delay.delay_ms(FAULT_PAUSE_MS);
            });

        match result {
            Ok(()) => {
                info!("sensor ready");
                self.poll = Periodic::new(SENSOR_POLL_MS, self.shared.clock.now());
                Ok(())
            }
            Err(e) => {
                let fault = Fault::SensorInit(e);
                error!("giving up on sensor: {}", fault);
                self.controller.report_fault(&fault);
                Err(fault)
            }
        }
    }

    /// One main-loop iteration. An `Err` is a fatal fault that has already been reported; the
    /// caller must halt.
    pub fn step<DL>(&mut self, delay: &mut DL) -> Result<(), Fault>
    where
        DL: DelayMs<u32> + DelayMs<u16>,
    {
        let now = self.shared.clock.now();
        self.controller.advance(now);

        if self.poll.poll(now) {
            self.poll_sensors(delay)?;
        }

        match self.shared.keys.take() {
            Some(press) => self.controller.handle_key(press),
            None => self.controller.idle(),
        }

        DelayMs::<u16>::delay_ms(delay, MAIN_LOOP_DELAY_MS);
        Ok(())
    }

    fn poll_sensors<DL>(&mut self, delay: &mut DL) -> Result<(), Fault>
    where
        DL: DelayMs<u32> + DelayMs<u16>,
    {
        let reading = match self.sensor.measure(delay) {
            Ok(reading) => reading,
            Err(e) => {
                self.escalate(Fault::Sensor(e), delay)?;
                return Ok(());
            }
        };

        let limiter_c = match self.limiter.read_celsius() {
            Ok(celsius) => celsius,
            Err(e) => {
                self.escalate(Fault::Thermal(e), delay)?;
                self.controller.tuning().thermal_fallback_c
            }
        };

        self.controller.regulate(reading, limiter_c);
        Ok(())
    }

    /// Report `fault`, then pause or halt according to its severity.
    fn escalate<DL>(&mut self, fault: Fault, delay: &mut DL) -> Result<(), Fault>
    where
        DL: DelayMs<u32>,
    {
        self.controller.report_fault(&fault);
        match fault.severity() {
            Severity::Halt => Err(fault),
            Severity::Pause(ms) => {
                warn!("pausing {} ms after fault {:02}", ms, fault.code());
                delay.delay_ms(ms);
                Ok(())
            }
        }
    }
}
