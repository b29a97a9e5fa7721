// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # Appliance Control
//!
//! Power/menu state machine, heater decision and audible feedback.
//!
//! ## Modules
//!
//! - [`state`] - Power, menu and work-screen state types with their transitions.
//! - [`heater`] - Heater demand with the thermal-limiter override.
//! - [`beeper`] - Beep countdown.
//! - [`actuators`] - Heater/fan/beeper/key-indicator outputs.
//! - [`controller`] - Key handling, timers and rendering on top of the pieces above.

pub mod actuators;
pub mod beeper;
pub mod controller;
pub mod heater;
pub mod state;

pub use actuators::{Actuators, SwitchBank};
pub use beeper::Beeper;
pub use controller::Controller;
pub use heater::heater_demand;
pub use state::{MenuState, PowerState, Screen};
