// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # Dryer Firmware Core
//!
//! This crate contains the portable control core of a heated-air dryer: a single periodic
//! interrupt drives a millisecond clock and the key debouncer, while a cooperative main loop polls
//! the climate sensor over a two-wire bus, guards the heater with an analog thermistor, and runs
//! the menu and heater/fan state machine.
//!
//! Everything here is generic over `embedded-hal` traits so it builds for the MCU and for the
//! host test-suite alike. Board bring-up lives in the `dryer_board` crate.
//!
//! ## Crate Structure
//!
//! | Module | Purpose |
//! | ------ | -------- |
//! | [`clock`] | Millisecond tick counter and wrap-safe interval helpers |
//! | [`wait`] | Iteration-bounded spin wait shared by every blocking driver |
//! | [`keys`] | Per-key debounce/long-press state machines and the key mailbox |
//! | [`bus`] | Addressed two-wire bus framing with numbered step failures |
//! | [`drivers`] | Device-level drivers (AHT20 sensor, TM1621 LCD, output switches) |
//! | [`thermal`] | Thermistor divider model and calibration-table interpolation |
//! | [`settings`] | Checksummed persisted settings and the flash slot journal |
//! | [`display`] | Display sink interface used by the controller |
//! | [`control`] | Power/menu state machine, heater decision, beeper |
//! | [`scheduler`] | Interrupt context and the cooperative main loop |
//! | [`fault`] | Fault taxonomy and display codes |
//!
//! ## Getting Started
//!
//! Run the host-side tests from the workspace root:
//!
//! ```bash
//! cargo test
//! ```
//!
//! Flash the board from `dryer_board/`:
//!
//! ```bash
//! cargo run --release
//! ```
//!
//! ## License
//!
//! Licensed under the **MIT License**.
//! See the `LICENSE` file in the repository root for full terms.
//!
//! © 2025–2026 Christopher Liu

#![cfg_attr(not(test), no_std)]

pub mod bus;
pub mod clock;
pub mod config;
pub mod control;
pub mod display;
pub mod drivers;
pub mod fault;
pub mod keys;
pub mod scheduler;
pub mod settings;
pub mod thermal;
pub mod wait;

#[cfg(test)]
pub(crate) mod testing;
