// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Board peripherals for the NUCLEO-F767ZI.

pub mod adc;
pub mod flash;
pub mod i2c;
pub mod pins;
pub mod tick;
pub mod usart;

pub use adc::Adc;
pub use flash::FlashSector;
pub use i2c::I2c1;
pub use pins::BoardPins;
pub use usart::Usart;
