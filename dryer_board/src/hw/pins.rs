// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Pin definitions for the dryer controller on a NUCLEO-F767ZI.
//!
//! | Function | Pin | Notes |
//! | -------- | --- | ----- |
//! | USART3 TX/RX | PD8 / PD9 | AF7, ST-LINK virtual COM port |
//! | I2C1 SCL/SDA | PB8 / PB9 | AF4, open-drain, climate sensor |
//! | Thermistor | PA3 | ADC1_IN3 |
//! | Power / Mode / Up keys | PF13 / PE9 / PE11 | pull-up, active low |
//! | Key LEDs | PB0 / PB7 / PB14 | on-board LD1..LD3, active high |
//! | Heater / Fan / Beeper | PE0 / PE2 / PE4 | active high |
//! | LCD CS / WR / DATA | PD3 / PD4 / PD5 | bit-banged TM1621 |
//! | LCD backlight | PD6 | active high |

use core::convert::Infallible;

use embedded_hal::digital::v2::{InputPin, OutputPin};
use stm32f7xx_hal::{
    gpio::{
        gpioa, gpiob, gpiod, gpioe, gpiof, Alternate, Analog, Input, OpenDrain, Output, PullUp,
        PushPull,
    },
    pac,
    prelude::*,
};

/// All board pins. Construct this once at startup using:
///
/// ```rust
/// let pins = BoardPins::new(dp.GPIOA, dp.GPIOB, dp.GPIOD, dp.GPIOE, dp.GPIOF);
/// ```
pub struct BoardPins {
    pub usart3: Usart3Pins,
    pub i2c1: I2c1Pins,
    pub thermistor: gpioa::PA3<Analog>,
    pub keys: KeyPins,
    pub key_leds: KeyLedPins,
    pub outputs: OutputPins,
    pub lcd: LcdPins,
}

pub struct Usart3Pins {
    pub tx: gpiod::PD8<Alternate<7>>,
    pub rx: gpiod::PD9<Alternate<7>>,
}

/// Held only to keep the pins in their alternate function; the bus driver talks to the PAC.
pub struct I2c1Pins {
    pub scl: gpiob::PB8<Alternate<4, OpenDrain>>,
    pub sda: gpiob::PB9<Alternate<4, OpenDrain>>,
}

pub struct KeyPins {
    pub power: gpiof::PF13<Input<PullUp>>,
    pub mode: gpioe::PE9<Input<PullUp>>,
    pub up: gpioe::PE11<Input<PullUp>>,
}

pub struct KeyLedPins {
    pub power: gpiob::PB0<Output<PushPull>>,
    pub mode: gpiob::PB7<Output<PushPull>>,
    pub up: gpiob::PB14<Output<PushPull>>,
}

pub struct OutputPins {
    pub heater: gpioe::PE0<Output<PushPull>>,
    pub fan: gpioe::PE2<Output<PushPull>>,
    pub beeper: gpioe::PE4<Output<PushPull>>,
}

/// TM1621 serial lines and backlight
pub struct LcdPins {
    pub cs: gpiod::PD3<Output<PushPull>>,
    pub wr: gpiod::PD4<Output<PushPull>>,
    pub data: gpiod::PD5<Output<PushPull>>,
    pub backlight: gpiod::PD6<Output<PushPull>>,
}

impl BoardPins {
    /// Create all named pins from raw GPIO peripherals.
    pub fn new(
        gpioa: pac::GPIOA,
        gpiob: pac::GPIOB,
        gpiod: pac::GPIOD,
        gpioe: pac::GPIOE,
        gpiof: pac::GPIOF,
    ) -> Self {
        let gpioa = gpioa.split();
        let gpiob = gpiob.split();
        let gpiod = gpiod.split();
        let gpioe = gpioe.split();
        let gpiof = gpiof.split();

        Self {
            usart3: Usart3Pins {
                tx: gpiod.pd8.into_alternate::<7>(),
                rx: gpiod.pd9.into_alternate::<7>(),
            },

            i2c1: I2c1Pins {
                scl: gpiob.pb8.into_alternate_open_drain::<4>(),
                sda: gpiob.pb9.into_alternate_open_drain::<4>(),
            },

            thermistor: gpioa.pa3.into_analog(),

            keys: KeyPins {
                power: gpiof.pf13.into_pull_up_input(),
                mode: gpioe.pe9.into_pull_up_input(),
                up: gpioe.pe11.into_pull_up_input(),
            },

            key_leds: KeyLedPins {
                power: gpiob.pb0.into_push_pull_output(),
                mode: gpiob.pb7.into_push_pull_output(),
                up: gpiob.pb14.into_push_pull_output(),
            },

            outputs: OutputPins {
                heater: gpioe.pe0.into_push_pull_output(),
                fan: gpioe.pe2.into_push_pull_output(),
                beeper: gpioe.pe4.into_push_pull_output(),
            },

            lcd: LcdPins {
                cs: gpiod.pd3.into_push_pull_output(),
                wr: gpiod.pd4.into_push_pull_output(),
                data: gpiod.pd5.into_push_pull_output(),
                backlight: gpiod.pd6.into_push_pull_output(),
            },
        }
    }
}

impl KeyPins {
    /// The three keys as one pin type, in power/mode/up order.
    pub fn into_array(self) -> [KeyPin; 3] {
        [
            KeyPin::Power(self.power),
            KeyPin::Mode(self.mode),
            KeyPin::Up(self.up),
        ]
    }
}

impl KeyLedPins {
    /// The three indicators as one pin type, in power/mode/up order.
    pub fn into_array(self) -> [KeyLed; 3] {
        [
            KeyLed::Power(self.power),
            KeyLed::Mode(self.mode),
            KeyLed::Up(self.up),
        ]
    }
}

/// Any of the front-panel key inputs.
pub enum KeyPin {
    Power(gpiof::PF13<Input<PullUp>>),
    Mode(gpioe::PE9<Input<PullUp>>),
    Up(gpioe::PE11<Input<PullUp>>),
}

impl InputPin for KeyPin {
    type Error = Infallible;

    fn is_high(&self) -> Result<bool, Self::Error> {
        self.is_low().map(|low| !low)
    }

    fn is_low(&self) -> Result<bool, Self::Error> {
        match self {
            KeyPin::Power(p) => InputPin::is_low(p),
            KeyPin::Mode(p) => InputPin::is_low(p),
            KeyPin::Up(p) => InputPin::is_low(p),
        }
    }
}

/// Any of the key indicator outputs.
pub enum KeyLed {
    Power(gpiob::PB0<Output<PushPull>>),
    Mode(gpiob::PB7<Output<PushPull>>),
    Up(gpiob::PB14<Output<PushPull>>),
}

impl OutputPin for KeyLed {
    type Error = Infallible;

    fn set_low(&mut self) -> Result<(), Self::Error> {
        match self {
            KeyLed::Power(p) => OutputPin::set_low(p),
            KeyLed::Mode(p) => OutputPin::set_low(p),
            KeyLed::Up(p) => OutputPin::set_low(p),
        }
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        match self {
            KeyLed::Power(p) => OutputPin::set_high(p),
            KeyLed::Mode(p) => OutputPin::set_high(p),
            KeyLed::Up(p) => OutputPin::set_high(p),
        }
    }
}
