// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Dryer controller firmware for the NUCLEO-F767ZI.
//!
//! Brings up the board peripherals, hands the keypad to the TIM2 tick interrupt and runs the
//! cooperative main loop until a fatal fault halts it.

#![no_main]
#![no_std]

use core::cell::RefCell;

use cortex_m::interrupt::Mutex;
use cortex_m_rt::entry;
use log::error;
use panic_halt as _;

use dryer::bus::BusMaster;
use dryer::clock::ClockDelay;
use dryer::config::{Tuning, BUS_WAIT_BUDGET, TICK_HZ};
use dryer::control::{Controller, SwitchBank};
use dryer::drivers::{Aht20, Switch, Tm1621};
use dryer::fault::Fault;
use dryer::keys::{KeyChannel, KeyId, Keypad};
use dryer::scheduler::{MainLoop, Shared};
use dryer::settings::{SettingsStore, SlotJournal};
use dryer::thermal::ThermalLimiter;
use hal::{
    pac::{self, interrupt},
    prelude::*,
    serial::{Config, Serial},
};
use stm32f7xx_hal as hal;

mod hw;
mod logger;

use hw::pins::KeyPin;
use hw::{flash, tick, Adc, BoardPins, FlashSector, I2c1, Usart};

/// ADC1 input wired to the heater thermistor divider (PA3).
const THERMISTOR_CHANNEL: u8 = 3;

static SHARED: Shared = Shared::new();
static KEYPAD: Mutex<RefCell<Option<Keypad<KeyPin, 3>>>> = Mutex::new(RefCell::new(None));

#[entry]
fn main() -> ! {
    // Peripherals
    let dp = pac::Peripherals::take().unwrap();

    // Clocks: 16 MHz HSI, APB1 undivided
    let rcc = dp.RCC.constrain();
    let clocks = rcc.cfgr.freeze();

    let pins = BoardPins::new(dp.GPIOA, dp.GPIOB, dp.GPIOD, dp.GPIOE, dp.GPIOF);

    // USART3 (ST-LINK VCP) logging
    let usart_cfg = Config {
        baud_rate: 115_200.bps(),
        ..Default::default()
    };
    let serial = Serial::new(dp.USART3, (pins.usart3.tx, pins.usart3.rx), &clocks, usart_cfg);
    logger::init(Usart::new(serial), &SHARED.clock);

    // Keys are owned by the tick interrupt from here on
    let [power, mode, up] = pins.keys.into_array();
    let keypad = Keypad::new([
        KeyChannel::active_low(KeyId::Power, power),
        KeyChannel::active_low(KeyId::Mode, mode),
        KeyChannel::active_low(KeyId::Up, up),
    ]);
    cortex_m::interrupt::free(|cs| {
        KEYPAD.borrow(cs).replace(Some(keypad));
    });
    tick::start(dp.TIM2, clocks.pclk1().raw(), TICK_HZ);

    // Display
    let mut lcd = Tm1621::new(
        pins.lcd.cs,
        pins.lcd.wr,
        pins.lcd.data,
        Switch::active_high(pins.lcd.backlight),
    );
    lcd.init();

    // Outputs
    let actuators = SwitchBank::new(
        Switch::active_high(pins.outputs.heater),
        Switch::active_high(pins.outputs.fan),
        Switch::active_high(pins.outputs.beeper),
        pins.key_leds.into_array().map(Switch::active_high),
    );

    let store = SettingsStore::new(SlotJournal::new(
        FlashSector::new(dp.FLASH),
        flash::SLOT_LEN,
    ));
    let controller = Controller::new(lcd, actuators, store, Tuning::default());

    // Sensors; PA3 stays in analog mode for the life of the program
    let _thermistor = pins.thermistor;
    let adc = RefCell::new(Adc::adc1(dp.ADC1));
    let limiter = ThermalLimiter::new(Adc::make_reader(&adc, THERMISTOR_CHANNEL));
    let bus = I2c1::new(dp.I2C1, pins.i2c1);
    let sensor = Aht20::new(BusMaster::new(bus, BUS_WAIT_BUDGET));

    let mut delay = ClockDelay::new(&SHARED.clock);
    let mut main_loop = MainLoop::new(&SHARED, sensor, limiter, controller);

    if let Err(fault) = main_loop.start(&mut delay) {
        halt(fault);
    }
    loop {
        if let Err(fault) = main_loop.step(&mut delay) {
            halt(fault);
        }
    }
}

/// Park the CPU after a fatal fault. The heater is already off and the code is on the display.
fn halt(fault: Fault) -> ! {
    error!("halted: {}", fault);
    loop {
        cortex_m::asm::wfi();
    }
}

#[interrupt]
fn TIM2() {
    tick::acknowledge();
    cortex_m::interrupt::free(|cs| {
        if let Some(keypad) = KEYPAD.borrow(cs).borrow_mut().as_mut() {
            SHARED.on_tick(keypad);
        }
    });
}
