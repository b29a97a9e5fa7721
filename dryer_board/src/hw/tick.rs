// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! TIM2 as the periodic tick interrupt.

use stm32f7xx_hal::pac::{self, Interrupt, NVIC};

/// Timer counter frequency after the prescaler.
const COUNTER_HZ: u32 = 1_000_000;

/// Start TIM2 raising its update interrupt at `tick_hz`.
///
/// `timer_clock_hz` is the APB1 timer kernel clock.
pub fn start(tim: pac::TIM2, timer_clock_hz: u32, tick_hz: u32) {
    let rcc = unsafe { &*pac::RCC::ptr() };
    rcc.apb1enr.modify(|_, w| w.tim2en().set_bit());

    tim.cr1.modify(|_, w| w.cen().clear_bit());
    tim.psc
        .write(|w| unsafe { w.bits(timer_clock_hz / COUNTER_HZ - 1) });
    tim.arr.write(|w| unsafe { w.bits(COUNTER_HZ / tick_hz - 1) });

    // Load PSC/ARR now, then drop the update flag the reload raised.
    tim.egr.write(|w| w.ug().set_bit());
    tim.sr.write(|w| unsafe { w.bits(0) });

    tim.dier.modify(|_, w| w.uie().set_bit());
    tim.cr1.modify(|_, w| w.cen().set_bit());

    unsafe { NVIC::unmask(Interrupt::TIM2) };
}

/// Clear the update flag. Call first thing in the TIM2 handler.
#[inline]
pub fn acknowledge() {
    let tim = unsafe { &*pac::TIM2::ptr() };
    tim.sr.write(|w| unsafe { w.bits(0) });
}
