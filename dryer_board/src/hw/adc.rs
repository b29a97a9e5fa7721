// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! ADC1 single-channel reads for the thermistor divider, using direct PAC register access.
//!
//! Conversions wait on EOC for a bounded number of polls; a converter that never finishes reads as
//! `None` and the limiter treats it as a missing sample.

use core::cell::RefCell;

use dryer::wait::spin_until;
use stm32f7xx_hal::pac;

/// Polls allowed for one conversion.
const CONVERSION_BUDGET: u32 = 10_000;

pub struct Adc {
    adc: pac::ADC1,
}

impl Adc {
    /// Enable and initialize ADC1: 12-bit, right-aligned, single software-triggered conversion.
    pub fn adc1(adc: pac::ADC1) -> Self {
        let rcc = unsafe { &*pac::RCC::ptr() };
        rcc.apb2enr.modify(|_, w| w.adc1en().set_bit());

        let common = unsafe { &*pac::ADC_COMMON::ptr() };
        // PCLK2 / 4
        common.ccr.modify(|_, w| w.adcpre().div4());

        adc.cr2.modify(|_, w| w.adon().clear_bit());
        adc.cr1.modify(|_, w| w.res().bits(0b00));
        adc.cr2.modify(|_, w| {
            w.cont().clear_bit();
            w.align().right();
            w.exten().disabled();
            w
        });
        adc.smpr2.modify(|_, w| unsafe { w.bits(0) });
        adc.cr2.modify(|_, w| w.adon().set_bit());

        Self { adc }
    }

    /// Convert `channel` (0..=9) once with the longest sample time.
    pub fn read(&self, channel: u8) -> Option<u16> {
        let adc = &self.adc;

        // 480 cycles on the selected channel; the divider source impedance is high.
        if channel <= 9 {
            adc.smpr2
                .modify(|r, w| unsafe { w.bits(r.bits() | (0b111 << (3 * u32::from(channel)))) });
        }
        adc.sqr1.modify(|_, w| w.l().bits(0));
        adc.sqr3
            .modify(|_, w| unsafe { w.sq1().bits(channel & 0x1F) });

        adc.cr2.modify(|_, w| w.swstart().set_bit());
        spin_until(CONVERSION_BUDGET, || adc.sr.read().eoc().bit_is_set()).ok()?;

        Some(adc.dr.read().data().bits())
    }

    /// Create a closure that reads the given channel from the ADC reference.
    pub fn make_reader<'a>(
        adc_ref: &'a RefCell<Self>,
        channel: u8,
    ) -> impl FnMut() -> Option<u16> + 'a {
        move || adc_ref.borrow().read(channel)
    }
}
