// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! `log` backend writing timestamped lines to USART3.
//!
//! Lines look like `[    1234] WARN  settings: read failed ...`, stamped with the tick clock.
//! Interrupts are masked only while the sink is taken out of or put back into its slot; the line
//! is formatted and sent with the tick running. A record logged while another is being sent is
//! dropped.

use core::cell::RefCell;
use core::fmt::Write;

use cortex_m::interrupt::{self, Mutex};
use dryer::clock::MillisClock;
use heapless::String;
use log::{LevelFilter, Log, Metadata, Record};
use stm32f7xx_hal::pac::USART3;

use crate::hw::Usart;

const MAX_LEVEL: LevelFilter = LevelFilter::Info;

/// Longest line sent; longer lines are cut.
const LINE_LEN: usize = 128;

struct Sink {
    usart: Usart<USART3>,
    clock: &'static MillisClock,
}

struct UsartLogger {
    sink: Mutex<RefCell<Option<Sink>>>,
}

static LOGGER: UsartLogger = UsartLogger {
    sink: Mutex::new(RefCell::new(None)),
};

impl UsartLogger {
    fn take(&self) -> Option<Sink> {
        interrupt::free(|cs| self.sink.borrow(cs).borrow_mut().take())
    }

    fn put_back(&self, sink: Sink) {
        interrupt::free(|cs| {
            self.sink.borrow(cs).replace(Some(sink));
        });
    }
}

impl Log for UsartLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= MAX_LEVEL
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let Some(mut sink) = self.take() else {
            return;
        };

        let mut line: String<LINE_LEN> = String::new();
        // Overflow leaves what fit.
        let _ = write!(
            line,
            "[{:>8}] {:<5} {}",
            sink.clock.now(),
            record.level(),
            record.args()
        );
        sink.usart.write_str(&line);
        sink.usart.write_str("\n");

        self.put_back(sink);
    }

    fn flush(&self) {
        if let Some(mut sink) = self.take() {
            sink.usart.flush();
            self.put_back(sink);
        }
    }
}

/// Install the USART logger.
pub fn init(usart: Usart<USART3>, clock: &'static MillisClock) {
    LOGGER.put_back(Sink { usart, clock });
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(MAX_LEVEL);
    }
}
