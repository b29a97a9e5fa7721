// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! AHT20 temperature/humidity sensor.
//!
//! Transactions (7-bit address 0x38):
//! - Wake: write `0xBE`.
//! - Measure: write `0xAC 0x33 0x00`, poll one status byte until bit 7 (busy) clears, then read six
//!   bytes.
//!
//! Data layout of the six-byte read:
//!
//! ```text
//! byte:   0        1        2        3         4        5
//!       status | humidity[19:4]  | h[3:0] t[19:16] | temperature[15:0]
//! ```

use embedded_hal::blocking::delay::DelayMs;
use log::{debug, warn};

use crate::bus::{BusError, BusMaster, Step, Transaction, TwoWire};
use crate::config::{STATUS_POLL_DELAY_MS, STATUS_POLL_LIMIT};

/// Fixed 7-bit bus address.
pub const ADDRESS: u8 = 0x38;

const CMD_WAKE: u8 = 0xBE;
const CMD_TRIGGER: [u8; 3] = [0xAC, 0x33, 0x00];
const STATUS_BUSY: u8 = 1 << 7;

/// One decoded measurement.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct SensorReading {
    /// Degrees Celsius.
    pub temperature_c: i16,
    /// Relative humidity in percent.
    pub humidity_pct: u8,
}

impl SensorReading {
    /// Decode the six raw bytes of a data read. Byte 0 (status) is ignored.
    pub fn decode(raw: &[u8; 6]) -> Self {
        let humidity = (raw[1] as u32) << 12 | (raw[2] as u32) << 4 | (raw[3] as u32) >> 4;
        let temperature = ((raw[3] & 0x0F) as u32) << 16 | (raw[4] as u32) << 8 | raw[5] as u32;

        Self {
            humidity_pct: ((humidity * 100) >> 20) as u8,
            temperature_c: ((temperature * 200) >> 20) as i16 - 50,
        }
    }
}

/// AHT20 driver owning the bus master.
pub struct Aht20<B> {
    master: BusMaster<B>,
    poll_limit: u8,
    poll_delay_ms: u16,
}

impl<B: TwoWire> Aht20<B> {
    pub fn new(master: BusMaster<B>) -> Self {
        Self {
            master,
            poll_limit: STATUS_POLL_LIMIT,
            poll_delay_ms: STATUS_POLL_DELAY_MS,
        }
    }

    /// Override the busy-status polling (count, delay between polls).
    pub fn with_status_polling(mut self, limit: u8, delay_ms: u16) -> Self {
        self.poll_limit = limit;
        self.poll_delay_ms = delay_ms;
        self
    }

    pub fn free(self) -> BusMaster<B> {
        self.master
    }

    /// Send the wake command.
    pub fn init(&mut self) -> Result<(), BusError> {
        self.master.write(ADDRESS, &[CMD_WAKE], Transaction::Wake)
    }

    /// Run [`init`](Self::init) up to `attempts` times.
    ///
    /// `on_failure` sees every failed attempt (1-based) before the next one starts. Returns the
    /// last error once all attempts are used up.
    pub fn init_with_retries<F>(&mut self, attempts: u8, mut on_failure: F) -> Result<(), BusError>
    where
        F: FnMut(u8, &BusError),
    {
        let mut last = BusError::new(Transaction::Wake, Step::Start);
        for attempt in 1..=attempts {
            match self.init() {
                Ok(()) => return Ok(()),
                Err(e) => {
                    warn!("sensor init attempt {} failed: {} (code {})", attempt, e, e.code());
                    on_failure(attempt, &e);
                    last = e;
                }
            }
        }
        Err(last)
    }

    /// Trigger a measurement, wait for it to complete and read it back.
    pub fn measure<D: DelayMs<u16>>(&mut self, delay: &mut D) -> Result<SensorReading, BusError> {
        self.master.write(ADDRESS, &CMD_TRIGGER, Transaction::Trigger)?;
        self.wait_ready(delay)?;

        let mut raw = [0u8; 6];
        self.master.read(ADDRESS, &mut raw, Transaction::Fetch)?;

        let reading = SensorReading::decode(&raw);
        debug!(
            "aht20: {} C, {} %RH",
            reading.temperature_c, reading.humidity_pct
        );
        Ok(reading)
    }

    fn wait_ready<D: DelayMs<u16>>(&mut self, delay: &mut D) -> Result<(), BusError> {
        for _ in 0..self.poll_limit {
            let mut status = [0u8; 1];
            self.master
                .read(ADDRESS, &mut status, Transaction::StatusPoll)?;
            if status[0] & STATUS_BUSY == 0 {
                return Ok(());
            }
            delay.delay_ms(self.poll_delay_ms);
        }
        Err(BusError::new(Transaction::StatusPoll, Step::Busy))
    }
}
