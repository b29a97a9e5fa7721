// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Millisecond clock.
//!
//! The counter is advanced exactly once per periodic interrupt and read from the main loop. It is a
//! single word, so reads never observe a torn value. It wraps after ~49 days; every consumer works
//! on differences (`wrapping_sub`), never on absolute comparisons.

use embedded_hal::blocking::delay::DelayMs;
use portable_atomic::{AtomicU32, Ordering};

/// Monotonic tick counter shared between the tick interrupt (writer) and the main loop (reader).
pub struct MillisClock {
    ticks: AtomicU32,
}

impl MillisClock {
    pub const fn new() -> Self {
        Self {
            ticks: AtomicU32::new(0),
        }
    }

    /// Advance by one tick. Only the tick interrupt calls this.
    #[inline]
    pub fn tick(&self) {
        // Single writer, no read-modify-write needed.
        let next = self.ticks.load(Ordering::Relaxed).wrapping_add(1);
        self.ticks.store(next, Ordering::Release);
    }

    /// Current tick count.
    #[inline]
    pub fn now(&self) -> u32 {
        self.ticks.load(Ordering::Acquire)
    }

    /// Milliseconds elapsed since `since`.
    #[inline]
    pub fn elapsed_since(&self, since: u32) -> u32 {
        elapsed(since, self.now())
    }
}

impl Default for MillisClock {
    fn default() -> Self {
        Self::new()
    }
}

/// Wrap-safe difference between two tick stamps.
#[inline]
pub fn elapsed(since: u32, now: u32) -> u32 {
    now.wrapping_sub(since)
}

/// Fixed-period trigger polled from the main loop.
#[derive(Copy, Clone, Debug)]
pub struct Periodic {
    period_ms: u32,
    last: u32,
}

impl Periodic {
    /// Create a trigger whose first expiry is one full period after `now`.
    pub fn new(period_ms: u32, now: u32) -> Self {
        Self {
            period_ms,
            last: now,
        }
    }

    /// Returns true once per elapsed period. The next period starts at `now`.
    pub fn poll(&mut self, now: u32) -> bool {
        if elapsed(self.last, now) >= self.period_ms {
            self.last = now;
            true
        } else {
            false
        }
    }
}

/// Blocking delay driven by the millisecond clock.
///
/// Spins until the requested number of ticks has elapsed, so it needs the tick interrupt running.
pub struct ClockDelay<'a> {
    clock: &'a MillisClock,
}

impl<'a> ClockDelay<'a> {
    pub fn new(clock: &'a MillisClock) -> Self {
        Self { clock }
    }
}

impl DelayMs<u32> for ClockDelay<'_> {
    fn delay_ms(&mut self, ms: u32) {
        let start = self.clock.now();
        while self.clock.elapsed_since(start) < ms {
            core::hint::spin_loop();
        }
    }
}

impl DelayMs<u16> for ClockDelay<'_> {
    fn delay_ms(&mut self, ms: u16) {
        DelayMs::<u32>::delay_ms(self, ms as u32);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tick_advances_by_one() {
        let clock = MillisClock::new();
        clock.tick();
        clock.tick();
        assert_eq!(clock.now(), 2);
    }

    #[test]
    fn elapsed_survives_wraparound() {
        assert_eq!(elapsed(u32::MAX - 4, 5), 10);
        assert_eq!(elapsed(100, 100), 0);
    }

    #[test]
    fn periodic_fires_once_per_period() {
        let mut poll = Periodic::new(1_000, 0);
        assert!(!poll.poll(999));
        assert!(poll.poll(1_000));
        assert!(!poll.poll(1_500));
        assert!(poll.poll(2_000));
    }

    #[test]
    fn periodic_across_wrap() {
        let mut poll = Periodic::new(1_000, u32::MAX - 100);
        assert!(!poll.poll(u32::MAX));
        assert!(poll.poll(899));
    }
}
