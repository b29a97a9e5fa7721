// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Beep countdown.
//!
//! The beeper does not own the output; the controller switches it on when a beep starts and off
//! when [`Beeper::advance`] reports the end.

#[derive(Copy, Clone, Debug, Default)]
pub struct Beeper {
    remaining_ms: u32,
}

impl Beeper {
    pub const fn new() -> Self {
        Self { remaining_ms: 0 }
    }

    /// Start (or restart) a beep of `ms`.
    #[inline]
    pub fn start(&mut self, ms: u32) {
        self.remaining_ms = ms;
    }

    #[inline]
    pub fn is_sounding(&self) -> bool {
        self.remaining_ms != 0
    }

    /// Count down by `elapsed_ms`. Returns true exactly once, when the beep ends.
    pub fn advance(&mut self, elapsed_ms: u32) -> bool {
        if self.remaining_ms == 0 {
            return false;
        }
        self.remaining_ms = self.remaining_ms.saturating_sub(elapsed_ms);
        self.remaining_ms == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ends_once() {
        let mut beeper = Beeper::new();
        beeper.start(50);
        assert!(!beeper.advance(20));
        assert!(!beeper.advance(20));
        assert!(beeper.advance(20));
        assert!(!beeper.is_sounding());
        assert!(!beeper.advance(20));
    }

    #[test]
    fn restart_extends() {
        let mut beeper = Beeper::new();
        beeper.start(50);
        beeper.advance(40);
        beeper.start(500);
        assert!(!beeper.advance(100));
        assert!(beeper.is_sounding());
    }
}
