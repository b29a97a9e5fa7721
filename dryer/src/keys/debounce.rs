// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Per-key press-duration state machine.
//!
//! Exactly one event is produced per physical press: a short press on release, or a long press at
//! the tick the hold duration reaches the threshold. Never both.
//!
//! ```text
//!            asserted                 count + 1 == threshold
//!   Idle ─────────────► Timing(n) ───────────────────────► LongReported
//!    ▲                   │   ▲  asserted, n < threshold          │
//!    │   released        │   └───┘                               │
//!    │   (emit Pressed)  │                                       │
//!    └───────────────────┘◄──────────────────────────────────────┘
//!                                  released (no event)
//! ```

use super::KeyEvent;
use crate::config::LONG_PRESS_TICKS;

/// Debounce state of one key.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DebounceState {
    /// Released, counter at zero.
    Idle,
    /// Held for `n` ticks, `0 < n < threshold`.
    Timing(u16),
    /// Long press already reported; waiting for release.
    LongReported,
}

/// Press-duration tracker for a single key, stepped once per tick.
#[derive(Copy, Clone, Debug)]
pub struct Debouncer {
    state: DebounceState,
    threshold: u16,
}

impl Debouncer {
    /// Create a debouncer with the default long-press threshold.
    pub const fn new() -> Self {
        Self::with_threshold(LONG_PRESS_TICKS)
    }

    /// Create a debouncer reporting a long press after `threshold` ticks (minimum 1).
    pub const fn with_threshold(threshold: u16) -> Self {
        Self {
            state: DebounceState::Idle,
            threshold: if threshold == 0 { 1 } else { threshold },
        }
    }

    #[inline]
    pub fn state(&self) -> DebounceState {
        self.state
    }

    /// Advance by one tick with the current (already level-corrected) input.
    pub fn step(&mut self, asserted: bool) -> Option<KeyEvent> {
        let (next, event) = match (self.state, asserted) {
            (DebounceState::Idle, false) => (DebounceState::Idle, None),
            (DebounceState::Idle, true) => self.hold(0),
            (DebounceState::Timing(held), true) => self.hold(held),
            (DebounceState::Timing(_), false) => (DebounceState::Idle, Some(KeyEvent::Pressed)),
            (DebounceState::LongReported, true) => (DebounceState::LongReported, None),
            (DebounceState::LongReported, false) => (DebounceState::Idle, None),
        };
        self.state = next;
        event
    }

    fn hold(&self, held: u16) -> (DebounceState, Option<KeyEvent>) {
        let held = held.saturating_add(1);
        if held >= self.threshold {
            (DebounceState::LongReported, Some(KeyEvent::LongPressed))
        } else {
            (DebounceState::Timing(held), None)
        }
    }
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new()
    }
}
