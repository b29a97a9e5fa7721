// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # Keys
//!
//! The three front-panel buttons are sampled once per tick from the scheduler interrupt. Each key
//! runs its own [`Debouncer`]; the resulting events are handed to the main loop through a
//! single-slot [`KeyMailbox`].
//!
//! ## Modules
//!
//! - [`debounce`] - Per-key short/long press state machine.
//! - [`mailbox`] - Overwriting single-slot handoff from interrupt to main loop.
//! - [`keypad`] - Binds debouncers to input pins.

pub mod debounce;
pub mod keypad;
pub mod mailbox;

pub use debounce::{DebounceState, Debouncer};
pub use keypad::{KeyChannel, Keypad};
pub use mailbox::KeyMailbox;

/// Front-panel key identity.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum KeyId {
    Power,
    Mode,
    Up,
}

impl KeyId {
    pub const ALL: [KeyId; 3] = [KeyId::Power, KeyId::Mode, KeyId::Up];

    #[inline]
    pub fn index(self) -> usize {
        match self {
            KeyId::Power => 0,
            KeyId::Mode => 1,
            KeyId::Up => 2,
        }
    }
}

/// What happened to a key.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum KeyEvent {
    /// Released before the long-press threshold.
    Pressed,
    /// Held up to the long-press threshold (reported while still held).
    LongPressed,
}

/// A key event as delivered to the controller.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct KeyPress {
    pub key: KeyId,
    pub event: KeyEvent,
}

impl KeyPress {
    pub fn new(key: KeyId, event: KeyEvent) -> Self {
        Self { key, event }
    }

    pub fn short(key: KeyId) -> Self {
        Self::new(key, KeyEvent::Pressed)
    }

    pub fn long(key: KeyId) -> Self {
        Self::new(key, KeyEvent::LongPressed)
    }
}
