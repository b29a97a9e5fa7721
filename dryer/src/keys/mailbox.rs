// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Single-slot key mailbox.
//!
//! The tick interrupt posts, the main loop takes. The whole slot is one byte, so a post and a take
//! can never observe half of the other. A post overwrites an unconsumed event: under rapid input
//! the older event is lost rather than queued.

use portable_atomic::{AtomicU8, Ordering};

use super::{KeyEvent, KeyId, KeyPress};

const EMPTY: u8 = 0;
const LONG_FLAG: u8 = 0x80;

pub struct KeyMailbox {
    slot: AtomicU8,
}

impl KeyMailbox {
    pub const fn new() -> Self {
        Self {
            slot: AtomicU8::new(EMPTY),
        }
    }

    /// Post an event, replacing any unconsumed one.
    #[inline]
    pub fn post(&self, press: KeyPress) {
        self.slot.store(encode(press), Ordering::Release);
    }

    /// Take the pending event, leaving the slot empty.
    #[inline]
    pub fn take(&self) -> Option<KeyPress> {
        decode(self.slot.swap(EMPTY, Ordering::AcqRel))
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.slot.load(Ordering::Acquire) == EMPTY
    }
}

impl Default for KeyMailbox {
    fn default() -> Self {
        Self::new()
    }
}

fn encode(press: KeyPress) -> u8 {
    // Key indices are offset by one so that zero stays "empty".
    let key = press.key.index() as u8 + 1;
    match press.event {
        KeyEvent::Pressed => key,
        KeyEvent::LongPressed => key | LONG_FLAG,
    }
}

fn decode(raw: u8) -> Option<KeyPress> {
    let key = match raw & !LONG_FLAG {
        1 => KeyId::Power,
        2 => KeyId::Mode,
        3 => KeyId::Up,
        _ => return None,
    };
    let event = if raw & LONG_FLAG != 0 {
        KeyEvent::LongPressed
    } else {
        KeyEvent::Pressed
    };
    Some(KeyPress { key, event })
}
