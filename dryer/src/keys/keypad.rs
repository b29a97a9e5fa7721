// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Binds debouncers to the physical key inputs.
//!
//! The keypad is owned by the tick interrupt. [`Keypad::poll`] must stay short and non-blocking: it
//! reads each pin once, steps its debouncer and posts at most one event per key.

use embedded_hal::digital::v2::InputPin;

use super::{Debouncer, KeyId, KeyMailbox, KeyPress};
use crate::drivers::switch::ActiveLevel;

/// One physical key: identity, input line and press-duration state.
///
/// The key's indicator LED is an output and is driven by the controller through
/// [`Actuators::set_key_indicator`](crate::control::Actuators::set_key_indicator).
pub struct KeyChannel<PIN: InputPin> {
    id: KeyId,
    pin: PIN,
    active: ActiveLevel,
    debouncer: Debouncer,
}

impl<PIN: InputPin> KeyChannel<PIN> {
    pub fn new(id: KeyId, pin: PIN, active: ActiveLevel) -> Self {
        Self::with_debouncer(id, pin, active, Debouncer::new())
    }

    pub fn with_debouncer(id: KeyId, pin: PIN, active: ActiveLevel, debouncer: Debouncer) -> Self {
        Self {
            id,
            pin,
            active,
            debouncer,
        }
    }

    /// Key wired to ground with a pull-up, the usual front-panel arrangement.
    pub fn active_low(id: KeyId, pin: PIN) -> Self {
        Self::new(id, pin, ActiveLevel::Low)
    }

    /// Sample the pin and advance the debouncer by one tick.
    pub fn poll(&mut self) -> Option<KeyPress> {
        let asserted = self.active.is_asserted(&self.pin);
        self.debouncer
            .step(asserted)
            .map(|event| KeyPress::new(self.id, event))
    }
}

/// Fixed set of keys sampled together every tick.
pub struct Keypad<PIN: InputPin, const N: usize> {
    channels: [KeyChannel<PIN>; N],
}

impl<PIN: InputPin, const N: usize> Keypad<PIN, N> {
    pub fn new(channels: [KeyChannel<PIN>; N]) -> Self {
        Self { channels }
    }

    /// Step every key by one tick, posting any resulting event.
    pub fn poll(&mut self, mailbox: &KeyMailbox) {
        for channel in self.channels.iter_mut() {
            if let Some(press) = channel.poll() {
                mailbox.post(press);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::KeyEvent;
    use crate::testing::FakePin;

    #[test]
    fn active_low_key_reports_short_press() {
        let pin = FakePin::new(true);
        let level = pin.level();
        let mut keypad = Keypad::new([KeyChannel::active_low(KeyId::Mode, pin)]);
        let mailbox = KeyMailbox::new();

        level.set(false);
        for _ in 0..40 {
            keypad.poll(&mailbox);
        }
        assert!(mailbox.is_empty());

        level.set(true);
        keypad.poll(&mailbox);
        assert_eq!(mailbox.take(), Some(KeyPress::short(KeyId::Mode)));
    }

    #[test]
    fn later_key_overwrites_unconsumed_event() {
        let power = FakePin::new(true);
        let up = FakePin::new(true);
        let (power_level, up_level) = (power.level(), up.level());
        let mut keypad = Keypad::new([
            KeyChannel::active_low(KeyId::Power, power),
            KeyChannel::with_debouncer(
                KeyId::Up,
                up,
                ActiveLevel::Low,
                Debouncer::with_threshold(5),
            ),
        ]);
        let mailbox = KeyMailbox::new();

        power_level.set(false);
        keypad.poll(&mailbox);
        power_level.set(true);
        keypad.poll(&mailbox);

        up_level.set(false);
        for _ in 0..5 {
            keypad.poll(&mailbox);
        }

        assert_eq!(
            mailbox.take(),
            Some(KeyPress::new(KeyId::Up, KeyEvent::LongPressed))
        );
        assert_eq!(mailbox.take(), None);
    }
}
