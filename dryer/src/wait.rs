// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Iteration-bounded spin wait.
//!
//! Every blocking hardware wait (bus events, ADC conversions, flash operations) goes through
//! [`spin_until`] so a peripheral that never answers costs at most `budget` polls instead of a
//! stalled main loop. The tick interrupt keeps running during the spin.

use thiserror::Error;

/// A bounded wait ran out of iterations.
#[derive(Copy, Clone, Debug, Error, PartialEq, Eq)]
#[error("wait budget exhausted")]
pub struct Timeout;

/// Poll `ready` until it returns true, at most `budget` times.
///
/// ```
/// use dryer::wait::{spin_until, Timeout};
///
/// let mut polls = 0;
/// assert_eq!(spin_until(10, || { polls += 1; polls == 3 }), Ok(()));
/// assert_eq!(spin_until(10, || false), Err(Timeout));
/// ```
pub fn spin_until<F>(budget: u32, mut ready: F) -> Result<(), Timeout>
where
    F: FnMut() -> bool,
{
    for _ in 0..budget {
        if ready() {
            return Ok(());
        }
        core::hint::spin_loop();
    }
    Err(Timeout)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stops_polling_at_budget() {
        let mut polls = 0u32;
        let result = spin_until(100, || {
            polls += 1;
            false
        });
        assert_eq!(result, Err(Timeout));
        assert_eq!(polls, 100);
    }

    #[test]
    fn zero_budget_never_polls() {
        let mut polled = false;
        assert_eq!(
            spin_until(0, || {
                polled = true;
                true
            }),
            Err(Timeout)
        );
        assert!(!polled);
    }
}
