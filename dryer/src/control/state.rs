// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Control state types.

/// Top-level power state.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PowerState {
    Off,
    On,
}

/// Menu sub-state while powered on. Mode cycles Temperature → Duration → Work → Temperature.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MenuState {
    /// Temperature setpoint view.
    Temperature,
    /// Duration setpoint view.
    Duration,
    /// Run view with the rotating work screens.
    Work,
}

impl MenuState {
    pub fn next(self) -> Self {
        match self {
            MenuState::Temperature => MenuState::Duration,
            MenuState::Duration => MenuState::Work,
            MenuState::Work => MenuState::Temperature,
        }
    }

    /// Views that time out back to [`MenuState::Work`].
    #[inline]
    pub fn times_out(self) -> bool {
        self != MenuState::Work
    }
}

/// Work-view screen, rotated while the menu sits in [`MenuState::Work`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Screen {
    /// Sensor temperature and humidity.
    Climate,
    /// Remaining run time.
    Remaining,
    /// Thermal-limiter temperature.
    Limiter,
}

impl Screen {
    pub fn next(self) -> Self {
        match self {
            Screen::Climate => Screen::Remaining,
            Screen::Remaining => Screen::Limiter,
            Screen::Limiter => Screen::Climate,
        }
    }
}
