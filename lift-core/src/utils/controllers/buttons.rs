//! Local pushbutton override.
//!
//! Two active-high buttons ("up" and "down") are sampled every cycle. The
//! interlock keeps no memory between samples; holding a button keeps renewing
//! a short deadline, releasing it lets the motor stop on its own.

use embedded_hal::digital::InputPin;

use super::motor::MAX_SPEED;

/// Snapshot of the two buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonState {
    Released,
    Up,
    Down,
    /// Both held: stop.
    Both,
}

impl ButtonState {
    pub fn from_levels(
        up: bool,
        down: bool,
    ) -> Self {
        match (up, down) {
            (true, true) => ButtonState::Both,
            (true, false) => ButtonState::Up,
            (false, true) => ButtonState::Down,
            (false, false) => ButtonState::Released,
        }
    }

    /// Speed forced by the buttons, or `None` when nothing is pressed.
    pub fn override_speed(self) -> Option<i32> {
        match self {
            ButtonState::Released => None,
            ButtonState::Up => Some(MAX_SPEED),
            ButtonState::Down => Some(-MAX_SPEED),
            ButtonState::Both => Some(0),
        }
    }

    pub fn is_active(self) -> bool {
        self != ButtonState::Released
    }
}

/// Reads the up/down button pair.
pub struct ButtonInterlock<Pin> {
    up: Pin,
    down: Pin,
}

impl<Pin, E> ButtonInterlock<Pin>
where
    Pin: InputPin<Error = E>,
{
    pub fn new(
        up: Pin,
        down: Pin,
    ) -> Self {
        Self { up, down }
    }

    /// Sample both buttons.
    pub fn read(&mut self) -> Result<ButtonState, E> {
        let up = self.up.is_high()?;
        let down = self.down.is_high()?;
        Ok(ButtonState::from_levels(up, down))
    }

    /// Sample both buttons, treating a failed read as both pressed so the
    /// motor is held stopped until the inputs read cleanly again.
    pub fn read_or_stop(&mut self) -> ButtonState
    where
        E: core::fmt::Debug,
    {
        self.read().unwrap_or_else(|error| {
            tracing::error!(?error, "button read failed, forcing stop");
            ButtonState::Both
        })
    }
}
