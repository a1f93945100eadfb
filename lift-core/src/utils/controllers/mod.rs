//! Module Exports
//!
//! Hardware-facing controllers of the lift.
//!
//! - `motor`: dead-man motor controller driving the H-bridge.
//! - `buttons`: local up/down override buttons.

pub mod buttons;
/// Motor safety controller for the H-bridge outputs.
pub mod motor;

pub use buttons::{ButtonInterlock, ButtonState};
pub use motor::{Direction, MotorController, MotorError, MAX_SPEED};
