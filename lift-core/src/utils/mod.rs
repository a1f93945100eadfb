//! Utility re-exports and helper macros for the lift firmware.
//!
//! - `connection`: UDP command protocol and transport
//! - `controllers`: motor safety controller and button interlock
//! - `scheduler`: one control cycle, tying the controllers to the network
//! - `display`: status surface pushed to the display collaborator
//! - `config`: runtime configuration and board defaults
//! - `time`: wrapping millisecond tick clock
//!
//! The `mk_static!` macro simplifies static initialization in no-std contexts.

pub mod config;
pub mod connection;
pub mod controllers;
pub mod display;
pub mod scheduler;
pub mod time;

pub use config::LiftConfig;
pub use controllers::{ButtonInterlock, ButtonState, MotorController};
pub use embassy_time::{Duration, Instant, Timer};
pub use scheduler::{Effects, Fault, Scheduler};
pub use time::Tick;

#[macro_export]
/// Initialize a no-std static cell and write the given value into it.
///
/// This macro creates a `static_cell::StaticCell` for type `$t` and initializes
/// it with `$val`, returning a mutable reference to the stored value.
macro_rules! mk_static {
    ($t:ty, $val:expr) => {{
        static STATIC_CELL: static_cell::StaticCell<$t> = static_cell::StaticCell::new();
        STATIC_CELL.uninit().write($val)
    }};
}
