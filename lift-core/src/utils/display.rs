//! Status surface.
//!
//! The scheduler hands out a [`LiftStatus`] at a bounded rate; what happens to
//! it (OLED, console, nothing) is up to the [`StatusDisplay`] implementation.

/// Snapshot pushed to the status display.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LiftStatus {
    /// Peers attached to the access point, if the platform can count them.
    pub station_count: Option<u16>,
    /// Applied motor speed.
    pub speed: i32,
    /// Seconds since the dead-man deadline; negative while it is still armed.
    pub seconds_since_deadline: f32,
}

/// Sink for status snapshots.
pub trait StatusDisplay {
    type Error: core::fmt::Debug;

    fn show(
        &mut self,
        status: &LiftStatus,
    ) -> Result<(), Self::Error>;
}
