//! Millisecond tick clock for deadline bookkeeping.
//!
//! The controller only ever compares two instants, so time is kept as a 32-bit
//! millisecond counter. Comparisons go through the signed wrapping difference,
//! which keeps the dead-man deadline correct when the counter rolls over
//! (about every 49.7 days) as long as windows stay below 2^31 ms.

use embassy_time::Instant;

/// A point on the monotonic millisecond clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Tick(pub u32);

impl Tick {
    /// Current time from the embassy time driver.
    pub fn now() -> Self {
        Self::from(Instant::now())
    }

    /// This tick moved by `ms` milliseconds; a negative offset lands in the
    /// past.
    pub const fn offset(self, ms: i32) -> Self {
        Tick(self.0.wrapping_add_signed(ms))
    }

    /// Signed milliseconds from `earlier` to `self`.
    pub const fn since(self, earlier: Tick) -> i32 {
        self.0.wrapping_sub(earlier.0) as i32
    }

    /// True if `self` is strictly later than `other`.
    pub const fn is_after(self, other: Tick) -> bool {
        self.since(other) > 0
    }
}

impl From<Instant> for Tick {
    fn from(instant: Instant) -> Self {
        // truncation is the wraparound
        Tick(instant.as_millis() as u32)
    }
}
