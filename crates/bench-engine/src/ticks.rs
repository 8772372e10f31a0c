//! 100 ns tick timestamps for bracketing measurement phases.
//!
//! Reads `CLOCK_MONOTONIC_RAW`, which is monotonic, available without any
//! special privilege, and cheap enough (vDSO) that a pair of reads around a
//! million-iteration loop contributes nothing measurable.

use std::time::Duration;

/// Nanoseconds per tick.
pub const TICK_NANOS: u64 = 100;

/// Ticks per whole microsecond.
pub const TICKS_PER_MICRO: u64 = 10;

/// Monotonic timestamp with 100 ns resolution.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct TickInstant {
    ticks: u64,
}

impl TickInstant {
    /// Current monotonic time in ticks.
    #[inline]
    pub fn now() -> Self {
        let mut ts = libc::timespec {
            tv_sec: 0,
            tv_nsec: 0,
        };
        // CLOCK_MONOTONIC_RAW cannot fail on any kernel we run on.
        let rc = unsafe { libc::clock_gettime(libc::CLOCK_MONOTONIC_RAW, &mut ts) };
        debug_assert_eq!(rc, 0);

        let nanos = ts.tv_sec as u64 * 1_000_000_000 + ts.tv_nsec as u64;
        Self {
            ticks: nanos / TICK_NANOS,
        }
    }

    /// Create a timestamp from a raw tick count.
    #[inline]
    pub fn from_ticks(ticks: u64) -> Self {
        Self { ticks }
    }

    /// Raw tick count.
    #[inline]
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Ticks elapsed since this timestamp.
    #[inline]
    pub fn elapsed_ticks(&self) -> u64 {
        Self::now().ticks.saturating_sub(self.ticks)
    }
}

/// Whole microseconds between two timestamps.
///
/// Truncating division: 19 ticks is 1 us, 9 ticks is 0 us. Callers depend on
/// the result never being rounded up.
#[inline]
pub fn elapsed_micros(start: TickInstant, end: TickInstant) -> u64 {
    end.ticks.saturating_sub(start.ticks) / TICKS_PER_MICRO
}

/// Convenience conversion for display paths.
#[inline]
pub fn elapsed_duration(start: TickInstant, end: TickInstant) -> Duration {
    Duration::from_nanos(end.ticks.saturating_sub(start.ticks) * TICK_NANOS)
}
