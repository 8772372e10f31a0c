//! Scheduler priority-level access.
//!
//! A level is the nice value of the calling thread: numerically lower values
//! run more urgently and raising above the current level needs
//! `CAP_SYS_NICE`. Reads go through `getpriority`, writes through
//! `setpriority`, and raise/restore pairs are modeled as drop guards so the
//! original level comes back on every exit path.

use std::fmt;
use std::io;

use tracing::warn;

/// A scheduler priority level (raw nice value, -20..=19).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct PriorityLevel(i32);

impl PriorityLevel {
    /// Most urgent level; the default raise target for measurements.
    pub const ELEVATED: PriorityLevel = PriorityLevel(-20);

    #[inline]
    pub const fn from_nice(nice: i32) -> Self {
        Self(nice)
    }

    #[inline]
    pub const fn nice(self) -> i32 {
        self.0
    }

    /// Whether this level preempts `other` in the run queue.
    #[inline]
    pub fn is_more_urgent_than(self, other: PriorityLevel) -> bool {
        self.0 < other.0
    }

    /// Read the calling thread's current level. No side effects.
    ///
    /// `getpriority` legitimately returns -1 for nice value -1, so errno has
    /// to be cleared before the call and consulted afterwards.
    #[inline]
    pub fn current() -> io::Result<PriorityLevel> {
        unsafe {
            *libc::__errno_location() = 0;
        }
        let nice = unsafe { libc::getpriority(libc::PRIO_PROCESS, 0) };
        if nice == -1 {
            let err = io::Error::last_os_error();
            if err.raw_os_error() != Some(0) {
                return Err(err);
            }
        }
        Ok(PriorityLevel(nice))
    }

    /// Make this level the calling thread's current level.
    #[inline]
    fn set(self) -> io::Result<()> {
        let rc = unsafe { libc::setpriority(libc::PRIO_PROCESS, 0, self.0) };
        if rc != 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }
}

impl fmt::Display for PriorityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Raises the calling thread to a target level and restores the saved level
/// when dropped.
///
/// Restoration failure is logged rather than propagated; `Drop` has no error
/// channel and the measurement result is already decided by then.
#[derive(Debug)]
pub struct PriorityGuard {
    previous: PriorityLevel,
}

impl PriorityGuard {
    /// Save the current level, then switch to `target`.
    #[inline]
    pub fn raise(target: PriorityLevel) -> io::Result<PriorityGuard> {
        let previous = PriorityLevel::current()?;
        target.set()?;
        Ok(PriorityGuard { previous })
    }

    /// The level that was in effect when this guard raised.
    #[inline]
    pub fn previous(&self) -> PriorityLevel {
        self.previous
    }
}

impl Drop for PriorityGuard {
    #[inline]
    fn drop(&mut self) {
        if let Err(err) = self.previous.set() {
            warn!("failed to restore priority level {}: {}", self.previous, err);
        }
    }
}
