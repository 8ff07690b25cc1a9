//! Time sources for the timer wheel.
//!
//! The wheel does all its arithmetic in nanoseconds relative to its own
//! start, so a time source is just a monotonic nanosecond counter. The
//! production source wraps the platform monotonic clock; the virtual source
//! only moves when told to, which is what makes wheel behavior testable
//! tick by tick.

use std::sync::atomic::{AtomicU64, Ordering};

/// Monotonic nanosecond source, pluggable for deterministic tests.
pub trait TimeSource: Send + Sync {
    /// Returns the current time in nanoseconds.
    ///
    /// Must be monotonically non-decreasing for the lifetime of any wheel
    /// constructed over it.
    fn nanos(&self) -> u64;
}

/// Wall clock time source for production use.
///
/// Uses `std::time::Instant` internally; the epoch is the moment this
/// source was created.
#[derive(Debug)]
pub struct WallClock {
    epoch: std::time::Instant,
}

impl WallClock {
    /// Creates a new wall clock time source.
    #[must_use]
    pub fn new() -> Self {
        Self {
            epoch: std::time::Instant::now(),
        }
    }
}

impl Default for WallClock {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for WallClock {
    fn nanos(&self) -> u64 {
        self.epoch.elapsed().as_nanos() as u64
    }
}

/// Virtual time source for deterministic tests.
///
/// Time only advances when explicitly told to do so.
///
/// # Example
///
/// ```
/// use spindle::time::{TimeSource, VirtualClock};
///
/// let clock = VirtualClock::new();
/// assert_eq!(clock.nanos(), 0);
///
/// clock.advance(1_000_000_000); // 1 second
/// assert_eq!(clock.nanos(), 1_000_000_000);
/// ```
#[derive(Debug, Default)]
pub struct VirtualClock {
    now: AtomicU64,
}

impl VirtualClock {
    /// Creates a virtual clock starting at time zero.
    #[must_use]
    pub fn new() -> Self {
        Self {
            now: AtomicU64::new(0),
        }
    }

    /// Creates a virtual clock starting at the given nanosecond value.
    #[must_use]
    pub fn starting_at(nanos: u64) -> Self {
        Self {
            now: AtomicU64::new(nanos),
        }
    }

    /// Advances time by the given number of nanoseconds.
    pub fn advance(&self, nanos: u64) {
        self.now.fetch_add(nanos, Ordering::Release);
    }

    /// Sets the current time. Callers are responsible for keeping the
    /// sequence of values monotonic.
    pub fn set(&self, nanos: u64) {
        self.now.store(nanos, Ordering::Release);
    }
}

impl TimeSource for VirtualClock {
    fn nanos(&self) -> u64 {
        self.now.load(Ordering::Acquire)
    }
}
