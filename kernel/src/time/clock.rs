//! Monotonic clock and time newtypes
//!
//! Millisecond resolution: quanta and sleep deadlines are wall-clock
//! milliseconds. Arithmetic saturates.

use core::ops::{Add, Sub};
use core::sync::atomic::{AtomicU64, Ordering};

/// Monotonic timestamp (milliseconds since boot)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Timestamp(pub u64);

impl Timestamp {
    pub const ZERO: Self = Self(0);

    pub const fn from_ms(ms: u64) -> Self {
        Self(ms)
    }

    pub const fn as_ms(&self) -> u64 {
        self.0
    }
}

impl Add<Duration> for Timestamp {
    type Output = Timestamp;

    fn add(self, rhs: Duration) -> Self::Output {
        Timestamp(self.0.saturating_add(rhs.0))
    }
}

impl Sub<Duration> for Timestamp {
    type Output = Timestamp;

    fn sub(self, rhs: Duration) -> Self::Output {
        Timestamp(self.0.saturating_sub(rhs.0))
    }
}

impl Sub<Timestamp> for Timestamp {
    type Output = Duration;

    fn sub(self, rhs: Timestamp) -> Self::Output {
        Duration(self.0.saturating_sub(rhs.0))
    }
}

/// Time span (milliseconds)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Duration(pub u64);

impl Duration {
    pub const ZERO: Self = Self(0);

    pub const fn from_ms(ms: u64) -> Self {
        Self(ms)
    }

    pub const fn from_secs(secs: u64) -> Self {
        Self(secs * 1_000)
    }

    pub const fn as_ms(&self) -> u64 {
        self.0
    }

    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl Add for Duration {
    type Output = Duration;

    fn add(self, rhs: Duration) -> Self::Output {
        Duration(self.0.saturating_add(rhs.0))
    }
}

impl Sub for Duration {
    type Output = Duration;

    fn sub(self, rhs: Duration) -> Self::Output {
        Duration(self.0.saturating_sub(rhs.0))
    }
}

/// Monotonic millisecond counter, advanced by the platform tick.
///
/// Owned by the scheduler rather than global so several instances can
/// coexist (and tests drive time explicitly).
pub struct Clock {
    now_ms: AtomicU64,
}

impl Clock {
    pub const fn new() -> Self {
        Self {
            now_ms: AtomicU64::new(0),
        }
    }

    /// Current monotonic time.
    pub fn now(&self) -> Timestamp {
        Timestamp(self.now_ms.load(Ordering::Acquire))
    }

    /// Advance the clock; called from the platform timer tick.
    pub fn advance(&self, delta: Duration) {
        self.now_ms.fetch_add(delta.as_ms(), Ordering::Release);
    }

    /// Wall time elapsed since `since`.
    pub fn elapsed_since(&self, since: Timestamp) -> Duration {
        self.now() - since
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}
