//! Clock abstraction for rotateout.
//!
//! Rotation decisions and rotated-file timestamps both read "now" through the
//! [`Clock`] trait, so the engine can be driven by a mock in tests.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, TimeZone, Utc};

/// Trait for getting the current wall-clock time.
pub trait Clock: Send + Sync {
    /// Returns the current time in UTC.
    fn now(&self) -> DateTime<Utc>;
}

/// Real system clock implementation.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }
}

/// Convert Unix seconds to a UTC timestamp, falling back to the epoch when
/// the value is out of chrono's range.
pub fn from_unix_sec(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(secs, 0).single().unwrap_or_default()
}

/// Mock clock for testing.
///
/// Clones share the same instant, so a test can keep one handle and move
/// time forward while the code under test owns another.
#[derive(Debug, Clone)]
pub struct MockClock {
    now: Arc<Mutex<DateTime<Utc>>>,
}

impl MockClock {
    /// Create a mock clock stopped at `now`.
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: Arc::new(Mutex::new(now)),
        }
    }

    /// Create a mock clock stopped at the given Unix second.
    pub fn at_unix_sec(secs: i64) -> Self {
        Self::new(from_unix_sec(secs))
    }

    /// Set the current instant.
    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.lock().unwrap() = now;
    }

    /// Move the clock forward (or backward, for a negative delta).
    pub fn advance(&self, delta: Duration) {
        let mut now = self.now.lock().unwrap();
        *now += delta;
    }
}

impl Clock for MockClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}
