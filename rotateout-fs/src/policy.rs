//! When to rotate.
//!
//! A rotation epoch starts whenever a fresh active file is opened and tracks
//! when that happened and how many bytes went in since. The policy compares
//! the epoch against size and age thresholds; a threshold of zero disables
//! that check. Both comparisons are strict, so a file may reach exactly the
//! limit without rotating.

use std::time::Duration;

use chrono::{DateTime, Utc};
use rotateout_clock::Clock;

/// Size and age limits for the active file. Zero disables a limit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RotationThresholds {
    pub max_bytes: u64,
    pub max_age: Duration,
}

impl RotationThresholds {
    /// Limits of `max_bytes` bytes and `max_age`; zero disables either.
    pub fn new(max_bytes: u64, max_age: Duration) -> Self {
        Self { max_bytes, max_age }
    }

    /// Thresholds that never trigger.
    pub fn disabled() -> Self {
        Self::default()
    }
}

/// Why a rotation is due.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotationTrigger {
    /// The active file is older than `max_age`.
    Age,
    /// More than `max_bytes` were written to the active file.
    Size,
}

impl std::fmt::Display for RotationTrigger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RotationTrigger::Age => write!(f, "max age exceeded"),
            RotationTrigger::Size => write!(f, "max size exceeded"),
        }
    }
}

/// State of the current active file. Replaced as a whole, never edited field by field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RotationEpoch {
    started_at: DateTime<Utc>,
    bytes_written: u64,
}

impl RotationEpoch {
    /// A new epoch starting at `now` with nothing written.
    pub fn begin(now: DateTime<Utc>) -> Self {
        Self {
            started_at: now,
            bytes_written: 0,
        }
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    /// The same epoch with `n` more bytes written.
    pub fn after_write(self, n: u64) -> Self {
        Self {
            bytes_written: self.bytes_written.saturating_add(n),
            ..self
        }
    }

    /// Time since the epoch began. A clock that stepped backwards yields zero.
    pub fn age(&self, now: DateTime<Utc>) -> Duration {
        (now - self.started_at).to_std().unwrap_or(Duration::ZERO)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PolicyState {
    Fresh,
    Active(RotationEpoch),
}

/// Decides whether the active file is due for rotation.
#[derive(Debug, Clone)]
pub struct RotationPolicy {
    thresholds: RotationThresholds,
    state: PolicyState,
}

impl RotationPolicy {
    pub fn new(thresholds: RotationThresholds) -> Self {
        Self {
            thresholds,
            state: PolicyState::Fresh,
        }
    }

    pub fn thresholds(&self) -> RotationThresholds {
        self.thresholds
    }

    /// The current epoch, or `None` before the first reset.
    pub fn epoch(&self) -> Option<RotationEpoch> {
        match self.state {
            PolicyState::Fresh => None,
            PolicyState::Active(epoch) => Some(epoch),
        }
    }

    /// Start a new epoch at the clock's current time.
    pub fn reset<C: Clock>(&mut self, clock: &C) {
        self.state = PolicyState::Active(RotationEpoch::begin(clock.now()));
    }

    /// Count `n` bytes against the current epoch. Ignored before the first reset.
    pub fn record_write(&mut self, n: u64) {
        if let PolicyState::Active(epoch) = self.state {
            self.state = PolicyState::Active(epoch.after_write(n));
        }
    }

    /// Check the thresholds and report which one, if any, is exceeded.
    ///
    /// The first call on a fresh policy starts an epoch and never asks for a
    /// rotation.
    pub fn check<C: Clock>(&mut self, clock: &C) -> Option<RotationTrigger> {
        let epoch = match self.state {
            PolicyState::Fresh => {
                self.reset(clock);
                return None;
            }
            PolicyState::Active(epoch) => epoch,
        };

        let max_age = self.thresholds.max_age;
        if !max_age.is_zero() && epoch.age(clock.now()) > max_age {
            return Some(RotationTrigger::Age);
        }

        let max_bytes = self.thresholds.max_bytes;
        if max_bytes > 0 && epoch.bytes_written() > max_bytes {
            return Some(RotationTrigger::Size);
        }

        None
    }

    /// Whether a rotation is due; see [`RotationPolicy::check`].
    pub fn needs_rotation<C: Clock>(&mut self, clock: &C) -> bool {
        self.check(clock).is_some()
    }
}
