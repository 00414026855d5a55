//! Unit tables mapping suffix spellings to integer multipliers.

use std::collections::BTreeMap;

/// Nanoseconds per second; durations are parsed into nanoseconds.
pub const NANOS_PER_SECOND: u64 = 1_000_000_000;

/// Default unit for duration strings with no suffix.
pub const DEFAULT_DURATION_UNIT: &str = "s";

/// Default unit for size strings with no suffix.
pub const DEFAULT_SIZE_UNIT: &str = "b";

/// Mapping from unit spelling to multiplier.
///
/// Lookup is exact, so case-insensitivity is expressed by registering both
/// spellings. Several spellings may alias the same multiplier.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnitTable {
    units: BTreeMap<String, u64>,
}

impl UnitTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `name` with the given multiplier, replacing any previous entry.
    pub fn with_unit(mut self, name: impl Into<String>, multiplier: u64) -> Self {
        self.units.insert(name.into(), multiplier);
        self
    }

    /// Register the lower and upper case spelling of a single-letter unit.
    fn with_letter(self, letter: char, multiplier: u64) -> Self {
        self.with_unit(letter.to_ascii_lowercase().to_string(), multiplier)
            .with_unit(letter.to_ascii_uppercase().to_string(), multiplier)
    }

    /// Duration units, in nanoseconds: `s`, `m`, `h`, `d`, `w` in either case.
    pub fn durations() -> Self {
        let minute = 60 * NANOS_PER_SECOND;
        let hour = 60 * minute;
        let day = 24 * hour;
        Self::new()
            .with_letter('s', NANOS_PER_SECOND)
            .with_letter('m', minute)
            .with_letter('h', hour)
            .with_letter('d', day)
            .with_letter('w', 7 * day)
    }

    /// Size units, in bytes: `b`, `k`, `m`, `g` (powers of 1024) in either case.
    pub fn sizes() -> Self {
        Self::new()
            .with_letter('b', 1)
            .with_letter('k', 1 << 10)
            .with_letter('m', 1 << 20)
            .with_letter('g', 1 << 30)
    }

    /// Multiplier registered for `unit`.
    pub fn multiplier(&self, unit: &str) -> Option<u64> {
        self.units.get(unit).copied()
    }

    /// All registered spellings, sorted.
    pub fn names(&self) -> Vec<String> {
        self.units.keys().cloned().collect()
    }
}
