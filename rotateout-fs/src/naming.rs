//! Names for rotated files.
//!
//! The active file is always `<base><suffix>`. A rotated file becomes
//! `<base>[.<time>][_NNNN]<suffix>`, where the time part comes from an
//! optional strftime pattern and the 4-digit counter is only added when the
//! plain name is already taken. `.` sorts before `_`, so within one time part
//! the bare name and then the counters come out in rotation order.

use std::ffi::OsString;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Local, Utc};
use rotateout_clock::{from_unix_sec, Clock};
use thiserror::Error;

use crate::filesystem::{Filesystem, FsError};

/// Highest collision counter tried before giving up.
pub const MAX_DISAMBIGUATOR: u32 = 9999;

/// Errors from rotated-name generation.
#[derive(Debug, Error)]
pub enum NamingError {
    #[error("invalid time format {pattern:?}")]
    InvalidTimePattern { pattern: String },

    #[error("cannot check whether {} exists: {source}", .path.display())]
    Probe {
        path: PathBuf,
        #[source]
        source: FsError,
    },

    #[error(
        "no free rotated file name for {} after {attempts} attempts; \
         rotation is faster than the time format can tell apart",
        .base.display()
    )]
    Exhausted { base: PathBuf, attempts: u32 },
}

/// A strftime pattern checked to be well formed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimePattern(String);

impl TimePattern {
    /// Validate `pattern` against chrono's strftime syntax.
    ///
    /// Specifiers chrono only understands when parsing (such as `%#z`) pass
    /// the syntax check but fail when formatting, so the pattern is also
    /// rendered once against a fixed instant.
    pub fn new(pattern: impl Into<String>) -> Result<Self, NamingError> {
        let pattern = pattern.into();
        if StrftimeItems::new(&pattern).any(|item| matches!(item, Item::Error)) {
            return Err(NamingError::InvalidTimePattern { pattern });
        }
        let mut rendered = String::new();
        if write!(rendered, "{}", from_unix_sec(0).format(&pattern)).is_err() {
            return Err(NamingError::InvalidTimePattern { pattern });
        }
        Ok(Self(pattern))
    }

    /// The pattern as given.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Format `now` in UTC or in the local time zone.
    pub fn format(&self, now: DateTime<Utc>, use_utc: bool) -> String {
        if use_utc {
            now.format(&self.0).to_string()
        } else {
            now.with_timezone(&Local).format(&self.0).to_string()
        }
    }
}

/// Where output goes and how rotated files are named.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputTarget {
    pub base_name: PathBuf,
    pub suffix: String,
    pub time_pattern: Option<TimePattern>,
    pub use_utc: bool,
}

impl OutputTarget {
    /// Target writing to `<base_name><suffix>`, with no time part in
    /// rotated names and local time.
    pub fn new(base_name: impl Into<PathBuf>, suffix: impl Into<String>) -> Self {
        Self {
            base_name: base_name.into(),
            suffix: suffix.into(),
            time_pattern: None,
            use_utc: false,
        }
    }

    /// Put a formatted timestamp into rotated names.
    pub fn with_time_pattern(mut self, pattern: TimePattern) -> Self {
        self.time_pattern = Some(pattern);
        self
    }

    /// Format that timestamp in UTC instead of local time.
    pub fn with_utc(mut self, use_utc: bool) -> Self {
        self.use_utc = use_utc;
        self
    }

    /// Path of the file currently being written.
    pub fn active_path(&self) -> PathBuf {
        self.path_with("")
    }

    /// `<base><infix><suffix>`, built on the raw OS string so non-UTF-8
    /// base names survive.
    fn path_with(&self, infix: &str) -> PathBuf {
        let mut name = OsString::from(self.base_name.as_os_str());
        name.push(infix);
        name.push(&self.suffix);
        PathBuf::from(name)
    }

    /// `.<formatted time>`, or empty without a pattern or when it formats to nothing.
    fn time_part(&self, now: DateTime<Utc>) -> String {
        match &self.time_pattern {
            Some(pattern) => {
                let formatted = pattern.format(now, self.use_utc);
                if formatted.is_empty() {
                    formatted
                } else {
                    format!(".{}", formatted)
                }
            }
            None => String::new(),
        }
    }
}

fn is_taken<F: Filesystem>(fs: &F, path: &Path) -> Result<bool, NamingError> {
    fs.exists(path).map_err(|source| NamingError::Probe {
        path: path.to_path_buf(),
        source,
    })
}

/// Pick the name the active file should be renamed to.
///
/// Tries `<base><time><suffix>` first, then `<base><time>_0001<suffix>` up
/// to `_9999`, and returns the first path that does not exist.
pub fn next_rotated_path<F: Filesystem, C: Clock>(
    fs: &F,
    clock: &C,
    target: &OutputTarget,
) -> Result<PathBuf, NamingError> {
    let time_part = target.time_part(clock.now());

    let plain = target.path_with(&time_part);
    if !is_taken(fs, &plain)? {
        return Ok(plain);
    }

    for counter in 1..=MAX_DISAMBIGUATOR {
        let candidate = target.path_with(&format!("{}_{:04}", time_part, counter));
        if !is_taken(fs, &candidate)? {
            return Ok(candidate);
        }
    }

    Err(NamingError::Exhausted {
        base: target.active_path(),
        attempts: MAX_DISAMBIGUATOR + 1,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filesystem::MockFilesystem;
    use chrono::TimeZone;
    use rotateout_clock::MockClock;

    fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> MockClock {
        MockClock::new(Utc.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap())
    }

    fn daily() -> TimePattern {
        TimePattern::new("%Y-%m-%d").unwrap()
    }

    // ===========================================
    // TimePattern
    // ===========================================

    #[test]
    fn test_time_pattern_valid() {
        let pattern = TimePattern::new("%Y-%m-%d-%H_%M_%S").expect("valid");
        assert_eq!(pattern.as_str(), "%Y-%m-%d-%H_%M_%S");
    }

    #[test]
    fn test_time_pattern_invalid() {
        let err = TimePattern::new("%Y-%Q").unwrap_err();
        assert!(matches!(
            err,
            NamingError::InvalidTimePattern { ref pattern } if pattern == "%Y-%Q"
        ));
        assert!(TimePattern::new("%").is_err());
    }

    #[test]
    fn test_time_pattern_parse_only_specifier_rejected() {
        let err = TimePattern::new("%#z").unwrap_err();
        assert!(matches!(
            err,
            NamingError::InvalidTimePattern { ref pattern } if pattern == "%#z"
        ));
        assert!(TimePattern::new("%Y-%#z").is_err());
    }

    #[test]
    fn test_time_pattern_accepted_patterns_format() {
        let clock = at(2024, 6, 30, 23, 59, 58);
        for raw in ["%Y", "%Y-%m-%d-%H_%M_%S", "%s", "%z", "%:z", "%Z", "%j", "%%", "plain"] {
            let pattern = TimePattern::new(raw).expect(raw);
            assert!(!pattern.format(clock.now(), true).is_empty(), "{}", raw);
            assert!(!pattern.format(clock.now(), false).is_empty(), "{}", raw);
        }
    }

    #[test]
    fn test_time_pattern_format_utc() {
        let clock = at(2024, 1, 1, 13, 5, 9);
        let pattern = TimePattern::new("%Y-%m-%d-%H_%M_%S").unwrap();
        assert_eq!(pattern.format(clock.now(), true), "2024-01-01-13_05_09");
    }

    #[test]
    fn test_time_pattern_format_local_matches_chrono_local() {
        let clock = at(2024, 6, 30, 23, 59, 59);
        let pattern = TimePattern::new("%Y%m%d%H%M%S").unwrap();
        let expected = clock.now().with_timezone(&Local).format("%Y%m%d%H%M%S").to_string();
        assert_eq!(pattern.format(clock.now(), false), expected);
    }

    // ===========================================
    // OutputTarget
    // ===========================================

    #[test]
    fn test_active_path() {
        let target = OutputTarget::new("/var/log/app", ".log");
        assert_eq!(target.active_path(), PathBuf::from("/var/log/app.log"));
    }

    #[test]
    fn test_active_path_empty_suffix() {
        let target = OutputTarget::new("/var/log/app", "");
        assert_eq!(target.active_path(), PathBuf::from("/var/log/app"));
    }

    #[test]
    fn test_builder() {
        let target = OutputTarget::new("base", ".txt")
            .with_time_pattern(daily())
            .with_utc(true);
        assert_eq!(target.time_pattern, Some(daily()));
        assert!(target.use_utc);
    }

    // ===========================================
    // next_rotated_path
    // ===========================================

    #[test]
    fn test_no_pattern_free_name() {
        let fs = MockFilesystem::new();
        let clock = MockClock::at_unix_sec(1000);
        let target = OutputTarget::new("/logs/base", ".log");

        let path = next_rotated_path(&fs, &clock, &target).expect("name");
        assert_eq!(path, PathBuf::from("/logs/base.log"));
    }

    #[test]
    fn test_no_pattern_collisions_count_up() {
        let fs = MockFilesystem::new();
        let clock = MockClock::at_unix_sec(1000);
        let target = OutputTarget::new("/logs/base", ".log");

        let mut produced = Vec::new();
        for _ in 0..4 {
            let path = next_rotated_path(&fs, &clock, &target).expect("name");
            fs.add_file(path.clone(), vec![]);
            produced.push(path);
        }

        assert_eq!(
            produced,
            vec![
                PathBuf::from("/logs/base.log"),
                PathBuf::from("/logs/base_0001.log"),
                PathBuf::from("/logs/base_0002.log"),
                PathBuf::from("/logs/base_0003.log"),
            ]
        );
    }

    #[test]
    fn test_pattern_uses_dot_separator() {
        let fs = MockFilesystem::new();
        let clock = at(2024, 1, 1, 0, 0, 0);
        let target = OutputTarget::new("/logs/base", ".log")
            .with_time_pattern(daily())
            .with_utc(true);

        let path = next_rotated_path(&fs, &clock, &target).expect("name");
        assert_eq!(path, PathBuf::from("/logs/base.2024-01-01.log"));
    }

    #[test]
    fn test_pattern_collision_uses_underscore_counter() {
        let fs = MockFilesystem::new();
        let clock = at(2024, 1, 1, 0, 0, 0);
        let target = OutputTarget::new("/logs/base", ".log")
            .with_time_pattern(daily())
            .with_utc(true);
        fs.add_file(PathBuf::from("/logs/base.2024-01-01.log"), vec![]);

        let path = next_rotated_path(&fs, &clock, &target).expect("name");
        assert_eq!(path, PathBuf::from("/logs/base.2024-01-01_0001.log"));
    }

    #[test]
    fn test_counter_skips_taken_slots() {
        let fs = MockFilesystem::new();
        let clock = MockClock::at_unix_sec(0);
        let target = OutputTarget::new("b", ".log");
        fs.add_file(PathBuf::from("b.log"), vec![]);
        fs.add_file(PathBuf::from("b_0001.log"), vec![]);
        fs.add_file(PathBuf::from("b_0003.log"), vec![]);

        let path = next_rotated_path(&fs, &clock, &target).expect("name");
        assert_eq!(path, PathBuf::from("b_0002.log"));
    }

    #[test]
    fn test_empty_formatted_time_has_no_separator() {
        let fs = MockFilesystem::new();
        let clock = MockClock::at_unix_sec(0);
        let target = OutputTarget::new("b", ".log")
            .with_time_pattern(TimePattern::new("").unwrap())
            .with_utc(true);

        assert_eq!(next_rotated_path(&fs, &clock, &target).unwrap(), PathBuf::from("b.log"));
    }

    #[test]
    fn test_names_sort_in_rotation_order() {
        let fs = MockFilesystem::new();
        let clock = at(2024, 1, 1, 0, 0, 0);
        let target = OutputTarget::new("base", ".log")
            .with_time_pattern(daily())
            .with_utc(true);

        let mut produced = Vec::new();
        for _ in 0..12 {
            let path = next_rotated_path(&fs, &clock, &target).unwrap();
            fs.add_file(path.clone(), vec![]);
            produced.push(path);
        }
        clock.advance(chrono::Duration::days(1));
        let next_day = next_rotated_path(&fs, &clock, &target).unwrap();
        produced.push(next_day);

        let mut sorted = produced.clone();
        sorted.sort();
        assert_eq!(sorted, produced);
    }

    #[test]
    fn test_exhausted() {
        let fs = MockFilesystem::new();
        let clock = MockClock::at_unix_sec(0);
        let target = OutputTarget::new("b", ".log");
        fs.add_file(PathBuf::from("b.log"), vec![]);
        for i in 1..=MAX_DISAMBIGUATOR {
            fs.add_file(PathBuf::from(format!("b_{:04}.log", i)), vec![]);
        }

        let err = next_rotated_path(&fs, &clock, &target).unwrap_err();
        assert!(matches!(err, NamingError::Exhausted { attempts: 10000, .. }));
        assert!(err.to_string().contains("b.log"));
    }

    #[test]
    fn test_last_counter_slot_is_used() {
        let fs = MockFilesystem::new();
        let clock = MockClock::at_unix_sec(0);
        let target = OutputTarget::new("b", ".log");
        fs.add_file(PathBuf::from("b.log"), vec![]);
        for i in 1..MAX_DISAMBIGUATOR {
            fs.add_file(PathBuf::from(format!("b_{:04}.log", i)), vec![]);
        }

        let path = next_rotated_path(&fs, &clock, &target).unwrap();
        assert_eq!(path, PathBuf::from("b_9999.log"));
    }

    #[test]
    fn test_real_filesystem_existence_check() {
        use crate::filesystem::RealFilesystem;

        let dir = tempfile::tempdir().expect("tempdir");
        let base = dir.path().join("app");
        let target = OutputTarget::new(&base, ".log");
        std::fs::write(dir.path().join("app.log"), b"active").unwrap();

        let path = next_rotated_path(&RealFilesystem, &MockClock::at_unix_sec(0), &target).unwrap();
        assert_eq!(path, dir.path().join("app_0001.log"));
    }
}
