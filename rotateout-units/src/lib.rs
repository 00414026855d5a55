//! Unit-suffixed quantity parsing for rotateout.
//!
//! This crate provides:
//! - `UnitTable` for mapping unit spellings to multipliers
//! - `parse_quantity` for strings like `3d12.5h` or `2m512.15k100b`
//! - `parse_duration` / `parse_size` with the built-in tables

pub mod parse;
pub mod table;

use std::time::Duration;

pub use parse::{parse_quantity, ParseError, ParseErrorKind, MAX_QUANTITY};
pub use table::{UnitTable, DEFAULT_DURATION_UNIT, DEFAULT_SIZE_UNIT, NANOS_PER_SECOND};

/// Parse a duration such as `1w` or `3d12.5h`; bare numbers are seconds.
pub fn parse_duration(s: &str) -> Result<Duration, ParseError> {
    parse_quantity(s, &UnitTable::durations(), DEFAULT_DURATION_UNIT).map(Duration::from_nanos)
}

/// Parse a byte size such as `1g` or `2m512k`; bare numbers are bytes.
pub fn parse_size(s: &str) -> Result<u64, ParseError> {
    parse_quantity(s, &UnitTable::sizes(), DEFAULT_SIZE_UNIT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_duration_days() {
        let d = parse_duration("7d").unwrap();
        assert_eq!(d, Duration::from_secs(7 * 24 * 60 * 60));
    }

    #[test]
    fn test_parse_duration_combined() {
        let d = parse_duration("1h30m").unwrap();
        assert_eq!(d, Duration::from_secs(90 * 60));
    }

    #[test]
    fn test_parse_duration_bare_seconds() {
        assert_eq!(parse_duration("45").unwrap(), Duration::from_secs(45));
    }

    #[test]
    fn test_parse_duration_fractional_seconds() {
        assert_eq!(parse_duration("1.5").unwrap(), Duration::from_millis(1500));
    }

    #[test]
    fn test_parse_duration_default_flag_value() {
        assert_eq!(parse_duration("1w").unwrap(), Duration::from_secs(604_800));
    }

    #[test]
    fn test_parse_size_default_flag_value() {
        assert_eq!(parse_size("1g").unwrap(), 1 << 30);
    }

    #[test]
    fn test_parse_invalid() {
        assert!(parse_duration("invalid").is_err());
        assert!(parse_duration("7y").is_err());
        assert!(parse_size("1t").is_err());
    }
}
