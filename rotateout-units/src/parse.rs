//! Parser for strings made of `<number><unit>` segments such as `3d12.5h`
//! or `2m512.15k100b`.
//!
//! Each segment is scaled by its unit's multiplier (truncating any fraction)
//! and the segments are summed. The result never exceeds `i64::MAX`.

use std::fmt;

use thiserror::Error;

use crate::table::UnitTable;

/// Largest quantity the parser will produce.
pub const MAX_QUANTITY: u64 = i64::MAX as u64;

/// 2^63 as f64; fractional products at or above it do not fit.
const MAX_QUANTITY_F64: f64 = 9_223_372_036_854_775_808.0;

/// What went wrong while parsing a quantity.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseErrorKind {
    #[error("unexpected character")]
    UnexpectedCharacter,

    #[error("number expected")]
    NumberExpected,

    #[error("bad unit {unit:?}: only {} allowed", .allowed.join(", "))]
    BadUnit { unit: String, allowed: Vec<String> },

    #[error("number is too big")]
    TooBig,

    #[error("numeric overflow")]
    Overflow,
}

/// A failed parse, carrying enough context to point at the fault.
///
/// Displays as three lines: the message, the full input and a caret
/// under the offending position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub kind: ParseErrorKind,
    /// The full string handed to the parser.
    pub input: String,
    /// The unparsed tail starting at the segment that failed.
    pub remaining: String,
    /// Character offset of the fault within `input`.
    pub offset: usize,
}

impl ParseError {
    fn new(kind: ParseErrorKind, input: &str, segment_start: usize, offset: usize) -> Self {
        Self {
            kind,
            input: input.to_string(),
            remaining: input[segment_start..].to_string(),
            offset: input[..offset].chars().count(),
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.kind)?;
        writeln!(f, "{}", self.input)?;
        write!(f, "{:>width$}", "^", width = self.offset + 1)
    }
}

impl std::error::Error for ParseError {}

/// One `<number><unit>` segment at the front of the remaining input.
#[derive(Debug, PartialEq, Eq)]
struct Segment<'a> {
    /// Digits with an optional `.digits` fraction.
    number: &'a str,
    /// Trailing ASCII letters, possibly empty.
    unit: &'a str,
}

impl<'a> Segment<'a> {
    /// Scan a segment from the start of `s`.
    fn scan(s: &'a str) -> Result<Self, ParseErrorKind> {
        let bytes = s.as_bytes();
        let digits_from = |start: usize| {
            bytes[start..]
                .iter()
                .take_while(|b| b.is_ascii_digit())
                .count()
        };

        let mut number_end = digits_from(0);
        if bytes.get(number_end) == Some(&b'.') {
            let fraction = digits_from(number_end + 1);
            if fraction > 0 {
                number_end += 1 + fraction;
            }
        }

        if number_end == 0 {
            return Err(match bytes.first() {
                Some(b) if b.is_ascii_alphabetic() || *b == b'.' => ParseErrorKind::NumberExpected,
                _ => ParseErrorKind::UnexpectedCharacter,
            });
        }

        let unit_len = bytes[number_end..]
            .iter()
            .take_while(|b| b.is_ascii_alphabetic())
            .count();

        Ok(Self {
            number: &s[..number_end],
            unit: &s[number_end..number_end + unit_len],
        })
    }

    fn len(&self) -> usize {
        self.number.len() + self.unit.len()
    }

    /// Scale the number by `multiplier`, or `None` if the product exceeds
    /// [`MAX_QUANTITY`]. Whole numbers are scaled exactly; fractions go
    /// through `f64` and are truncated.
    fn scale(&self, multiplier: u64) -> Option<u64> {
        if !self.number.contains('.') {
            return self
                .number
                .parse::<u64>()
                .ok()?
                .checked_mul(multiplier)
                .filter(|v| *v <= MAX_QUANTITY);
        }

        let value: f64 = self.number.parse().ok()?;
        let product = value * multiplier as f64;
        if product >= MAX_QUANTITY_F64 {
            return None;
        }
        Some(product as u64)
    }
}

/// Parse `input` into a single quantity using `units`.
///
/// Segments without a suffix use `default_unit`. The literal `"0"` is always
/// accepted, whatever the table holds. An empty string parses as zero.
pub fn parse_quantity(
    input: &str,
    units: &UnitTable,
    default_unit: &str,
) -> Result<u64, ParseError> {
    if input == "0" {
        return Ok(0);
    }

    let mut total: u64 = 0;
    let mut pos = 0;

    while pos < input.len() {
        let segment = Segment::scan(&input[pos..])
            .map_err(|kind| ParseError::new(kind, input, pos, pos))?;

        let unit = if segment.unit.is_empty() {
            default_unit
        } else {
            segment.unit
        };
        let multiplier = units.multiplier(unit).ok_or_else(|| {
            let kind = ParseErrorKind::BadUnit {
                unit: unit.to_string(),
                allowed: units.names(),
            };
            ParseError::new(kind, input, pos, pos + segment.number.len())
        })?;

        let value = segment
            .scale(multiplier)
            .ok_or_else(|| ParseError::new(ParseErrorKind::TooBig, input, pos, pos))?;

        total = total
            .checked_add(value)
            .filter(|t| *t <= MAX_QUANTITY)
            .ok_or_else(|| ParseError::new(ParseErrorKind::Overflow, input, pos, pos))?;

        pos += segment.len();
    }

    Ok(total)
}
