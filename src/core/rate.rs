//! Emission interval parsing.
//!
//! Accepts Go-style duration strings: a sequence of decimal numbers, each with
//! a unit suffix, such as `300ms`, `1.5s` or `1m30s`. A bare `0` is allowed.

use crate::core::error::{Error, Result};
use std::time::Duration;

const UNITS: [(&str, f64); 9] = [
    ("ns", 1.0),
    ("us", 1e3),
    ("µs", 1e3),
    ("μs", 1e3),
    ("ms", 1e6),
    ("s", 1e9),
    ("m", 60e9),
    ("h", 3600e9),
    ("d", 86400e9),
];

/// Parses a duration string like `500ms`, `2s` or `1h15m`.
pub fn parse_rate(value: &str) -> Result<Duration> {
    let value = value.trim();
    if value.is_empty() {
        return Err(invalid(value, "empty duration"));
    }
    if value == "0" {
        return Ok(Duration::ZERO);
    }

    let mut rest = value;
    let mut total_nanos = 0.0_f64;
    while !rest.is_empty() {
        let number_len = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(rest.len());
        let (number, tail) = rest.split_at(number_len);
        if number.is_empty() || number == "." {
            return Err(invalid(value, "expected a number"));
        }
        let amount: f64 = number
            .parse()
            .map_err(|_| invalid(value, "malformed number"))?;

        let unit_len = tail
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(tail.len());
        let (unit, tail) = tail.split_at(unit_len);
        let scale = UNITS
            .iter()
            .find(|(name, _)| *name == unit)
            .map(|(_, scale)| *scale)
            .ok_or_else(|| {
                if unit.is_empty() {
                    invalid(value, "missing unit")
                } else {
                    invalid(value, &format!("unknown unit '{unit}'"))
                }
            })?;

        total_nanos += amount * scale;
        rest = tail;
    }

    if !total_nanos.is_finite() || total_nanos > u64::MAX as f64 {
        return Err(invalid(value, "duration out of range"));
    }
    Ok(Duration::from_nanos(total_nanos.round() as u64))
}

fn invalid(value: &str, reason: &str) -> Error {
    Error::Usage(format!("invalid rate '{value}': {reason}"))
}
