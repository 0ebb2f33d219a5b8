//! Row admissibility checks: coordinate ranges, timestamp parsing and
//! header detection.
//!
//! Nothing in here returns an error. Every check answers with a `bool` or an
//! `Option` so the ingester can turn failures into reject reasons.

use chrono::{DateTime, NaiveDateTime, Utc};

/// Column names that mark a row as a header.
pub const COLUMN_NAMES: [&str; 4] = ["device_id", "lat", "lon", "timestamp"];

/// Offset-bearing layouts tried after RFC 3339.
const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
];

/// Layouts without an offset; these are read as UTC.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y/%m/%d %H:%M:%S%.f",
    "%Y/%m/%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M",
];

fn parse_number(value: &str) -> Option<f64> {
    value.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

fn parse_in_range(value: &str, limit: f64) -> Option<f64> {
    parse_number(value).filter(|v| (-limit..=limit).contains(v))
}

/// Parses a latitude, returning `None` when it is not a number in `[-90, 90]`.
pub fn parse_latitude(value: &str) -> Option<f64> {
    parse_in_range(value, 90.0)
}

/// Parses a longitude, returning `None` when it is not a number in `[-180, 180]`.
pub fn parse_longitude(value: &str) -> Option<f64> {
    parse_in_range(value, 180.0)
}

/// True iff `value` parses as a number in `[-90, 90]`.
pub fn is_valid_latitude(value: &str) -> bool {
    parse_latitude(value).is_some()
}

/// True iff `value` parses as a number in `[-180, 180]`.
pub fn is_valid_longitude(value: &str) -> bool {
    parse_longitude(value).is_some()
}

/// Parses an ISO-8601 style timestamp into a UTC instant.
///
/// Accepts RFC 3339 (`2025-08-14T12:34:56Z`, `2025-08-14T12:34:56+02:00`),
/// a space in place of the `T`, optional fractional seconds, slash-separated
/// dates and minute precision. Text without an offset is taken as UTC.
pub fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(text, format) {
            return Some(dt.with_timezone(&Utc));
        }
    }

    // a trailing Z on an otherwise naive layout still means UTC
    let naive = text
        .strip_suffix('Z')
        .or_else(|| text.strip_suffix('z'))
        .unwrap_or(text);

    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(naive, format).ok())
        .map(|dt| dt.and_utc())
}

/// Decides whether the first row of an input is a header (or garbage) rather
/// than data.
///
/// A row is a header when any field names one of [`COLUMN_NAMES`], when it
/// has fewer than four fields, or when fields 2-4 do not read as
/// `<number>,<number>,<timestamp>`. Only numeric shape is checked here, not
/// coordinate range, so an out-of-range first row is still treated as data
/// and rejected downstream.
pub fn is_header_row<S: AsRef<str>>(fields: &[S]) -> bool {
    let names_a_column = fields.iter().any(|field| {
        let field = field.as_ref().trim();
        COLUMN_NAMES
            .iter()
            .any(|name| field.eq_ignore_ascii_case(name))
    });
    if names_a_column {
        return true;
    }

    if fields.len() < 4 {
        return true;
    }

    let looks_like_data = parse_number(fields[1].as_ref()).is_some()
        && parse_number(fields[2].as_ref()).is_some()
        && parse_timestamp(fields[3].as_ref()).is_some();

    !looks_like_data
}
