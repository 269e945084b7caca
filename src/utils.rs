//! Date helpers shared by validation and presentation

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Formats a DateTime as the ISO-8601 timestamp the API expects
///
/// Millisecond precision with a `Z` suffix, the shape a browser's
/// `Date.toISOString()` produces.
///
/// Example output: "2025-06-14T10:03:54.374Z"
pub fn format_wire_datetime(dt: DateTime<Utc>) -> String {
    dt.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}

/// Parses the date part of a server timestamp
///
/// Accepts a bare date, an RFC 3339 timestamp, or a naive timestamp without
/// offset (some backends omit it).
pub fn parse_record_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.date_naive());
    }
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|dt| dt.date())
}

/// Renders a record date as `dd/mm/yyyy` for listings
///
/// Input that does not parse is returned unchanged.
pub fn format_display_date(value: &str) -> String {
    match parse_record_date(value) {
        Some(date) => date.format("%d/%m/%Y").to_string(),
        None => value.to_string(),
    }
}
