//! Timestamp parsing
//!
//! The backend stores sale times as naive server-local timestamps. Depending
//! on how they were serialised they arrive as ISO-8601 text, RFC 3339 or the
//! RFC 2822 form used by the backend's JSON encoder. All of them are reduced
//! to the wall-clock reading as written.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// Naive formats tried after the canonical ISO-8601 parse
const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
];

/// Parse a timestamp string into a server-local wall-clock reading
///
/// Returns `None` for anything unparseable; callers decide how to degrade.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    // "%Y-%m-%dT%H:%M:%S%.f"
    if let Ok(dt) = raw.parse::<NaiveDateTime>() {
        return Some(dt);
    }

    for fmt in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(dt);
        }
    }

    // Offset-bearing forms keep the fields as written
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_local());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(raw) {
        return Some(dt.naive_local());
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}
