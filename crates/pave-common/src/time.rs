//! Timestamp parsing and calendar arithmetic.

use chrono::{Datelike, NaiveDate, NaiveDateTime};

/// Timestamp layouts accepted from extracts, production files and the CLI.
const TIMESTAMP_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
];

/// Parse a timestamp or a bare date (midnight).
///
/// Returns `None` if the text matches none of the accepted layouts.
pub fn parse_timestamp(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    for fmt in TIMESTAMP_FORMATS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(text, fmt) {
            return Some(ts);
        }
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Same month, day and time `years` calendar years earlier.
///
/// Feb 29 maps to Feb 28 when the target year is not a leap year. A shift
/// past chrono's earliest representable date saturates to
/// [`NaiveDateTime::MIN`].
pub fn years_before(ts: NaiveDateTime, years: u32) -> NaiveDateTime {
    let Some(year) = i32::try_from(years)
        .ok()
        .and_then(|y| ts.year().checked_sub(y))
    else {
        return NaiveDateTime::MIN;
    };
    ts.with_year(year)
        .or_else(|| NaiveDate::from_ymd_opt(year, ts.month(), 28).map(|d| d.and_time(ts.time())))
        .unwrap_or(NaiveDateTime::MIN)
}
