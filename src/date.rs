//! Timestamp parsing across the date formats seen in scraper output.
//! First format that parses wins; nothing here returns an error.

use serde_json::Value;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, OffsetDateTime, PrimitiveDateTime};

/// Parse a timestamp value. Strings are tried against, in order:
/// 1. Twitter native: `Wed Oct 05 20:30:00 +0000 2022`
/// 2. RFC 3339, with or without fractional seconds
/// 3. ISO-8601 without offset (`2024-06-25T14:00:00[.123]`), taken as UTC
/// 4. plain `2024-06-25 14:00:00`, taken as UTC
/// 5. a run of digits as Unix epoch seconds
///
/// JSON numbers are epoch seconds.
pub fn parse_timestamp(v: &Value) -> Option<OffsetDateTime> {
    match v {
        Value::String(s) => parse_timestamp_str(s),
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f as i64))
            .and_then(from_epoch),
        _ => None,
    }
}

pub fn parse_timestamp_str(s: &str) -> Option<OffsetDateTime> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    let twitter = format_description!(
        "[weekday repr:short] [month repr:short] [day] [hour]:[minute]:[second] [offset_hour sign:mandatory][offset_minute] [year]"
    );
    if let Ok(dt) = OffsetDateTime::parse(s, twitter) {
        return Some(dt);
    }
    if let Ok(dt) = OffsetDateTime::parse(s, &Rfc3339) {
        return Some(dt);
    }

    let iso_frac = format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond]");
    let iso = format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]");
    let plain = format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");
    for fmt in [iso_frac, iso, plain] {
        if let Ok(dt) = PrimitiveDateTime::parse(s, fmt) {
            return Some(dt.assume_utc());
        }
    }

    if s.bytes().all(|b| b.is_ascii_digit()) {
        return s.parse::<i64>().ok().and_then(from_epoch);
    }
    None
}

/// Epoch seconds; values that look like milliseconds (13+ digits) are scaled down.
fn from_epoch(ts: i64) -> Option<OffsetDateTime> {
    let secs = if ts.abs() >= 100_000_000_000 { ts / 1000 } else { ts };
    OffsetDateTime::from_unix_timestamp(secs).ok()
}

pub fn format_rfc3339(dt: &OffsetDateTime) -> String {
    dt.format(&Rfc3339).unwrap_or_default()
}

/// Calendar date in UTC.
pub fn utc_date(dt: &OffsetDateTime) -> Date {
    dt.to_offset(time::UtcOffset::UTC).date()
}

pub fn utc_hour(dt: &OffsetDateTime) -> u8 {
    dt.to_offset(time::UtcOffset::UTC).hour()
}

/// Whole days between two instants (truncated toward zero).
pub fn whole_days_between(first: OffsetDateTime, last: OffsetDateTime) -> i64 {
    (last - first).whole_days()
}
