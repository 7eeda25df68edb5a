//! Date casts
//!
//! Numbers are Unix timestamps: seconds when their printed form has at most
//! ten characters, milliseconds otherwise. Strings are tried against the
//! formats below, all read as UTC unless they carry an offset, and fall
//! back to the timestamp rule when purely numeric.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};

use crate::schema::{FieldDescriptor, HookContext};
use crate::validation::ErrorCode;
use crate::value::{format_number, parse_number, Value};

use super::Rejection;

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%Y/%m/%d %H:%M:%S",
];

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%m/%d/%Y",
    "%Y/%m/%d",
    "%B %d, %Y",
    "%B %d %Y",
    "%d %B %Y",
    "%a %b %d %Y",
];

pub(super) fn cast_date(
    value: Option<Value>,
    descriptor: &FieldDescriptor,
    ctx: &HookContext<'_>,
) -> Result<Option<Value>, Rejection> {
    let value = match value {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::String(s)) if s.is_empty() => return Ok(None),
        Some(value) => value,
    };

    let parsed = match &value {
        Value::Date(date) => Some(*date),
        Value::Number(n) => from_timestamp(*n),
        Value::String(s) => parse_date(s).or_else(|| parse_number(s).and_then(from_timestamp)),
        _ => return Err(Rejection::new(ErrorCode::DateCast, None, value.clone())),
    };
    let mut date = match parsed {
        Some(date) => date,
        None => return Err(Rejection::new(ErrorCode::DateParse, None, value)),
    };

    if let Some(transform) = &descriptor.date_transform {
        date = transform(date, ctx);
    }
    Ok(Some(Value::Date(date)))
}

fn from_timestamp(n: f64) -> Option<DateTime<Utc>> {
    if !n.is_finite() {
        return None;
    }
    let millis = if format_number(n).len() > 10 { n } else { n * 1000.0 };
    if millis.abs() > i64::MAX as f64 {
        return None;
    }
    Utc.timestamp_millis_opt(millis.round() as i64).single()
}

/// Parses a date string in one of the accepted textual formats.
pub fn parse_date(input: &str) -> Option<DateTime<Utc>> {
    let s = input.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(date) = DateTime::parse_from_rfc3339(s) {
        return Some(date.with_timezone(&Utc));
    }
    if let Ok(date) = DateTime::parse_from_rfc2822(s) {
        return Some(date.with_timezone(&Utc));
    }
    if let Some(date) = parse_verbose(s) {
        return Some(date);
    }
    for format in DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }
    for format in DATE_FORMATS {
        if let Ok(day) = NaiveDate::parse_from_str(s, format) {
            return day.and_hms_opt(0, 0, 0).map(|naive| Utc.from_utc_datetime(&naive));
        }
    }
    None
}

/// `Tue Jun 21 1988 00:00:00 GMT-0700 (PDT)`
fn parse_verbose(s: &str) -> Option<DateTime<Utc>> {
    let without_zone_name = match s.find(" (") {
        Some(index) if s.ends_with(')') => &s[..index],
        _ => s,
    };
    DateTime::parse_from_str(without_zone_name, "%a %b %d %Y %H:%M:%S GMT%z")
        .ok()
        .map(|date| date.with_timezone(&Utc))
}
