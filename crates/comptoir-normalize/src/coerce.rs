//! Lenient value coercion for serialized records.
//!
//! Stored records come from years of mixed imports, so field shapes
//! drift. These helpers never fail: parse problems surface as `None` or
//! a zero default and rendering always has something to show.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::Value;

/// Parse a date-bearing value, returning `None` for anything
/// unparseable.
///
/// Accepts RFC 3339 strings, naive `Y-m-d H:M:S` spellings (taken as
/// UTC), bare dates (`Y-m-d` and `d/m/Y`, taken as midnight UTC) and
/// integer Unix timestamps. `None` means "unknown date" and is
/// indistinguishable from an absent field; callers must not treat it as
/// an error signal.
pub fn parse_date_safe(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => parse_date_str(s.trim()),
        Value::Number(n) => n.as_i64().and_then(|secs| DateTime::from_timestamp(secs, 0)),
        _ => None,
    }
}

fn parse_date_str(s: &str) -> Option<DateTime<Utc>> {
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Some(naive.and_utc());
        }
    }
    for format in ["%Y-%m-%d", "%d/%m/%Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(s, format) {
            return date.and_hms_opt(0, 0, 0).map(|naive| naive.and_utc());
        }
    }
    None
}

/// Coerce a possibly-missing amount to a float rounded to two decimals.
///
/// Missing, null, non-numeric and unparseable inputs all coerce to
/// `0.0`. Rounding is half-up: `"12.3456"` becomes `12.35`.
pub fn format_amount(value: Option<&Value>) -> f64 {
    let raw = match value {
        None | Some(Value::Null) => 0.0,
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => s.trim().parse::<f64>().unwrap_or(0.0),
        Some(_) => 0.0,
    };
    round2(raw)
}

fn round2(value: f64) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    (value * 100.0).round() / 100.0
}
