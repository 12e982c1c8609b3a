//! Leaf normalization used for change detection.
//!
//! Two leaves are "the same" when their normalized strings are equal. The
//! normalized form is never shown to users; change items keep raw values.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::{Number, Value};

use crate::diff::noise::{normalize_path, NoisePolicy};
use crate::snapshot::canonical::sort_keys;

const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Normalize an optional leaf for comparison
pub fn normalize_leaf(path: &str, value: Option<&Value>, noise: &NoisePolicy) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(Value::Number(n)) => number_text(n),
        Some(Value::String(s)) => normalize_text(path, s, noise),
        Some(Value::Array(items)) if items.is_empty() => String::new(),
        Some(Value::Object(map)) if map.is_empty() => String::new(),
        Some(container) => sort_keys(container).to_string(),
    }
}

fn normalize_text(path: &str, raw: &str, noise: &NoisePolicy) -> String {
    let text = raw.trim();
    if is_date_path(path) {
        if let Some(day) = parse_day(text) {
            return day.format("%Y-%m-%d").to_string();
        }
    }
    if is_url(text) {
        return strip_signed_params(text, noise);
    }
    text.to_string()
}

/// Decimal text; integral floats print as integers (`1.0` → `1`)
pub fn number_text(n: &Number) -> String {
    if let Some(i) = n.as_i64() {
        return i.to_string();
    }
    if let Some(u) = n.as_u64() {
        return u.to_string();
    }
    match n.as_f64() {
        Some(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", f as i64),
        Some(f) => f.to_string(),
        None => n.to_string(),
    }
}

/// A path is date-like when a segment equals or ends with `date`
pub fn is_date_path(path: &str) -> bool {
    normalize_path(path)
        .split('.')
        .any(|segment| segment.to_lowercase().ends_with("date"))
}

/// Parse a calendar day out of a day or timestamp string
///
/// RFC 3339 timestamps keep the day as written in their own offset, so
/// `2024-01-15T23:30:00+07:00` is the 15th.
pub fn parse_day(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    if let Ok(day) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return Some(day);
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(text) {
        return Some(ts.date_naive());
    }
    if let Ok(ts) = DateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S%.f%:z") {
        return Some(ts.date_naive());
    }
    NAIVE_DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .map(|ts| ts.date())
}

/// Whether a string is a full timestamp (not just a day)
pub fn is_timestamp(text: &str) -> bool {
    let text = text.trim();
    DateTime::parse_from_rfc3339(text).is_ok()
        || NAIVE_DATETIME_FORMATS
            .iter()
            .any(|fmt| NaiveDateTime::parse_from_str(text, fmt).is_ok())
}

pub fn is_url(text: &str) -> bool {
    let lower = text.trim_start().to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Drop signed-URL query parameters so a re-signed link compares equal
pub fn strip_signed_params(url: &str, noise: &NoisePolicy) -> String {
    let (rest, fragment) = match url.split_once('#') {
        Some((rest, fragment)) => (rest, Some(fragment)),
        None => (url, None),
    };
    let (base, query) = match rest.split_once('?') {
        Some((base, query)) => (base, query),
        None => return url.to_string(),
    };

    let kept: Vec<&str> = query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .filter(|pair| {
            let name = pair.split('=').next().unwrap_or(pair);
            !noise.is_sensitive(name)
        })
        .collect();

    let mut out = base.to_string();
    if !kept.is_empty() {
        out.push('?');
        out.push_str(&kept.join("&"));
    }
    if let Some(fragment) = fragment {
        out.push('#');
        out.push_str(fragment);
    }
    out
}
