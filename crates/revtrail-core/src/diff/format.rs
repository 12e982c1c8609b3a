//! Localized display formatting for change values.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::{DiffConfig, Language};
use crate::diff::normalize::{is_date_path, is_timestamp, is_url, number_text, parse_day};
use crate::snapshot::canonical::sort_keys;

/// Formatted value; `href` is set for links
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayValue {
    pub text: String,
    pub href: Option<String>,
}

impl DisplayValue {
    fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            href: None,
        }
    }
}

impl std::fmt::Display for DisplayValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.text)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatOptions {
    pub language: Language,
    /// Strings longer than this many characters are cut and ellipsized
    pub ellipsis_at: usize,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            language: Language::default(),
            ellipsis_at: 80,
        }
    }
}

impl FormatOptions {
    pub fn from_config(config: &DiffConfig) -> Self {
        Self {
            language: config.language,
            ellipsis_at: config.ellipsis_at,
        }
    }
}

/// Format a leaf value for display
///
/// ```
/// use revtrail_core::config::Language;
/// use revtrail_core::diff::format::{format_value, FormatOptions};
/// use serde_json::json;
///
/// let en = FormatOptions { language: Language::En, ..Default::default() };
/// assert_eq!(format_value(&json!(1234567.5), "unitPrice", &en).text, "1,234,567.5");
/// assert_eq!(format_value(&json!(true), "active", &en).text, "Yes");
/// ```
pub fn format_value(value: &Value, path: &str, options: &FormatOptions) -> DisplayValue {
    let language = options.language;
    match value {
        Value::Null => DisplayValue::text(empty_text(language)),
        Value::Bool(b) => DisplayValue::text(bool_text(*b, language)),
        Value::Number(n) => DisplayValue::text(group_digits(&number_text(n), language)),
        Value::String(s) => format_text(s.trim(), path, options),
        Value::Array(items) if items.is_empty() => DisplayValue::text(empty_text(language)),
        Value::Object(map) if map.is_empty() => DisplayValue::text(empty_text(language)),
        container => DisplayValue::text(ellipsize(
            &sort_keys(container).to_string(),
            options.ellipsis_at,
        )),
    }
}

fn format_text(text: &str, path: &str, options: &FormatOptions) -> DisplayValue {
    if text.is_empty() {
        return DisplayValue::text(empty_text(options.language));
    }
    if is_url(text) {
        let without_query = text
            .split(['?', '#'])
            .next()
            .unwrap_or(text);
        return DisplayValue {
            text: ellipsize(without_query, options.ellipsis_at),
            href: Some(text.to_string()),
        };
    }
    if is_date_path(path) || is_timestamp(text) {
        if let Some(day) = parse_day(text) {
            let pattern = match options.language {
                Language::Vi => "%d/%m/%Y",
                Language::En => "%Y-%m-%d",
            };
            return DisplayValue::text(day.format(pattern).to_string());
        }
    }
    DisplayValue::text(ellipsize(text, options.ellipsis_at))
}

fn empty_text(language: Language) -> &'static str {
    match language {
        Language::Vi => "(trống)",
        Language::En => "(empty)",
    }
}

fn bool_text(value: bool, language: Language) -> &'static str {
    match (language, value) {
        (Language::Vi, true) => "Có",
        (Language::Vi, false) => "Không",
        (Language::En, true) => "Yes",
        (Language::En, false) => "No",
    }
}

/// Group a plain decimal string: `1234567.5` → `1.234.567,5` (vi) or
/// `1,234,567.5` (en)
pub fn group_digits(decimal: &str, language: Language) -> String {
    let (group_sep, decimal_sep) = match language {
        Language::Vi => ('.', ','),
        Language::En => (',', '.'),
    };
    let (sign, unsigned) = match decimal.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", decimal),
    };
    let (int_part, frac_part) = match unsigned.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (unsigned, None),
    };
    if !int_part.chars().all(|c| c.is_ascii_digit()) {
        // exponent forms and the like are shown as-is
        return decimal.to_string();
    }

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, c) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(group_sep);
        }
        grouped.push(c);
    }

    let mut out = format!("{}{}", sign, grouped);
    if let Some(frac) = frac_part {
        out.push(decimal_sep);
        out.push_str(frac);
    }
    out
}

/// Cut to `limit` characters and append an ellipsis
pub fn ellipsize(text: &str, limit: usize) -> String {
    if text.chars().count() <= limit {
        return text.to_string();
    }
    let mut out: String = text.chars().take(limit).collect();
    out.push('…');
    out
}
