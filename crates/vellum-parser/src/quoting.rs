//! Scalar quoting policy.
//!
//! A value is emitted bare unless bare output would be misread: empty
//! strings, YAML-significant characters, a leading `-`/`?`/`:`, surrounding
//! whitespace, or text that would coerce to another type (`true`, `null`,
//! `42`). Quoted values use single quotes, or double quotes when the value
//! itself contains a single quote. Block scalar syntax is never produced;
//! embedded line breaks are folded to spaces.

use crate::extract::NUMBER_PATTERN;
use once_cell::sync::Lazy;
use regex::Regex;

const SIGNIFICANT: &[char] = &[
    ':', '#', '{', '}', '[', ']', '&', '*', '!', '|', '>', '\'', '"', '%', '@', '`', '\t', '\n',
    '\r', '\\',
];

static COERCIBLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!("^(?:null|~|true|false|{NUMBER_PATTERN})$")).expect("valid regex")
});

static DATE_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}").expect("valid regex"));

/// Whether a string must be quoted to survive a round trip.
pub fn needs_quoting(value: &str) -> bool {
    value.is_empty()
        || value.starts_with(['-', '?', ':'])
        || value.trim() != value
        || value.contains(SIGNIFICANT)
        || COERCIBLE.is_match(value)
}

/// Render a string scalar under the quoting policy.
pub fn quote_scalar(value: &str) -> String {
    let value = fold_line_breaks(value);

    if !needs_quoting(&value) {
        value
    } else if !value.contains('\'') {
        format!("'{}'", value)
    } else {
        format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
    }
}

/// Leading `YYYY-MM-DD` of a date-like string, if present.
pub fn date_prefix(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    DATE_PREFIX.find(trimmed).map(|m| m.as_str())
}

fn fold_line_breaks(value: &str) -> String {
    if value.contains(['\n', '\r']) {
        value
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    } else {
        value.to_string()
    }
}
