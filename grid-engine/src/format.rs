//! FILENAME: grid-engine/src/format.rs
//! PURPOSE: Header and value formatting for group buckets.
//! CONTEXT: This module turns raw field values into the display strings
//! that name group buckets. Two values belong to the same bucket exactly
//! when they format to the same string, so formatting is part of the
//! grouping semantics, not just presentation.

use chrono::{DateTime, Datelike, FixedOffset, Timelike};
use serde::{Deserialize, Serialize};

use crate::value::{DataType, FieldValue};

/// Header label used for empty/unresolvable values.
pub const EMPTY_HEADER: &str = "-";

/// Display options supplied by the owning view (localized boolean text).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatOptions {
    pub true_text: String,
    pub false_text: String,
}

impl Default for FormatOptions {
    fn default() -> Self {
        FormatOptions {
            true_text: "true".to_string(),
            false_text: "false".to_string(),
        }
    }
}

/// Formats a field value under its declared data type.
///
/// Empty or uncoercible values format as `"-"`, except Boolean which always
/// formats explicitly (an empty boolean shows the false text). Decimal uses
/// a `#,##0.00`-style pattern (default 2 decimal places); DateTime/Date use
/// token patterns where `ww` is the ISO-8601 calendar week number.
pub fn format_value(
    value: &FieldValue,
    data_type: DataType,
    pattern: Option<&str>,
    options: &FormatOptions,
) -> String {
    match data_type {
        DataType::Boolean => {
            if value.as_boolean().unwrap_or(false) {
                options.true_text.clone()
            } else {
                options.false_text.clone()
            }
        }
        DataType::String => match value.as_text() {
            Some(s) if !s.is_empty() => s,
            _ => EMPTY_HEADER.to_string(),
        },
        DataType::Decimal => match value.as_decimal() {
            Some(n) => format_decimal_pattern(n, pattern.unwrap_or("0.00")),
            None => EMPTY_HEADER.to_string(),
        },
        DataType::DateTime => match value.as_datetime() {
            Some(dt) => format_date_pattern(&dt, pattern.unwrap_or("yyyy-MM-dd HH:mm")),
            None => EMPTY_HEADER.to_string(),
        },
        DataType::Date => match value.as_datetime() {
            Some(dt) => format_date_pattern(&dt, pattern.unwrap_or("yyyy-MM-dd")),
            None => EMPTY_HEADER.to_string(),
        },
    }
}

/// Builds the final group header: `title + ": " + value` when a title is
/// configured, else just the formatted value.
pub fn group_header(title: &str, formatted_value: &str) -> String {
    if title.is_empty() {
        formatted_value.to_string()
    } else {
        format!("{}: {}", title, formatted_value)
    }
}

/// Formats a number using a custom format pattern.
/// The number of decimal places is counted from the pattern ("0.00" → 2),
/// and a comma anywhere in the pattern enables thousands grouping.
pub fn format_decimal_pattern(value: f64, pattern: &str) -> String {
    let decimal_places = if let Some(dot_pos) = pattern.find('.') {
        pattern[dot_pos + 1..]
            .chars()
            .take_while(|c| *c == '0' || *c == '#')
            .count()
    } else {
        0
    };

    let use_thousands = pattern.contains(',');
    format_decimal(value, decimal_places, use_thousands)
}

/// Format a number with fixed decimal places and optional thousands
/// separator.
pub fn format_decimal(value: f64, decimal_places: usize, use_thousands_separator: bool) -> String {
    let rounded = format!("{:.prec$}", value, prec = decimal_places);

    if use_thousands_separator {
        add_thousands_separator(&rounded)
    } else {
        rounded
    }
}

fn add_thousands_separator(s: &str) -> String {
    let parts: Vec<&str> = s.split('.').collect();
    let integer_part = parts[0];
    let decimal_part = parts.get(1);

    let negative = integer_part.starts_with('-');
    let digits: String = integer_part.chars().filter(|c| c.is_ascii_digit()).collect();

    let mut result = String::new();
    let len = digits.len();

    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }

    if negative {
        result = format!("-{}", result);
    }

    if let Some(decimal) = decimal_part {
        result.push('.');
        result.push_str(decimal);
    }

    result
}

/// Formats an instant using date pattern tokens, evaluated against the
/// value's own timezone offset (the logical calendar date, not UTC).
///
/// Tokens: `yyyy`, `yy`, `MM`, `dd`, `HH`, `mm`, `ss`, and `ww` for the
/// ISO-8601 week-of-year (zero-padded). Token replacements produce digits
/// only, so chained substitution cannot cascade.
pub fn format_date_pattern(instant: &DateTime<FixedOffset>, pattern: &str) -> String {
    let local = instant.naive_local();
    let date = local.date();

    pattern
        .replace("yyyy", &format!("{:04}", date.year()))
        .replace("yy", &format!("{:02}", date.year().rem_euclid(100)))
        .replace("MM", &format!("{:02}", date.month()))
        .replace("dd", &format!("{:02}", date.day()))
        .replace("HH", &format!("{:02}", local.hour()))
        .replace("mm", &format!("{:02}", local.minute()))
        .replace("ss", &format!("{:02}", local.second()))
        .replace("ww", &format!("{:02}", date.iso_week().week()))
}
