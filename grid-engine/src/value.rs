//! FILENAME: grid-engine/src/value.rs
//! PURPOSE: Defines the fundamental value model for grid rows.
//! CONTEXT: This file contains the `FieldValue` enum and the declared
//! `DataType` of a column or group field. Values are owned by the external
//! data-access layer; the engine only reads them, so coercion is lenient —
//! a value that does not fit its declared type is treated as empty rather
//! than raising an error.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// Declared type of a column or group field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataType {
    String,
    Boolean,
    Decimal,
    DateTime,
    Date,
}

impl Default for DataType {
    fn default() -> Self {
        DataType::String
    }
}

/// A single field value within a row.
/// DateTime values carry the row's nominal timezone offset; calendar
/// operations (date bucketing, date formatting) use the local view while
/// ordering uses the absolute instant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FieldValue {
    Empty,
    Text(String),
    Number(f64),
    Boolean(bool),
    DateTime(DateTime<FixedOffset>),
}

impl FieldValue {
    pub fn text(s: impl Into<String>) -> Self {
        FieldValue::Text(s.into())
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, FieldValue::Empty)
    }

    /// Returns the display string of the value.
    /// Used by the full-text search predicate and by group headers for
    /// string-typed fields.
    pub fn display_value(&self) -> String {
        match self {
            FieldValue::Empty => String::new(),
            FieldValue::Number(n) => {
                // Format without unnecessary decimal places
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    format!("{:.0}", n)
                } else {
                    format!("{}", n)
                }
            }
            FieldValue::Text(s) => s.clone(),
            FieldValue::Boolean(b) => {
                if *b { "true" } else { "false" }.to_string()
            }
            FieldValue::DateTime(dt) => dt.to_rfc3339(),
        }
    }

    /// Coerces the value to a decimal. Text that parses as a number counts;
    /// anything else is treated as empty.
    pub fn as_decimal(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            FieldValue::Text(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        }
    }

    pub fn as_boolean(&self) -> Option<bool> {
        match self {
            FieldValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Coerces the value to an instant. Text in RFC 3339 form counts;
    /// anything else is treated as empty.
    pub fn as_datetime(&self) -> Option<DateTime<FixedOffset>> {
        match self {
            FieldValue::DateTime(dt) => Some(*dt),
            FieldValue::Text(s) => DateTime::parse_from_rfc3339(s.trim()).ok(),
            _ => None,
        }
    }

    /// Coerces the value to text. Everything except Empty has a string
    /// representation.
    pub fn as_text(&self) -> Option<String> {
        match self {
            FieldValue::Empty => None,
            other => Some(other.display_value()),
        }
    }
}

impl Default for FieldValue {
    fn default() -> Self {
        FieldValue::Empty
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Number(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Boolean(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}
