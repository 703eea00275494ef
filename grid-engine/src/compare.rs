//! FILENAME: grid-engine/src/compare.rs
//! Comparator library - type-aware total ordering over field values.
//!
//! Used both by the sorter and by the tree builder when ordering group
//! buckets. The declared `DataType` of the field decides which comparison
//! applies; a value that cannot be coerced to the declared type compares
//! as empty. Empty sorts before any non-empty value of the same type.

use std::cmp::Ordering;

use crate::value::{DataType, FieldValue};

/// Compares two field values under a declared data type.
///
/// - `String`: case-insensitive comparison (Unicode lowercase fold).
/// - `Boolean`: `false < true`.
/// - `Decimal`: numeric comparison.
/// - `DateTime`: comparison by absolute instant.
/// - `Date`: comparison by the logical calendar date in the value's own
///   timezone offset, so rows near midnight group with their local day.
pub fn compare_values(a: &FieldValue, b: &FieldValue, data_type: DataType) -> Ordering {
    match data_type {
        DataType::String => compare_nulls_first(
            a.as_text().map(|s| s.to_lowercase()),
            b.as_text().map(|s| s.to_lowercase()),
            |x, y| x.cmp(&y),
        ),
        DataType::Boolean => {
            compare_nulls_first(a.as_boolean(), b.as_boolean(), |x, y| x.cmp(&y))
        }
        DataType::Decimal => compare_nulls_first(a.as_decimal(), b.as_decimal(), |x, y| {
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }),
        DataType::DateTime => {
            compare_nulls_first(a.as_datetime(), b.as_datetime(), |x, y| x.cmp(&y))
        }
        DataType::Date => compare_nulls_first(
            a.as_datetime().map(|dt| dt.naive_local().date()),
            b.as_datetime().map(|dt| dt.naive_local().date()),
            |x, y| x.cmp(&y),
        ),
    }
}

/// Null/uncoercible values sort before any present value; two nulls are
/// equal.
fn compare_nulls_first<T>(
    a: Option<T>,
    b: Option<T>,
    compare: impl FnOnce(T, T) -> Ordering,
) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(x), Some(y)) => compare(x, y),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, TimeZone};

    #[test]
    fn test_string_case_insensitive() {
        let a = FieldValue::text("apple");
        let b = FieldValue::text("Banana");
        assert_eq!(compare_values(&a, &b, DataType::String), Ordering::Less);

        let a = FieldValue::text("HELLO");
        let b = FieldValue::text("hello");
        assert_eq!(compare_values(&a, &b, DataType::String), Ordering::Equal);
    }

    #[test]
    fn test_nulls_sort_first() {
        let empty = FieldValue::Empty;
        let value = FieldValue::Number(1.0);
        assert_eq!(
            compare_values(&empty, &value, DataType::Decimal),
            Ordering::Less
        );
        assert_eq!(
            compare_values(&value, &empty, DataType::Decimal),
            Ordering::Greater
        );
        assert_eq!(
            compare_values(&empty, &empty, DataType::Decimal),
            Ordering::Equal
        );
    }

    #[test]
    fn test_boolean_false_before_true() {
        let f = FieldValue::Boolean(false);
        let t = FieldValue::Boolean(true);
        assert_eq!(compare_values(&f, &t, DataType::Boolean), Ordering::Less);
    }

    #[test]
    fn test_type_mismatch_treated_as_null() {
        // A boolean under a Decimal column cannot be coerced, so it
        // compares as empty and sorts before real numbers.
        let mismatched = FieldValue::Boolean(true);
        let number = FieldValue::Number(-100.0);
        assert_eq!(
            compare_values(&mismatched, &number, DataType::Decimal),
            Ordering::Less
        );
    }

    #[test]
    fn test_numeric_text_coerces() {
        let text = FieldValue::text("10");
        let number = FieldValue::Number(9.0);
        assert_eq!(
            compare_values(&text, &number, DataType::Decimal),
            Ordering::Greater
        );
    }

    #[test]
    fn test_date_compares_by_local_calendar_date() {
        // 00:30 local on Jan 2 in UTC+2 is 22:30 UTC on Jan 1. Under the
        // Date type it must still order as Jan 2.
        let plus_two = FixedOffset::east_opt(2 * 3600).unwrap();
        let utc = FixedOffset::east_opt(0).unwrap();
        let late = FieldValue::DateTime(plus_two.with_ymd_and_hms(2021, 1, 2, 0, 30, 0).unwrap());
        let early = FieldValue::DateTime(utc.with_ymd_and_hms(2021, 1, 1, 23, 0, 0).unwrap());

        // By instant the "late" value happens first...
        assert_eq!(
            compare_values(&late, &early, DataType::DateTime),
            Ordering::Less
        );
        // ...but by logical calendar date it is the later day.
        assert_eq!(
            compare_values(&late, &early, DataType::Date),
            Ordering::Greater
        );
    }
}
