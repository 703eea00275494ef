//! FILENAME: grid-engine/src/lib.rs
//! PURPOSE: Main library entry point for the shared grid value model.
//! CONTEXT: Re-exports public types and modules for use by other crates.

pub mod compare;
pub mod format;
pub mod row;
pub mod value;

// Re-export commonly used types at the crate root
pub use compare::compare_values;
pub use format::{
    format_date_pattern, format_decimal, format_decimal_pattern, format_value, group_header,
    FormatOptions, EMPTY_HEADER,
};
pub use row::{Row, RowSet, RowSetError};
pub use value::{DataType, FieldValue};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_formats_a_group_bucket_end_to_end() {
        let row = Row::new("r1").with("amount", FieldValue::Number(1250.0));
        let options = FormatOptions::default();
        let formatted = format_value(
            row.value("amount"),
            DataType::Decimal,
            Some("#,##0.00"),
            &options,
        );
        assert_eq!(group_header("Amount", &formatted), "Amount: 1,250.00");
    }
}
