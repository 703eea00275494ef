//! FILENAME: grid-engine/src/row.rs
//! PURPOSE: Row records as delivered by the data-access layer.
//! CONTEXT: A row is an opaque record (field name → value) plus a stable
//! identity key used to re-identify rows and group nodes across full
//! pipeline rebuilds. Rows are read-only inputs for one pipeline run.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::value::FieldValue;

const EMPTY_VALUE: FieldValue = FieldValue::Empty;

/// Errors raised while ingesting external records into a [`RowSet`].
#[derive(Error, Debug)]
pub enum RowSetError {
    #[error("record {index} is missing identity key field '{key_field}'")]
    MissingKey { index: usize, key_field: String },
}

/// A single data row: identity key plus a flat field map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    key: String,
    values: HashMap<String, FieldValue>,
}

impl Row {
    pub fn new(key: impl Into<String>) -> Self {
        Row {
            key: key.into(),
            values: HashMap::new(),
        }
    }

    /// The globally-unique identity key of this row.
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn set(&mut self, field: impl Into<String>, value: FieldValue) {
        self.values.insert(field.into(), value);
    }

    /// Builder-style variant of [`Row::set`].
    pub fn with(mut self, field: impl Into<String>, value: FieldValue) -> Self {
        self.set(field, value);
        self
    }

    /// Resolves a (possibly dotted) field path on this row.
    /// Rows are flat records, so the dotted path is the field name itself;
    /// a missing field resolves to `Empty` and never fails.
    pub fn value(&self, path: &str) -> &FieldValue {
        self.values.get(path).unwrap_or(&EMPTY_VALUE)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// An owned collection of rows sharing one identity-key field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RowSet {
    rows: Vec<Row>,
}

impl RowSet {
    pub fn new() -> Self {
        RowSet { rows: Vec::new() }
    }

    pub fn from_rows(rows: Vec<Row>) -> Self {
        RowSet { rows }
    }

    /// Ingests plain records from the data-access layer, extracting each
    /// row's identity from `key_field`. A record without a usable identity
    /// key is rejected — identity is the one contract the engine cannot
    /// repair on its own.
    pub fn from_records(
        key_field: &str,
        records: Vec<HashMap<String, FieldValue>>,
    ) -> Result<RowSet, RowSetError> {
        let mut rows = Vec::with_capacity(records.len());

        for (index, record) in records.into_iter().enumerate() {
            let key = record
                .get(key_field)
                .and_then(|v| v.as_text())
                .filter(|s| !s.is_empty())
                .ok_or_else(|| RowSetError::MissingKey {
                    index,
                    key_field: key_field.to_string(),
                })?;

            let mut row = Row::new(key);
            for (field, value) in record {
                row.set(field, value);
            }
            rows.push(row);
        }

        Ok(RowSet { rows })
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<Row> {
        self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
