//! FILENAME: group-engine/src/definition.rs
//! Grouping Definition - The serializable configuration.
//!
//! This module contains all the types needed to DESCRIBE a grouped grid
//! view. These structures are designed to be:
//! - Serializable (for saving/loading view state)
//! - Sent across the rendering boundary
//! - Immutable snapshots of user intent

use serde::{Deserialize, Serialize};

use grid_engine::DataType;

// ============================================================================
// AGGREGATION
// ============================================================================

/// Supported aggregation functions for group and footer values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AggregateFunction {
    Sum,
    Average,
    Min,
    Max,
}

impl Default for AggregateFunction {
    fn default() -> Self {
        AggregateFunction::Sum
    }
}

/// One configured aggregate: read `source_field` from each member row,
/// write the result to `target_field` (which may be a dotted path, letting
/// results attach at a nested display location).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateSpec {
    pub target_field: String,
    pub source_field: String,
    pub function: AggregateFunction,
}

impl AggregateSpec {
    pub fn new(
        target_field: impl Into<String>,
        source_field: impl Into<String>,
        function: AggregateFunction,
    ) -> Self {
        AggregateSpec {
            target_field: target_field.into(),
            source_field: source_field.into(),
            function,
        }
    }
}

// ============================================================================
// SORT DIRECTION
// ============================================================================

/// Sort order for group buckets and the active sort column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl Default for SortDirection {
    fn default() -> Self {
        SortDirection::Ascending
    }
}

// ============================================================================
// GROUP DEFINITION
// ============================================================================

/// One grouping level configured by the user. The position of a definition
/// within the [`crate::manager::GroupManager`] decides its nesting depth
/// (index 0 = outermost).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupDefinition {
    /// Field path the rows are bucketed by.
    pub field: String,

    /// Display title prefixed to the bucket header ("Title: value").
    /// Empty means the header is the formatted value alone.
    pub title: String,

    /// Declared type of the grouped field; drives comparison and header
    /// formatting.
    pub data_type: DataType,

    /// Bucket order at this level.
    pub direction: SortDirection,

    /// Aggregates computed per bucket at this level.
    pub aggregates: Vec<AggregateSpec>,

    /// Format pattern for the bucket header (decimal or date tokens).
    pub format_pattern: Option<String>,

    /// Whether adding this group should expand the view to expose it.
    pub auto_expand: bool,

    /// Whether the grouped column stays visible as a regular grid column
    /// (consumed by the rendering surface, carried here as user intent).
    pub show_when_grouped: bool,
}

impl GroupDefinition {
    pub fn new(field: impl Into<String>, title: impl Into<String>, data_type: DataType) -> Self {
        GroupDefinition {
            field: field.into(),
            title: title.into(),
            data_type,
            direction: SortDirection::Ascending,
            aggregates: Vec::new(),
            format_pattern: None,
            auto_expand: true,
            show_when_grouped: true,
        }
    }

    pub fn descending(mut self) -> Self {
        self.direction = SortDirection::Descending;
        self
    }

    pub fn with_aggregate(mut self, spec: AggregateSpec) -> Self {
        self.aggregates.push(spec);
        self
    }

    pub fn with_format_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.format_pattern = Some(pattern.into());
        self
    }
}

// ============================================================================
// COLUMN METADATA
// ============================================================================

/// Column metadata supplied by the rendering surface. The engine uses it
/// only to restrict full-text search to string-typed columns and to look
/// up the data type of the active sort column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnInfo {
    pub field: String,
    pub data_type: DataType,
    pub title: String,
}

impl ColumnInfo {
    pub fn new(field: impl Into<String>, data_type: DataType, title: impl Into<String>) -> Self {
        ColumnInfo {
            field: field.into(),
            data_type,
            title: title.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_definition_defaults() {
        let def = GroupDefinition::new("customer", "Customer", DataType::String);
        assert_eq!(def.direction, SortDirection::Ascending);
        assert!(def.auto_expand);
        assert!(def.show_when_grouped);
        assert!(def.aggregates.is_empty());
    }

    #[test]
    fn test_definition_serde_round_trip() {
        let def = GroupDefinition::new("amount", "", DataType::Decimal)
            .descending()
            .with_aggregate(AggregateSpec::new("amount", "amount", AggregateFunction::Sum))
            .with_format_pattern("#,##0.00");

        let json = serde_json::to_string(&def).unwrap();
        let back: GroupDefinition = serde_json::from_str(&json).unwrap();
        assert_eq!(def, back);
    }
}
