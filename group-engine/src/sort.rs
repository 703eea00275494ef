//! FILENAME: group-engine/src/sort.rs
//! Sorter - applies the single active sort column at the leaf level.
//!
//! Groups themselves stay ordered by their bucket key from the tree
//! builder; the active sort only rearranges the leaf rows inside each
//! innermost group. Without grouping it orders the whole collection.
//! Ties always break on the identity key so the output is deterministic
//! regardless of engine-internal ordering.

use serde::{Deserialize, Serialize};

use grid_engine::{compare_values, DataType, Row};

use crate::definition::{ColumnInfo, SortDirection};
use crate::tree::{GroupTree, RowId};

/// The active sort column and direction. `field = None` is the neutral
/// state: identity-key order only.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SortState {
    pub field: Option<String>,
    pub direction: SortDirection,
}

impl SortState {
    pub fn new() -> Self {
        SortState::default()
    }

    pub fn is_active(&self) -> bool {
        self.field.is_some()
    }

    /// Column-header toggle semantics: a fresh field sorts ascending,
    /// repeating it flips to descending, a third click clears the sort.
    pub fn cycle(&mut self, field: &str) {
        match &self.field {
            Some(current) if current == field => {
                if self.direction == SortDirection::Ascending {
                    self.direction = SortDirection::Descending;
                } else {
                    self.field = None;
                    self.direction = SortDirection::Ascending;
                }
            }
            _ => {
                self.field = Some(field.to_string());
                self.direction = SortDirection::Ascending;
            }
        }
    }
}

/// Sorts a run of leaf row ids in place.
pub fn sort_leaf_rows(rows: &[Row], ids: &mut [RowId], sort: &SortState, columns: &[ColumnInfo]) {
    match &sort.field {
        None => {
            ids.sort_by(|&a, &b| rows[a].key().cmp(rows[b].key()));
        }
        Some(field) => {
            let data_type = columns
                .iter()
                .find(|c| &c.field == field)
                .map(|c| c.data_type)
                .unwrap_or(DataType::String);

            ids.sort_by(|&a, &b| {
                let ordering = compare_values(rows[a].value(field), rows[b].value(field), data_type);
                let ordering = match sort.direction {
                    SortDirection::Ascending => ordering,
                    SortDirection::Descending => ordering.reverse(),
                };
                ordering.then_with(|| rows[a].key().cmp(rows[b].key()))
            });
        }
    }
}

/// Applies the sorter to a freshly built tree, before flattening.
/// Grouped: only innermost-group leaf runs are touched, and only when a
/// sort is active (the bucket order already fixed leaf runs otherwise).
/// Ungrouped: the whole collection is ordered, falling back to the
/// identity-key natural order in the neutral state.
pub fn apply_sort(tree: &mut GroupTree, rows: &[Row], sort: &SortState, columns: &[ColumnInfo]) {
    if tree.is_grouped() {
        if !sort.is_active() {
            return;
        }
        for node in &mut tree.nodes {
            if !node.rows.is_empty() {
                sort_leaf_rows(rows, &mut node.rows, sort, columns);
            }
        }
    } else {
        sort_leaf_rows(rows, &mut tree.ungrouped, sort, columns);
    }
}
