//! FILENAME: group-engine/src/view.rs
//! Grid View - Renderable output for the rendering surface.
//!
//! This module is the engine's only output channel: an ordered sequence
//! of visible rows plus the authoritative aggregate values and counts.
//! Everything here is a plain serializable snapshot; a renderer never
//! needs to reach back into the pipeline's internal state.

use serde::{Deserialize, Serialize};

use crate::aggregate::AggregateValues;
use crate::manager::NodeKey;

/// One visible row, either a group header or a leaf.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewRow {
    /// Nesting depth (0 = outermost).
    pub level: usize,

    /// Whether this is a group header row.
    pub is_group: bool,

    /// Group header text (group rows only).
    pub header: Option<String>,

    /// Rebuild-stable node identity, round-tripped by the renderer into
    /// `toggle_expand` calls (group rows only).
    pub node_key: Option<NodeKey>,

    /// Identity key of the leaf row (leaf rows only).
    pub row_key: Option<String>,

    /// Effective expansion state (group rows only; leaves are `true`).
    pub is_expanded: bool,

    /// Filtered item count beneath this group.
    pub number_of_items: usize,

    /// Aggregates over the group's filtered rows, keyed by target path.
    pub aggregate_values: AggregateValues,
}

impl ViewRow {
    pub fn group(
        level: usize,
        header: String,
        node_key: NodeKey,
        is_expanded: bool,
        number_of_items: usize,
        aggregate_values: AggregateValues,
    ) -> Self {
        ViewRow {
            level,
            is_group: true,
            header: Some(header),
            node_key: Some(node_key),
            row_key: None,
            is_expanded,
            number_of_items,
            aggregate_values,
        }
    }

    pub fn leaf(level: usize, row_key: String) -> Self {
        ViewRow {
            level,
            is_group: false,
            header: None,
            node_key: None,
            row_key: Some(row_key),
            is_expanded: true,
            number_of_items: 0,
            aggregate_values: AggregateValues::default(),
        }
    }
}

/// The render-ready result of one pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridView {
    /// Which pipeline generation produced this view.
    pub generation: u64,

    /// The visible row sequence, ready for paging/virtualized rendering.
    pub rows: Vec<ViewRow>,

    /// Footer aggregates over the full filtered leaf set.
    pub footer_aggregates: AggregateValues,

    /// Filtered leaf count across the whole view.
    pub number_of_items: usize,

    /// Total leaf count ignoring the filter.
    pub number_of_unfiltered_items: usize,
}

impl GridView {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Iterates the visible group header rows.
    pub fn group_rows(&self) -> impl Iterator<Item = &ViewRow> {
        self.rows.iter().filter(|r| r.is_group)
    }

    /// Iterates the visible leaf rows.
    pub fn leaf_rows(&self) -> impl Iterator<Item = &ViewRow> {
        self.rows.iter().filter(|r| !r.is_group)
    }
}
