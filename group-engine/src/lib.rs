//! FILENAME: group-engine/src/lib.rs
//! Grouping/aggregation subsystem for the grid client runtime.
//!
//! This crate turns a flat row collection into a collapsible, aggregated
//! tree view, kept in sync with live full-text filtering, expand/collapse
//! state, and footer totals. It depends on `engine` for the shared value
//! model, comparators, and header formatting.
//!
//! Layers:
//! - `definition`: Serializable configuration (what the grouping IS)
//! - `manager`: Persistent user state (definition store, expand state)
//! - `tree` / `flatten` / `visibility` / `aggregate` / `sort`: the pipeline
//! - `view`: Renderable output for the frontend (WHAT we display)
//! - `engine`: The owning orchestrator (HOW one run is calculated)

pub mod aggregate;
pub mod definition;
pub mod engine;
pub mod flatten;
pub mod manager;
pub mod sort;
pub mod tree;
pub mod view;
pub mod visibility;

pub use aggregate::{aggregate, calculate_aggregates, footer_aggregates, AggregateValues};
pub use definition::*;
pub use engine::GridState;
pub use flatten::{flatten, RenderRow, RenderRowKind};
pub use manager::{ExpandState, GroupManager, NodeKey};
pub use sort::{apply_sort, sort_leaf_rows, SortState};
pub use tree::{build_group_tree, GroupNode, GroupTree, NodeId, RowId};
pub use view::{GridView, ViewRow};
pub use visibility::{compute_visibility, row_matches_search, VisibleSet};
