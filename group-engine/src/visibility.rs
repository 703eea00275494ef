//! FILENAME: group-engine/src/visibility.rs
//! Visibility & Filter Engine - one forward pass over the render sequence.
//!
//! The pass maintains a stack of the currently-open ancestor group nodes
//! and, per leaf, evaluates the full-text search predicate. Matching
//! leaves are counted onto every open ancestor regardless of expansion
//! (collapsed groups still show filtered totals); a group header enters
//! the visible set lazily, the first time a matching descendant is found
//! beneath it, and only if no collapsed ancestor hides it. A group with
//! zero matching descendants never appears.

use smallvec::SmallVec;

use grid_engine::{DataType, Row};

use crate::aggregate::AggregateValues;
use crate::definition::ColumnInfo;
use crate::flatten::{RenderRow, RenderRowKind};
use crate::manager::ExpandState;
use crate::tree::{GroupTree, NodeId, RowId};

/// Result of the visibility pass: the ordered visible render rows plus the
/// global filtered leaf set used for footer aggregation.
#[derive(Debug, Clone, Default)]
pub struct VisibleSet {
    pub rows: Vec<RenderRow>,
    pub filtered_leaves: Vec<RowId>,
    pub number_of_items: usize,
    pub number_of_unfiltered_items: usize,
}

/// Full-text search predicate: matches when the lowercased search text is
/// a substring of any string-typed column's display string. Non-string
/// columns are never searched.
pub fn row_matches_search(row: &Row, string_columns: &[&ColumnInfo], needle: &str) -> bool {
    string_columns.iter().any(|column| {
        row.value(&column.field)
            .as_text()
            .map(|text| text.to_lowercase().contains(needle))
            .unwrap_or(false)
    })
}

/// Runs the visibility pass over the flattened sequence. Resets and
/// refills every node's per-run accumulators (`number_of_items`,
/// `filtered_rows`, `is_expanded`) as a side effect.
pub fn compute_visibility(
    tree: &mut GroupTree,
    flat: &[RenderRow],
    rows: &[Row],
    columns: &[ColumnInfo],
    search_text: &str,
    expand: &ExpandState,
) -> VisibleSet {
    let needle = search_text.to_lowercase();
    let string_columns: Vec<&ColumnInfo> = columns
        .iter()
        .filter(|c| c.data_type == DataType::String)
        .collect();

    for node in &mut tree.nodes {
        node.number_of_items = 0;
        node.filtered_rows.clear();
        node.aggregate_values = AggregateValues::default();
        node.is_expanded = expand.is_expanded(&node.key());
    }

    let mut emitted = vec![false; tree.nodes.len()];
    let mut stack: SmallVec<[NodeId; 8]> = SmallVec::new();
    let mut visible = VisibleSet::default();
    let mut total_leaves = 0;

    for render_row in flat {
        match render_row.kind {
            RenderRowKind::GroupHeader(node_id) => {
                while stack.len() > render_row.level {
                    stack.pop();
                }
                stack.push(node_id);
            }
            RenderRowKind::Leaf(row_id) => {
                while stack.len() > render_row.level {
                    stack.pop();
                }

                total_leaves += 1;
                let row = &rows[row_id];
                if !needle.is_empty() && !row_matches_search(row, &string_columns, &needle) {
                    continue;
                }
                visible.filtered_leaves.push(row_id);

                for (depth, &ancestor) in stack.iter().enumerate() {
                    tree.nodes[ancestor].number_of_items += 1;
                    tree.nodes[ancestor].filtered_rows.push(row_id);

                    if !emitted[ancestor] {
                        let hidden = stack[..depth]
                            .iter()
                            .any(|&above| !tree.nodes[above].is_expanded);
                        if !hidden {
                            emitted[ancestor] = true;
                            visible.rows.push(RenderRow {
                                level: tree.nodes[ancestor].level,
                                kind: RenderRowKind::GroupHeader(ancestor),
                            });
                        }
                    }
                }

                if stack.iter().all(|&a| tree.nodes[a].is_expanded) {
                    visible.rows.push(*render_row);
                }
            }
        }
    }

    visible.number_of_unfiltered_items = total_leaves;
    visible.number_of_items = visible.filtered_leaves.len();
    visible
}
