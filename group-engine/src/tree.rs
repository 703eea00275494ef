//! FILENAME: group-engine/src/tree.rs
//! Tree Builder - recursively partitions rows into nested group buckets.
//!
//! The tree is an arena: nodes live in one `Vec` and reference each other
//! (and their rows) by index. It is entirely ephemeral — rebuilt from
//! scratch on every pipeline run, never mutated incrementally.
//!
//! Algorithm per level:
//! 1. Stable-sort the row ids by the raw field value (Comparator order,
//!    honoring the level's direction; ties keep the incoming order).
//! 2. Partition the sorted sequence into contiguous runs sharing the same
//!    formatted header (two distinct timestamps in the same day bucket
//!    share a run).
//! 3. Synthesize a node per run and recurse into the next level.

use serde::{Deserialize, Serialize};

use grid_engine::{compare_values, format_value, group_header, FormatOptions, Row};

use crate::aggregate::AggregateValues;
use crate::definition::{GroupDefinition, SortDirection};
use crate::manager::NodeKey;

/// Index of a node within the tree arena.
pub type NodeId = usize;

/// Index of a row within the pipeline's row slice.
pub type RowId = usize;

// ============================================================================
// GROUP NODE
// ============================================================================

/// Synthetic node produced by the tree builder.
/// `number_of_items`, `filtered_rows`, `aggregate_values`, and
/// `is_expanded` are per-run accumulators filled by the visibility and
/// aggregation stages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupNode {
    /// Display header, including the definition's title prefix.
    pub header: String,

    /// Concatenation of all ancestor headers ("_"-separated).
    pub header_path: String,

    /// Nesting depth (0 = outermost).
    pub level: usize,

    /// Identity key of the bucket's first row, part of the node identity.
    pub leader_key: String,

    /// Child group nodes (empty at the innermost level).
    pub children: Vec<NodeId>,

    /// Leaf rows (populated only at the innermost level).
    pub rows: Vec<RowId>,

    /// Total leaves beneath this node, ignoring the filter.
    pub unfiltered_items: usize,

    /// Leaves beneath this node matching the active filter.
    pub number_of_items: usize,

    /// The matching leaves themselves, for aggregation.
    pub filtered_rows: Vec<RowId>,

    /// Aggregates over `filtered_rows` for this node's level.
    pub aggregate_values: AggregateValues,

    /// Effective expansion, resolved against the expand state each run.
    pub is_expanded: bool,
}

impl GroupNode {
    fn new(header: String, header_path: String, level: usize, leader_key: String) -> Self {
        GroupNode {
            header,
            header_path,
            level,
            leader_key,
            children: Vec::new(),
            rows: Vec::new(),
            unfiltered_items: 0,
            number_of_items: 0,
            filtered_rows: Vec::new(),
            aggregate_values: AggregateValues::default(),
            is_expanded: false,
        }
    }

    /// The rebuild-stable identity of this node.
    pub fn key(&self) -> NodeKey {
        NodeKey::new(self.header_path.clone(), self.level as u32, self.leader_key.clone())
    }
}

// ============================================================================
// GROUP TREE
// ============================================================================

/// Arena-backed group tree. When no grouping is active the tree has no
/// nodes and `ungrouped` holds every row in source order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GroupTree {
    pub nodes: Vec<GroupNode>,
    pub roots: Vec<NodeId>,
    pub ungrouped: Vec<RowId>,
}

impl GroupTree {
    pub fn is_grouped(&self) -> bool {
        !self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> &GroupNode {
        &self.nodes[id]
    }
}

// ============================================================================
// BUILDER
// ============================================================================

/// Builds the group tree for one pipeline run.
pub fn build_group_tree(
    rows: &[Row],
    definitions: &[GroupDefinition],
    options: &FormatOptions,
) -> GroupTree {
    let ids: Vec<RowId> = (0..rows.len()).collect();

    if definitions.is_empty() {
        return GroupTree {
            nodes: Vec::new(),
            roots: Vec::new(),
            ungrouped: ids,
        };
    }

    let mut tree = GroupTree::default();
    tree.roots = build_level(&mut tree.nodes, rows, ids, definitions, 0, "", options);
    tree
}

fn build_level(
    nodes: &mut Vec<GroupNode>,
    rows: &[Row],
    mut ids: Vec<RowId>,
    definitions: &[GroupDefinition],
    level: usize,
    parent_path: &str,
    options: &FormatOptions,
) -> Vec<NodeId> {
    let definition = &definitions[level];

    ids.sort_by(|&a, &b| {
        let ordering = compare_values(
            rows[a].value(&definition.field),
            rows[b].value(&definition.field),
            definition.data_type,
        );
        match definition.direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    });

    // Bucket labels are the formatted values; the partition runs on them,
    // not on the raw values.
    let labels: Vec<String> = ids
        .iter()
        .map(|&id| {
            format_value(
                rows[id].value(&definition.field),
                definition.data_type,
                definition.format_pattern.as_deref(),
                options,
            )
        })
        .collect();

    let mut out = Vec::new();
    let mut run_start = 0;

    while run_start < ids.len() {
        let mut run_end = run_start + 1;
        while run_end < ids.len() && labels[run_end] == labels[run_start] {
            run_end += 1;
        }

        let header = group_header(&definition.title, &labels[run_start]);
        let header_path = format!("{}_{}", parent_path, header);
        let leader_key = rows[ids[run_start]].key().to_string();

        let node_id = nodes.len();
        let mut node = GroupNode::new(header, header_path.clone(), level, leader_key);
        node.unfiltered_items = run_end - run_start;
        nodes.push(node);

        let run: Vec<RowId> = ids[run_start..run_end].to_vec();
        if level + 1 < definitions.len() {
            let children = build_level(
                nodes,
                rows,
                run,
                definitions,
                level + 1,
                &header_path,
                options,
            );
            nodes[node_id].children = children;
        } else {
            nodes[node_id].rows = run;
        }

        out.push(node_id);
        run_start = run_end;
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, TimeZone};
    use grid_engine::{DataType, FieldValue};

    fn customer_rows() -> Vec<Row> {
        vec![
            Row::new("r1")
                .with("customer", FieldValue::text("B"))
                .with("amount", FieldValue::Number(5.0)),
            Row::new("r2")
                .with("customer", FieldValue::text("A"))
                .with("amount", FieldValue::Number(10.0)),
            Row::new("r3")
                .with("customer", FieldValue::text("A"))
                .with("amount", FieldValue::Number(20.0)),
        ]
    }

    #[test]
    fn test_buckets_are_ordered_and_contiguous() {
        let rows = customer_rows();
        let defs = vec![GroupDefinition::new("customer", "", DataType::String)];
        let tree = build_group_tree(&rows, &defs, &FormatOptions::default());

        let headers: Vec<&str> = tree
            .roots
            .iter()
            .map(|&id| tree.node(id).header.as_str())
            .collect();
        assert_eq!(headers, vec!["A", "B"]);

        // Stable sort keeps r2 before r3 inside the A bucket.
        assert_eq!(tree.node(tree.roots[0]).rows, vec![1, 2]);
        assert_eq!(tree.node(tree.roots[0]).leader_key, "r2");
        assert_eq!(tree.node(tree.roots[0]).unfiltered_items, 2);
    }

    #[test]
    fn test_descending_direction() {
        let rows = customer_rows();
        let defs = vec![GroupDefinition::new("customer", "", DataType::String).descending()];
        let tree = build_group_tree(&rows, &defs, &FormatOptions::default());

        let headers: Vec<&str> = tree
            .roots
            .iter()
            .map(|&id| tree.node(id).header.as_str())
            .collect();
        assert_eq!(headers, vec!["B", "A"]);
    }

    #[test]
    fn test_missing_field_goes_to_dash_bucket() {
        let rows = vec![
            Row::new("r1").with("customer", FieldValue::text("A")),
            Row::new("r2"),
        ];
        let defs = vec![GroupDefinition::new("customer", "", DataType::String)];
        let tree = build_group_tree(&rows, &defs, &FormatOptions::default());

        assert_eq!(tree.node(tree.roots[0]).header, "-");
        assert_eq!(tree.node(tree.roots[0]).rows, vec![1]);
    }

    #[test]
    fn test_header_path_concatenates_ancestors() {
        let rows = vec![Row::new("r1")
            .with("country", FieldValue::text("SE"))
            .with("city", FieldValue::text("Gothenburg"))];
        let defs = vec![
            GroupDefinition::new("country", "", DataType::String),
            GroupDefinition::new("city", "", DataType::String),
        ];
        let tree = build_group_tree(&rows, &defs, &FormatOptions::default());

        let country = tree.node(tree.roots[0]);
        assert_eq!(country.header_path, "_SE");
        let city = tree.node(country.children[0]);
        assert_eq!(city.header_path, "_SE_Gothenburg");
        assert_eq!(city.level, 1);
        assert_eq!(city.rows, vec![0]);
    }

    #[test]
    fn test_timestamps_share_a_date_bucket() {
        let utc = FixedOffset::east_opt(0).unwrap();
        let rows = vec![
            Row::new("r1").with(
                "created",
                FieldValue::DateTime(utc.with_ymd_and_hms(2021, 3, 1, 8, 0, 0).unwrap()),
            ),
            Row::new("r2").with(
                "created",
                FieldValue::DateTime(utc.with_ymd_and_hms(2021, 3, 1, 17, 30, 0).unwrap()),
            ),
            Row::new("r3").with(
                "created",
                FieldValue::DateTime(utc.with_ymd_and_hms(2021, 3, 2, 9, 0, 0).unwrap()),
            ),
        ];
        let defs = vec![GroupDefinition::new("created", "", DataType::Date)];
        let tree = build_group_tree(&rows, &defs, &FormatOptions::default());

        let headers: Vec<&str> = tree
            .roots
            .iter()
            .map(|&id| tree.node(id).header.as_str())
            .collect();
        assert_eq!(headers, vec!["2021-03-01", "2021-03-02"]);
        assert_eq!(tree.node(tree.roots[0]).rows.len(), 2);
    }

    #[test]
    fn test_title_prefixes_header() {
        let rows = customer_rows();
        let defs = vec![GroupDefinition::new("customer", "Customer", DataType::String)];
        let tree = build_group_tree(&rows, &defs, &FormatOptions::default());
        assert_eq!(tree.node(tree.roots[0]).header, "Customer: A");
        assert_eq!(tree.node(tree.roots[0]).header_path, "_Customer: A");
    }

    #[test]
    fn test_ungrouped_passthrough() {
        let rows = customer_rows();
        let tree = build_group_tree(&rows, &[], &FormatOptions::default());
        assert!(tree.nodes.is_empty());
        assert_eq!(tree.ungrouped, vec![0, 1, 2]);
    }
}
