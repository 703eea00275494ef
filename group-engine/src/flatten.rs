//! FILENAME: group-engine/src/flatten.rs
//! Flattener - linearizes a group tree into an ordered render sequence.
//!
//! The output is a strict pre-order traversal: every group header appears
//! before its children, every leaf after its full ancestor chain. The
//! sequence is deterministic given a deterministic tree; flattening an
//! unchanged tree twice yields identical output.

use serde::{Deserialize, Serialize};

use crate::tree::{GroupTree, NodeId, RowId};

/// What a render row points at: a group header node or a leaf row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RenderRowKind {
    GroupHeader(NodeId),
    Leaf(RowId),
}

/// One flattened output unit, tagged with its nesting depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderRow {
    pub level: usize,
    pub kind: RenderRowKind,
}

impl RenderRow {
    pub fn is_group(&self) -> bool {
        matches!(self.kind, RenderRowKind::GroupHeader(_))
    }
}

/// Flattens a group tree (or the ungrouped row list) into render rows.
pub fn flatten(tree: &GroupTree) -> Vec<RenderRow> {
    let mut out = Vec::new();

    if !tree.is_grouped() {
        for &row_id in &tree.ungrouped {
            out.push(RenderRow {
                level: 0,
                kind: RenderRowKind::Leaf(row_id),
            });
        }
        return out;
    }

    for &root in &tree.roots {
        flatten_node(tree, root, &mut out);
    }
    out
}

fn flatten_node(tree: &GroupTree, node_id: NodeId, out: &mut Vec<RenderRow>) {
    let node = tree.node(node_id);
    out.push(RenderRow {
        level: node.level,
        kind: RenderRowKind::GroupHeader(node_id),
    });

    for &child in &node.children {
        flatten_node(tree, child, out);
    }
    for &row_id in &node.rows {
        out.push(RenderRow {
            level: node.level + 1,
            kind: RenderRowKind::Leaf(row_id),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::GroupDefinition;
    use crate::tree::build_group_tree;
    use grid_engine::{DataType, FieldValue, FormatOptions, Row};

    fn rows() -> Vec<Row> {
        vec![
            Row::new("r1")
                .with("country", FieldValue::text("SE"))
                .with("city", FieldValue::text("Gothenburg")),
            Row::new("r2")
                .with("country", FieldValue::text("SE"))
                .with("city", FieldValue::text("Stockholm")),
            Row::new("r3")
                .with("country", FieldValue::text("DK"))
                .with("city", FieldValue::text("Copenhagen")),
        ]
    }

    #[test]
    fn test_pre_order_traversal() {
        let rows = rows();
        let defs = vec![
            GroupDefinition::new("country", "", DataType::String),
            GroupDefinition::new("city", "", DataType::String),
        ];
        let tree = build_group_tree(&rows, &defs, &FormatOptions::default());
        let flat = flatten(&tree);

        // DK > Copenhagen > r3, SE > Gothenburg > r1, SE > Stockholm > r2
        let shape: Vec<(usize, bool)> = flat.iter().map(|r| (r.level, r.is_group())).collect();
        assert_eq!(
            shape,
            vec![
                (0, true),
                (1, true),
                (2, false),
                (0, true),
                (1, true),
                (2, false),
                (1, true),
                (2, false),
            ]
        );
    }

    #[test]
    fn test_every_leaf_appears_exactly_once() {
        let rows = rows();
        let defs = vec![GroupDefinition::new("country", "", DataType::String)];
        let tree = build_group_tree(&rows, &defs, &FormatOptions::default());
        let flat = flatten(&tree);

        let mut leaf_ids: Vec<usize> = flat
            .iter()
            .filter_map(|r| match r.kind {
                RenderRowKind::Leaf(id) => Some(id),
                _ => None,
            })
            .collect();
        leaf_ids.sort();
        assert_eq!(leaf_ids, vec![0, 1, 2]);
    }

    #[test]
    fn test_flatten_is_deterministic() {
        let rows = rows();
        let defs = vec![GroupDefinition::new("country", "", DataType::String)];
        let tree = build_group_tree(&rows, &defs, &FormatOptions::default());
        assert_eq!(flatten(&tree), flatten(&tree));
    }

    #[test]
    fn test_ungrouped_leaves_at_level_zero() {
        let rows = rows();
        let tree = build_group_tree(&rows, &[], &FormatOptions::default());
        let flat = flatten(&tree);
        assert_eq!(flat.len(), 3);
        assert!(flat.iter().all(|r| r.level == 0 && !r.is_group()));
    }
}
