//! FILENAME: group-engine/src/engine.rs
//! Grid State - the owning orchestrator of the grouping pipeline.
//!
//! Holds the state that persists across pipeline runs (rows, columns,
//! group definitions, expand state, search text, sort state) and re-runs
//! the full pipeline synchronously on every user operation:
//!
//! 1. Build the group tree from the definition store
//! 2. Apply the active sort to the leaf runs
//! 3. Flatten into the pre-order render sequence
//! 4. Run the visibility/filter pass
//! 5. Compute per-group and footer aggregates
//!
//! There is no incremental update path; correctness comes from cheap,
//! deterministic, total recomputation. Asynchronous row deliveries are
//! guarded by a monotonically increasing generation counter so a slow
//! fetch can never clobber a newer state.

use std::time::Instant;

use grid_engine::{FormatOptions, Row, RowSet};

use crate::aggregate::{calculate_aggregates, footer_aggregates};
use crate::definition::{ColumnInfo, GroupDefinition};
use crate::flatten::{flatten, RenderRowKind};
use crate::manager::{ExpandState, GroupManager, NodeKey};
use crate::sort::{apply_sort, SortState};
use crate::tree::build_group_tree;
use crate::view::{GridView, ViewRow};
use crate::visibility::compute_visibility;

/// The engine's persistent state and public operation surface.
pub struct GridState {
    rows: Vec<Row>,
    columns: Vec<ColumnInfo>,
    groups: GroupManager,
    expand: ExpandState,
    sort: SortState,
    search_text: String,
    options: FormatOptions,
    generation: u64,
}

impl GridState {
    pub fn new(columns: Vec<ColumnInfo>) -> Self {
        GridState {
            rows: Vec::new(),
            columns,
            groups: GroupManager::new(),
            expand: ExpandState::default(),
            sort: SortState::new(),
            search_text: String::new(),
            options: FormatOptions::default(),
            generation: 0,
        }
    }

    pub fn with_options(mut self, options: FormatOptions) -> Self {
        self.options = options;
        self
    }

    // ========================================================================
    // ACCESSORS
    // ========================================================================

    pub fn groups(&self) -> &[GroupDefinition] {
        self.groups.groups()
    }

    pub fn columns(&self) -> &[ColumnInfo] {
        &self.columns
    }

    pub fn search_text(&self) -> &str {
        &self.search_text
    }

    pub fn sort(&self) -> &SortState {
        &self.sort
    }

    pub fn expand_level(&self) -> Option<u32> {
        self.expand.expand_level()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    // ========================================================================
    // ROW DELIVERY (generation-guarded)
    // ========================================================================

    /// Starts a data refresh and returns the generation the caller must
    /// hand back together with the fetched rows.
    pub fn begin_refresh(&mut self) -> u64 {
        self.generation += 1;
        self.generation
    }

    /// Installs a fetched row collection. A delivery for anything but the
    /// current generation is stale — it is dropped and `None` is returned,
    /// leaving the newer state untouched.
    pub fn supply_rows(&mut self, generation: u64, rows: RowSet) -> Option<GridView> {
        if generation != self.generation {
            log::debug!(
                "dropping stale row delivery (generation {}, current {})",
                generation,
                self.generation
            );
            return None;
        }
        self.rows = rows.into_rows();
        Some(self.calculate())
    }

    // ========================================================================
    // USER OPERATIONS
    // ========================================================================

    /// Appends a grouping level. A field that is already grouped is a
    /// silent no-op. When the new definition asks for auto-expand, the
    /// global expand level is raised to expose every level (a hard reset
    /// of the exception sets).
    pub fn add_group(&mut self, definition: GroupDefinition) -> GridView {
        let auto_expand = definition.auto_expand;
        if self.groups.add_group(definition) && auto_expand {
            self.expand.set_expand_level(Some(self.groups.len() as u32));
        }
        self.calculate()
    }

    pub fn move_group_up(&mut self, field: &str) -> GridView {
        self.groups.move_up(field);
        self.calculate()
    }

    pub fn move_group_down(&mut self, field: &str) -> GridView {
        self.groups.move_down(field);
        self.calculate()
    }

    pub fn remove_group(&mut self, field: &str) -> GridView {
        self.groups.remove_group(field);
        self.calculate()
    }

    /// Cycles the sort on a column: ascending, then descending, then back
    /// to the neutral identity order.
    pub fn set_sort(&mut self, field: &str) -> GridView {
        self.sort.cycle(field);
        self.calculate()
    }

    pub fn set_search_text(&mut self, text: &str) -> GridView {
        self.search_text = text.to_string();
        self.calculate()
    }

    pub fn toggle_expand(&mut self, key: &NodeKey) -> GridView {
        self.expand.toggle(key);
        self.calculate()
    }

    /// Sets the global expand level (`None` = expand all), clearing both
    /// exception sets.
    pub fn set_expand_level(&mut self, level: Option<u32>) -> GridView {
        self.expand.set_expand_level(level);
        self.calculate()
    }

    pub fn set_columns(&mut self, columns: Vec<ColumnInfo>) -> GridView {
        self.columns = columns;
        self.calculate()
    }

    // ========================================================================
    // PIPELINE
    // ========================================================================

    /// Runs the full pipeline over the current state and returns the
    /// render-ready view.
    pub fn calculate(&mut self) -> GridView {
        let started = Instant::now();

        let definitions = self.groups.groups();
        let mut tree = build_group_tree(&self.rows, definitions, &self.options);
        apply_sort(&mut tree, &self.rows, &self.sort, &self.columns);
        let flat = flatten(&tree);
        let visible = compute_visibility(
            &mut tree,
            &flat,
            &self.rows,
            &self.columns,
            &self.search_text,
            &self.expand,
        );
        calculate_aggregates(&mut tree, &self.rows, definitions);
        let footer = footer_aggregates(&self.rows, &visible.filtered_leaves, definitions);

        let mut view_rows = Vec::with_capacity(visible.rows.len());
        for render_row in &visible.rows {
            match render_row.kind {
                RenderRowKind::GroupHeader(node_id) => {
                    let node = tree.node(node_id);
                    view_rows.push(ViewRow::group(
                        node.level,
                        node.header.clone(),
                        node.key(),
                        node.is_expanded,
                        node.number_of_items,
                        node.aggregate_values.clone(),
                    ));
                }
                RenderRowKind::Leaf(row_id) => {
                    view_rows.push(ViewRow::leaf(
                        render_row.level,
                        self.rows[row_id].key().to_string(),
                    ));
                }
            }
        }

        log::debug!(
            "grid pipeline: {} rows, {} groups, {} visible in {:?}",
            self.rows.len(),
            tree.nodes.len(),
            view_rows.len(),
            started.elapsed()
        );

        GridView {
            generation: self.generation,
            rows: view_rows,
            footer_aggregates: footer,
            number_of_items: visible.number_of_items,
            number_of_unfiltered_items: visible.number_of_unfiltered_items,
        }
    }
}
