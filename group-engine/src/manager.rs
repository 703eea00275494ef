//! FILENAME: group-engine/src/manager.rs
//! Group Definition Store and Expand State.
//!
//! The `GroupManager` is the ordered, mutable list of active grouping
//! levels; the `ExpandState` is the user's expand/collapse intent. Both
//! persist across pipeline runs while everything downstream (trees,
//! render rows, aggregates) is rebuilt from scratch on every interaction.

use serde::{Deserialize, Serialize};

use rustc_hash::FxHashSet;

use crate::definition::GroupDefinition;

// ============================================================================
// GROUP MANAGER
// ============================================================================

/// Ordered store of the active group definitions. Index 0 is the outermost
/// grouping level. Every successful mutation bumps `version` so downstream
/// consumers can cheaply detect staleness.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GroupManager {
    groups: Vec<GroupDefinition>,
    version: u64,
}

impl GroupManager {
    pub fn new() -> Self {
        GroupManager::default()
    }

    pub fn groups(&self) -> &[GroupDefinition] {
        &self.groups
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    fn position(&self, field: &str) -> Option<usize> {
        self.groups.iter().position(|g| g.field == field)
    }

    /// Appends a definition at the end (innermost level). A field that is
    /// already grouped is rejected as a silent no-op.
    pub fn add_group(&mut self, definition: GroupDefinition) -> bool {
        if self.position(&definition.field).is_some() {
            return false;
        }
        self.groups.push(definition);
        self.version += 1;
        true
    }

    /// Swaps the definition with its outer neighbour. No-op at the boundary.
    pub fn move_up(&mut self, field: &str) -> bool {
        match self.position(field) {
            Some(index) if index > 0 => {
                self.groups.swap(index, index - 1);
                self.version += 1;
                true
            }
            _ => false,
        }
    }

    /// Swaps the definition with its inner neighbour. No-op at the boundary.
    pub fn move_down(&mut self, field: &str) -> bool {
        match self.position(field) {
            Some(index) if index + 1 < self.groups.len() => {
                self.groups.swap(index, index + 1);
                self.version += 1;
                true
            }
            _ => false,
        }
    }

    /// Removes the definition grouping `field`.
    pub fn remove_group(&mut self, field: &str) -> bool {
        match self.position(field) {
            Some(index) => {
                self.groups.remove(index);
                self.version += 1;
                true
            }
            None => false,
        }
    }
}

// ============================================================================
// NODE IDENTITY
// ============================================================================

/// Identity of a group node that survives full rebuilds. Object references
/// never outlive a pipeline run, so nodes are matched by value: the full
/// ancestor header path, the nesting level, and the identity key of the
/// bucket's representative (first) row.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeKey {
    pub header_path: String,
    pub level: u32,
    pub leader_key: String,
}

impl NodeKey {
    pub fn new(header_path: impl Into<String>, level: u32, leader_key: impl Into<String>) -> Self {
        NodeKey {
            header_path: header_path.into(),
            level,
            leader_key: leader_key.into(),
        }
    }
}

// ============================================================================
// EXPAND STATE
// ============================================================================

/// Global expand level plus per-node exception sets.
///
/// `expand_level = None` means "expand all". A node identity never sits in
/// both exception sets: inserting into one removes it from the other.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpandState {
    expand_level: Option<u32>,
    expanded_exceptions: FxHashSet<NodeKey>,
    collapsed_exceptions: FxHashSet<NodeKey>,
}

impl Default for ExpandState {
    fn default() -> Self {
        ExpandState::new(None)
    }
}

impl ExpandState {
    pub fn new(expand_level: Option<u32>) -> Self {
        ExpandState {
            expand_level,
            expanded_exceptions: FxHashSet::default(),
            collapsed_exceptions: FxHashSet::default(),
        }
    }

    pub fn expand_level(&self) -> Option<u32> {
        self.expand_level
    }

    /// Resolves the effective expansion of a node: expand-all wins, then
    /// the exception sets, then the global level cutoff.
    pub fn is_expanded(&self, key: &NodeKey) -> bool {
        let level = match self.expand_level {
            None => return true,
            Some(level) => level,
        };
        if self.expanded_exceptions.contains(key) {
            return true;
        }
        if self.collapsed_exceptions.contains(key) {
            return false;
        }
        key.level < level
    }

    /// Flips the effective expansion of a node by recording it in the
    /// exception set that overrides its current state. Returns the new
    /// effective state.
    pub fn toggle(&mut self, key: &NodeKey) -> bool {
        let expanded = self.is_expanded(key);
        self.set_expanded(key.clone(), !expanded);
        self.is_expanded(key)
    }

    pub fn set_expanded(&mut self, key: NodeKey, expanded: bool) {
        if expanded {
            self.collapsed_exceptions.remove(&key);
            self.expanded_exceptions.insert(key);
        } else {
            self.expanded_exceptions.remove(&key);
            self.collapsed_exceptions.insert(key);
        }
    }

    /// Hard reset: installs a new global level and clears both exception
    /// sets. This is not a merge.
    pub fn set_expand_level(&mut self, expand_level: Option<u32>) {
        self.expand_level = expand_level;
        self.expanded_exceptions.clear();
        self.collapsed_exceptions.clear();
    }
}
