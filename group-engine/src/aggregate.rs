//! FILENAME: group-engine/src/aggregate.rs
//! Aggregator - sum/average/min/max over filtered row collections.
//!
//! Per-group aggregates run over each node's post-filter row collection,
//! never the raw subtree; footer aggregates run over the full filtered
//! leaf set. Everything is recomputed on every pipeline run, so stale
//! values cannot survive a change to filtering, grouping, or the data.

use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

use grid_engine::Row;

use crate::definition::{AggregateFunction, GroupDefinition};
use crate::tree::{GroupTree, RowId};

// ============================================================================
// AGGREGATE VALUES
// ============================================================================

/// One computed aggregate or a nested branch of them.
/// An undefined aggregate (empty average/min/max input) is `Value(None)`
/// and serializes as `null` — there is no NaN sentinel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AggregateEntry {
    Value(Option<f64>),
    Nested(AggregateValues),
}

/// Aggregate results keyed by target field path. Dotted target paths
/// attach their value at a nested location, so display layers can bind
/// a whole subtree of totals at once.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AggregateValues {
    entries: FxHashMap<String, AggregateEntry>,
}

impl AggregateValues {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Writes a value at a dotted path, creating nested branches as needed.
    pub fn set_path(&mut self, path: &str, value: Option<f64>) {
        match path.split_once('.') {
            None => {
                self.entries
                    .insert(path.to_string(), AggregateEntry::Value(value));
            }
            Some((head, rest)) => {
                let entry = self
                    .entries
                    .entry(head.to_string())
                    .or_insert_with(|| AggregateEntry::Nested(AggregateValues::default()));
                if let AggregateEntry::Nested(nested) = entry {
                    nested.set_path(rest, value);
                } else {
                    let mut nested = AggregateValues::default();
                    nested.set_path(rest, value);
                    *entry = AggregateEntry::Nested(nested);
                }
            }
        }
    }

    /// Reads the value at a dotted path. `None` when the path is absent or
    /// the aggregate is undefined.
    pub fn value(&self, path: &str) -> Option<f64> {
        match path.split_once('.') {
            None => match self.entries.get(path) {
                Some(AggregateEntry::Value(v)) => *v,
                _ => None,
            },
            Some((head, rest)) => match self.entries.get(head) {
                Some(AggregateEntry::Nested(nested)) => nested.value(rest),
                _ => None,
            },
        }
    }
}

// ============================================================================
// ACCUMULATOR
// ============================================================================

/// Single-pass accumulator for all supported functions.
#[derive(Debug, Clone, Default)]
struct AggregateAccumulator {
    sum: f64,
    count: u64,
    min: Option<f64>,
    max: Option<f64>,
}

impl AggregateAccumulator {
    fn add(&mut self, value: f64) {
        self.sum += value;
        self.count += 1;
        self.min = Some(self.min.map_or(value, |m| m.min(value)));
        self.max = Some(self.max.map_or(value, |m| m.max(value)));
    }

    fn compute(&self, function: AggregateFunction) -> Option<f64> {
        match function {
            AggregateFunction::Sum => Some(self.sum),
            AggregateFunction::Average => {
                if self.count > 0 {
                    Some(self.sum / self.count as f64)
                } else {
                    None
                }
            }
            AggregateFunction::Min => self.min,
            AggregateFunction::Max => self.max,
        }
    }
}

// ============================================================================
// AGGREGATION
// ============================================================================

/// Computes one aggregate over the given rows. Values that do not coerce
/// to a number are skipped; an empty input yields 0 for `Sum` and
/// undefined for the rest.
pub fn aggregate(
    rows: &[Row],
    ids: &[RowId],
    source_field: &str,
    function: AggregateFunction,
) -> Option<f64> {
    let mut accumulator = AggregateAccumulator::default();
    for &id in ids {
        if let Some(value) = rows[id].value(source_field).as_decimal() {
            accumulator.add(value);
        }
    }
    accumulator.compute(function)
}

/// Fills every node's `aggregate_values` from its filtered row collection,
/// applying the specs configured on the definition at the node's level.
pub fn calculate_aggregates(tree: &mut GroupTree, rows: &[Row], definitions: &[GroupDefinition]) {
    for node in &mut tree.nodes {
        let mut values = AggregateValues::default();
        if let Some(definition) = definitions.get(node.level) {
            for spec in &definition.aggregates {
                values.set_path(
                    &spec.target_field,
                    aggregate(rows, &node.filtered_rows, &spec.source_field, spec.function),
                );
            }
        }
        node.aggregate_values = values;
    }
}

/// Footer aggregates over the full filtered leaf set, for the union of all
/// configured specs (the first spec registered per target path wins).
pub fn footer_aggregates(
    rows: &[Row],
    filtered: &[RowId],
    definitions: &[GroupDefinition],
) -> AggregateValues {
    let mut values = AggregateValues::default();
    let mut seen: FxHashSet<&str> = FxHashSet::default();

    for definition in definitions {
        for spec in &definition.aggregates {
            if seen.insert(spec.target_field.as_str()) {
                values.set_path(
                    &spec.target_field,
                    aggregate(rows, filtered, &spec.source_field, spec.function),
                );
            }
        }
    }
    values
}

#[cfg(test)]
mod tests {
    use super::*;
    use grid_engine::FieldValue;

    fn amount_rows() -> Vec<Row> {
        vec![
            Row::new("r1").with("amount", FieldValue::Number(10.0)),
            Row::new("r2").with("amount", FieldValue::Number(20.0)),
            Row::new("r3").with("amount", FieldValue::text("not numeric")),
        ]
    }

    #[test]
    fn test_sum_skips_non_numeric() {
        let rows = amount_rows();
        let ids = vec![0, 1, 2];
        assert_eq!(
            aggregate(&rows, &ids, "amount", AggregateFunction::Sum),
            Some(30.0)
        );
    }

    #[test]
    fn test_average_min_max() {
        let rows = amount_rows();
        let ids = vec![0, 1];
        assert_eq!(
            aggregate(&rows, &ids, "amount", AggregateFunction::Average),
            Some(15.0)
        );
        assert_eq!(
            aggregate(&rows, &ids, "amount", AggregateFunction::Min),
            Some(10.0)
        );
        assert_eq!(
            aggregate(&rows, &ids, "amount", AggregateFunction::Max),
            Some(20.0)
        );
    }

    #[test]
    fn test_empty_input() {
        let rows = amount_rows();
        assert_eq!(aggregate(&rows, &[], "amount", AggregateFunction::Sum), Some(0.0));
        assert_eq!(aggregate(&rows, &[], "amount", AggregateFunction::Average), None);
        assert_eq!(aggregate(&rows, &[], "amount", AggregateFunction::Min), None);
        assert_eq!(aggregate(&rows, &[], "amount", AggregateFunction::Max), None);
    }

    #[test]
    fn test_missing_field_aggregates_as_empty() {
        let rows = amount_rows();
        let ids = vec![0, 1, 2];
        assert_eq!(
            aggregate(&rows, &ids, "no_such_field", AggregateFunction::Sum),
            Some(0.0)
        );
        assert_eq!(
            aggregate(&rows, &ids, "no_such_field", AggregateFunction::Max),
            None
        );
    }

    #[test]
    fn test_dotted_target_path_nests() {
        let mut values = AggregateValues::default();
        values.set_path("totals.amount", Some(42.0));
        values.set_path("totals.count", Some(3.0));
        values.set_path("flat", None);

        assert_eq!(values.value("totals.amount"), Some(42.0));
        assert_eq!(values.value("totals.count"), Some(3.0));
        assert_eq!(values.value("flat"), None);
        assert_eq!(values.value("totals.missing"), None);
    }

    #[test]
    fn test_undefined_serializes_as_null() {
        let mut values = AggregateValues::default();
        values.set_path("avg", None);
        let json = serde_json::to_string(&values).unwrap();
        assert!(json.contains("null"));
    }
}
