use std::collections::HashSet;

use serde::Serialize;
use tracing::{debug, warn};

use crate::core::dataset::Dataset;
use crate::core::value::Value;
use crate::matching::mapping::ColumnMapping;
use crate::matching::simple::simple_column_mapping;
use crate::reconcile::keys::{usable_pairs, SelectedKeySet};

/// Separator between key components
pub const KEY_DELIMITER: &str = "|";

/// Stand-in for a null key component
pub const NULL_SENTINEL: &str = "NULL";

/// Fewest mapped columns for a whole-row comparison
pub const MIN_WHOLE_ROW_COLUMNS: usize = 2;

/// Description used when trailing rows are reported by position
pub const POSITIONAL_DESCRIPTION: &str = "All columns (by position)";

/// Description used when the positional fallback finds nothing
pub const SAME_LENGTH_DESCRIPTION: &str = "No difference in row count";

/// What rows are matched on
#[derive(Debug, Clone, Copy)]
pub enum KeySource<'a> {
    /// Composite key over selected key fields
    Keys(&'a SelectedKeySet),

    /// Whole rows over every mapped column
    Mapping(&'a ColumnMapping),
}

/// How a reconciliation was actually performed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReconcileStrategy {
    /// Composite key over the selected key fields
    CompositeKey,
    /// Every mapped column forms the key
    WholeRow,
    /// Too few mapped columns: only the trailing rows of the longer side
    Positional,
}

impl std::fmt::Display for ReconcileStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CompositeKey => write!(f, "composite key"),
            Self::WholeRow => write!(f, "whole row"),
            Self::Positional => write!(f, "positional"),
        }
    }
}

/// Rows present on only one side
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reconciliation {
    pub unique_a: Dataset,
    pub unique_b: Dataset,
    pub strategy: ReconcileStrategy,

    /// Fields the rows were matched on, for display
    pub key_fields: Vec<String>,
}

impl Reconciliation {
    /// Human-readable summary of the fields used
    #[must_use]
    pub fn key_description(&self) -> String {
        self.key_fields.join(", ")
    }
}

/// Find rows present in one dataset but not the other.
///
/// Rows are matched by a string key built from paired columns, and the
/// result is an unordered set difference: duplicate keys on one side
/// collapse, and every original row whose key is unique is returned.
///
/// With no usable key fields the comparison falls back to whole rows over
/// a name-based mapping, and with fewer than two mapped columns to a
/// positional comparison that reports the trailing rows of the longer
/// dataset.
#[must_use]
pub fn reconcile(dataset_a: &Dataset, dataset_b: &Dataset, source: KeySource<'_>) -> Reconciliation {
    match source {
        KeySource::Keys(keys) => {
            let pairs = usable_pairs(keys, dataset_a, dataset_b);
            if pairs.len() < keys.len() {
                warn!(
                    "{} key field(s) missing from the data were ignored",
                    keys.len() - pairs.len()
                );
            }
            if pairs.is_empty() {
                warn!("No usable key fields, falling back to name-based comparison");
                return reconcile_by_names(dataset_a, dataset_b);
            }

            let (unique_a, unique_b) = diff_by_key(dataset_a, dataset_b, &pairs);
            let key_fields = keys
                .fields
                .iter()
                .filter(|f| pairs.contains(&(f.column_a.as_str(), f.column_b.as_str())))
                .map(|f| f.description())
                .collect();

            Reconciliation {
                unique_a,
                unique_b,
                strategy: ReconcileStrategy::CompositeKey,
                key_fields,
            }
        }
        KeySource::Mapping(mapping) => reconcile_whole_rows(dataset_a, dataset_b, mapping),
    }
}

/// Whole-row comparison over a name-only mapping, or positional
fn reconcile_by_names(dataset_a: &Dataset, dataset_b: &Dataset) -> Reconciliation {
    let mapping = simple_column_mapping(&dataset_a.column_names(), &dataset_b.column_names());
    debug!("Name-based mapping found {} column(s)", mapping.len());
    reconcile_whole_rows(dataset_a, dataset_b, &mapping)
}

fn reconcile_whole_rows(
    dataset_a: &Dataset,
    dataset_b: &Dataset,
    mapping: &ColumnMapping,
) -> Reconciliation {
    let pairs: Vec<(&str, &str)> = mapping
        .iter()
        .filter(|(a, b)| dataset_a.has_column(a) && dataset_b.has_column(b))
        .collect();

    if pairs.len() < MIN_WHOLE_ROW_COLUMNS {
        warn!(
            "Only {} mapped column(s), falling back to positional comparison",
            pairs.len()
        );
        return reconcile_positional(dataset_a, dataset_b);
    }

    let (unique_a, unique_b) = diff_by_key(dataset_a, dataset_b, &pairs);
    Reconciliation {
        unique_a,
        unique_b,
        strategy: ReconcileStrategy::WholeRow,
        key_fields: pairs.iter().map(|(a, _)| (*a).to_string()).collect(),
    }
}

/// Extra trailing rows of the longer dataset are reported as unique
fn reconcile_positional(dataset_a: &Dataset, dataset_b: &Dataset) -> Reconciliation {
    let rows_a = dataset_a.row_count();
    let rows_b = dataset_b.row_count();

    let (unique_a, unique_b) = if rows_a > rows_b {
        (dataset_a.tail(rows_a - rows_b), dataset_b.empty_like())
    } else {
        (dataset_a.empty_like(), dataset_b.tail(rows_b - rows_a))
    };

    let description = if rows_a == rows_b {
        SAME_LENGTH_DESCRIPTION
    } else {
        POSITIONAL_DESCRIPTION
    };

    Reconciliation {
        unique_a,
        unique_b,
        strategy: ReconcileStrategy::Positional,
        key_fields: vec![description.to_string()],
    }
}

fn diff_by_key(dataset_a: &Dataset, dataset_b: &Dataset, pairs: &[(&str, &str)]) -> (Dataset, Dataset) {
    let columns_a: Vec<&str> = pairs.iter().map(|(a, _)| *a).collect();
    let columns_b: Vec<&str> = pairs.iter().map(|(_, b)| *b).collect();

    let keys_a = composite_keys(dataset_a, &columns_a);
    let keys_b = composite_keys(dataset_b, &columns_b);

    let set_a: HashSet<&str> = keys_a.iter().map(String::as_str).collect();
    let set_b: HashSet<&str> = keys_b.iter().map(String::as_str).collect();

    let only_a: Vec<usize> = (0..keys_a.len())
        .filter(|&i| !set_b.contains(keys_a[i].as_str()))
        .collect();
    let only_b: Vec<usize> = (0..keys_b.len())
        .filter(|&i| !set_a.contains(keys_b[i].as_str()))
        .collect();

    debug!(
        "Keys built: {} in A, {} in B; unique rows: {} in A, {} in B",
        keys_a.len(),
        keys_b.len(),
        only_a.len(),
        only_b.len()
    );

    (dataset_a.take_rows(&only_a), dataset_b.take_rows(&only_b))
}

/// One key string per row: the cells of `columns` joined by
/// [`KEY_DELIMITER`], nulls written as [`NULL_SENTINEL`]
#[must_use]
pub fn composite_keys(dataset: &Dataset, columns: &[&str]) -> Vec<String> {
    let cols: Vec<_> = columns.iter().filter_map(|c| dataset.column(c)).collect();

    (0..dataset.row_count())
        .map(|i| {
            cols.iter()
                .map(|c| key_component(&c.values[i]))
                .collect::<Vec<_>>()
                .join(KEY_DELIMITER)
        })
        .collect()
}

fn key_component(value: &Value) -> String {
    if value.is_null() {
        NULL_SENTINEL.to_string()
    } else {
        value.to_string()
    }
}
