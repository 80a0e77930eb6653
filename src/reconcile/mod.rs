//! Row reconciliation between two datasets.
//!
//! - [`select_keys`]: rates mapped column pairs as keys and picks a
//!   composite key
//! - [`reconcile`]: rows present on only one side, by composite key, whole
//!   row, or position
//! - [`cell_differences`]: positional cell diff for datasets with the same
//!   columns
//! - [`compare`]: filter, map, reconcile and total in one call
//!
//! ## Fallbacks
//!
//! | Situation | Strategy |
//! |-----------|----------|
//! | key fields selected | composite key over the key fields |
//! | no usable key fields, at least two columns matched by name | whole row |
//! | fewer than two matched columns | trailing rows of the longer side |

pub mod compare;
pub mod diff;
pub mod keys;
pub mod rows;

pub use compare::{compare, compare_files, CompareError, CompareRequest, ComparisonResult};
pub use diff::{cell_differences, CellDiffReport, CellDifference};
pub use keys::{select_keys, ColumnKeyScore, KeyFieldScore, SelectedKeySet};
pub use rows::{reconcile, KeySource, ReconcileStrategy, Reconciliation};
