//! Row filtering and column aggregation.
//!
//! - [`apply_filters`]: keeps the rows that satisfy every [`FilterSpec`]
//! - [`aggregate`]: sum, count, mean, min and max per column
//! - [`preview`]: column names, numeric columns and first rows
//!
//! Both are best-effort: a filter that cannot be evaluated is skipped and
//! reported, and a column whose totals cannot be computed gets a zeroed
//! record carrying the error.

pub mod aggregate;
pub mod filter;
pub mod preview;

pub use aggregate::{aggregate, AggregationError, ColumnTotals};
pub use filter::{
    apply_filters, apply_filters_with_report, FilterEvaluationError, FilterOperator, FilterReport,
    FilterSpec, SkippedFilter,
};
pub use preview::{preview, DatasetPreview};
