//! # sheet-recon
//!
//! A library for matching the schemas of two spreadsheets and reconciling
//! their rows.
//!
//! Exports from different systems rarely agree on column names: one says
//! `Codigo Produto`, the other `cod_produto`. Before two such tables can be
//! compared row by row, someone has to decide which columns correspond and
//! which of them identify a row.
//!
//! `sheet-recon` infers both from the data itself.
//!
//! ## Features
//!
//! - **Schema matching**: Pairs columns by name similarity and content profile
//! - **Key selection**: Rates mapped pairs on completeness, uniqueness and shape
//! - **Row reconciliation**: Reports rows present on only one side
//! - **Graceful fallback**: Whole-row and positional comparison when no key exists
//! - **Filters and totals**: Narrows datasets and sums mapped numeric columns
//! - **Spreadsheet input**: CSV, TSV, gzip-compressed text, XLSX/XLS/ODS
//!
//! ## Example
//!
//! ```rust
//! use sheet_recon::{compare, CompareRequest, Dataset, ReconConfig, Value};
//!
//! let erp = Dataset::from_rows(
//!     vec!["Codigo", "Valor"],
//!     vec![
//!         vec![Value::from(1), Value::from(10.0)],
//!         vec![Value::from(2), Value::from(20.0)],
//!         vec![Value::from(3), Value::from(30.0)],
//!     ],
//! )
//! .unwrap();
//! let store = Dataset::from_rows(
//!     vec!["codigo", "valor"],
//!     vec![
//!         vec![Value::from(1), Value::from(10.0)],
//!         vec![Value::from(2), Value::from(20.0)],
//!     ],
//! )
//! .unwrap();
//!
//! let result = compare(&erp, &store, &CompareRequest::default(), &ReconConfig::default()).unwrap();
//! assert_eq!(result.unique_rows.only_in_a.count, 1);
//! assert_eq!(result.unique_rows.only_in_b.count, 0);
//! ```
//!
//! ## Modules
//!
//! - [`core`]: Cell values, datasets and shared enums
//! - [`parsing`]: Loaders for delimited text and spreadsheets, filter files
//! - [`matching`]: Name normalization, profiling, similarity and mapping
//! - [`reconcile`]: Key selection, row reconciliation and composed comparison
//! - [`query`]: Row filters, column totals and previews
//! - [`config`]: Tunable heuristic constants
//! - [`cli`]: Command-line interface implementation

pub mod cli;
pub mod config;
pub mod core;
pub mod matching;
pub mod parsing;
pub mod query;
pub mod reconcile;
pub mod utils;

// Re-export commonly used types for convenience
pub use config::ReconConfig;
pub use core::dataset::{Column, Dataset};
pub use core::types::*;
pub use core::value::Value;
pub use matching::engine::{MappingEngine, MappingResult};
pub use matching::mapping::ColumnMapping;
pub use parsing::load_dataset;
pub use query::filter::{apply_filters, FilterOperator, FilterSpec};
pub use reconcile::compare::{compare, compare_files, CompareRequest, ComparisonResult};
pub use reconcile::rows::{reconcile, KeySource, ReconcileStrategy, Reconciliation};
