//! Core data types for tabular reconciliation.
//!
//! This module provides the fundamental types used throughout the library:
//!
//! - [`Value`]: A single scalar cell (text, number, date, or null)
//! - [`Dataset`]: An immutable table of equally long, uniquely named columns
//! - [`ContentType`], [`ValuePattern`]: Column classification types
//!
//! ## Immutability
//!
//! Datasets are created once by a loader and then only read. Filtering, row
//! selection and column selection all return new datasets:
//!
//! | Operation | Returns |
//! |-----------|---------|
//! | `take_rows` | rows picked by index |
//! | `head` / `tail` | first / last `n` rows |
//! | `select_columns` | named subset of columns |

pub mod dataset;
pub mod types;
pub mod value;

pub use dataset::{Column, Dataset, DatasetError};
pub use types::{ContentType, Side, ValuePattern};
pub use value::Value;
