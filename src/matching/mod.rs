//! Column matching between two datasets.
//!
//! This module infers which column of dataset A corresponds to which column
//! of dataset B:
//!
//! - [`normalize_column_name`]: canonical form of a column label
//! - [`ColumnProfile`]: sampled content type and value patterns of a column
//! - [`SimilarityScore`]: name + content similarity of one column pair
//! - [`MappingEngine`]: builds the similarity matrix and resolves the mapping
//! - [`simple_column_mapping`]: name-only mapping used as a fallback
//!
//! ## Matching Algorithm
//!
//! 1. **Profiling**: every column is sampled once and classified as numeric,
//!    date or text, with detected value patterns
//! 2. **Scoring**: every (A, B) pair gets a name similarity (longest common
//!    subsequence over normalized labels, plus containment and keyword
//!    bonuses) and a content similarity (same type, shared patterns)
//! 3. **Resolution**: A columns with the strongest best match go first and
//!    each claims its best still-free B column above the threshold
//!
//! ## Example
//!
//! ```rust
//! use sheet_recon::{Dataset, MappingEngine};
//!
//! let a = Dataset::from_rows(vec!["Codigo Produto", "Nome"], vec![]).unwrap();
//! let b = Dataset::from_rows(vec!["cod_produto", "nome_prod"], vec![]).unwrap();
//!
//! let result = MappingEngine::new().analyze(&a, &b);
//! assert_eq!(result.mapping.target("Codigo Produto"), Some("cod_produto"));
//! assert_eq!(result.mapping.target("Nome"), Some("nome_prod"));
//! ```

pub mod engine;
pub mod mapping;
pub mod normalize;
pub mod profile;
pub mod scoring;
pub mod simple;

pub use engine::{MappedColumn, MappingEngine, MappingResult, SimilarityMatrix};
pub use mapping::{ColumnMapping, MappingError};
pub use normalize::normalize_column_name;
pub use profile::ColumnProfile;
pub use scoring::SimilarityScore;
pub use simple::simple_column_mapping;
