//! Tunable heuristic constants.
//!
//! Every threshold and point weight used by profiling, similarity scoring,
//! mapping and key selection lives here so it can be adjusted without code
//! changes. All sections default to the values the engine was tuned with;
//! a JSON file only needs to name the fields it overrides.
//!
//! ```json
//! {
//!   "mapping": { "min_similarity": 0.4 },
//!   "key_selection": { "min_fields": 1, "max_fields": 4 }
//! }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("Invalid config value for '{field}': {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Default number of non-null values sampled per column
pub const DEFAULT_SAMPLE_SIZE: usize = 100;

/// Default minimum combined similarity for a column pair to be mapped
pub const DEFAULT_MIN_SIMILARITY: f64 = 0.3;

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconConfig {
    pub profile: ProfileConfig,
    pub similarity: SimilarityConfig,
    pub mapping: MappingConfig,
    pub key_scoring: KeyScoringConfig,
    pub key_selection: KeySelectionConfig,
    pub output: OutputConfig,
}

impl ReconConfig {
    /// Load and validate a JSON config file
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ReadError` if the file cannot be read,
    /// `ConfigError::ParseError` if it is not valid JSON, or
    /// `ConfigError::Invalid` if a value is out of range.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Parse and validate JSON config text
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ParseError` or `ConfigError::Invalid`.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Check cross-field consistency
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_unit("profile.numeric_ratio_threshold", self.profile.numeric_ratio_threshold)?;
        check_unit("profile.date_ratio_threshold", self.profile.date_ratio_threshold)?;
        check_unit("mapping.min_similarity", self.mapping.min_similarity)?;
        check_unit(
            "key_scoring.spread_max_share",
            self.key_scoring.spread_max_share,
        )?;
        check_unit(
            "key_scoring.moderate_max_share",
            self.key_scoring.moderate_max_share,
        )?;

        if self.profile.sample_size == 0 {
            return Err(ConfigError::Invalid {
                field: "profile.sample_size",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.key_selection.min_fields == 0 {
            return Err(ConfigError::Invalid {
                field: "key_selection.min_fields",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.key_selection.min_fields > self.key_selection.max_fields {
            return Err(ConfigError::Invalid {
                field: "key_selection.min_fields",
                reason: format!(
                    "{} exceeds max_fields {}",
                    self.key_selection.min_fields, self.key_selection.max_fields
                ),
            });
        }
        if !(0.0..=100.0).contains(&self.key_selection.min_score) {
            return Err(ConfigError::Invalid {
                field: "key_selection.min_score",
                reason: format!("{} is outside 0..=100", self.key_selection.min_score),
            });
        }
        if self.similarity.name_weight < 0.0 || self.similarity.content_weight < 0.0 {
            return Err(ConfigError::Invalid {
                field: "similarity.name_weight",
                reason: "weights must not be negative".to_string(),
            });
        }
        Ok(())
    }
}

fn check_unit(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field,
            reason: format!("{value} is outside 0..=1"),
        })
    }
}

/// Content profiling parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileConfig {
    /// Non-null values sampled per column
    pub sample_size: usize,
    /// Values kept on the profile for display
    pub display_sample_size: usize,
    /// Numeric share above which a column is `numeric`
    pub numeric_ratio_threshold: f64,
    /// Date share above which a column is `date`
    pub date_ratio_threshold: f64,
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            sample_size: DEFAULT_SAMPLE_SIZE,
            display_sample_size: 10,
            numeric_ratio_threshold: 0.7,
            date_ratio_threshold: 0.7,
        }
    }
}

/// Column-pair similarity weights and bonuses
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimilarityConfig {
    /// Weight of name similarity in the combined score
    pub name_weight: f64,
    /// Weight of content similarity in the combined score
    pub content_weight: f64,
    /// Added when one normalized name contains the other
    pub containment_bonus: f64,
    /// Added once when both normalized names share a keyword
    pub keyword_bonus: f64,
    /// Content similarity for two profiles of the same informative type
    pub same_type_bonus: f64,
    /// Extra content similarity when pattern sets intersect
    pub pattern_bonus: f64,
    /// Domain keywords checked in order; the first shared one wins
    pub keywords: Vec<String>,
}

impl Default for SimilarityConfig {
    fn default() -> Self {
        Self {
            name_weight: 0.7,
            content_weight: 0.3,
            containment_bonus: 0.2,
            keyword_bonus: 0.1,
            same_type_bonus: 0.3,
            pattern_bonus: 0.2,
            keywords: [
                "cod",
                "codigo",
                "id",
                "num",
                "numero",
                "nome",
                "descr",
                "descricao",
                "valor",
                "preco",
                "qtd",
                "quantidade",
                "data",
                "loja",
                "produto",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
        }
    }
}

/// Mapping resolver parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MappingConfig {
    /// Minimum combined similarity for a pair to be assigned
    pub min_similarity: f64,
}

impl Default for MappingConfig {
    fn default() -> Self {
        Self {
            min_similarity: DEFAULT_MIN_SIMILARITY,
        }
    }
}

/// Point weights for rating a column as a reconciliation key
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyScoringConfig {
    /// Points for a fully populated column
    pub completeness_points: f64,
    /// Points for a column with no repeated values
    pub uniqueness_points: f64,
    /// Name contains an identifier keyword
    pub identifier_name_points: f64,
    /// Name contains a numbering keyword
    pub numbering_name_points: f64,
    /// Values are numeric (when no name keyword matched)
    pub numeric_type_points: f64,
    /// Numeric values are assumed consistently formatted
    pub numeric_consistency_points: f64,
    /// Text values with low length variance
    pub length_consistency_points: f64,
    /// Sample variance of text lengths must stay below this
    pub length_variance_threshold: f64,
    /// No single value above `spread_max_share`
    pub spread_distribution_points: f64,
    /// No single value above `moderate_max_share`
    pub moderate_distribution_points: f64,
    pub spread_max_share: f64,
    pub moderate_max_share: f64,
    pub identifier_keywords: Vec<String>,
    pub numbering_keywords: Vec<String>,
}

impl Default for KeyScoringConfig {
    fn default() -> Self {
        Self {
            completeness_points: 25.0,
            uniqueness_points: 30.0,
            identifier_name_points: 20.0,
            numbering_name_points: 15.0,
            numeric_type_points: 10.0,
            numeric_consistency_points: 15.0,
            length_consistency_points: 10.0,
            length_variance_threshold: 10.0,
            spread_distribution_points: 10.0,
            moderate_distribution_points: 5.0,
            spread_max_share: 0.1,
            moderate_max_share: 0.3,
            identifier_keywords: ["id", "cod", "codigo", "key", "chave"]
                .into_iter()
                .map(String::from)
                .collect(),
            numbering_keywords: ["num", "numero", "nf", "serie"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

/// Composite key selection bounds
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KeySelectionConfig {
    pub min_fields: usize,
    pub max_fields: usize,
    /// Pairs scoring below this are dropped unless needed to reach `min_fields`
    pub min_score: f64,
}

impl Default for KeySelectionConfig {
    fn default() -> Self {
        Self {
            min_fields: 2,
            max_fields: 6,
            min_score: 40.0,
        }
    }
}

/// Limits on how much detail results carry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Rows kept in each unique-rows sample
    pub sample_rows: usize,
    /// Cell differences kept in a comparison
    pub max_cell_differences: usize,
    /// Rows shown by previews
    pub preview_rows: usize,
    /// Columns shown by filter previews
    pub preview_columns: usize,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            sample_rows: 10,
            max_cell_differences: 100,
            preview_rows: 5,
            preview_columns: 6,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(ReconConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config =
            ReconConfig::from_json(r#"{"mapping": {"min_similarity": 0.5}}"#).unwrap();
        assert!((config.mapping.min_similarity - 0.5).abs() < f64::EPSILON);
        assert_eq!(config.key_selection.max_fields, 6);
        assert_eq!(config.profile.sample_size, 100);
        assert!(config.similarity.keywords.iter().any(|k| k == "produto"));
    }

    #[test]
    fn test_min_fields_above_max_rejected() {
        let err = ReconConfig::from_json(r#"{"key_selection": {"min_fields": 7}}"#).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "key_selection.min_fields",
                ..
            }
        ));
    }

    #[test]
    fn test_threshold_out_of_range_rejected() {
        let err = ReconConfig::from_json(r#"{"mapping": {"min_similarity": 1.5}}"#).unwrap_err();
        assert!(err.to_string().contains("mapping.min_similarity"));
    }

    #[test]
    fn test_malformed_json_rejected() {
        assert!(matches!(
            ReconConfig::from_json("{not json"),
            Err(ConfigError::ParseError(_))
        ));
    }
}
