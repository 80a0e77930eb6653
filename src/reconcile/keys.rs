use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use serde::Serialize;
use tracing::debug;

use crate::config::{KeyScoringConfig, KeySelectionConfig};
use crate::core::dataset::Dataset;
use crate::core::value::Value;
use crate::matching::mapping::ColumnMapping;
use crate::utils::validation::{count_to_f64, ratio};

/// Suitability of a single column as a reconciliation key, 0 to 100
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnKeyScore {
    pub column: String,

    /// Share of non-null rows, weighted
    pub completeness: f64,

    /// Share of distinct values among non-null rows, weighted
    pub uniqueness: f64,

    /// Identifier-like or numbering-like name, or numeric values
    pub type_bonus: f64,

    /// Numeric values, or text of near-constant length
    pub consistency_bonus: f64,

    /// No single value dominates the column
    pub distribution_bonus: f64,

    /// Sum of the components, clamped to [0, 100]
    pub total: f64,
}

impl ColumnKeyScore {
    fn zero(column: &str) -> Self {
        Self {
            column: column.to_string(),
            completeness: 0.0,
            uniqueness: 0.0,
            type_bonus: 0.0,
            consistency_bonus: 0.0,
            distribution_bonus: 0.0,
            total: 0.0,
        }
    }

    /// Rate `column` of `dataset` as a key.
    ///
    /// A missing column, an empty dataset or an all-null column scores 0.
    #[must_use]
    pub fn calculate(dataset: &Dataset, column: &str, config: &KeyScoringConfig) -> Self {
        let Some(col) = dataset.column(column) else {
            return Self::zero(column);
        };
        let values: Vec<&Value> = col.non_null().collect();
        if dataset.is_empty() || values.is_empty() {
            return Self::zero(column);
        }

        let non_null = values.len();
        let is_numeric = col.is_numeric();

        let completeness = ratio(non_null, dataset.row_count()) * config.completeness_points;

        let mut counts: HashMap<&Value, usize> = HashMap::new();
        for value in &values {
            *counts.entry(*value).or_insert(0) += 1;
        }
        let uniqueness = ratio(counts.len(), non_null) * config.uniqueness_points;

        let name = column.to_lowercase();
        let contains_any =
            |keywords: &[String]| keywords.iter().any(|k| name.contains(k.as_str()));
        let type_bonus = if contains_any(config.identifier_keywords.as_slice()) {
            config.identifier_name_points
        } else if contains_any(config.numbering_keywords.as_slice()) {
            config.numbering_name_points
        } else if is_numeric {
            config.numeric_type_points
        } else {
            0.0
        };

        let consistency_bonus = if is_numeric {
            config.numeric_consistency_points
        } else {
            match length_variance(&values) {
                Some(variance) if variance < config.length_variance_threshold => {
                    config.length_consistency_points
                }
                _ => 0.0,
            }
        };

        let max_share = ratio(counts.values().copied().max().unwrap_or(0), non_null);
        let distribution_bonus = if max_share < config.spread_max_share {
            config.spread_distribution_points
        } else if max_share < config.moderate_max_share {
            config.moderate_distribution_points
        } else {
            0.0
        };

        let total = (completeness + uniqueness + type_bonus + consistency_bonus + distribution_bonus)
            .clamp(0.0, 100.0);

        Self {
            column: column.to_string(),
            completeness,
            uniqueness,
            type_bonus,
            consistency_bonus,
            distribution_bonus,
            total,
        }
    }
}

/// Sample variance of the values' text lengths; `None` below two values
fn length_variance(values: &[&Value]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let lengths: Vec<f64> = values
        .iter()
        .map(|v| count_to_f64(v.to_string().chars().count()))
        .collect();
    let n = count_to_f64(lengths.len());
    let mean = lengths.iter().sum::<f64>() / n;
    let squares: f64 = lengths.iter().map(|l| (l - mean).powi(2)).sum();
    Some(squares / (n - 1.0))
}

/// Key suitability of one mapped column pair
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeyFieldScore {
    pub column_a: String,
    pub column_b: String,
    pub score_a: ColumnKeyScore,
    pub score_b: ColumnKeyScore,

    /// Mean of the two column scores
    pub combined: f64,
}

impl KeyFieldScore {
    #[must_use]
    pub fn calculate(
        dataset_a: &Dataset,
        column_a: &str,
        dataset_b: &Dataset,
        column_b: &str,
        config: &KeyScoringConfig,
    ) -> Self {
        let score_a = ColumnKeyScore::calculate(dataset_a, column_a, config);
        let score_b = ColumnKeyScore::calculate(dataset_b, column_b, config);
        let combined = (score_a.total + score_b.total) / 2.0;

        Self {
            column_a: column_a.to_string(),
            column_b: column_b.to_string(),
            score_a,
            score_b,
            combined,
        }
    }

    /// e.g. `id ↔ codigo (score: 85.0)`
    #[must_use]
    pub fn description(&self) -> String {
        format!(
            "{} ↔ {} (score: {:.1})",
            self.column_a, self.column_b, self.combined
        )
    }
}

/// The composite key chosen for reconciliation
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SelectedKeySet {
    /// Selected pairs, highest score first
    pub fields: Vec<KeyFieldScore>,

    /// Every scored pair, highest score first
    pub candidates: Vec<KeyFieldScore>,

    /// True when pairs under the minimum score were added back
    pub relaxed: bool,
}

impl SelectedKeySet {
    /// Key set built directly from column pairs, without scoring
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let fields = pairs
            .into_iter()
            .map(|(a, b)| KeyFieldScore {
                column_a: a.to_string(),
                column_b: b.to_string(),
                score_a: ColumnKeyScore::zero(a),
                score_b: ColumnKeyScore::zero(b),
                combined: 0.0,
            })
            .collect();
        Self {
            fields,
            candidates: Vec::new(),
            relaxed: false,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    #[must_use]
    pub fn columns_a(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.column_a.as_str()).collect()
    }

    #[must_use]
    pub fn columns_b(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.column_b.as_str()).collect()
    }

    #[must_use]
    pub fn descriptions(&self) -> Vec<String> {
        self.fields.iter().map(KeyFieldScore::description).collect()
    }
}

/// Score every mapped pair, in mapping order
#[must_use]
pub fn score_key_fields(
    mapping: &ColumnMapping,
    dataset_a: &Dataset,
    dataset_b: &Dataset,
    config: &KeyScoringConfig,
) -> Vec<KeyFieldScore> {
    mapping
        .iter()
        .map(|(a, b)| {
            let score = KeyFieldScore::calculate(dataset_a, a, dataset_b, b, config);
            debug!(
                "Key field {} <-> {}: score {:.1} (A: {:.1}, B: {:.1})",
                a, b, score.combined, score.score_a.total, score.score_b.total
            );
            score
        })
        .collect()
}

/// Choose the composite key from a column mapping.
///
/// Pairs are ranked by combined score (ties keep mapping order), capped at
/// `max_fields`, and those under `min_score` are dropped. When fewer than
/// `min_fields` remain, the next best ranked pairs are added back. The
/// selection is empty only for an empty mapping.
#[must_use]
pub fn select_keys(
    mapping: &ColumnMapping,
    dataset_a: &Dataset,
    dataset_b: &Dataset,
    scoring: &KeyScoringConfig,
    selection: &KeySelectionConfig,
) -> SelectedKeySet {
    let mut ranked = score_key_fields(mapping, dataset_a, dataset_b, scoring);
    ranked.sort_by(|x, y| {
        y.combined
            .partial_cmp(&x.combined)
            .unwrap_or(Ordering::Equal)
    });

    let mut fields: Vec<KeyFieldScore> = ranked
        .iter()
        .take(selection.max_fields)
        .filter(|f| f.combined >= selection.min_score)
        .cloned()
        .collect();

    let mut relaxed = false;
    if fields.len() < selection.min_fields {
        // Ranked order means the kept pairs form a prefix of `ranked`
        let end = selection.min_fields.min(ranked.len());
        let start = fields.len().min(end);
        relaxed = start < end;
        fields.extend(ranked[start..end].iter().cloned());
    }

    debug!("Selected {} key field(s)", fields.len());
    for (i, field) in fields.iter().enumerate() {
        debug!("{}. {}", i + 1, field.description());
    }

    SelectedKeySet {
        fields,
        candidates: ranked,
        relaxed,
    }
}

/// Distinct key pairs whose columns exist on both sides
pub(crate) fn usable_pairs<'k>(
    keys: &'k SelectedKeySet,
    dataset_a: &Dataset,
    dataset_b: &Dataset,
) -> Vec<(&'k str, &'k str)> {
    let mut seen = HashSet::new();
    keys.fields
        .iter()
        .filter(|f| dataset_a.has_column(&f.column_a) && dataset_b.has_column(&f.column_b))
        .filter(|f| seen.insert((f.column_a.as_str(), f.column_b.as_str())))
        .map(|f| (f.column_a.as_str(), f.column_b.as_str()))
        .collect()
}
