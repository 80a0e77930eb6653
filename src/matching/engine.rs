use std::cmp::Ordering;

use serde::Serialize;
use tracing::debug;

use crate::config::{ProfileConfig, ReconConfig, SimilarityConfig, DEFAULT_MIN_SIMILARITY};
use crate::core::dataset::Dataset;
use crate::matching::mapping::ColumnMapping;
use crate::matching::profile::ColumnProfile;
use crate::matching::scoring::SimilarityScore;

/// Full |A|×|B| table of pairwise scores, rows in A order, columns in B order
#[derive(Debug, Clone, Default, Serialize)]
pub struct SimilarityMatrix {
    pub columns_a: Vec<String>,
    pub columns_b: Vec<String>,
    pub scores: Vec<Vec<SimilarityScore>>,
}

impl SimilarityMatrix {
    #[must_use]
    pub fn get(&self, a: usize, b: usize) -> Option<&SimilarityScore> {
        self.scores.get(a).and_then(|row| row.get(b))
    }

    /// Score for a pair of column names
    #[must_use]
    pub fn lookup(&self, column_a: &str, column_b: &str) -> Option<&SimilarityScore> {
        let a = self.columns_a.iter().position(|c| c == column_a)?;
        let b = self.columns_b.iter().position(|c| c == column_b)?;
        self.get(a, b)
    }
}

/// One accepted column pair, in the order the resolver committed it
#[derive(Debug, Clone, Serialize)]
pub struct MappedColumn {
    pub column_a: String,
    pub column_b: String,
    pub score: SimilarityScore,
}

/// Outcome of inferring a column mapping between two datasets
#[derive(Debug, Clone, Serialize)]
pub struct MappingResult {
    /// The one-to-one mapping
    pub mapping: ColumnMapping,

    /// Accepted pairs with their scores
    pub assignments: Vec<MappedColumn>,

    /// A columns left without a partner, in A order
    pub unmapped_a: Vec<String>,

    /// B columns no A column claimed, in B order
    pub unmapped_b: Vec<String>,

    pub similarity_matrix: SimilarityMatrix,

    pub profiles_a: Vec<ColumnProfile>,
    pub profiles_b: Vec<ColumnProfile>,

    /// Acceptance threshold the mapping was resolved with
    pub threshold: f64,
}

/// Infers column correspondences from names and content
#[derive(Debug, Clone)]
pub struct MappingEngine {
    profile: ProfileConfig,
    similarity: SimilarityConfig,
    min_similarity: f64,
}

impl Default for MappingEngine {
    fn default() -> Self {
        Self {
            profile: ProfileConfig::default(),
            similarity: SimilarityConfig::default(),
            min_similarity: DEFAULT_MIN_SIMILARITY,
        }
    }
}

impl MappingEngine {
    /// Create a new mapping engine with default configuration
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new mapping engine with custom configuration
    #[must_use]
    pub fn with_config(config: &ReconConfig) -> Self {
        Self {
            profile: config.profile.clone(),
            similarity: config.similarity.clone(),
            min_similarity: config.mapping.min_similarity,
        }
    }

    /// Override the acceptance threshold
    #[must_use]
    pub fn with_threshold(mut self, min_similarity: f64) -> Self {
        self.min_similarity = min_similarity;
        self
    }

    /// Profile both datasets, score every column pair and resolve a
    /// one-to-one mapping greedily.
    #[must_use]
    pub fn analyze(&self, dataset_a: &Dataset, dataset_b: &Dataset) -> MappingResult {
        let columns_a: Vec<String> = dataset_a
            .column_names()
            .into_iter()
            .map(String::from)
            .collect();
        let columns_b: Vec<String> = dataset_b
            .column_names()
            .into_iter()
            .map(String::from)
            .collect();

        let profiles_a: Vec<ColumnProfile> = columns_a
            .iter()
            .map(|c| ColumnProfile::analyze(dataset_a, c, &self.profile))
            .collect();
        let profiles_b: Vec<ColumnProfile> = columns_b
            .iter()
            .map(|c| ColumnProfile::analyze(dataset_b, c, &self.profile))
            .collect();

        let scores: Vec<Vec<SimilarityScore>> = columns_a
            .iter()
            .zip(&profiles_a)
            .map(|(label_a, profile_a)| {
                columns_b
                    .iter()
                    .zip(&profiles_b)
                    .map(|(label_b, profile_b)| {
                        SimilarityScore::calculate(
                            label_a,
                            profile_a,
                            label_b,
                            profile_b,
                            &self.similarity,
                        )
                    })
                    .collect()
            })
            .collect();

        let matrix = SimilarityMatrix {
            columns_a,
            columns_b,
            scores,
        };

        let pairs = resolve_greedy(&matrix.scores, self.min_similarity);

        let mut mapping = ColumnMapping::default();
        let mut assignments = Vec::with_capacity(pairs.len());
        for &(a, b) in &pairs {
            let column_a = matrix.columns_a[a].clone();
            let column_b = matrix.columns_b[b].clone();
            let score = matrix.scores[a][b];
            debug!(
                "Mapped '{}' -> '{}' (combined {:.3}, name {:.3}, content {:.3})",
                column_a, column_b, score.combined, score.name, score.content
            );
            // Resolver output is one-to-one, so insertion cannot collide
            if mapping.insert(column_a.clone(), column_b.clone()).is_ok() {
                assignments.push(MappedColumn {
                    column_a,
                    column_b,
                    score,
                });
            }
        }

        let unmapped_a: Vec<String> = matrix
            .columns_a
            .iter()
            .filter(|c| mapping.target(c).is_none())
            .cloned()
            .collect();
        let unmapped_b: Vec<String> = matrix
            .columns_b
            .iter()
            .filter(|c| mapping.source(c).is_none())
            .cloned()
            .collect();

        debug!(
            "Mapping resolved: {} mapped, {} unmapped in A, {} unmapped in B",
            mapping.len(),
            unmapped_a.len(),
            unmapped_b.len()
        );

        MappingResult {
            mapping,
            assignments,
            unmapped_a,
            unmapped_b,
            similarity_matrix: matrix,
            profiles_a,
            profiles_b,
            threshold: self.min_similarity,
        }
    }
}

/// Greedy one-to-one assignment over a score matrix.
///
/// A rows are processed by descending best score; each takes its highest
/// scoring B column that reaches `threshold` and is still free. Ties are
/// broken by original column order on both axes. Returns `(a, b)` index
/// pairs in the order they were committed.
#[must_use]
pub fn resolve_greedy(scores: &[Vec<SimilarityScore>], threshold: f64) -> Vec<(usize, usize)> {
    let by_score_desc = |x: f64, y: f64| y.partial_cmp(&x).unwrap_or(Ordering::Equal);

    let candidates: Vec<Vec<usize>> = scores
        .iter()
        .map(|row| {
            let mut order: Vec<usize> = (0..row.len()).collect();
            order.sort_by(|&x, &y| by_score_desc(row[x].combined, row[y].combined));
            order
        })
        .collect();

    let best: Vec<f64> = scores
        .iter()
        .zip(&candidates)
        .map(|(row, order)| order.first().map_or(f64::NEG_INFINITY, |&b| row[b].combined))
        .collect();

    let mut processing: Vec<usize> = (0..scores.len()).collect();
    processing.sort_by(|&x, &y| by_score_desc(best[x], best[y]));

    let width = scores.iter().map(Vec::len).max().unwrap_or(0);
    let mut claimed = vec![false; width];
    let mut pairs = Vec::new();

    for a in processing {
        for &b in &candidates[a] {
            let score = scores[a][b].combined;
            if score < threshold {
                // Candidates are sorted, nothing further can qualify
                break;
            }
            if !claimed[b] {
                claimed[b] = true;
                pairs.push((a, b));
                break;
            }
        }
    }

    pairs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::value::Value;

    fn headers_only(names: &[&str]) -> Dataset {
        Dataset::from_rows(names.to_vec(), vec![]).unwrap()
    }

    fn score(combined: f64) -> SimilarityScore {
        SimilarityScore {
            name: combined,
            content: 0.0,
            combined,
        }
    }

    #[test]
    fn test_product_columns_mapped() {
        let a = headers_only(&["Codigo Produto", "Nome"]);
        let b = headers_only(&["cod_produto", "nome_prod"]);
        let result = MappingEngine::new().analyze(&a, &b);

        assert_eq!(result.mapping.target("Codigo Produto"), Some("cod_produto"));
        assert_eq!(result.mapping.target("Nome"), Some("nome_prod"));
        assert!(result.unmapped_a.is_empty());
        assert!(result.unmapped_b.is_empty());

        let m = &result.similarity_matrix;
        let right = m.lookup("Codigo Produto", "cod_produto").unwrap().combined;
        let wrong = m.lookup("Codigo Produto", "nome_prod").unwrap().combined;
        assert!(right > wrong);
        // Strongest pair is committed first
        assert_eq!(result.assignments[0].column_a, "Codigo Produto");
    }

    #[test]
    fn test_zero_row_columns_share_type_bonus() {
        let a = headers_only(&["abcdxxxxxx"]);
        let b = headers_only(&["abcdyyyyyy"]);
        let result = MappingEngine::new().analyze(&a, &b);

        let pair = result
            .similarity_matrix
            .lookup("abcdxxxxxx", "abcdyyyyyy")
            .unwrap();
        assert!((pair.name - 0.4).abs() < 1e-9);
        assert!((pair.content - 0.3).abs() < 1e-9);
        assert!((pair.combined - 0.37).abs() < 1e-9);
        assert_eq!(result.mapping.target("abcdxxxxxx"), Some("abcdyyyyyy"));
    }

    #[test]
    fn test_mapping_respects_threshold_and_is_injective() {
        let rows = vec![
            vec![Value::from(1), Value::from("a"), Value::from(10.5)],
            vec![Value::from(2), Value::from("b"), Value::from(20.0)],
        ];
        let a = Dataset::from_rows(vec!["id", "descricao", "valor"], rows.clone()).unwrap();
        let b = Dataset::from_rows(vec!["codigo", "zzz", "valor_total"], rows).unwrap();

        for threshold in [0.0, 0.3, 0.6, 0.9] {
            let result = MappingEngine::new().with_threshold(threshold).analyze(&a, &b);
            assert!(result.mapping.is_injective());
            for pair in &result.assignments {
                assert!(pair.score.combined >= threshold);
            }
            assert_eq!(
                result.mapping.len() + result.unmapped_a.len(),
                a.column_count()
            );
        }
    }

    #[test]
    fn test_tie_break_prefers_original_order() {
        // Both A columns normalize to "valor" and tie at 1.0
        let a = headers_only(&["Valor", "VALOR"]);
        let b = headers_only(&["valor"]);
        let result = MappingEngine::new().analyze(&a, &b);
        assert_eq!(result.mapping.target("Valor"), Some("valor"));
        assert_eq!(result.unmapped_a, vec!["VALOR".to_string()]);

        let a = headers_only(&["valor"]);
        let b = headers_only(&["Valor", "VALOR"]);
        let result = MappingEngine::new().analyze(&a, &b);
        assert_eq!(result.mapping.target("valor"), Some("Valor"));
        assert_eq!(result.unmapped_b, vec!["VALOR".to_string()]);
    }

    #[test]
    fn test_resolve_greedy_strongest_first() {
        // A1's best (0.9) beats A0's best (0.8) on the same column, so A0
        // falls back to its second choice
        let scores = vec![
            vec![score(0.8), score(0.5)],
            vec![score(0.9), score(0.1)],
        ];
        let pairs = resolve_greedy(&scores, 0.3);
        assert_eq!(pairs, vec![(1, 0), (0, 1)]);
    }

    #[test]
    fn test_resolve_greedy_below_threshold() {
        let scores = vec![vec![score(0.8), score(0.2)], vec![score(0.7), score(0.25)]];
        let pairs = resolve_greedy(&scores, 0.3);
        assert_eq!(pairs, vec![(0, 0)]);
        assert!(resolve_greedy(&[], 0.3).is_empty());
        assert!(resolve_greedy(&[vec![]], 0.3).is_empty());
    }
}
