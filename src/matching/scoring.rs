use serde::Serialize;

use crate::config::SimilarityConfig;
use crate::core::types::ContentType;
use crate::matching::normalize::normalize_column_name;
use crate::matching::profile::ColumnProfile;
use crate::utils::validation::count_to_f64;

/// Similarity scores for one (column A, column B) pair
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SimilarityScore {
    /// Normalized-name similarity, clamped to [0, 1]
    pub name: f64,

    /// Content-profile similarity
    pub content: f64,

    /// Weighted combination, used only for ranking and not clamped
    pub combined: f64,
}

impl SimilarityScore {
    /// Score a column pair from its labels and content profiles
    #[must_use]
    pub fn calculate(
        label_a: &str,
        profile_a: &ColumnProfile,
        label_b: &str,
        profile_b: &ColumnProfile,
        config: &SimilarityConfig,
    ) -> Self {
        let name = name_similarity(label_a, label_b, config);
        let content = content_similarity(profile_a, profile_b, config);
        let combined = config.name_weight * name + config.content_weight * content;

        Self {
            name,
            content,
            combined,
        }
    }
}

/// Similarity of two column labels in [0, 1].
///
/// Equal normalized labels score 1.0. Otherwise the base is the longest
/// common subsequence length over the longer label's length, plus a bonus
/// when one label contains the other and a single bonus when both contain
/// the same domain keyword. Symmetric in its arguments.
#[must_use]
pub fn name_similarity(label_a: &str, label_b: &str, config: &SimilarityConfig) -> f64 {
    if label_a.is_empty() || label_b.is_empty() {
        return 0.0;
    }

    let norm_a = normalize_column_name(label_a);
    let norm_b = normalize_column_name(label_b);

    // Labels made only of punctuation carry no name evidence
    if norm_a.is_empty() || norm_b.is_empty() {
        return 0.0;
    }
    if norm_a == norm_b {
        return 1.0;
    }

    let chars_a: Vec<char> = norm_a.chars().collect();
    let chars_b: Vec<char> = norm_b.chars().collect();
    let max_len = chars_a.len().max(chars_b.len());

    let mut similarity = count_to_f64(longest_common_subsequence(&chars_a, &chars_b))
        / count_to_f64(max_len);

    if norm_a.contains(norm_b.as_str()) || norm_b.contains(norm_a.as_str()) {
        similarity += config.containment_bonus;
    }

    if config
        .keywords
        .iter()
        .any(|k| norm_a.contains(k.as_str()) && norm_b.contains(k.as_str()))
    {
        similarity += config.keyword_bonus;
    }

    similarity.clamp(0.0, 1.0)
}

/// Similarity of two content profiles.
///
/// Profiles of the same type get the same-type bonus, unless both are
/// empty, and a further bonus when their pattern sets intersect.
#[must_use]
pub fn content_similarity(
    profile_a: &ColumnProfile,
    profile_b: &ColumnProfile,
    config: &SimilarityConfig,
) -> f64 {
    if profile_a.content_type != profile_b.content_type
        || profile_a.content_type == ContentType::Empty
    {
        return 0.0;
    }

    let mut similarity = config.same_type_bonus;
    if profile_a
        .patterns
        .intersection(&profile_b.patterns)
        .next()
        .is_some()
    {
        similarity += config.pattern_bonus;
    }
    similarity
}

/// Length of the longest common subsequence (LCS).
///
/// Classic dynamic program keeping two rows of the table.
fn longest_common_subsequence<T: PartialEq>(a: &[T], b: &[T]) -> usize {
    if a.is_empty() || b.is_empty() {
        return 0;
    }

    let mut prev = vec![0usize; b.len() + 1];
    let mut curr = vec![0usize; b.len() + 1];

    for item_a in a {
        for (j, item_b) in b.iter().enumerate() {
            curr[j + 1] = if item_a == item_b {
                prev[j] + 1
            } else {
                prev[j + 1].max(curr[j])
            };
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}
