use std::collections::BTreeSet;

use serde::Serialize;

use crate::config::ProfileConfig;
use crate::core::dataset::Dataset;
use crate::core::types::{ContentType, ValuePattern};
use crate::core::value::Value;
use crate::utils::validation::ratio;

/// Share of sampled values falling in each class
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProfileStats {
    pub numeric_ratio: f64,
    pub text_ratio: f64,
    pub date_ratio: f64,
}

/// Statistical summary of a column's sampled values
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnProfile {
    /// Column the profile describes
    pub column: String,

    /// Dominant content type
    pub content_type: ContentType,

    /// First values of the sample, for display
    pub sample: Vec<Value>,

    /// Patterns detected among textual values
    pub patterns: BTreeSet<ValuePattern>,

    /// Class ratios over the sample
    pub stats: ProfileStats,

    /// Number of values that were sampled
    pub sampled: usize,
}

impl ColumnProfile {
    /// Profile for a missing column or an empty dataset
    pub fn unknown(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            content_type: ContentType::Unknown,
            sample: Vec::new(),
            patterns: BTreeSet::new(),
            stats: ProfileStats::default(),
            sampled: 0,
        }
    }

    /// Sample a column's non-null values and classify them.
    ///
    /// Numbers count as numeric; text counts as text and is checked for
    /// patterns. Every sampled value is independently probed as a date.
    #[must_use]
    pub fn analyze(dataset: &Dataset, column: &str, config: &ProfileConfig) -> Self {
        let Some(col) = dataset.column(column) else {
            return Self::unknown(column);
        };
        if dataset.is_empty() {
            return Self::unknown(column);
        }

        let sample: Vec<&Value> = col.non_null().take(config.sample_size).collect();

        let mut numeric_count = 0usize;
        let mut text_count = 0usize;
        let mut date_count = 0usize;
        let mut patterns = BTreeSet::new();

        for value in &sample {
            match value {
                Value::Number(_) => numeric_count += 1,
                Value::Text(text) => {
                    text_count += 1;
                    if let Some(pattern) = detect_pattern(text) {
                        patterns.insert(pattern);
                    }
                }
                Value::Date(_) | Value::Null => {}
            }

            if value.to_date().is_some() {
                date_count += 1;
            }
        }

        let total = sample.len();
        let stats = ProfileStats {
            numeric_ratio: ratio(numeric_count, total),
            text_ratio: ratio(text_count, total),
            date_ratio: ratio(date_count, total),
        };

        let content_type = if total == 0 {
            ContentType::Empty
        } else if stats.numeric_ratio > config.numeric_ratio_threshold {
            ContentType::Numeric
        } else if stats.date_ratio > config.date_ratio_threshold {
            ContentType::Date
        } else {
            ContentType::Text
        };

        Self {
            column: column.to_string(),
            content_type,
            sample: sample
                .into_iter()
                .take(config.display_sample_size)
                .cloned()
                .collect(),
            patterns,
            stats,
            sampled: total,
        }
    }
}

/// Classify a text value; the checks are tried in order and the first hit wins
fn detect_pattern(text: &str) -> Option<ValuePattern> {
    if is_all_digits(text) {
        Some(ValuePattern::DigitsOnly)
    } else if text.contains('/') || text.contains('-') {
        Some(ValuePattern::DateLike)
    } else if is_all_digits(&text.replace(['.', ','], "")) {
        Some(ValuePattern::DecimalLike)
    } else {
        None
    }
}

fn is_all_digits(text: &str) -> bool {
    !text.is_empty() && text.chars().all(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dataset() -> Dataset {
        Dataset::from_rows(
            vec!["amount", "code", "when", "label", "blank"],
            vec![
                vec![
                    Value::from(10),
                    Value::from("0012"),
                    Value::from("2024-01-02"),
                    Value::from("alpha"),
                    Value::Null,
                ],
                vec![
                    Value::from(20.5),
                    Value::from("0013"),
                    Value::from("2024-01-03"),
                    Value::from("1.234,50"),
                    Value::Null,
                ],
                vec![
                    Value::Null,
                    Value::from("0014"),
                    Value::from("03/01/2024"),
                    Value::from("gamma"),
                    Value::Null,
                ],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_numeric_column() {
        let profile = ColumnProfile::analyze(&dataset(), "amount", &ProfileConfig::default());
        assert_eq!(profile.content_type, ContentType::Numeric);
        assert_eq!(profile.sampled, 2);
        assert!((profile.stats.numeric_ratio - 1.0).abs() < f64::EPSILON);
        assert!(profile.patterns.is_empty());
    }

    #[test]
    fn test_numbers_are_not_dates() {
        let profile = ColumnProfile::analyze(&dataset(), "amount", &ProfileConfig::default());
        assert!(profile.stats.date_ratio.abs() < f64::EPSILON);

        let mixed = Dataset::from_rows(
            vec!["mixed"],
            vec![
                vec![Value::from(45_292)],
                vec![Value::from(45_293)],
                vec![Value::from("2024-01-02")],
                vec![Value::from("2024-01-03")],
            ],
        )
        .unwrap();
        let profile = ColumnProfile::analyze(&mixed, "mixed", &ProfileConfig::default());
        assert!((profile.stats.date_ratio - 0.5).abs() < f64::EPSILON);
        assert!((profile.stats.numeric_ratio - 0.5).abs() < f64::EPSILON);
        assert_eq!(profile.content_type, ContentType::Text);
    }

    #[test]
    fn test_digit_text_column() {
        let profile = ColumnProfile::analyze(&dataset(), "code", &ProfileConfig::default());
        assert_eq!(profile.content_type, ContentType::Text);
        assert!(profile.patterns.contains(&ValuePattern::DigitsOnly));
        assert_eq!(profile.patterns.len(), 1);
    }

    #[test]
    fn test_date_column() {
        let profile = ColumnProfile::analyze(&dataset(), "when", &ProfileConfig::default());
        assert_eq!(profile.content_type, ContentType::Date);
        assert!(profile.patterns.contains(&ValuePattern::DateLike));
        assert!((profile.stats.text_ratio - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_decimal_like_pattern() {
        let profile = ColumnProfile::analyze(&dataset(), "label", &ProfileConfig::default());
        assert_eq!(profile.content_type, ContentType::Text);
        assert!(profile.patterns.contains(&ValuePattern::DecimalLike));
    }

    #[test]
    fn test_empty_and_unknown() {
        let ds = dataset();
        let blank = ColumnProfile::analyze(&ds, "blank", &ProfileConfig::default());
        assert_eq!(blank.content_type, ContentType::Empty);
        assert!(blank.sample.is_empty());

        let missing = ColumnProfile::analyze(&ds, "nope", &ProfileConfig::default());
        assert_eq!(missing.content_type, ContentType::Unknown);

        let no_rows = ColumnProfile::analyze(&ds.empty_like(), "amount", &ProfileConfig::default());
        assert_eq!(no_rows.content_type, ContentType::Unknown);
    }

    #[test]
    fn test_sample_is_bounded() {
        let rows = (0..150).map(|i| vec![Value::from(i)]).collect();
        let ds = Dataset::from_rows(vec!["n"], rows).unwrap();
        let profile = ColumnProfile::analyze(&ds, "n", &ProfileConfig::default());
        assert_eq!(profile.sampled, 100);
        assert_eq!(profile.sample.len(), 10);
        assert_eq!(profile.sample[0], Value::from(0));
    }

    #[test]
    fn test_pattern_order() {
        assert_eq!(detect_pattern("123"), Some(ValuePattern::DigitsOnly));
        assert_eq!(detect_pattern("1-2"), Some(ValuePattern::DateLike));
        assert_eq!(detect_pattern("1.5"), Some(ValuePattern::DecimalLike));
        assert_eq!(detect_pattern("abc"), None);
        assert_eq!(detect_pattern(""), None);
        assert_eq!(detect_pattern(".,"), None);
    }
}
