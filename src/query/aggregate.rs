use std::collections::HashSet;

use serde::Serialize;
use thiserror::Error;
use tracing::warn;

use crate::core::dataset::Dataset;
use crate::utils::validation::count_to_f64;

/// Why a column's statistics could not be computed
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AggregationError {
    #[error("Column '{0}' not found")]
    MissingColumn(String),

    #[error("Sum of column '{0}' is not finite")]
    NonFinite(String),
}

/// Statistics over the numeric-coercible values of one column
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnTotals {
    pub column: String,
    pub sum: f64,
    pub count: usize,
    pub mean: f64,
    pub min: f64,
    pub max: f64,

    /// Set when the column could not be processed; the figures are then zero
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ColumnTotals {
    fn failed(column: &str, error: &AggregationError) -> Self {
        Self {
            column: column.to_string(),
            sum: 0.0,
            count: 0,
            mean: 0.0,
            min: 0.0,
            max: 0.0,
            error: Some(error.to_string()),
        }
    }

    /// Sum, count, mean, min and max of the column's values that coerce to
    /// numbers. Other values are left out of all five; with none at all the
    /// figures are zero.
    ///
    /// # Errors
    ///
    /// Returns `AggregationError::MissingColumn` or
    /// `AggregationError::NonFinite`.
    pub fn calculate(dataset: &Dataset, column: &str) -> Result<Self, AggregationError> {
        let col = dataset
            .column(column)
            .ok_or_else(|| AggregationError::MissingColumn(column.to_string()))?;

        let numbers: Vec<f64> = col.values.iter().filter_map(|v| v.coerce_number()).collect();

        let sum: f64 = numbers.iter().sum();
        if !sum.is_finite() {
            return Err(AggregationError::NonFinite(column.to_string()));
        }

        let count = numbers.len();
        let (mean, min, max) = if count == 0 {
            (0.0, 0.0, 0.0)
        } else {
            (
                sum / count_to_f64(count),
                numbers.iter().copied().fold(f64::INFINITY, f64::min),
                numbers.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            )
        };

        Ok(Self {
            column: column.to_string(),
            sum,
            count,
            mean,
            min,
            max,
            error: None,
        })
    }
}

/// Totals for each requested column, in request order.
///
/// A column that cannot be processed yields a zeroed record carrying the
/// error message; the others are unaffected. Repeated names are computed
/// once.
#[must_use]
pub fn aggregate<S: AsRef<str>>(dataset: &Dataset, columns: &[S]) -> Vec<ColumnTotals> {
    let mut seen = HashSet::new();
    let mut totals = Vec::new();

    for column in columns {
        let column: &str = column.as_ref();
        if !seen.insert(column) {
            continue;
        }
        match ColumnTotals::calculate(dataset, column) {
            Ok(t) => totals.push(t),
            Err(e) => {
                warn!("Totals for '{}' unavailable: {}", column, e);
                totals.push(ColumnTotals::failed(column, &e));
            }
        }
    }

    totals
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::value::Value;

    fn dataset() -> Dataset {
        Dataset::from_rows(
            vec!["v", "big", "text"],
            vec![
                vec![Value::from(10), Value::from(f64::MAX), Value::from("a")],
                vec![Value::from(20), Value::from(f64::MAX), Value::from("b")],
                vec![Value::from("x"), Value::Null, Value::Null],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_non_numeric_values_excluded() {
        let totals = aggregate(&dataset(), &["v"]);
        let v = &totals[0];
        assert!((v.sum - 30.0).abs() < 1e-9);
        assert_eq!(v.count, 2);
        assert!((v.mean - 15.0).abs() < 1e-9);
        assert!((v.min - 10.0).abs() < 1e-9);
        assert!((v.max - 20.0).abs() < 1e-9);
        assert!(v.error.is_none());
    }

    #[test]
    fn test_numeric_text_is_coerced() {
        let ds = Dataset::from_rows(
            vec!["amount"],
            vec![vec![Value::from(" 2.5 ")], vec![Value::from(-1)]],
        )
        .unwrap();
        let totals = aggregate(&ds, &["amount"]);
        assert!((totals[0].sum - 1.5).abs() < 1e-9);
        assert!((totals[0].min + 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_no_numbers_gives_zeroes() {
        let totals = aggregate(&dataset(), &["text"]);
        assert_eq!(totals[0].count, 0);
        assert!((totals[0].mean).abs() < f64::EPSILON);
        assert!(totals[0].error.is_none());
    }

    #[test]
    fn test_failures_are_per_column() {
        let totals = aggregate(&dataset(), &["missing", "big", "v", "v"]);
        assert_eq!(totals.len(), 3);
        assert!(totals[0].error.as_deref().unwrap().contains("not found"));
        assert!(totals[1].error.as_deref().unwrap().contains("not finite"));
        assert_eq!(totals[1].count, 0);
        assert!(totals[2].error.is_none());
    }
}
