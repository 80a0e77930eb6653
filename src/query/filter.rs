use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::core::dataset::{Column, Dataset};
use crate::core::value::{parse_number, Value};

/// A filter that could not be evaluated and was skipped
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
pub enum FilterEvaluationError {
    #[error("Column '{0}' not found")]
    MissingColumn(String),

    #[error("Operator '{0}' requires a value")]
    MissingValue(FilterOperator),
}

/// Predicate operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterOperator {
    Equals,
    NotEquals,
    Contains,
    NotContains,
    StartsWith,
    EndsWith,
    GreaterThan,
    LessThan,
    IsEmpty,
    IsNotEmpty,
}

impl FilterOperator {
    pub const ALL: [Self; 10] = [
        Self::Equals,
        Self::NotEquals,
        Self::Contains,
        Self::NotContains,
        Self::StartsWith,
        Self::EndsWith,
        Self::GreaterThan,
        Self::LessThan,
        Self::IsEmpty,
        Self::IsNotEmpty,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Equals => "equals",
            Self::NotEquals => "not_equals",
            Self::Contains => "contains",
            Self::NotContains => "not_contains",
            Self::StartsWith => "starts_with",
            Self::EndsWith => "ends_with",
            Self::GreaterThan => "greater_than",
            Self::LessThan => "less_than",
            Self::IsEmpty => "is_empty",
            Self::IsNotEmpty => "is_not_empty",
        }
    }

    /// Whether the operator compares against a filter value
    #[must_use]
    pub fn needs_value(self) -> bool {
        !matches!(self, Self::IsEmpty | Self::IsNotEmpty)
    }
}

impl std::fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for FilterOperator {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|op| op.as_str() == s)
            .ok_or_else(|| format!("unknown operator '{s}'"))
    }
}

/// One (column, operator, value) predicate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSpec {
    pub column: String,
    pub operator: FilterOperator,

    /// Comparison value; JSON numbers and booleans are kept as their text
    #[serde(default, deserialize_with = "deserialize_value")]
    pub value: Option<String>,
}

impl FilterSpec {
    pub fn new(column: impl Into<String>, operator: FilterOperator, value: Option<&str>) -> Self {
        Self {
            column: column.into(),
            operator,
            value: value.map(String::from),
        }
    }
}

impl std::fmt::Display for FilterSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.value {
            Some(value) => write!(f, "{} {} '{}'", self.column, self.operator, value),
            None => write!(f, "{} {}", self.column, self.operator),
        }
    }
}

fn deserialize_value<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match raw {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}

/// A filter skipped during evaluation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedFilter {
    /// Position in the filter list
    pub index: usize,
    pub filter: FilterSpec,
    pub reason: FilterEvaluationError,
}

/// Summary of one filtering pass
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterReport {
    pub original_rows: usize,
    pub filtered_rows: usize,
    pub applied: usize,
    pub skipped: Vec<SkippedFilter>,
}

/// Apply filters in order, keeping rows that satisfy every one.
///
/// Filters that cannot be evaluated are skipped. The input is not modified.
#[must_use]
pub fn apply_filters(dataset: &Dataset, filters: &[FilterSpec]) -> Dataset {
    apply_filters_with_report(dataset, filters).0
}

/// [`apply_filters`], also reporting what was applied and skipped
#[must_use]
pub fn apply_filters_with_report(dataset: &Dataset, filters: &[FilterSpec]) -> (Dataset, FilterReport) {
    let mut rows: Vec<usize> = (0..dataset.row_count()).collect();
    let mut report = FilterReport {
        original_rows: dataset.row_count(),
        filtered_rows: dataset.row_count(),
        applied: 0,
        skipped: Vec::new(),
    };

    if filters.is_empty() {
        debug!("No filters to apply, keeping {} rows", rows.len());
        return (dataset.clone(), report);
    }

    for (index, filter) in filters.iter().enumerate() {
        let before = rows.len();
        match retain_matching(dataset, filter, &mut rows) {
            Ok(()) => {
                report.applied += 1;
                debug!(
                    "Filter {} ({}): {} -> {} rows",
                    index + 1,
                    filter,
                    before,
                    rows.len()
                );
            }
            Err(reason) => {
                warn!("Skipping filter {} ({}): {}", index + 1, filter, reason);
                report.skipped.push(SkippedFilter {
                    index,
                    filter: filter.clone(),
                    reason,
                });
            }
        }
    }

    report.filtered_rows = rows.len();
    (dataset.take_rows(&rows), report)
}

fn retain_matching(
    dataset: &Dataset,
    filter: &FilterSpec,
    rows: &mut Vec<usize>,
) -> Result<(), FilterEvaluationError> {
    let column = dataset
        .column(&filter.column)
        .ok_or_else(|| FilterEvaluationError::MissingColumn(filter.column.clone()))?;

    let value = match (&filter.value, filter.operator.needs_value()) {
        (Some(value), _) => value.as_str(),
        (None, false) => "",
        (None, true) => return Err(FilterEvaluationError::MissingValue(filter.operator)),
    };

    let predicate = Predicate::new(filter.operator, value, column);
    rows.retain(|&i| predicate.matches(&column.values[i]));
    Ok(())
}

/// A filter resolved against one column
struct Predicate<'a> {
    operator: FilterOperator,
    text: &'a str,
    lowered: String,
    number: Option<f64>,
    numeric_equality: bool,
}

impl<'a> Predicate<'a> {
    fn new(operator: FilterOperator, text: &'a str, column: &Column) -> Self {
        let number = parse_number(text);
        Self {
            operator,
            text,
            lowered: text.to_lowercase(),
            number,
            numeric_equality: number.is_some() && column.is_numeric(),
        }
    }

    fn matches(&self, cell: &Value) -> bool {
        match self.operator {
            FilterOperator::Equals => self.equals(cell),
            FilterOperator::NotEquals => !self.equals(cell),
            FilterOperator::Contains => self.contains(cell),
            FilterOperator::NotContains => !self.contains(cell),
            FilterOperator::StartsWith => {
                !cell.is_null() && cell.to_string().starts_with(self.text)
            }
            FilterOperator::EndsWith => !cell.is_null() && cell.to_string().ends_with(self.text),
            FilterOperator::GreaterThan => self.compare(cell, |c, v| c > v),
            FilterOperator::LessThan => self.compare(cell, |c, v| c < v),
            FilterOperator::IsEmpty => cell.is_blank(),
            FilterOperator::IsNotEmpty => !cell.is_blank(),
        }
    }

    fn equals(&self, cell: &Value) -> bool {
        if cell.is_null() {
            return false;
        }
        if self.numeric_equality {
            return cell.coerce_number() == self.number;
        }
        cell.to_string() == self.text
    }

    fn contains(&self, cell: &Value) -> bool {
        !cell.is_null() && cell.to_string().to_lowercase().contains(&self.lowered)
    }

    fn compare(&self, cell: &Value, op: impl Fn(f64, f64) -> bool) -> bool {
        match (cell.coerce_number(), self.number) {
            (Some(c), Some(v)) => op(c, v),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dataset() -> Dataset {
        Dataset::from_rows(
            vec!["id", "v", "name"],
            vec![
                vec![Value::from(1), Value::from(10), Value::from("Alpha")],
                vec![Value::from(2), Value::from(20), Value::from("beta")],
                vec![Value::from(3), Value::Null, Value::from("")],
                vec![Value::from(4), Value::from(40), Value::Null],
            ],
        )
        .unwrap()
    }

    fn ids(ds: &Dataset) -> Vec<Value> {
        ds.column("id").unwrap().values.clone()
    }

    fn run(op: FilterOperator, column: &str, value: Option<&str>) -> Vec<Value> {
        ids(&apply_filters(&dataset(), &[FilterSpec::new(column, op, value)]))
    }

    #[test]
    fn test_empty_filter_list_is_identity() {
        let ds = dataset();
        assert_eq!(apply_filters(&ds, &[]), ds);
    }

    #[test]
    fn test_equals_numeric_and_text() {
        assert_eq!(run(FilterOperator::Equals, "v", Some("20")), vec![Value::from(2)]);
        assert_eq!(run(FilterOperator::Equals, "v", Some("20.0")), vec![Value::from(2)]);
        assert_eq!(run(FilterOperator::Equals, "name", Some("beta")), vec![Value::from(2)]);
        assert!(run(FilterOperator::Equals, "name", Some("BETA")).is_empty());
    }

    #[test]
    fn test_not_equals_keeps_nulls() {
        assert_eq!(
            run(FilterOperator::NotEquals, "v", Some("20")),
            vec![Value::from(1), Value::from(3), Value::from(4)]
        );
    }

    #[test]
    fn test_contains_is_case_insensitive() {
        assert_eq!(
            run(FilterOperator::Contains, "name", Some("A")),
            vec![Value::from(1), Value::from(2)]
        );
        assert_eq!(
            run(FilterOperator::NotContains, "name", Some("alp")),
            vec![Value::from(2), Value::from(3), Value::from(4)]
        );
    }

    #[test]
    fn test_prefix_suffix_are_case_sensitive() {
        assert_eq!(run(FilterOperator::StartsWith, "name", Some("Al")), vec![Value::from(1)]);
        assert!(run(FilterOperator::StartsWith, "name", Some("al")).is_empty());
        assert_eq!(run(FilterOperator::EndsWith, "name", Some("ta")), vec![Value::from(2)]);
    }

    #[test]
    fn test_numeric_comparisons() {
        assert_eq!(
            run(FilterOperator::GreaterThan, "v", Some("15")),
            vec![Value::from(2), Value::from(4)]
        );
        assert_eq!(run(FilterOperator::LessThan, "v", Some("15")), vec![Value::from(1)]);
        // Non-numeric filter value fails every row
        assert!(run(FilterOperator::GreaterThan, "v", Some("abc")).is_empty());
        // Text cells are not coercible
        assert!(run(FilterOperator::GreaterThan, "name", Some("0")).is_empty());
    }

    #[test]
    fn test_is_empty_partitions_rows() {
        for column in ["v", "name"] {
            let empty = run(FilterOperator::IsEmpty, column, None);
            let not_empty = run(FilterOperator::IsNotEmpty, column, None);
            assert_eq!(empty.len() + not_empty.len(), 4);
            assert!(empty.iter().all(|v| !not_empty.contains(v)));
        }
        assert_eq!(
            run(FilterOperator::IsEmpty, "name", None),
            vec![Value::from(3), Value::from(4)]
        );
    }

    #[test]
    fn test_filters_are_anded() {
        let filters = [
            FilterSpec::new("v", FilterOperator::GreaterThan, Some("5")),
            FilterSpec::new("name", FilterOperator::IsNotEmpty, None),
        ];
        let (filtered, report) = apply_filters_with_report(&dataset(), &filters);
        assert_eq!(ids(&filtered), vec![Value::from(1), Value::from(2)]);
        assert_eq!(report.original_rows, 4);
        assert_eq!(report.filtered_rows, 2);
        assert_eq!(report.applied, 2);
    }

    #[test]
    fn test_unusable_filters_skipped() {
        let filters = [
            FilterSpec::new("missing", FilterOperator::Equals, Some("x")),
            FilterSpec::new("v", FilterOperator::Equals, None),
            FilterSpec::new("v", FilterOperator::LessThan, Some("30")),
        ];
        let (filtered, report) = apply_filters_with_report(&dataset(), &filters);
        assert_eq!(ids(&filtered), vec![Value::from(1), Value::from(2)]);
        assert_eq!(report.applied, 1);
        assert_eq!(report.skipped.len(), 2);
        assert_eq!(
            report.skipped[0].reason,
            FilterEvaluationError::MissingColumn("missing".to_string())
        );
        assert_eq!(report.skipped[1].index, 1);
    }

    #[test]
    fn test_deserialize_spec_values() {
        let filters: Vec<FilterSpec> = serde_json::from_str(
            r#"[
                {"column": "v", "operator": "greater_than", "value": 15},
                {"column": "name", "operator": "is_empty"},
                {"column": "name", "operator": "equals", "value": "beta"},
                {"column": "flag", "operator": "equals", "value": true}
            ]"#,
        )
        .unwrap();
        assert_eq!(filters[0].value.as_deref(), Some("15"));
        assert_eq!(filters[1].value, None);
        assert_eq!(filters[2].value.as_deref(), Some("beta"));
        assert_eq!(filters[3].value.as_deref(), Some("true"));
    }

    #[test]
    fn test_operator_from_str() {
        for op in FilterOperator::ALL {
            assert_eq!(op.as_str().parse::<FilterOperator>(), Ok(op));
        }
        assert!("between".parse::<FilterOperator>().is_err());
    }
}
