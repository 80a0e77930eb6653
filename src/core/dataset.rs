use std::collections::HashSet;

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use thiserror::Error;

use crate::core::value::Value;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DatasetError {
    #[error("Column '{column}' has {actual} values, expected {expected}")]
    RaggedColumn {
        column: String,
        expected: usize,
        actual: usize,
    },

    #[error("Row {row} has {actual} cells, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        actual: usize,
    },

    #[error("Duplicate column name: '{0}'")]
    DuplicateColumn(String),
}

/// A named column of cell values
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub values: Vec<Value>,
}

impl Column {
    pub fn new(name: impl Into<String>, values: Vec<Value>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate over the non-null values in row order
    pub fn non_null(&self) -> impl Iterator<Item = &Value> {
        self.values.iter().filter(|v| !v.is_null())
    }

    /// Number of non-null values
    #[must_use]
    pub fn non_null_count(&self) -> usize {
        self.non_null().count()
    }

    /// A column is numeric-typed when every non-null value is a number.
    ///
    /// An all-null column counts as numeric, the way a loader that sees no
    /// text at all would type it.
    #[must_use]
    pub fn is_numeric(&self) -> bool {
        self.non_null().all(Value::is_number)
    }
}

/// An immutable table of equally long, uniquely named columns.
///
/// Every transformation (row selection, column selection) returns a new
/// dataset; nothing mutates an existing one.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Dataset {
    columns: Vec<Column>,
    row_count: usize,
}

impl Dataset {
    /// Build a dataset from columns, checking names and lengths.
    ///
    /// # Errors
    ///
    /// Returns `DatasetError::DuplicateColumn` if two columns share a name, or
    /// `DatasetError::RaggedColumn` if column lengths differ.
    pub fn new(columns: Vec<Column>) -> Result<Self, DatasetError> {
        let row_count = columns.first().map_or(0, Column::len);

        let mut seen = HashSet::new();
        for column in &columns {
            if !seen.insert(column.name.as_str()) {
                return Err(DatasetError::DuplicateColumn(column.name.clone()));
            }
            if column.len() != row_count {
                return Err(DatasetError::RaggedColumn {
                    column: column.name.clone(),
                    expected: row_count,
                    actual: column.len(),
                });
            }
        }

        Ok(Self { columns, row_count })
    }

    /// Build a dataset from a header and row-major cells.
    ///
    /// # Errors
    ///
    /// Returns `DatasetError::RaggedRow` if a row's width differs from the
    /// header, or `DatasetError::DuplicateColumn` for repeated header names.
    pub fn from_rows<S: Into<String>>(
        headers: Vec<S>,
        rows: Vec<Vec<Value>>,
    ) -> Result<Self, DatasetError> {
        let names: Vec<String> = headers.into_iter().map(Into::into).collect();
        let mut columns: Vec<Vec<Value>> = names
            .iter()
            .map(|_| Vec::with_capacity(rows.len()))
            .collect();

        for (row_idx, row) in rows.into_iter().enumerate() {
            if row.len() != names.len() {
                return Err(DatasetError::RaggedRow {
                    row: row_idx,
                    expected: names.len(),
                    actual: row.len(),
                });
            }
            for (col_idx, value) in row.into_iter().enumerate() {
                columns[col_idx].push(value);
            }
        }

        Self::new(
            names
                .into_iter()
                .zip(columns)
                .map(|(name, values)| Column::new(name, values))
                .collect(),
        )
    }

    #[must_use]
    pub fn row_count(&self) -> usize {
        self.row_count
    }

    #[must_use]
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// True when the dataset has no rows
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.row_count == 0
    }

    #[must_use]
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    #[must_use]
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    #[must_use]
    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    #[must_use]
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Cells of one row in column order
    #[must_use]
    pub fn row(&self, index: usize) -> Option<Vec<&Value>> {
        if index >= self.row_count {
            return None;
        }
        Some(self.columns.iter().map(|c| &c.values[index]).collect())
    }

    /// Iterate over rows in order
    pub fn rows(&self) -> impl Iterator<Item = Vec<&Value>> + '_ {
        (0..self.row_count).map(move |i| self.columns.iter().map(|c| &c.values[i]).collect())
    }

    /// New dataset holding the given rows, in the given order.
    ///
    /// Indices past the end are ignored.
    #[must_use]
    pub fn take_rows(&self, indices: &[usize]) -> Self {
        let indices: Vec<usize> = indices
            .iter()
            .copied()
            .filter(|&i| i < self.row_count)
            .collect();

        let columns = self
            .columns
            .iter()
            .map(|c| Column::new(c.name.clone(), indices.iter().map(|&i| c.values[i].clone()).collect()))
            .collect();

        Self {
            columns,
            row_count: indices.len(),
        }
    }

    /// First `n` rows
    #[must_use]
    pub fn head(&self, n: usize) -> Self {
        let end = n.min(self.row_count);
        self.take_rows(&(0..end).collect::<Vec<_>>())
    }

    /// Last `n` rows
    #[must_use]
    pub fn tail(&self, n: usize) -> Self {
        let start = self.row_count.saturating_sub(n);
        self.take_rows(&(start..self.row_count).collect::<Vec<_>>())
    }

    /// Same columns, no rows
    #[must_use]
    pub fn empty_like(&self) -> Self {
        self.take_rows(&[])
    }

    /// New dataset restricted to the named columns that exist, in the order
    /// given. Unknown names are skipped.
    #[must_use]
    pub fn select_columns<S: AsRef<str>>(&self, names: &[S]) -> Self {
        let mut seen = HashSet::new();
        let mut columns: Vec<Column> = Vec::new();
        for name in names {
            let name: &str = name.as_ref();
            if !seen.insert(name) {
                continue;
            }
            if let Some(column) = self.column(name) {
                columns.push(column.clone());
            }
        }
        let row_count = if columns.is_empty() { 0 } else { self.row_count };
        Self { columns, row_count }
    }

    /// Names of columns whose non-null values are all numbers
    #[must_use]
    pub fn numeric_columns(&self) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|c| c.is_numeric())
            .map(|c| c.name.as_str())
            .collect()
    }
}

/// Row-major values for serialization
struct RowsView<'a>(&'a Dataset);

impl Serialize for RowsView<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.0.rows())
    }
}

impl Serialize for Dataset {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Dataset", 2)?;
        state.serialize_field("columns", &self.column_names())?;
        state.serialize_field("rows", &RowsView(self))?;
        state.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Dataset {
        Dataset::from_rows(
            vec!["id", "v"],
            vec![
                vec![Value::from(1), Value::from(10)],
                vec![Value::from(2), Value::Null],
                vec![Value::from(3), Value::from("x")],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_from_rows() {
        let ds = sample();
        assert_eq!(ds.row_count(), 3);
        assert_eq!(ds.column_count(), 2);
        assert_eq!(ds.column_names(), vec!["id", "v"]);
        assert_eq!(ds.row(1).unwrap()[0], &Value::from(2));
        assert!(ds.row(3).is_none());
    }

    #[test]
    fn test_ragged_rows_rejected() {
        let err = Dataset::from_rows(vec!["a", "b"], vec![vec![Value::from(1)]]).unwrap_err();
        assert!(matches!(err, DatasetError::RaggedRow { row: 0, .. }));
    }

    #[test]
    fn test_ragged_columns_rejected() {
        let err = Dataset::new(vec![
            Column::new("a", vec![Value::Null]),
            Column::new("b", vec![]),
        ])
        .unwrap_err();
        assert!(matches!(err, DatasetError::RaggedColumn { .. }));
    }

    #[test]
    fn test_duplicate_columns_rejected() {
        let err = Dataset::from_rows(vec!["a", "a"], vec![]).unwrap_err();
        assert_eq!(err, DatasetError::DuplicateColumn("a".to_string()));
    }

    #[test]
    fn test_take_rows_head_tail() {
        let ds = sample();
        let picked = ds.take_rows(&[2, 0, 99]);
        assert_eq!(picked.row_count(), 2);
        assert_eq!(picked.column("id").unwrap().values[0], Value::from(3));

        assert_eq!(ds.head(2).row_count(), 2);
        assert_eq!(ds.tail(1).column("id").unwrap().values[0], Value::from(3));
        assert_eq!(ds.tail(10).row_count(), 3);
        assert_eq!(ds.empty_like().column_count(), 2);
        // Original is untouched
        assert_eq!(ds.row_count(), 3);
    }

    #[test]
    fn test_select_columns() {
        let ds = sample();
        let selected = ds.select_columns(&["v", "missing", "id"]);
        assert_eq!(selected.column_names(), vec!["v", "id"]);
        assert_eq!(selected.row_count(), 3);
        assert_eq!(ds.select_columns(&["missing"]).row_count(), 0);
    }

    #[test]
    fn test_numeric_columns() {
        let ds = sample();
        assert_eq!(ds.numeric_columns(), vec!["id"]);
    }

    #[test]
    fn test_serialize_dataset() {
        let ds = sample().head(1);
        let json = serde_json::to_value(&ds).unwrap();
        assert_eq!(json["columns"], serde_json::json!(["id", "v"]));
        assert_eq!(json["rows"], serde_json::json!([[1.0, 10.0]]));
    }
}
