use serde::Serialize;

use crate::core::dataset::Dataset;

/// Shape and first rows of a dataset
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetPreview {
    pub columns: Vec<String>,

    /// Columns whose non-null values are all numbers
    pub numeric_columns: Vec<String>,

    /// First rows
    pub sample: Dataset,

    pub total_rows: usize,
}

/// Preview the first `rows` rows of a dataset
#[must_use]
pub fn preview(dataset: &Dataset, rows: usize) -> DatasetPreview {
    DatasetPreview {
        columns: dataset.column_names().into_iter().map(String::from).collect(),
        numeric_columns: dataset
            .numeric_columns()
            .into_iter()
            .map(String::from)
            .collect(),
        sample: dataset.head(rows),
        total_rows: dataset.row_count(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::value::Value;

    #[test]
    fn test_preview() {
        let ds = Dataset::from_rows(
            vec!["id", "name"],
            (0..8)
                .map(|i| vec![Value::from(i), Value::from(format!("n{i}"))])
                .collect(),
        )
        .unwrap();
        let p = preview(&ds, 5);
        assert_eq!(p.columns, vec!["id", "name"]);
        assert_eq!(p.numeric_columns, vec!["id"]);
        assert_eq!(p.sample.row_count(), 5);
        assert_eq!(p.total_rows, 8);
    }
}
