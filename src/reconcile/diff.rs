use std::collections::HashSet;

use serde::Serialize;

use crate::core::dataset::Dataset;
use crate::core::value::Value;

/// Spreadsheet row number of the first data row (the header is row 1)
const FIRST_DATA_ROW: usize = 2;

/// One cell that differs between two datasets at the same position
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CellDifference {
    /// 1-based spreadsheet row number
    pub row: usize,
    pub column: String,
    pub value_a: Value,
    pub value_b: Value,
}

/// Positional cell-by-cell comparison of two datasets with the same columns
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CellDiffReport {
    /// First differences found, row-major in A's column order
    pub differences: Vec<CellDifference>,

    /// Differences found in total, including those not kept
    pub total_differences: usize,

    /// Rows of A beyond B's length
    pub extra_rows_a: usize,

    /// Rows of B beyond A's length
    pub extra_rows_b: usize,
}

impl CellDiffReport {
    #[must_use]
    pub fn is_truncated(&self) -> bool {
        self.total_differences > self.differences.len()
    }
}

/// Compare two datasets cell by cell over their common row range.
///
/// Returns `None` unless both datasets have exactly the same set of column
/// names. Two nulls are equal; at most `limit` differences are kept.
#[must_use]
pub fn cell_differences(dataset_a: &Dataset, dataset_b: &Dataset, limit: usize) -> Option<CellDiffReport> {
    let names_a: HashSet<&str> = dataset_a.column_names().into_iter().collect();
    let names_b: HashSet<&str> = dataset_b.column_names().into_iter().collect();
    if names_a != names_b {
        return None;
    }

    // Columns in A's order, paired with B's column of the same name
    let columns: Vec<_> = dataset_a
        .columns()
        .iter()
        .filter_map(|a| dataset_b.column(&a.name).map(|b| (a, b)))
        .collect();

    let common_rows = dataset_a.row_count().min(dataset_b.row_count());
    let mut differences = Vec::new();
    let mut total_differences = 0;

    for row in 0..common_rows {
        for (col_a, col_b) in &columns {
            let value_a = &col_a.values[row];
            let value_b = &col_b.values[row];
            if value_a == value_b {
                continue;
            }
            total_differences += 1;
            if differences.len() < limit {
                differences.push(CellDifference {
                    row: row + FIRST_DATA_ROW,
                    column: col_a.name.clone(),
                    value_a: value_a.clone(),
                    value_b: value_b.clone(),
                });
            }
        }
    }

    Some(CellDiffReport {
        differences,
        total_differences,
        extra_rows_a: dataset_a.row_count().saturating_sub(dataset_b.row_count()),
        extra_rows_b: dataset_b.row_count().saturating_sub(dataset_a.row_count()),
    })
}
