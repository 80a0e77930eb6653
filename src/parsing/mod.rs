//! Loaders that turn files into [`Dataset`]s, and filter-spec parsing.
//!
//! This module provides loaders for:
//!
//! - **CSV files**: delimiter sniffed among `,` `;` tab and `|`
//! - **TSV/TXT files**: tab-delimited
//! - **Gzip-compressed CSV/TSV**: `.csv.gz`, `.tsv.gz`
//! - **Spreadsheets**: `.xlsx`, `.xlsm`, `.xls`, `.xlsb`, `.ods` (first worksheet)
//!
//! ## Example
//!
//! ```rust,no_run
//! use sheet_recon::parsing::load_dataset;
//! use std::path::Path;
//!
//! let dataset = load_dataset(Path::new("sales.csv")).unwrap();
//! println!("{} rows, columns: {:?}", dataset.row_count(), dataset.column_names());
//! ```
//!
//! ## Header and cells
//!
//! | Input | Result |
//! |-------|--------|
//! | first row | column names |
//! | blank header cell | `Unnamed: <index>` |
//! | repeated header name | suffixed `.1`, `.2`, ... |
//! | empty cell, `NA`, `NULL`, `#N/A`, ... | null |
//! | delimited column whose every cell is a number | numeric column |

use std::collections::HashSet;
use std::path::Path;

use thiserror::Error;

use crate::core::dataset::{Dataset, DatasetError};
use crate::core::value::Value;
use crate::utils::validation::check_column_limit;

pub mod delimited;
pub mod filters;
pub mod spreadsheet;

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Spreadsheet error: {0}")]
    Spreadsheet(String),

    #[error("File is not valid UTF-8 text: {0}")]
    Encoding(String),

    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("File has no header row")]
    Empty,

    #[error("Invalid data format: {0}")]
    InvalidFormat(String),

    #[error("Invalid dataset: {0}")]
    Dataset(#[from] DatasetError),

    #[error("{0}")]
    TooLarge(String),
}

/// Input file kinds recognized by extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Csv,
    Tsv,
    CsvGz,
    TsvGz,
    Spreadsheet,
}

impl InputFormat {
    /// Detect the format from a path's extension(s)
    ///
    /// # Errors
    ///
    /// Returns `LoadError::UnsupportedFormat` for unknown extensions.
    pub fn detect(path: &Path) -> Result<Self, LoadError> {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();

        let format = if name.ends_with(".csv.gz") {
            Self::CsvGz
        } else if name.ends_with(".tsv.gz") || name.ends_with(".txt.gz") {
            Self::TsvGz
        } else if name.ends_with(".csv") {
            Self::Csv
        } else if name.ends_with(".tsv") || name.ends_with(".txt") {
            Self::Tsv
        } else if spreadsheet::EXTENSIONS
            .iter()
            .any(|ext| name.ends_with(&format!(".{ext}")))
        {
            Self::Spreadsheet
        } else {
            return Err(LoadError::UnsupportedFormat(path.display().to_string()));
        };
        Ok(format)
    }
}

/// Load a dataset from a file, choosing the loader by extension
///
/// # Errors
///
/// Returns `LoadError::UnsupportedFormat` for unknown extensions, and the
/// loader's errors otherwise (I/O, syntax, encoding, size limits).
pub fn load_dataset(path: &Path) -> Result<Dataset, LoadError> {
    let dataset = match InputFormat::detect(path)? {
        InputFormat::Csv => delimited::load_delimited(path, None, false)?,
        InputFormat::Tsv => delimited::load_delimited(path, Some(b'\t'), false)?,
        InputFormat::CsvGz => delimited::load_delimited(path, None, true)?,
        InputFormat::TsvGz => delimited::load_delimited(path, Some(b'\t'), true)?,
        InputFormat::Spreadsheet => spreadsheet::load_spreadsheet(path)?,
    };

    tracing::debug!(
        "Loaded {}: {} rows x {} columns",
        path.display(),
        dataset.row_count(),
        dataset.column_count()
    );
    Ok(dataset)
}

/// Turn raw header cells into unique, non-empty column names
pub(crate) fn column_names(raw: &[String]) -> Vec<String> {
    let mut used: HashSet<String> = HashSet::new();
    let mut names = Vec::with_capacity(raw.len());

    for (i, cell) in raw.iter().enumerate() {
        let base = if cell.trim().is_empty() {
            format!("Unnamed: {i}")
        } else {
            cell.clone()
        };

        let mut name = base.clone();
        let mut suffix = 1;
        while used.contains(&name) {
            name = format!("{base}.{suffix}");
            suffix += 1;
        }
        used.insert(name.clone());
        names.push(name);
    }

    names
}

/// Check the column limit and assemble a dataset from header and rows.
///
/// Short rows are padded with nulls; long rows are an error.
pub(crate) fn build_dataset(
    header: &[String],
    mut rows: Vec<Vec<Value>>,
) -> Result<Dataset, LoadError> {
    if let Some(msg) = check_column_limit(header.len()) {
        return Err(LoadError::TooLarge(msg));
    }

    for (i, row) in rows.iter_mut().enumerate() {
        if row.len() > header.len() {
            return Err(LoadError::InvalidFormat(format!(
                "Row {} has {} fields, header has {}",
                i + 2,
                row.len(),
                header.len()
            )));
        }
        row.resize(header.len(), Value::Null);
    }

    Ok(Dataset::from_rows(column_names(header), rows)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn test_detect_format() {
        assert_eq!(InputFormat::detect(Path::new("a.CSV")).unwrap(), InputFormat::Csv);
        assert_eq!(InputFormat::detect(Path::new("a.tsv")).unwrap(), InputFormat::Tsv);
        assert_eq!(InputFormat::detect(Path::new("a.txt")).unwrap(), InputFormat::Tsv);
        assert_eq!(InputFormat::detect(Path::new("a.csv.gz")).unwrap(), InputFormat::CsvGz);
        assert_eq!(InputFormat::detect(Path::new("a.xlsx")).unwrap(), InputFormat::Spreadsheet);
        assert_eq!(InputFormat::detect(Path::new("a.ods")).unwrap(), InputFormat::Spreadsheet);
        assert!(matches!(
            InputFormat::detect(Path::new("a.pdf")),
            Err(LoadError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_column_names() {
        let names = column_names(&strings(&["id", "", "id", "id.1", "  ", "id"]));
        assert_eq!(
            names,
            strings(&["id", "Unnamed: 1", "id.1", "id.1.1", "Unnamed: 4", "id.2"])
        );
    }

    #[test]
    fn test_build_dataset_pads_short_rows() {
        let ds = build_dataset(&strings(&["a", "b"]), vec![vec![Value::from(1)]]).unwrap();
        assert_eq!(ds.row(0).unwrap(), vec![&Value::from(1), &Value::Null]);
    }

    #[test]
    fn test_build_dataset_rejects_long_rows() {
        let err = build_dataset(
            &strings(&["a"]),
            vec![vec![Value::from(1), Value::from(2)]],
        )
        .unwrap_err();
        assert!(matches!(err, LoadError::InvalidFormat(_)));
    }
}
