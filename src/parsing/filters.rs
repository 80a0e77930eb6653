use std::path::Path;

use thiserror::Error;

use crate::query::filter::FilterSpec;

#[derive(Error, Debug)]
pub enum FilterSpecError {
    #[error("Failed to read filter file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid filter specification: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Filter {index} has an empty column name")]
    EmptyColumn { index: usize },
}

/// Parse a JSON array of `{"column", "operator", "value"}` objects.
///
/// A single object is accepted as a one-element list.
///
/// # Errors
///
/// Returns `FilterSpecError::Json` for malformed JSON or unknown operators,
/// and `FilterSpecError::EmptyColumn` for a blank column name.
pub fn parse_filters(text: &str) -> Result<Vec<FilterSpec>, FilterSpecError> {
    let value: serde_json::Value = serde_json::from_str(text)?;
    let filters: Vec<FilterSpec> = if value.is_array() {
        serde_json::from_value(value)?
    } else {
        vec![serde_json::from_value(value)?]
    };

    if let Some(index) = filters.iter().position(|f| f.column.trim().is_empty()) {
        return Err(FilterSpecError::EmptyColumn { index });
    }
    Ok(filters)
}

/// Read and parse a JSON filter file
///
/// # Errors
///
/// Returns `FilterSpecError::Io` if the file cannot be read, and the errors
/// of [`parse_filters`].
pub fn load_filters_file(path: &Path) -> Result<Vec<FilterSpec>, FilterSpecError> {
    let content = std::fs::read_to_string(path)?;
    parse_filters(&content)
}
