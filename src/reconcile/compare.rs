use std::path::Path;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::config::{ConfigError, ReconConfig};
use crate::core::dataset::Dataset;
use crate::core::types::Side;
use crate::matching::engine::MappingEngine;
use crate::matching::mapping::{ColumnMapping, MappingError};
use crate::parsing::{load_dataset, LoadError};
use crate::query::aggregate::{aggregate, ColumnTotals};
use crate::query::filter::{apply_filters_with_report, FilterReport, FilterSpec};
use crate::reconcile::diff::{cell_differences, CellDiffReport};
use crate::reconcile::keys::{select_keys, SelectedKeySet};
use crate::reconcile::rows::{reconcile, KeySource, ReconcileStrategy};

#[derive(Error, Debug)]
pub enum CompareError {
    #[error("Failed to load dataset: {0}")]
    Load(#[from] LoadError),

    #[error("Invalid column mapping: {0}")]
    Mapping(#[from] MappingError),

    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Column '{column}' not found in dataset {side}")]
    UnknownColumn { side: Side, column: String },
}

/// Everything a comparison needs besides the two datasets
#[derive(Debug, Clone, Default)]
pub struct CompareRequest {
    /// Explicit mapping; inferred from names and content when absent
    pub mapping: Option<ColumnMapping>,
    pub filters_a: Vec<FilterSpec>,
    pub filters_b: Vec<FilterSpec>,
    /// Restrict both datasets to these columns where present
    pub selected_columns: Vec<String>,
    /// A-side columns to total
    pub total_columns: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Dimensions {
    pub rows: usize,
    pub columns: usize,
}

impl Dimensions {
    fn of(dataset: &Dataset) -> Self {
        Self {
            rows: dataset.row_count(),
            columns: dataset.column_count(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DimensionsSummary {
    pub a: Dimensions,
    pub b: Dimensions,
    pub mapped_columns: usize,
}

/// Column names compared literally between the two datasets
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnDifferences {
    pub only_in_a: Vec<String>,
    pub only_in_b: Vec<String>,
    pub common: Vec<String>,
}

impl ColumnDifferences {
    fn between(dataset_a: &Dataset, dataset_b: &Dataset) -> Self {
        let names = |ds: &Dataset, other: &Dataset, present: bool| -> Vec<String> {
            ds.column_names()
                .into_iter()
                .filter(|c| other.has_column(c) == present)
                .map(String::from)
                .collect()
        };
        Self {
            only_in_a: names(dataset_a, dataset_b, false),
            only_in_b: names(dataset_b, dataset_a, false),
            common: names(dataset_a, dataset_b, true),
        }
    }
}

/// Rows unique to one side: the count and the first few rows
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UniqueRows {
    pub count: usize,
    pub sample: Dataset,
}

impl UniqueRows {
    fn new(rows: &Dataset, sample_rows: usize) -> Self {
        Self {
            count: rows.row_count(),
            sample: rows.head(sample_rows),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowComparison {
    pub only_in_a: UniqueRows,
    pub only_in_b: UniqueRows,
    pub strategy: ReconcileStrategy,
    /// Fields the rows were matched on
    pub comparison_columns: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MappingSource {
    Explicit,
    Inferred,
}

#[derive(Debug, Clone, Serialize)]
pub struct MappingInfo {
    pub mapping: ColumnMapping,
    pub source: MappingSource,
    pub mapped_columns: usize,
    pub original_columns_a: usize,
    pub original_columns_b: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct FiltersApplied {
    pub filters_a: Vec<FilterSpec>,
    pub filters_b: Vec<FilterSpec>,
    pub report_a: FilterReport,
    pub report_b: FilterReport,
    pub selected_columns: Vec<String>,
    pub total_columns: Vec<String>,
}

/// Totals of mapped columns on both sides; B uses the mapped names
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TotalsComparison {
    pub columns: Vec<String>,
    pub a: Vec<ColumnTotals>,
    pub b: Vec<ColumnTotals>,
}

/// Outcome of a full comparison
#[derive(Debug, Clone, Serialize)]
pub struct ComparisonResult {
    pub dimensions: DimensionsSummary,
    pub columns: ColumnDifferences,
    pub mapping_info: MappingInfo,
    pub key_set: SelectedKeySet,
    pub unique_rows: RowComparison,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub totals: Option<TotalsComparison>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cell_differences: Option<CellDiffReport>,
    pub filters_applied: FiltersApplied,
}

/// Filter both datasets, map their columns, reconcile rows and total the
/// requested columns.
///
/// # Errors
///
/// Returns `CompareError::Config` for an invalid configuration, and
/// `CompareError::UnknownColumn` when an explicit mapping names a column a
/// dataset does not have. No partial result is produced.
pub fn compare(
    dataset_a: &Dataset,
    dataset_b: &Dataset,
    request: &CompareRequest,
    config: &ReconConfig,
) -> Result<ComparisonResult, CompareError> {
    config.validate()?;

    let (filtered_a, report_a) = apply_filters_with_report(dataset_a, &request.filters_a);
    let (filtered_b, report_b) = apply_filters_with_report(dataset_b, &request.filters_b);
    debug!(
        "After filters: A {} -> {} rows, B {} -> {} rows",
        report_a.original_rows, report_a.filtered_rows, report_b.original_rows, report_b.filtered_rows
    );

    let a = select_available(filtered_a, &request.selected_columns);
    let b = select_available(filtered_b, &request.selected_columns);

    let (mapping, source) = match &request.mapping {
        Some(explicit) => {
            check_mapping(explicit, &a, &b)?;
            (explicit.clone(), MappingSource::Explicit)
        }
        None => {
            let result = MappingEngine::with_config(config).analyze(&a, &b);
            (result.mapping, MappingSource::Inferred)
        }
    };
    info!("Comparing with {} mapped column(s)", mapping.len());

    let key_set = if mapping.is_empty() {
        SelectedKeySet::default()
    } else {
        select_keys(&mapping, &a, &b, &config.key_scoring, &config.key_selection)
    };
    let reconciliation = reconcile(&a, &b, KeySource::Keys(&key_set));

    let sample_rows = config.output.sample_rows;
    let unique_rows = RowComparison {
        only_in_a: UniqueRows::new(&reconciliation.unique_a, sample_rows),
        only_in_b: UniqueRows::new(&reconciliation.unique_b, sample_rows),
        strategy: reconciliation.strategy,
        comparison_columns: reconciliation.key_fields,
    };

    let totals = if request.total_columns.is_empty() {
        None
    } else {
        Some(mapped_totals(&a, &b, &mapping, &request.total_columns))
    };

    let cell_differences = cell_differences(&a, &b, config.output.max_cell_differences);

    Ok(ComparisonResult {
        dimensions: DimensionsSummary {
            a: Dimensions::of(&a),
            b: Dimensions::of(&b),
            mapped_columns: mapping.len(),
        },
        columns: ColumnDifferences::between(&a, &b),
        mapping_info: MappingInfo {
            mapped_columns: mapping.len(),
            original_columns_a: dataset_a.column_count(),
            original_columns_b: dataset_b.column_count(),
            mapping,
            source,
        },
        key_set,
        unique_rows,
        totals,
        cell_differences,
        filters_applied: FiltersApplied {
            filters_a: request.filters_a.clone(),
            filters_b: request.filters_b.clone(),
            report_a,
            report_b,
            selected_columns: request.selected_columns.clone(),
            total_columns: request.total_columns.clone(),
        },
    })
}

/// Load two files and [`compare`] them.
///
/// # Errors
///
/// Returns `CompareError::Load` if either file cannot be loaded, plus the
/// errors of [`compare`].
pub fn compare_files(
    path_a: &Path,
    path_b: &Path,
    request: &CompareRequest,
    config: &ReconConfig,
) -> Result<ComparisonResult, CompareError> {
    let dataset_a = load_dataset(path_a)?;
    let dataset_b = load_dataset(path_b)?;
    compare(&dataset_a, &dataset_b, request, config)
}

fn select_available(dataset: Dataset, columns: &[String]) -> Dataset {
    if columns.iter().any(|c| dataset.has_column(c)) {
        dataset.select_columns(columns)
    } else {
        dataset
    }
}

fn check_mapping(mapping: &ColumnMapping, a: &Dataset, b: &Dataset) -> Result<(), CompareError> {
    for (column_a, column_b) in mapping.iter() {
        if !a.has_column(column_a) {
            return Err(CompareError::UnknownColumn {
                side: Side::A,
                column: column_a.to_string(),
            });
        }
        if !b.has_column(column_b) {
            return Err(CompareError::UnknownColumn {
                side: Side::B,
                column: column_b.to_string(),
            });
        }
    }
    Ok(())
}

fn mapped_totals(
    a: &Dataset,
    b: &Dataset,
    mapping: &ColumnMapping,
    requested: &[String],
) -> TotalsComparison {
    let columns: Vec<String> = requested
        .iter()
        .filter(|c| mapping.target(c).is_some())
        .cloned()
        .collect();
    let targets: Vec<&str> = columns.iter().filter_map(|c| mapping.target(c)).collect();

    TotalsComparison {
        a: aggregate(a, &columns),
        b: aggregate(b, &targets),
        columns,
    }
}
