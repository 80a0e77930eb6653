//! Command-line interface for sheet-recon.
//!
//! This module implements the CLI using clap. Available commands:
//!
//! - **analyze**: Infer a column mapping between two datasets
//! - **keys**: Rate mapped column pairs as reconciliation keys
//! - **compare**: Filter, map, reconcile and total two datasets
//! - **filter**: Apply filters to one dataset and optionally save the result
//! - **totals**: Sum, count, mean, min and max of columns
//! - **preview**: Show columns and first rows of datasets
//!
//! ## Usage
//!
//! ```text
//! # Which columns correspond?
//! sheet-recon analyze erp.xlsx store.csv
//!
//! # Rows present on one side only, with an explicit mapping
//! sheet-recon compare erp.xlsx store.csv --map Codigo=cod --map Valor=valor
//!
//! # Filter and save
//! sheet-recon filter sales.csv --filters '[{"column":"loja","operator":"equals","value":"7"}]' -o loja7.csv
//!
//! # JSON output for scripting
//! sheet-recon compare a.csv b.csv --format json
//! ```

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};

use crate::config::ReconConfig;
use crate::core::dataset::Dataset;
use crate::core::value::Value;
use crate::parsing;
use crate::parsing::filters::{load_filters_file, parse_filters};
use crate::query::filter::FilterSpec;

pub mod analyze;
pub mod compare;
pub mod filter;
pub mod keys;
pub mod preview;
pub mod totals;

#[derive(Parser)]
#[command(name = "sheet-recon")]
#[command(version)]
#[command(about = "Match spreadsheet schemas and reconcile their rows")]
#[command(
    long_about = "sheet-recon compares two tabular datasets (CSV, TSV or spreadsheets) whose column names differ.\n\nIt infers which columns correspond from their names and content, picks the columns that best identify a row, and reports:\n- Rows present in only one of the datasets\n- Totals of mapped numeric columns on both sides\n- Cell-by-cell differences when both datasets share the same columns"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format
    #[arg(short, long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// JSON file overriding the heuristic constants
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Infer the column mapping between two datasets
    Analyze(analyze::AnalyzeArgs),

    /// Score mapped column pairs as reconciliation keys
    Keys(keys::KeysArgs),

    /// Compare two datasets row by row
    Compare(compare::CompareArgs),

    /// Filter a dataset
    Filter(filter::FilterArgs),

    /// Compute column totals
    Totals(totals::TotalsArgs),

    /// Preview datasets
    Preview(preview::PreviewArgs),
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Tsv,
}

/// Load the configuration file if one was given, else the defaults
///
/// # Errors
///
/// Returns an error if the file cannot be read or holds invalid values.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<ReconConfig> {
    match path {
        Some(path) => Ok(ReconConfig::load_from_file(path)?),
        None => Ok(ReconConfig::default()),
    }
}

/// Load a dataset, reporting its shape on stderr when verbose
pub(crate) fn load_input(path: &Path, label: &str, verbose: bool) -> anyhow::Result<Dataset> {
    let dataset = parsing::load_dataset(path)?;
    if verbose {
        eprintln!(
            "{label}: {} rows x {} columns ({})",
            dataset.row_count(),
            dataset.column_count(),
            path.display()
        );
    }
    Ok(dataset)
}

/// Filters from inline JSON or a JSON file; none when neither is given
pub(crate) fn read_filters(
    inline: Option<&str>,
    file: Option<&Path>,
) -> anyhow::Result<Vec<FilterSpec>> {
    match (inline, file) {
        (Some(_), Some(_)) => {
            anyhow::bail!("Give filters either inline or as a file, not both")
        }
        (Some(text), None) => Ok(parse_filters(text)?),
        (None, Some(path)) => Ok(load_filters_file(path)?),
        (None, None) => Ok(Vec::new()),
    }
}

/// Render a cell for text and TSV output
pub(crate) fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        other => other.to_string().replace(['\t', '\n'], " "),
    }
}

/// Print a dataset as an aligned table, indented two spaces
pub(crate) fn print_table(dataset: &Dataset) {
    let names = dataset.column_names();
    let rows: Vec<Vec<String>> = dataset
        .rows()
        .map(|row| row.into_iter().map(cell_text).collect())
        .collect();

    let widths: Vec<usize> = names
        .iter()
        .enumerate()
        .map(|(i, name)| {
            rows.iter()
                .filter_map(|r| r.get(i))
                .map(|c| c.chars().count())
                .chain(std::iter::once(name.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let line = |cells: Vec<&str>| -> String {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, &width)| format!("{cell:<width$}"))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    println!("  {}", line(names.clone()));
    for row in &rows {
        println!("  {}", line(row.iter().map(String::as_str).collect()));
    }
}

/// Print a dataset as TSV: header line then one line per row
pub(crate) fn print_tsv_table(dataset: &Dataset) {
    println!("{}", dataset.column_names().join("\t"));
    for row in dataset.rows() {
        let cells: Vec<String> = row.into_iter().map(cell_text).collect();
        println!("{}", cells.join("\t"));
    }
}
