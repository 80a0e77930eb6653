use std::path::{Path, PathBuf};

use clap::Args;

use crate::cli::{load_input, print_table, print_tsv_table, read_filters, OutputFormat};
use crate::config::ReconConfig;
use crate::core::dataset::Dataset;
use crate::query::filter::{apply_filters_with_report, FilterReport};

#[derive(Args)]
pub struct FilterArgs {
    /// Dataset to filter
    #[arg(required = true)]
    pub input: PathBuf,

    /// Filters as a JSON array of {"column", "operator", "value"} objects
    #[arg(long, value_name = "JSON")]
    pub filters: Option<String>,

    /// JSON file with filters
    #[arg(long, value_name = "FILE")]
    pub filters_file: Option<PathBuf>,

    /// Keep only these columns (repeatable)
    #[arg(short, long = "columns", value_name = "COLUMN")]
    pub columns: Vec<String>,

    /// Write the filtered rows to this CSV file
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

pub fn run(
    args: FilterArgs,
    format: OutputFormat,
    verbose: bool,
    config: &ReconConfig,
) -> anyhow::Result<()> {
    let filters = read_filters(args.filters.as_deref(), args.filters_file.as_deref())?;
    if filters.is_empty() && args.columns.is_empty() {
        anyhow::bail!("Nothing to do: give --filters, --filters-file or --columns");
    }

    let dataset = load_input(&args.input, "Input", verbose)?;
    let (filtered, report) = apply_filters_with_report(&dataset, &filters);
    let filtered = if args.columns.is_empty() {
        filtered
    } else {
        filtered.select_columns(&args.columns)
    };

    if let Some(path) = &args.output {
        write_csv(&filtered, path)?;
        if verbose {
            eprintln!("Wrote {} rows to {}", filtered.row_count(), path.display());
        }
    }

    let preview = preview_of(&filtered, config);
    match format {
        OutputFormat::Text => print_text_filter(&args, &report, &preview),
        OutputFormat::Json => print_json_filter(&args, &report, &preview)?,
        OutputFormat::Tsv => print_tsv_table(&filtered),
    }

    Ok(())
}

/// First `preview_rows` rows of the first `preview_columns` columns
fn preview_of(dataset: &Dataset, config: &ReconConfig) -> Dataset {
    let names: Vec<&str> = dataset
        .column_names()
        .into_iter()
        .take(config.output.preview_columns)
        .collect();
    dataset
        .head(config.output.preview_rows)
        .select_columns(&names)
}

/// Write a dataset as comma-separated text with a header row
fn write_csv(dataset: &Dataset, path: &Path) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(dataset.column_names())?;
    for row in dataset.rows() {
        writer.write_record(row.into_iter().map(|v| v.to_string()))?;
    }
    writer.flush()?;
    Ok(())
}

fn print_text_filter(args: &FilterArgs, report: &FilterReport, preview: &Dataset) {
    println!("Filter Results");
    println!("{}", "=".repeat(60));

    println!("\nInput: {}", args.input.display());
    println!("  Original rows: {}", report.original_rows);
    println!("  Filtered rows: {}", report.filtered_rows);
    println!("  Filters applied: {}", report.applied);
    if !report.skipped.is_empty() {
        println!("  Filters skipped: {}", report.skipped.len());
        for s in &report.skipped {
            println!("    #{} ({}): {}", s.index + 1, s.filter, s.reason);
        }
    }
    if let Some(path) = &args.output {
        println!("  Saved to: {}", path.display());
    }

    if !preview.is_empty() {
        println!("\nPreview:");
        print_table(preview);
    }
}

fn print_json_filter(
    args: &FilterArgs,
    report: &FilterReport,
    preview: &Dataset,
) -> anyhow::Result<()> {
    let output = serde_json::json!({
        "input": args.input.display().to_string(),
        "original_rows": report.original_rows,
        "filtered_rows": report.filtered_rows,
        "filters_applied": report.applied,
        "skipped": report.skipped,
        "output": args.output.as_ref().map(|p| p.display().to_string()),
        "preview": preview,
    });

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::value::Value;
    use crate::parsing::load_dataset;

    #[test]
    fn test_write_csv_round_trips_through_loader() {
        let ds = Dataset::from_rows(
            vec!["id", "name"],
            vec![
                vec![Value::from(1), Value::from("a, b")],
                vec![Value::from(2), Value::Null],
            ],
        )
        .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        write_csv(&ds, &path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("id,name\n1,\"a, b\"\n2,\n"));
        assert_eq!(load_dataset(&path).unwrap(), ds);
    }

    #[test]
    fn test_preview_limits() {
        let ds = Dataset::from_rows(
            (0..8).map(|i| format!("c{i}")).collect(),
            (0..7).map(|r| (0..8).map(|c| Value::from(r * 10 + c)).collect()).collect(),
        )
        .unwrap();
        let preview = preview_of(&ds, &ReconConfig::default());
        assert_eq!(preview.row_count(), 5);
        assert_eq!(preview.column_count(), 6);
        assert_eq!(preview.column_names()[5], "c5");
    }
}
