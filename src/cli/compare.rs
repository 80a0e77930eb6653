use std::path::PathBuf;

use clap::Args;

use crate::cli::{cell_text, load_input, print_table, read_filters, OutputFormat};
use crate::config::ReconConfig;
use crate::matching::mapping::ColumnMapping;
use crate::query::aggregate::ColumnTotals;
use crate::query::filter::FilterReport;
use crate::reconcile::compare::{compare, CompareRequest, ComparisonResult, UniqueRows};

#[derive(Args)]
pub struct CompareArgs {
    /// First dataset
    #[arg(required = true)]
    pub input_a: PathBuf,

    /// Second dataset
    #[arg(required = true)]
    pub input_b: PathBuf,

    /// Column pair `a=b` (repeatable); inferred from names and content when omitted
    #[arg(short, long = "map", value_name = "A=B")]
    pub map: Vec<String>,

    /// Filters for the first dataset, as a JSON array
    #[arg(long, value_name = "JSON")]
    pub filters_a: Option<String>,

    /// JSON file with filters for the first dataset
    #[arg(long, value_name = "FILE")]
    pub filters_a_file: Option<PathBuf>,

    /// Filters for the second dataset, as a JSON array
    #[arg(long, value_name = "JSON")]
    pub filters_b: Option<String>,

    /// JSON file with filters for the second dataset
    #[arg(long, value_name = "FILE")]
    pub filters_b_file: Option<PathBuf>,

    /// Column of the first dataset to total on both sides (repeatable)
    #[arg(short, long = "total", value_name = "COLUMN")]
    pub total: Vec<String>,

    /// Restrict both datasets to these columns (repeatable)
    #[arg(short, long = "columns", value_name = "COLUMN")]
    pub columns: Vec<String>,

    /// Minimum combined similarity for inferred mappings
    #[arg(long)]
    pub threshold: Option<f64>,
}

pub fn run(
    args: CompareArgs,
    format: OutputFormat,
    verbose: bool,
    config: &ReconConfig,
) -> anyhow::Result<()> {
    let mut config = config.clone();
    if let Some(threshold) = args.threshold {
        config.mapping.min_similarity = threshold;
    }

    let request = CompareRequest {
        mapping: if args.map.is_empty() {
            None
        } else {
            Some(ColumnMapping::parse_entries(&args.map)?)
        },
        filters_a: read_filters(args.filters_a.as_deref(), args.filters_a_file.as_deref())?,
        filters_b: read_filters(args.filters_b.as_deref(), args.filters_b_file.as_deref())?,
        selected_columns: args.columns.clone(),
        total_columns: args.total.clone(),
    };

    let dataset_a = load_input(&args.input_a, "Input A", verbose)?;
    let dataset_b = load_input(&args.input_b, "Input B", verbose)?;

    let result = compare(&dataset_a, &dataset_b, &request, &config)?;

    match format {
        OutputFormat::Text => print_text_comparison(&args, &result),
        OutputFormat::Json => print_json_comparison(&args, &result)?,
        OutputFormat::Tsv => print_tsv_comparison(&result),
    }

    Ok(())
}

fn print_text_comparison(args: &CompareArgs, result: &ComparisonResult) {
    println!("Comparison Results");
    println!("{}", "=".repeat(60));

    let dims = &result.dimensions;
    println!("\nInput A: {}", args.input_a.display());
    println!("  Rows: {}  Columns: {}", dims.a.rows, dims.a.columns);
    print_filter_summary(&result.filters_applied.report_a);

    println!("\nInput B: {}", args.input_b.display());
    println!("  Rows: {}  Columns: {}", dims.b.rows, dims.b.columns);
    print_filter_summary(&result.filters_applied.report_b);

    let info = &result.mapping_info;
    println!(
        "\nColumn mapping ({:?}, {} of {} / {} columns):",
        info.source, info.mapped_columns, info.original_columns_a, info.original_columns_b
    );
    for (a, b) in info.mapping.iter() {
        println!("  {a} -> {b}");
    }
    if !result.columns.only_in_a.is_empty() {
        println!("  Only in A: {}", result.columns.only_in_a.join(", "));
    }
    if !result.columns.only_in_b.is_empty() {
        println!("  Only in B: {}", result.columns.only_in_b.join(", "));
    }

    let rows = &result.unique_rows;
    println!("\nRow reconciliation ({}):", rows.strategy);
    for field in &rows.comparison_columns {
        println!("  Key: {field}");
    }
    if result.key_set.relaxed {
        println!("  Note: low-scoring key fields were used to reach the minimum count");
    }

    print_unique_rows("Only in A", &rows.only_in_a);
    print_unique_rows("Only in B", &rows.only_in_b);

    if let Some(totals) = &result.totals {
        println!("\nTotals:");
        if totals.columns.is_empty() {
            println!("  (no requested column is mapped)");
        }
        for (a, b) in totals.a.iter().zip(&totals.b) {
            print_totals_pair(a, b);
        }
    }

    if let Some(diff) = &result.cell_differences {
        println!("\nCell differences: {}", diff.total_differences);
        for d in &diff.differences {
            println!(
                "  row {} {}: '{}' vs '{}'",
                d.row,
                d.column,
                cell_text(&d.value_a),
                cell_text(&d.value_b)
            );
        }
        if diff.is_truncated() {
            println!(
                "  ... {} more",
                diff.total_differences - diff.differences.len()
            );
        }
        if diff.extra_rows_a > 0 {
            println!("  Extra rows in A: {}", diff.extra_rows_a);
        }
        if diff.extra_rows_b > 0 {
            println!("  Extra rows in B: {}", diff.extra_rows_b);
        }
    }
}

fn print_filter_summary(report: &FilterReport) {
    if report.applied == 0 && report.skipped.is_empty() {
        return;
    }
    println!(
        "  Filters: {} applied, {} skipped ({} -> {} rows)",
        report.applied,
        report.skipped.len(),
        report.original_rows,
        report.filtered_rows
    );
    for s in &report.skipped {
        println!("    skipped #{} ({}): {}", s.index + 1, s.filter, s.reason);
    }
}

fn print_unique_rows(label: &str, rows: &UniqueRows) {
    println!("\n{label}: {} row(s)", rows.count);
    if rows.sample.is_empty() {
        return;
    }
    print_table(&rows.sample);
    if rows.count > rows.sample.row_count() {
        println!("  ... {} more", rows.count - rows.sample.row_count());
    }
}

fn print_totals_pair(a: &ColumnTotals, b: &ColumnTotals) {
    println!(
        "  {} / {}: sum {:.2} vs {:.2} (diff {:.2}), count {} vs {}",
        a.column,
        b.column,
        a.sum,
        b.sum,
        a.sum - b.sum,
        a.count,
        b.count
    );
    for t in [a, b] {
        if let Some(err) = &t.error {
            println!("    {}: {err}", t.column);
        }
    }
}

fn print_json_comparison(args: &CompareArgs, result: &ComparisonResult) -> anyhow::Result<()> {
    let output = serde_json::json!({
        "input_a": args.input_a.display().to_string(),
        "input_b": args.input_b.display().to_string(),
        "result": result,
    });

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn print_tsv_comparison(result: &ComparisonResult) {
    println!(
        "rows_a\trows_b\tmapped_columns\tstrategy\tkey_fields\tonly_in_a\tonly_in_b\tcell_differences"
    );
    println!(
        "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
        result.dimensions.a.rows,
        result.dimensions.b.rows,
        result.dimensions.mapped_columns,
        result.unique_rows.strategy,
        result.unique_rows.comparison_columns.join("; "),
        result.unique_rows.only_in_a.count,
        result.unique_rows.only_in_b.count,
        result
            .cell_differences
            .as_ref()
            .map_or_else(String::new, |d| d.total_differences.to_string()),
    );
}
