use std::path::PathBuf;

use clap::Args;

use crate::cli::{load_input, OutputFormat};
use crate::config::ReconConfig;
use crate::query::aggregate::{aggregate, ColumnTotals};

#[derive(Args)]
pub struct TotalsArgs {
    /// Dataset to aggregate
    #[arg(required = true)]
    pub input: PathBuf,

    /// Columns to total; all numeric columns when omitted
    pub columns: Vec<String>,
}

pub fn run(
    args: TotalsArgs,
    format: OutputFormat,
    verbose: bool,
    _config: &ReconConfig,
) -> anyhow::Result<()> {
    let dataset = load_input(&args.input, "Input", verbose)?;

    let columns: Vec<String> = if args.columns.is_empty() {
        dataset
            .numeric_columns()
            .into_iter()
            .map(String::from)
            .collect()
    } else {
        args.columns.clone()
    };
    let totals = aggregate(&dataset, &columns);

    match format {
        OutputFormat::Text => print_text_totals(&args, &totals),
        OutputFormat::Json => print_json_totals(&args, &totals)?,
        OutputFormat::Tsv => print_tsv_totals(&totals),
    }

    Ok(())
}

fn print_text_totals(args: &TotalsArgs, totals: &[ColumnTotals]) {
    println!("Column Totals");
    println!("{}", "=".repeat(60));
    println!("\nInput: {}", args.input.display());

    if totals.is_empty() {
        println!("\nNo numeric columns.");
        return;
    }

    for t in totals {
        println!("\n{}:", t.column);
        if let Some(err) = &t.error {
            println!("  Error: {err}");
            continue;
        }
        println!("  Sum:   {:.2}", t.sum);
        println!("  Count: {}", t.count);
        println!("  Mean:  {:.2}", t.mean);
        println!("  Min:   {:.2}", t.min);
        println!("  Max:   {:.2}", t.max);
    }
}

fn print_json_totals(args: &TotalsArgs, totals: &[ColumnTotals]) -> anyhow::Result<()> {
    let output = serde_json::json!({
        "input": args.input.display().to_string(),
        "totals": totals,
    });

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn print_tsv_totals(totals: &[ColumnTotals]) {
    println!("column\tsum\tcount\tmean\tmin\tmax\terror");
    for t in totals {
        println!(
            "{}\t{}\t{}\t{}\t{}\t{}\t{}",
            t.column,
            t.sum,
            t.count,
            t.mean,
            t.min,
            t.max,
            t.error.as_deref().unwrap_or("")
        );
    }
}
