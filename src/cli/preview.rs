use std::path::PathBuf;

use clap::Args;

use crate::cli::{load_input, print_table, print_tsv_table, OutputFormat};
use crate::config::ReconConfig;
use crate::query::preview::{preview, DatasetPreview};

#[derive(Args)]
pub struct PreviewArgs {
    /// Datasets to preview
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Rows to show (defaults to the configured preview size)
    #[arg(short = 'n', long)]
    pub rows: Option<usize>,
}

pub fn run(
    args: PreviewArgs,
    format: OutputFormat,
    verbose: bool,
    config: &ReconConfig,
) -> anyhow::Result<()> {
    let rows = args.rows.unwrap_or(config.output.preview_rows);

    let mut previews = Vec::with_capacity(args.inputs.len());
    for path in &args.inputs {
        let dataset = load_input(path, "Input", verbose)?;
        previews.push((path, preview(&dataset, rows)));
    }

    match format {
        OutputFormat::Text => {
            for (path, p) in &previews {
                print_text_preview(path, p);
            }
        }
        OutputFormat::Json => {
            let output: Vec<serde_json::Value> = previews
                .iter()
                .map(|(path, p)| {
                    serde_json::json!({
                        "input": path.display().to_string(),
                        "preview": p,
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Tsv => {
            for (_, p) in &previews {
                print_tsv_table(&p.sample);
            }
        }
    }

    Ok(())
}

fn print_text_preview(path: &std::path::Path, p: &DatasetPreview) {
    println!("{}", path.display());
    println!("{}", "=".repeat(60));
    println!("  Rows: {}", p.total_rows);
    println!("  Columns ({}): {}", p.columns.len(), p.columns.join(", "));
    if !p.numeric_columns.is_empty() {
        println!("  Numeric: {}", p.numeric_columns.join(", "));
    }
    if !p.sample.is_empty() {
        println!();
        print_table(&p.sample);
    }
    println!();
}
