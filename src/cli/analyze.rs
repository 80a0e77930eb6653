use std::path::PathBuf;

use clap::Args;

use crate::cli::{load_input, OutputFormat};
use crate::config::ReconConfig;
use crate::matching::engine::{MappingEngine, MappingResult};

#[derive(Args)]
pub struct AnalyzeArgs {
    /// First dataset (CSV, TSV, gzip-compressed CSV/TSV, or spreadsheet)
    #[arg(required = true)]
    pub input_a: PathBuf,

    /// Second dataset
    #[arg(required = true)]
    pub input_b: PathBuf,

    /// Minimum combined similarity for a column pair to be mapped
    #[arg(short, long)]
    pub threshold: Option<f64>,

    /// Also print the full similarity matrix
    #[arg(long)]
    pub matrix: bool,
}

pub fn run(
    args: AnalyzeArgs,
    format: OutputFormat,
    verbose: bool,
    config: &ReconConfig,
) -> anyhow::Result<()> {
    if let Some(threshold) = args.threshold {
        if !(0.0..=1.0).contains(&threshold) {
            anyhow::bail!("Threshold must be between 0 and 1, got {threshold}");
        }
    }

    let dataset_a = load_input(&args.input_a, "Input A", verbose)?;
    let dataset_b = load_input(&args.input_b, "Input B", verbose)?;

    let mut engine = MappingEngine::with_config(config);
    if let Some(threshold) = args.threshold {
        engine = engine.with_threshold(threshold);
    }
    let result = engine.analyze(&dataset_a, &dataset_b);

    match format {
        OutputFormat::Text => print_text_analysis(&args, &result),
        OutputFormat::Json => print_json_analysis(&args, &result)?,
        OutputFormat::Tsv => print_tsv_analysis(&args, &result),
    }

    Ok(())
}

fn print_text_analysis(args: &AnalyzeArgs, result: &MappingResult) {
    println!("Column Mapping");
    println!("{}", "=".repeat(60));

    println!("\nInput A: {}", args.input_a.display());
    println!("Input B: {}", args.input_b.display());
    println!("Threshold: {:.2}", result.threshold);

    println!("\nMapped columns ({}):", result.assignments.len());
    if result.assignments.is_empty() {
        println!("  (none)");
    }
    for m in &result.assignments {
        println!(
            "  {} -> {}  (combined {:.3}, name {:.3}, content {:.3})",
            m.column_a, m.column_b, m.score.combined, m.score.name, m.score.content
        );
    }

    if !result.unmapped_a.is_empty() {
        println!("\nUnmapped in A: {}", result.unmapped_a.join(", "));
    }
    if !result.unmapped_b.is_empty() {
        println!("Unmapped in B: {}", result.unmapped_b.join(", "));
    }

    println!("\nProfiles:");
    for (side, profiles) in [("A", &result.profiles_a), ("B", &result.profiles_b)] {
        for p in profiles {
            let patterns: Vec<String> = p.patterns.iter().map(ToString::to_string).collect();
            let patterns = if patterns.is_empty() {
                String::new()
            } else {
                format!(" [{}]", patterns.join(", "))
            };
            println!("  {side}.{}: {}{}", p.column, p.content_type, patterns);
        }
    }

    if args.matrix {
        let matrix = &result.similarity_matrix;
        println!("\nSimilarity matrix (combined):");
        println!("  A \\ B\t{}", matrix.columns_b.join("\t"));
        for (i, column_a) in matrix.columns_a.iter().enumerate() {
            let cells: Vec<String> = matrix.scores[i]
                .iter()
                .map(|s| format!("{:.3}", s.combined))
                .collect();
            println!("  {column_a}\t{}", cells.join("\t"));
        }
    }
}

fn print_json_analysis(args: &AnalyzeArgs, result: &MappingResult) -> anyhow::Result<()> {
    let mut output = serde_json::json!({
        "input_a": args.input_a.display().to_string(),
        "input_b": args.input_b.display().to_string(),
        "threshold": result.threshold,
        "mapping": result.mapping,
        "assignments": result.assignments,
        "unmapped_a": result.unmapped_a,
        "unmapped_b": result.unmapped_b,
        "profiles_a": result.profiles_a,
        "profiles_b": result.profiles_b,
    });
    if args.matrix {
        output["similarity_matrix"] = serde_json::to_value(&result.similarity_matrix)?;
    }

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn print_tsv_analysis(args: &AnalyzeArgs, result: &MappingResult) {
    if args.matrix {
        println!("column_a\tcolumn_b\tname\tcontent\tcombined\tmapped");
        let matrix = &result.similarity_matrix;
        for (i, column_a) in matrix.columns_a.iter().enumerate() {
            for (j, column_b) in matrix.columns_b.iter().enumerate() {
                let s = &matrix.scores[i][j];
                let mapped = result.mapping.target(column_a) == Some(column_b.as_str());
                println!(
                    "{column_a}\t{column_b}\t{:.4}\t{:.4}\t{:.4}\t{mapped}",
                    s.name, s.content, s.combined
                );
            }
        }
        return;
    }

    println!("column_a\tcolumn_b\tname\tcontent\tcombined");
    for m in &result.assignments {
        println!(
            "{}\t{}\t{:.4}\t{:.4}\t{:.4}",
            m.column_a, m.column_b, m.score.name, m.score.content, m.score.combined
        );
    }
}
