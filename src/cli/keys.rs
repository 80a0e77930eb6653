use std::path::PathBuf;

use clap::Args;

use crate::cli::{load_input, OutputFormat};
use crate::config::ReconConfig;
use crate::matching::engine::MappingEngine;
use crate::matching::mapping::ColumnMapping;
use crate::reconcile::keys::{select_keys, KeyFieldScore, SelectedKeySet};

#[derive(Args)]
pub struct KeysArgs {
    /// First dataset
    #[arg(required = true)]
    pub input_a: PathBuf,

    /// Second dataset
    #[arg(required = true)]
    pub input_b: PathBuf,

    /// Column pair `a=b` to score (repeatable); inferred when omitted
    #[arg(short, long = "map", value_name = "A=B")]
    pub map: Vec<String>,

    /// Minimum number of key fields
    #[arg(long)]
    pub min_fields: Option<usize>,

    /// Maximum number of key fields
    #[arg(long)]
    pub max_fields: Option<usize>,

    /// Minimum combined score (0-100) for a field to be selected
    #[arg(long)]
    pub min_key_score: Option<f64>,
}

impl KeysArgs {
    /// Apply the command-line overrides on top of the loaded config
    fn effective_config(&self, config: &ReconConfig) -> anyhow::Result<ReconConfig> {
        let mut config = config.clone();
        if let Some(n) = self.min_fields {
            config.key_selection.min_fields = n;
        }
        if let Some(n) = self.max_fields {
            config.key_selection.max_fields = n;
        }
        if let Some(score) = self.min_key_score {
            config.key_selection.min_score = score;
        }
        config.validate()?;
        Ok(config)
    }
}

pub fn run(
    args: KeysArgs,
    format: OutputFormat,
    verbose: bool,
    config: &ReconConfig,
) -> anyhow::Result<()> {
    let config = args.effective_config(config)?;

    let dataset_a = load_input(&args.input_a, "Input A", verbose)?;
    let dataset_b = load_input(&args.input_b, "Input B", verbose)?;

    let mapping = if args.map.is_empty() {
        MappingEngine::with_config(&config)
            .analyze(&dataset_a, &dataset_b)
            .mapping
    } else {
        ColumnMapping::parse_entries(&args.map)?
    };

    if verbose {
        eprintln!("Scoring {} mapped column pair(s)", mapping.len());
    }

    let keys = select_keys(
        &mapping,
        &dataset_a,
        &dataset_b,
        &config.key_scoring,
        &config.key_selection,
    );

    match format {
        OutputFormat::Text => print_text_keys(&keys),
        OutputFormat::Json => print_json_keys(&mapping, &keys)?,
        OutputFormat::Tsv => print_tsv_keys(&keys),
    }

    Ok(())
}

fn is_selected(keys: &SelectedKeySet, candidate: &KeyFieldScore) -> bool {
    keys.fields
        .iter()
        .any(|f| f.column_a == candidate.column_a && f.column_b == candidate.column_b)
}

fn print_text_keys(keys: &SelectedKeySet) {
    println!("Key Fields");
    println!("{}", "=".repeat(60));

    if keys.candidates.is_empty() {
        println!("\nNo mapped columns to score.");
        return;
    }

    println!("\nSelected ({}):", keys.len());
    for (i, field) in keys.fields.iter().enumerate() {
        println!("  {}. {}", i + 1, field.description());
    }
    if keys.relaxed {
        println!("  (fields below the minimum score were added to reach the minimum count)");
    }

    println!("\nCandidates:");
    for c in &keys.candidates {
        let marker = if is_selected(keys, c) { "*" } else { " " };
        println!("  {marker} {}", c.description());
        for s in [&c.score_a, &c.score_b] {
            println!(
                "      {}: completeness {:.1}, uniqueness {:.1}, type {:.1}, consistency {:.1}, distribution {:.1} = {:.1}",
                s.column,
                s.completeness,
                s.uniqueness,
                s.type_bonus,
                s.consistency_bonus,
                s.distribution_bonus,
                s.total
            );
        }
    }
}

fn print_json_keys(mapping: &ColumnMapping, keys: &SelectedKeySet) -> anyhow::Result<()> {
    let output = serde_json::json!({
        "mapping": mapping,
        "selected": keys.descriptions(),
        "relaxed": keys.relaxed,
        "fields": keys.fields,
        "candidates": keys.candidates,
    });

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn print_tsv_keys(keys: &SelectedKeySet) {
    println!("column_a\tcolumn_b\tscore_a\tscore_b\tcombined\tselected");
    for c in &keys.candidates {
        println!(
            "{}\t{}\t{:.2}\t{:.2}\t{:.2}\t{}",
            c.column_a,
            c.column_b,
            c.score_a.total,
            c.score_b.total,
            c.combined,
            is_selected(keys, c)
        );
    }
}
