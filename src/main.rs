use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod config;
mod core;
mod matching;
mod parsing;
mod query;
mod reconcile;
mod utils;

fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();

    // Initialize logging based on verbosity flag
    let filter = if cli.verbose {
        EnvFilter::new("sheet_recon=debug,info")
    } else {
        EnvFilter::new("sheet_recon=warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    let config = cli::load_config(cli.config.as_deref())?;

    match cli.command {
        cli::Commands::Analyze(args) => {
            cli::analyze::run(args, cli.format, cli.verbose, &config)?;
        }
        cli::Commands::Keys(args) => {
            cli::keys::run(args, cli.format, cli.verbose, &config)?;
        }
        cli::Commands::Compare(args) => {
            cli::compare::run(args, cli.format, cli.verbose, &config)?;
        }
        cli::Commands::Filter(args) => {
            cli::filter::run(args, cli.format, cli.verbose, &config)?;
        }
        cli::Commands::Totals(args) => {
            cli::totals::run(args, cli.format, cli.verbose, &config)?;
        }
        cli::Commands::Preview(args) => {
            cli::preview::run(args, cli.format, cli.verbose, &config)?;
        }
    }

    Ok(())
}
