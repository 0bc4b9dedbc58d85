//! Gradebench CLI
//!
//! Runs calibrated evaluations of a tool-using model on the drift-detection
//! coding task, and grades submissions offline.
//!
//! - `gradebench run`: run N trials against the configured model and report
//! - `gradebench grade <FILE>`: grade a source file without a model
//! - `gradebench selfcheck`: grade the built-in reference solution
//! - `gradebench vectors`: list the hidden vectors and their expectations

mod args;
mod commands;
mod console;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use args::{Cli, Commands, LogFormat};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.log_format);

    match cli.command {
        Commands::Run(args) => commands::run::execute(args).await,
        Commands::Grade(args) => commands::grade::execute(args).await,
        Commands::Selfcheck { python, config } => {
            commands::selfcheck::execute(python, config.as_deref()).await
        }
        Commands::Vectors { config } => commands::vectors::execute(config.as_deref()),
    }
}

/// RUST_LOG wins; otherwise warn, or debug with `--verbose`
fn init_logging(verbose: bool, format: LogFormat) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}
