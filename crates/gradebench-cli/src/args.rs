//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use gradebench_eval::ReportFormat;

#[derive(Parser)]
#[command(name = "gradebench")]
#[command(about = "Calibrated pass-rate harness for tool-using code generation agents")]
#[command(version)]
pub struct Cli {
    /// Enable debug logging
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Log output format
    #[arg(long, value_enum, default_value = "text", global = true)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

fn parse_report_format(value: &str) -> Result<ReportFormat, String> {
    ReportFormat::from_str(value).ok_or_else(|| {
        format!("unknown report format '{}' (expected table, markdown or json)", value)
    })
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run an evaluation against the configured model
    Run(RunArgs),

    /// Grade a source file offline
    Grade(GradeArgs),

    /// Grade the built-in reference solution
    Selfcheck {
        /// Grade the embedded Python reference through the Python runtime
        #[arg(long)]
        python: bool,

        /// Path to configuration file
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// List the hidden vectors with their expected outcomes
    Vectors {
        /// Path to configuration file
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Number of trials
    #[arg(long, short = 'n')]
    pub trials: Option<usize>,

    /// Run trials one at a time, printing each summary as it completes
    #[arg(long)]
    pub sequential: bool,

    /// Grading mode: strict or calibration
    #[arg(long)]
    pub mode: Option<String>,

    /// Provider requests per trial
    #[arg(long)]
    pub max_steps: Option<usize>,

    /// Cap on concurrently running trials
    #[arg(long)]
    pub max_concurrency: Option<usize>,

    /// Model identifier
    #[arg(long)]
    pub model: Option<String>,

    /// Report format: table, markdown or json
    #[arg(long, short, default_value = "table", value_parser = parse_report_format)]
    pub format: ReportFormat,

    /// Path to configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct GradeArgs {
    /// Source file to grade
    pub file: PathBuf,

    /// Grading mode: strict or calibration
    #[arg(long)]
    pub mode: Option<String>,

    /// Path to configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Print the grade report as JSON
    #[arg(long)]
    pub json: bool,
}
