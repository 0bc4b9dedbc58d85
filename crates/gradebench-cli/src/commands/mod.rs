//! Subcommand handlers

pub mod grade;
pub mod run;
pub mod selfcheck;
pub mod vectors;

use std::path::Path;

use anyhow::{Result, anyhow};
use gradebench_eval::{EvalConfig, GradingMode};

/// Load config (explicit path, `gradebench.toml`, or defaults) plus environment
pub(crate) fn load_config(path: Option<&Path>) -> Result<EvalConfig> {
    Ok(EvalConfig::load(path)?)
}

/// Parse a `--mode` flag
pub(crate) fn parse_mode(mode: &str) -> Result<GradingMode> {
    mode.parse::<GradingMode>().map_err(|e| anyhow!(e))
}
