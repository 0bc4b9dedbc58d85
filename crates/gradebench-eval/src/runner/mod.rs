//! Evaluation runner components
//!
//! Configuration plus the orchestrator that runs trials and aggregates them.

mod config;
mod orchestrator;

pub use config::{DEFAULT_CONFIG_FILE, EvalConfig, Schedule};
pub use orchestrator::{Orchestrator, ProgressCallback};
