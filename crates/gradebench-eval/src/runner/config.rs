//! Evaluation configuration
//!
//! Layered as defaults, then a config file, then environment variables, then
//! whatever the caller (usually the CLI) overrides.

use std::fs;
use std::path::{Path, PathBuf};

use gradebench_core::{
    HarnessError, HarnessResult, ModelConfig, PythonConfig, RetryPolicy, SessionOptions,
};
use serde::{Deserialize, Serialize};

use crate::grading::GradingMode;
use crate::metrics::CalibrationBand;
use crate::tasks::{DriftOracle, DriftThresholds, TaskPrompt, VectorSet};

/// Config file picked up from the working directory when none is given
pub const DEFAULT_CONFIG_FILE: &str = "gradebench.toml";

/// How trials are scheduled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Schedule {
    /// All trials run concurrently; summaries are emitted at the end
    #[default]
    Parallel,
    /// One trial at a time; each summary is emitted as it completes
    Sequential,
}

impl std::fmt::Display for Schedule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Schedule::Parallel => write!(f, "parallel"),
            Schedule::Sequential => write!(f, "sequential"),
        }
    }
}

/// Configuration for evaluation runs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvalConfig {
    /// Number of trials
    #[serde(default = "default_trials")]
    pub trials: usize,

    #[serde(default)]
    pub schedule: Schedule,

    /// Provider requests per session
    #[serde(default = "default_max_steps")]
    pub max_steps: usize,

    /// Cap on concurrently running trials (unbounded when absent)
    #[serde(default)]
    pub max_concurrency: Option<usize>,

    #[serde(default)]
    pub grading: GradingMode,

    /// Target pass-rate band
    #[serde(default)]
    pub target_band: CalibrationBand,

    #[serde(default)]
    pub thresholds: DriftThresholds,

    /// Relative tolerance for impact figures
    #[serde(default = "default_impact_tolerance")]
    pub impact_tolerance: f64,

    #[serde(default)]
    pub python: PythonConfig,

    #[serde(default)]
    pub retry: RetryPolicy,

    #[serde(default)]
    pub model: ModelConfig,

    /// Replacement prompt text
    #[serde(default)]
    pub prompt_file: Option<PathBuf>,
}

fn default_trials() -> usize {
    10
}

fn default_max_steps() -> usize {
    20
}

fn default_impact_tolerance() -> f64 {
    0.02
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            trials: default_trials(),
            schedule: Schedule::default(),
            max_steps: default_max_steps(),
            max_concurrency: None,
            grading: GradingMode::default(),
            target_band: CalibrationBand::default(),
            thresholds: DriftThresholds::default(),
            impact_tolerance: default_impact_tolerance(),
            python: PythonConfig::default(),
            retry: RetryPolicy::default(),
            model: ModelConfig::default(),
            prompt_file: None,
        }
    }
}

impl EvalConfig {
    /// Load from `path`, or from [`DEFAULT_CONFIG_FILE`] if present, then apply
    /// the process environment.
    pub fn load(path: Option<&Path>) -> HarnessResult<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_FILE))?
            }
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Parse a config file; the format follows the extension (TOML, YAML, else JSON)
    pub fn from_file(path: &Path) -> HarnessResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            HarnessError::config_with_context(
                format!("Failed to read config file: {}", e),
                format!("Reading configuration from '{}'", path.display()),
            )
        })?;

        let config = match path.extension().and_then(|s| s.to_str()) {
            Some("toml") => toml::from_str(&content).map_err(|e| {
                HarnessError::config_with_context(
                    format!("Failed to parse TOML config: {}", e),
                    format!("Deserializing TOML configuration from '{}'", path.display()),
                )
            })?,
            Some("yaml") | Some("yml") => serde_yaml::from_str(&content).map_err(|e| {
                HarnessError::config_with_context(
                    format!("Failed to parse YAML config: {}", e),
                    format!("Deserializing YAML configuration from '{}'", path.display()),
                )
            })?,
            _ => serde_json::from_str(&content).map_err(|e| {
                HarnessError::config_with_context(
                    format!("Failed to parse JSON config: {}", e),
                    format!("Deserializing JSON configuration from '{}'", path.display()),
                )
            })?,
        };

        Ok(config)
    }

    /// Overlay environment variables read through `lookup`
    pub fn apply_env<F>(&mut self, lookup: F) -> HarnessResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(api_key) = lookup("ANTHROPIC_API_KEY").filter(|v| !v.is_empty()) {
            self.model.api_key = Some(api_key);
        }
        if let Some(base_url) = lookup("ANTHROPIC_BASE_URL").filter(|v| !v.is_empty()) {
            self.model.base_url = base_url;
        }
        if let Some(model) = lookup("GRADEBENCH_MODEL").filter(|v| !v.is_empty()) {
            self.model.model = model;
        }
        if let Some(trials) = lookup("GRADEBENCH_TRIALS") {
            self.trials = trials
                .parse()
                .map_err(|_| HarnessError::config("Invalid GRADEBENCH_TRIALS value"))?;
        }
        if let Some(max_steps) = lookup("GRADEBENCH_MAX_STEPS") {
            self.max_steps = max_steps
                .parse()
                .map_err(|_| HarnessError::config("Invalid GRADEBENCH_MAX_STEPS value"))?;
        }
        Ok(())
    }

    /// Set number of trials
    pub fn with_trials(mut self, trials: usize) -> Self {
        self.trials = trials;
        self
    }

    pub fn with_schedule(mut self, schedule: Schedule) -> Self {
        self.schedule = schedule;
        self
    }

    /// Set max steps per session
    pub fn with_max_steps(mut self, steps: usize) -> Self {
        self.max_steps = steps;
        self
    }

    pub fn with_max_concurrency(mut self, limit: usize) -> Self {
        self.max_concurrency = Some(limit);
        self
    }

    pub fn with_grading(mut self, grading: GradingMode) -> Self {
        self.grading = grading;
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model.model = model.into();
        self
    }

    /// Session limits derived from this config
    pub fn session_options(&self) -> SessionOptions {
        SessionOptions::default()
            .with_max_steps(self.max_steps)
            .with_retry(self.retry.clone())
    }

    /// Hidden vectors for the configured thresholds
    pub fn vector_set(&self) -> VectorSet {
        VectorSet::build(&DriftOracle::new(self.thresholds.clone()), self.impact_tolerance)
    }

    /// The prompt from `prompt_file`, or the built-in one
    pub fn prompt(&self) -> anyhow::Result<TaskPrompt> {
        match &self.prompt_file {
            Some(path) => TaskPrompt::from_file(path),
            None => Ok(TaskPrompt::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::time::Duration;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = EvalConfig::default();
        assert_eq!(config.trials, 10);
        assert_eq!(config.max_steps, 20);
        assert_eq!(config.schedule, Schedule::Parallel);
        assert_eq!(config.grading, GradingMode::Strict);
        assert!(config.max_concurrency.is_none());
        assert_eq!(config.python.program, "python3");
    }

    #[test]
    fn test_config_builder() {
        let config = EvalConfig::default()
            .with_trials(3)
            .with_schedule(Schedule::Sequential)
            .with_max_steps(5)
            .with_max_concurrency(2)
            .with_grading(GradingMode::calibration())
            .with_model("claude-test");

        assert_eq!(config.trials, 3);
        assert_eq!(config.schedule, Schedule::Sequential);
        assert_eq!(config.max_steps, 5);
        assert_eq!(config.max_concurrency, Some(2));
        assert_eq!(config.grading.label(), "calibration");
        assert_eq!(config.model.model, "claude-test");
    }

    #[test]
    fn test_load_toml_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("gradebench.toml");
        fs::write(
            &path,
            r#"
trials = 4
schedule = "sequential"

[grading]
mode = "calibration"

[grading.bands.impact]
min_passed = 1
max_passed = 4

[target_band]
low = 0.2
high = 0.5

[python]
eval_timeout = "30s"

[retry]
abort_on_terminal = true
"#,
        )
        .unwrap();

        let config = EvalConfig::from_file(&path).unwrap();
        assert_eq!(config.trials, 4);
        assert_eq!(config.schedule, Schedule::Sequential);
        assert_eq!(config.max_steps, 20);
        assert_eq!(config.target_band, CalibrationBand::new(0.2, 0.5));
        assert_eq!(config.python.eval_timeout, Some(Duration::from_secs(30)));
        assert!(config.retry.abort_on_terminal);
        match config.grading {
            GradingMode::Calibration { bands } => {
                assert_eq!(bands.impact.min_passed, 1);
                assert_eq!(bands.action.max_passed, 6);
            }
            other => panic!("unexpected mode {:?}", other),
        }
    }

    #[test]
    fn test_load_json_file_with_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.json");
        fs::write(&path, r#"{"max_steps": 7, "thresholds": {"covariate_shift": 0.25}}"#).unwrap();

        let config = EvalConfig::from_file(&path).unwrap();
        assert_eq!(config.max_steps, 7);
        assert_eq!(config.trials, 10);
        assert_eq!(config.thresholds.covariate_shift, 0.25);
        assert_eq!(config.thresholds.concept_quality_drop, 0.10);
    }

    #[test]
    fn test_load_yaml_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.yaml");
        fs::write(&path, "trials: 2\nmax_concurrency: 1\n").unwrap();

        let config = EvalConfig::from_file(&path).unwrap();
        assert_eq!(config.trials, 2);
        assert_eq!(config.max_concurrency, Some(1));
    }

    #[test]
    fn test_invalid_file_is_config_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("broken.toml");
        fs::write(&path, "trials = [").unwrap();
        let err = EvalConfig::from_file(&path).unwrap_err();
        assert_eq!(err.error_code(), "GB_CONFIG");

        let missing = EvalConfig::from_file(&temp_dir.path().join("absent.json")).unwrap_err();
        assert_eq!(missing.error_code(), "GB_CONFIG");
    }

    #[test]
    fn test_apply_env() {
        let vars: HashMap<&str, &str> = [
            ("ANTHROPIC_API_KEY", "sk-env"),
            ("GRADEBENCH_MODEL", "claude-env"),
            ("GRADEBENCH_TRIALS", "3"),
        ]
        .into_iter()
        .collect();

        let mut config = EvalConfig::default();
        config
            .apply_env(|key| vars.get(key).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.model.api_key.as_deref(), Some("sk-env"));
        assert_eq!(config.model.model, "claude-env");
        assert_eq!(config.trials, 3);
        assert_eq!(config.max_steps, 20);
    }

    #[test]
    fn test_apply_env_rejects_bad_numbers() {
        let mut config = EvalConfig::default();
        let err = config
            .apply_env(|key| (key == "GRADEBENCH_MAX_STEPS").then(|| "many".to_string()))
            .unwrap_err();
        assert!(err.to_string().contains("GRADEBENCH_MAX_STEPS"));
    }
}
