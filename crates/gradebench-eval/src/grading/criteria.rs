//! Pass criteria for a graded function

use serde::{Deserialize, Serialize};

use crate::tasks::FunctionKey;

/// Inclusive range of satisfied-vector counts that counts as a pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcceptanceBand {
    pub min_passed: usize,
    pub max_passed: usize,
}

impl AcceptanceBand {
    pub const fn new(min_passed: usize, max_passed: usize) -> Self {
        Self {
            min_passed,
            max_passed,
        }
    }

    pub fn contains(&self, passed: usize) -> bool {
        (self.min_passed..=self.max_passed).contains(&passed)
    }
}

impl std::fmt::Display for AcceptanceBand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}..={}", self.min_passed, self.max_passed)
    }
}

/// Per-function bands for calibration grading
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationBands {
    #[serde(default = "default_covariate_band")]
    pub detect_covariate: AcceptanceBand,
    #[serde(default = "default_concept_band")]
    pub detect_concept: AcceptanceBand,
    #[serde(default = "default_classify_band")]
    pub classify: AcceptanceBand,
    #[serde(default = "default_impact_band")]
    pub impact: AcceptanceBand,
    #[serde(default = "default_action_band")]
    pub action: AcceptanceBand,
}

fn default_covariate_band() -> AcceptanceBand {
    AcceptanceBand::new(3, 5)
}

fn default_concept_band() -> AcceptanceBand {
    AcceptanceBand::new(3, 5)
}

fn default_classify_band() -> AcceptanceBand {
    AcceptanceBand::new(5, 7)
}

fn default_impact_band() -> AcceptanceBand {
    AcceptanceBand::new(2, 3)
}

fn default_action_band() -> AcceptanceBand {
    AcceptanceBand::new(4, 6)
}

impl Default for CalibrationBands {
    fn default() -> Self {
        Self {
            detect_covariate: default_covariate_band(),
            detect_concept: default_concept_band(),
            classify: default_classify_band(),
            impact: default_impact_band(),
            action: default_action_band(),
        }
    }
}

impl CalibrationBands {
    pub fn band_for(&self, key: FunctionKey) -> AcceptanceBand {
        match key {
            FunctionKey::DetectCovariate => self.detect_covariate,
            FunctionKey::DetectConcept => self.detect_concept,
            FunctionKey::Classify => self.classify,
            FunctionKey::Impact => self.impact,
            FunctionKey::Action => self.action,
        }
    }
}

/// How vector outcomes turn into a function verdict
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum GradingMode {
    /// Every vector must hold
    #[default]
    Strict,
    /// The satisfied count must fall inside the function's band
    Calibration {
        #[serde(default)]
        bands: CalibrationBands,
    },
}

impl GradingMode {
    /// Calibration mode with the default bands
    pub fn calibration() -> Self {
        GradingMode::Calibration {
            bands: CalibrationBands::default(),
        }
    }

    /// Short label for reports
    pub fn label(&self) -> &'static str {
        match self {
            GradingMode::Strict => "strict",
            GradingMode::Calibration { .. } => "calibration",
        }
    }

    /// Verdict and reason for one function given per-vector outcomes in order
    pub fn judge(&self, key: FunctionKey, outcomes: &[bool]) -> (bool, String) {
        let total = outcomes.len();
        let passed = outcomes.iter().filter(|ok| **ok).count();
        match self {
            GradingMode::Strict => {
                if passed == total {
                    (true, format!("all {} vectors passed", total))
                } else {
                    let failed: Vec<usize> = outcomes
                        .iter()
                        .enumerate()
                        .filter(|(_, ok)| !**ok)
                        .map(|(i, _)| i + 1)
                        .collect();
                    (false, format!("failed vectors: {:?}", failed))
                }
            }
            GradingMode::Calibration { bands } => {
                let band = bands.band_for(key);
                (
                    band.contains(passed),
                    format!("passed {}/{} vectors (band {})", passed, total, band),
                )
            }
        }
    }
}

impl std::str::FromStr for GradingMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "strict" => Ok(GradingMode::Strict),
            "calibration" | "calibrated" => Ok(GradingMode::calibration()),
            other => Err(format!("unknown grading mode: {}", other)),
        }
    }
}
