//! Reference semantics for the five graded functions
//!
//! Expected vector outcomes are computed from these definitions, never typed
//! in by hand. All threshold comparisons are inclusive.

use serde::{Deserialize, Serialize};

/// Slack applied to inclusive comparisons so decimal boundaries such as
/// `(0.9 - 0.81) / 0.9 >= 0.1` hold in binary floating point.
pub const BOUNDARY_EPSILON: f64 = 1e-9;

/// Tunable oracle thresholds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriftThresholds {
    /// Minimum relative mean shift for covariate drift
    #[serde(default = "default_covariate_shift")]
    pub covariate_shift: f64,

    /// Maximum relative quality movement (either direction) for covariate drift
    #[serde(default = "default_covariate_quality_band")]
    pub covariate_quality_band: f64,

    /// Minimum relative quality drop for concept drift
    #[serde(default = "default_concept_quality_drop")]
    pub concept_quality_drop: f64,

    /// Maximum relative mean shift for concept drift
    #[serde(default = "default_concept_input_band")]
    pub concept_input_band: f64,

    /// Highest severity answered with MONITOR
    #[serde(default = "default_monitor_max")]
    pub monitor_max: f64,

    /// Highest severity answered with INVESTIGATE
    #[serde(default = "default_investigate_max")]
    pub investigate_max: f64,

    /// Highest severity answered with RETRAIN
    #[serde(default = "default_retrain_max")]
    pub retrain_max: f64,
}

fn default_covariate_shift() -> f64 {
    0.20
}

fn default_covariate_quality_band() -> f64 {
    0.05
}

fn default_concept_quality_drop() -> f64 {
    0.10
}

fn default_concept_input_band() -> f64 {
    0.02
}

fn default_monitor_max() -> f64 {
    0.3
}

fn default_investigate_max() -> f64 {
    0.5
}

fn default_retrain_max() -> f64 {
    0.9
}

impl Default for DriftThresholds {
    fn default() -> Self {
        Self {
            covariate_shift: default_covariate_shift(),
            covariate_quality_band: default_covariate_quality_band(),
            concept_quality_drop: default_concept_quality_drop(),
            concept_input_band: default_concept_input_band(),
            monitor_max: default_monitor_max(),
            investigate_max: default_investigate_max(),
            retrain_max: default_retrain_max(),
        }
    }
}

/// Drift classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DriftType {
    Covariate,
    Concept,
    Both,
    None,
}

impl DriftType {
    /// Lowercase label
    pub fn as_str(&self) -> &'static str {
        match self {
            DriftType::Covariate => "covariate",
            DriftType::Concept => "concept",
            DriftType::Both => "both",
            DriftType::None => "none",
        }
    }
}

/// Recommended response to drift
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ResponseAction {
    Monitor,
    Investigate,
    Retrain,
    Escalate,
}

impl ResponseAction {
    /// Uppercase label
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseAction::Monitor => "MONITOR",
            ResponseAction::Investigate => "INVESTIGATE",
            ResponseAction::Retrain => "RETRAIN",
            ResponseAction::Escalate => "ESCALATE",
        }
    }
}

/// Cost of a blind period
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DriftImpact {
    pub predictions_affected: f64,
    pub errors: f64,
    pub financial_impact: f64,
}

/// `|b - a| / |a|`; zero baseline yields 0 for no change and infinity otherwise
pub fn relative_change(a: f64, b: f64) -> f64 {
    if a == 0.0 {
        if b == 0.0 { 0.0 } else { f64::INFINITY }
    } else {
        (b - a).abs() / a.abs()
    }
}

/// Signed relative drop from `before` to `after`; negative for improvement
pub fn relative_drop(before: f64, after: f64) -> f64 {
    if before == 0.0 {
        if after < before { f64::INFINITY } else { 0.0 }
    } else {
        (before - after) / before.abs()
    }
}

/// Arithmetic mean; an empty slice averages to zero
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

fn at_least(value: f64, threshold: f64) -> bool {
    value >= threshold - BOUNDARY_EPSILON
}

fn at_most(value: f64, threshold: f64) -> bool {
    value <= threshold + BOUNDARY_EPSILON
}

/// The reference implementation of the task
#[derive(Debug, Clone, Default)]
pub struct DriftOracle {
    thresholds: DriftThresholds,
}

impl DriftOracle {
    pub fn new(thresholds: DriftThresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &DriftThresholds {
        &self.thresholds
    }

    /// Input moved enough while quality held steady
    pub fn detect_covariate(&self, before: &[f64], after: &[f64], q_before: f64, q_after: f64) -> bool {
        let shift = relative_change(mean(before), mean(after));
        let quality_change = relative_change(q_before, q_after);
        at_least(shift, self.thresholds.covariate_shift)
            && at_most(quality_change, self.thresholds.covariate_quality_band)
    }

    /// Quality fell enough while input held steady
    pub fn detect_concept(&self, before: &[f64], after: &[f64], q_before: f64, q_after: f64) -> bool {
        let shift = relative_change(mean(before), mean(after));
        let drop = relative_drop(q_before, q_after);
        at_least(drop, self.thresholds.concept_quality_drop)
            && at_most(shift, self.thresholds.concept_input_band)
    }

    /// Total over both flags
    pub fn classify(&self, input_shifted: bool, quality_dropped: bool) -> DriftType {
        match (input_shifted, quality_dropped) {
            (true, false) => DriftType::Covariate,
            (false, true) => DriftType::Concept,
            (true, true) => DriftType::Both,
            (false, false) => DriftType::None,
        }
    }

    pub fn impact(&self, daily_predictions: f64, days: f64, error_rate_increase: f64, cost_per_error: f64) -> DriftImpact {
        let predictions_affected = daily_predictions * days;
        let errors = predictions_affected * error_rate_increase;
        DriftImpact {
            predictions_affected,
            errors,
            financial_impact: errors * cost_per_error,
        }
    }

    /// Severity ladder with upper-inclusive bounds. The drift type does not matter.
    pub fn action(&self, severity: f64) -> ResponseAction {
        let t = &self.thresholds;
        if at_most(severity, t.monitor_max) {
            ResponseAction::Monitor
        } else if at_most(severity, t.investigate_max) {
            ResponseAction::Investigate
        } else if at_most(severity, t.retrain_max) {
            ResponseAction::Retrain
        } else {
            ResponseAction::Escalate
        }
    }
}
