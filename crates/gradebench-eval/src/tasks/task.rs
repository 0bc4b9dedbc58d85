//! The task handed to the model
//!
//! The task shape is fixed: five named functions, two tools. Only the prompt
//! text may be swapped out.

use std::path::Path;

use anyhow::{Context, Result};
use gradebench_core::ToolSpec;
use serde::{Deserialize, Serialize};

/// One of the five graded functions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FunctionKey {
    /// `detect_covariate_drift`
    DetectCovariate,
    /// `detect_concept_drift`
    DetectConcept,
    /// `classify_drift`
    Classify,
    /// `calculate_drift_impact`
    Impact,
    /// `determine_response_action`
    Action,
}

impl FunctionKey {
    /// Every graded function, in report order
    pub const ALL: [FunctionKey; 5] = [
        FunctionKey::DetectCovariate,
        FunctionKey::DetectConcept,
        FunctionKey::Classify,
        FunctionKey::Impact,
        FunctionKey::Action,
    ];

    /// Short key used in reports
    pub fn key(&self) -> &'static str {
        match self {
            FunctionKey::DetectCovariate => "detect_covariate",
            FunctionKey::DetectConcept => "detect_concept",
            FunctionKey::Classify => "classify",
            FunctionKey::Impact => "impact",
            FunctionKey::Action => "action",
        }
    }

    /// Symbol resolved in the submitted source. Nothing outside this list is ever looked up.
    pub fn symbol(&self) -> &'static str {
        match self {
            FunctionKey::DetectCovariate => "detect_covariate_drift",
            FunctionKey::DetectConcept => "detect_concept_drift",
            FunctionKey::Classify => "classify_drift",
            FunctionKey::Impact => "calculate_drift_impact",
            FunctionKey::Action => "determine_response_action",
        }
    }
}

impl std::fmt::Display for FunctionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// Built-in task prompt
pub const DEFAULT_PROMPT: &str = "\
Implement 5 Python functions for detecting and responding to data drift:

1. detect_covariate_drift(input_before, input_after, output_quality_before, output_quality_after) -> dict
   Returns: {'detected': bool, 'drift': 'covariate' or None}
   input_before/after: lists of numerical values.
   Detect when the mean input shifts by at least 20% AND output quality stays within 5% of its previous value.
   Must NOT detect if quality moves by more than 5% (that is concept drift).

2. detect_concept_drift(input_before, input_after, output_quality_before, output_quality_after) -> dict
   Returns: {'detected': bool, 'drift': 'concept' or None}
   Detect when quality drops by at least 10% AND the mean input stays within 2%.
   Must NOT detect if the input shifts or if quality improves.

3. classify_drift(input_shifted: bool, quality_dropped: bool) -> dict
   Returns: {'type': 'covariate'|'concept'|'both'|'none'}
   Return the lowercase type string.

4. calculate_drift_impact(daily_predictions: int, days_in_blind_period: int, error_rate_increase: float, cost_per_error: float) -> dict
   Returns: {'predictions_affected': int, 'errors': int, 'financial_impact': float}
   Must be accurate within 2%.

5. determine_response_action(drift_type: str, severity: float) -> dict
   Returns: {'action': 'MONITOR'|'INVESTIGATE'|'RETRAIN'|'ESCALATE'}
   Severity thresholds (upper bound inclusive):
   - 0 to 0.3: MONITOR
   - above 0.3 to 0.5: INVESTIGATE
   - above 0.5 to 0.9: RETRAIN
   - above 0.9: ESCALATE
   Return the uppercase action string.

Use the python_expression tool to test your code. Submit the complete source with submit_answer when done.";

/// Prompt text plus the tools advertised with it
#[derive(Debug, Clone, PartialEq)]
pub struct TaskPrompt {
    /// User message seeding every session
    pub text: String,
    /// Tool specs, in advertised order
    pub tools: Vec<ToolSpec>,
}

impl Default for TaskPrompt {
    fn default() -> Self {
        Self::new(DEFAULT_PROMPT)
    }
}

impl TaskPrompt {
    /// Use custom prompt text with the fixed tool set
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            tools: ToolSpec::task_tools(),
        }
    }

    /// Load the prompt text from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read prompt file: {}", path.display()))?;
        let text = text.trim();
        if text.is_empty() {
            anyhow::bail!("Prompt file is empty: {}", path.display());
        }
        Ok(Self::new(text))
    }
}
