//! Metric types for evaluation runs

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use gradebench_core::{SessionOutcome, StepFault};
use serde::{Deserialize, Serialize};

use crate::grading::{FunctionGrade, GradeReport};
use crate::runner::Schedule;
use crate::tasks::FunctionKey;

/// How a trial's session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrialOutcome {
    /// Code was submitted and graded
    Submitted,
    /// Step budget ran out; graded as empty source
    Exhausted,
    /// A provider fault ended the session; graded as empty source
    Aborted,
    /// The trial task itself failed
    Crashed,
}

impl TrialOutcome {
    pub fn from_session(outcome: &SessionOutcome) -> Self {
        match outcome {
            SessionOutcome::Submitted { .. } => TrialOutcome::Submitted,
            SessionOutcome::Exhausted => TrialOutcome::Exhausted,
            SessionOutcome::Aborted { .. } => TrialOutcome::Aborted,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TrialOutcome::Submitted => "submitted",
            TrialOutcome::Exhausted => "exhausted",
            TrialOutcome::Aborted => "aborted",
            TrialOutcome::Crashed => "crashed",
        }
    }
}

/// Result of one trial
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunResult {
    /// 1-based trial number
    pub trial_id: usize,

    /// Passed functions, 0 through 5
    pub score: usize,

    /// Per-function verdicts
    pub results: BTreeMap<FunctionKey, FunctionGrade>,

    /// Session terminal state
    pub outcome: TrialOutcome,

    /// Provider requests issued
    pub steps_attempted: usize,

    /// Tool calls dispatched
    #[serde(default)]
    pub tool_calls: usize,

    /// Provider faults seen during the session
    #[serde(default)]
    pub faults: Vec<StepFault>,

    /// Grading diagnostic (load error, runtime failure)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grading_error: Option<String>,

    /// Why the trial crashed, if it did
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diagnostic: Option<String>,

    /// Wall time of the trial
    pub elapsed_secs: f64,
}

impl RunResult {
    /// Combine a graded session into a result
    pub fn new(
        trial_id: usize,
        outcome: TrialOutcome,
        steps_attempted: usize,
        tool_calls: usize,
        faults: Vec<StepFault>,
        grade: GradeReport,
        elapsed_secs: f64,
    ) -> Self {
        Self {
            trial_id,
            score: grade.score,
            results: grade.results,
            outcome,
            steps_attempted,
            tool_calls,
            faults,
            grading_error: grade.error,
            diagnostic: None,
            elapsed_secs,
        }
    }

    /// Score-0 result for a trial that never produced a report
    pub fn crashed(trial_id: usize, diagnostic: impl Into<String>) -> Self {
        Self {
            trial_id,
            score: 0,
            results: BTreeMap::new(),
            outcome: TrialOutcome::Crashed,
            steps_attempted: 0,
            tool_calls: 0,
            faults: Vec::new(),
            grading_error: None,
            diagnostic: Some(diagnostic.into()),
            elapsed_secs: 0.0,
        }
    }

    /// Every function passed
    pub fn fully_passed(&self) -> bool {
        self.score == FunctionKey::ALL.len()
    }
}

/// Target pass-rate range, inclusive on both ends
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalibrationBand {
    #[serde(default = "default_band_low")]
    pub low: f64,
    #[serde(default = "default_band_high")]
    pub high: f64,
}

fn default_band_low() -> f64 {
    0.10
}

fn default_band_high() -> f64 {
    0.40
}

impl Default for CalibrationBand {
    fn default() -> Self {
        Self {
            low: default_band_low(),
            high: default_band_high(),
        }
    }
}

impl CalibrationBand {
    pub fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }

    /// Place a pass rate relative to the band
    pub fn verdict(&self, pass_rate: Option<f64>) -> Verdict {
        match pass_rate {
            None => Verdict::NoTrials,
            Some(rate) if rate > self.high => Verdict::TooEasy,
            Some(rate) if rate < self.low => Verdict::TooHard,
            Some(_) => Verdict::WithinBand,
        }
    }
}

impl std::fmt::Display for CalibrationBand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.0}%-{:.0}%", self.low * 100.0, self.high * 100.0)
    }
}

/// Where the pass rate sits against the calibration band
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    WithinBand,
    /// Above the band
    TooEasy,
    /// Below the band
    TooHard,
    NoTrials,
}

impl Verdict {
    pub fn is_within_band(&self) -> bool {
        matches!(self, Verdict::WithinBand)
    }

    pub fn describe(&self) -> &'static str {
        match self {
            Verdict::WithinBand => "within calibration band",
            Verdict::TooEasy => "above calibration band (task too easy)",
            Verdict::TooHard => "below calibration band (task too hard)",
            Verdict::NoTrials => "no trials were run",
        }
    }
}

/// Count of trials per score
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreHistogram {
    /// `counts[s]` is the number of trials scoring `s`
    pub counts: [usize; 6],
}

impl ScoreHistogram {
    pub fn from_results(results: &[RunResult]) -> Self {
        let mut counts = [0; 6];
        for result in results {
            counts[result.score.min(5)] += 1;
        }
        Self { counts }
    }
}

/// Aggregate report for an evaluation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub total_trials: usize,

    /// Trials scoring 5
    pub fully_passed: usize,

    /// fully_passed / total_trials; absent for zero trials
    pub pass_rate: Option<f64>,

    pub mean_score: Option<f64>,

    pub histogram: ScoreHistogram,

    /// Fraction of trials passing each function
    pub function_pass_rates: BTreeMap<FunctionKey, f64>,

    /// Provider faults across all trials
    pub total_faults: usize,

    pub band: CalibrationBand,

    pub verdict: Verdict,

    pub schedule: Schedule,

    pub grading_mode: String,

    pub model: String,

    pub timestamp: DateTime<Utc>,

    pub wall_time_secs: f64,

    pub runs: Vec<RunResult>,
}
