//! Per-trial summaries

use crate::metrics::{RunResult, TrialOutcome};
use crate::tasks::FunctionKey;

/// Render one trial as plain text: a header line, then one line per function
pub fn trial_summary(result: &RunResult) -> String {
    let mut out = String::new();

    if result.outcome == TrialOutcome::Crashed {
        out.push_str(&format!(
            "Trial {}: crashed ({})\n",
            result.trial_id,
            result.diagnostic.as_deref().unwrap_or("no diagnostic")
        ));
        return out;
    }

    out.push_str(&format!(
        "Trial {}: {}/{} passed ({}, {} steps, {} tool calls",
        result.trial_id,
        result.score,
        FunctionKey::ALL.len(),
        result.outcome.label(),
        result.steps_attempted,
        result.tool_calls,
    ));
    if !result.faults.is_empty() {
        out.push_str(&format!(", {} faults", result.faults.len()));
    }
    out.push_str(")\n");

    for (key, grade) in &result.results {
        out.push_str(&format!(
            "  {:<18} {:<7} {}\n",
            key.key(),
            if grade.passed { "PASSED" } else { "FAILED" },
            grade.reason
        ));
    }

    if let Some(error) = &result.grading_error {
        out.push_str(&format!("  grading error: {}\n", error));
    }
    out
}
