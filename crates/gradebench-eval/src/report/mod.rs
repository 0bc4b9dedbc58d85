//! Report generation for evaluation results
//!
//! Generates reports as a terminal table, Markdown, or JSON.

mod json;
mod markdown;
mod summary;

pub use json::JsonReporter;
pub use markdown::MarkdownReporter;
pub use summary::trial_summary;

use anyhow::Result;

use crate::metrics::EvaluationReport;

/// Report format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportFormat {
    #[default]
    Table,
    Markdown,
    Json,
}

impl ReportFormat {
    /// Parse from string
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "table" => Some(ReportFormat::Table),
            "markdown" | "md" => Some(ReportFormat::Markdown),
            "json" => Some(ReportFormat::Json),
            _ => None,
        }
    }
}

/// Generate a report in the specified format
pub fn generate_report(report: &EvaluationReport, format: ReportFormat) -> Result<String> {
    match format {
        ReportFormat::Table => generate_table(report),
        ReportFormat::Markdown => MarkdownReporter::generate(report),
        ReportFormat::Json => JsonReporter::generate(report),
    }
}

fn format_rate(rate: Option<f64>) -> String {
    rate.map(|r| format!("{:.1}%", r * 100.0))
        .unwrap_or_else(|| "n/a".to_string())
}

/// Generate a simple table report for terminal output
fn generate_table(report: &EvaluationReport) -> Result<String> {
    let mut output = String::new();

    output.push_str(&format!("\n{:=<70}\n", "= Gradebench Evaluation Results "));
    output.push_str(&format!(
        "Model: {} | Mode: {} | Schedule: {}\n",
        report.model, report.grading_mode, report.schedule
    ));
    output.push_str(&format!(
        "Timestamp: {}\n",
        report.timestamp.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    output.push_str(&format!("{:=<70}\n\n", ""));

    output.push_str("SUMMARY\n");
    output.push_str(&format!("{:-<70}\n", ""));
    output.push_str(&format!(
        "Fully passed: {}/{} ({})\n",
        report.fully_passed,
        report.total_trials,
        format_rate(report.pass_rate)
    ));
    if let Some(mean) = report.mean_score {
        output.push_str(&format!("Mean score: {:.2}/5\n", mean));
    }
    output.push_str(&format!("Provider faults: {}\n", report.total_faults));
    output.push_str(&format!("Total Time: {:.1}s\n", report.wall_time_secs));
    output.push_str(&format!(
        "Target band: {} -> {}\n\n",
        report.band,
        report.verdict.describe()
    ));

    output.push_str("SCORE DISTRIBUTION\n");
    output.push_str(&format!("{:-<70}\n", ""));
    for (score, count) in report.histogram.counts.iter().enumerate() {
        output.push_str(&format!("{}/5 {:>6}\n", score, count));
    }
    output.push('\n');

    if !report.function_pass_rates.is_empty() {
        output.push_str("BY FUNCTION\n");
        output.push_str(&format!("{:-<70}\n", ""));
        output.push_str(&format!("{:<34} {:>10}\n", "Function", "Pass Rate"));
        output.push_str(&format!("{:-<70}\n", ""));
        for (key, rate) in &report.function_pass_rates {
            output.push_str(&format!("{:<34} {:>9.1}%\n", key.symbol(), rate * 100.0));
        }
        output.push('\n');
    }

    output.push_str("TRIALS\n");
    output.push_str(&format!("{:-<70}\n", ""));
    output.push_str(&format!(
        "{:<8} {:>8} {:>12} {:>8} {:>8} {:>10}\n",
        "Trial", "Score", "Outcome", "Steps", "Faults", "Time"
    ));
    output.push_str(&format!("{:-<70}\n", ""));
    for result in &report.runs {
        output.push_str(&format!(
            "{:<8} {:>6}/5 {:>12} {:>8} {:>8} {:>9.1}s\n",
            result.trial_id,
            result.score,
            result.outcome.label(),
            result.steps_attempted,
            result.faults.len(),
            result.elapsed_secs
        ));
    }

    output.push_str(&format!("{:=<70}\n", ""));

    Ok(output)
}
