//! Markdown report generation

use anyhow::Result;

use super::summary::trial_summary;
use crate::metrics::EvaluationReport;

/// Markdown report generator
pub struct MarkdownReporter;

impl MarkdownReporter {
    /// Generate a Markdown report
    pub fn generate(report: &EvaluationReport) -> Result<String> {
        let mut md = String::new();

        md.push_str("# Gradebench Evaluation Report\n\n");

        md.push_str("## Overview\n\n");
        md.push_str(&format!("- **Model**: {}\n", report.model));
        md.push_str(&format!("- **Grading Mode**: {}\n", report.grading_mode));
        md.push_str(&format!("- **Schedule**: {}\n", report.schedule));
        md.push_str(&format!(
            "- **Timestamp**: {}\n",
            report.timestamp.format("%Y-%m-%d %H:%M:%S UTC")
        ));
        md.push_str(&format!(
            "- **Total Execution Time**: {:.1}s\n\n",
            report.wall_time_secs
        ));

        md.push_str("## Summary\n\n");
        md.push_str("| Metric | Value |\n|--------|-------|\n");
        md.push_str(&format!("| Trials | {} |\n", report.total_trials));
        md.push_str(&format!("| Fully Passed | {} |\n", report.fully_passed));
        md.push_str(&format!(
            "| Pass Rate | {} |\n",
            super::format_rate(report.pass_rate)
        ));
        md.push_str(&format!(
            "| Mean Score | {} |\n",
            report
                .mean_score
                .map(|s| format!("{:.2}", s))
                .unwrap_or_else(|| "n/a".to_string())
        ));
        md.push_str(&format!("| Provider Faults | {} |\n", report.total_faults));
        md.push_str(&format!("| Target Band | {} |\n", report.band));
        md.push_str(&format!("| Verdict | {} |\n\n", report.verdict.describe()));

        md.push_str("## Score Distribution\n\n");
        md.push_str("| Score | Trials |\n|-------|--------|\n");
        for (score, count) in report.histogram.counts.iter().enumerate() {
            md.push_str(&format!("| {} | {} |\n", score, count));
        }
        md.push('\n');

        if !report.function_pass_rates.is_empty() {
            md.push_str("## Results by Function\n\n");
            md.push_str("| Function | Pass Rate |\n|----------|-----------|\n");
            for (key, rate) in &report.function_pass_rates {
                md.push_str(&format!("| {} | {:.1}% |\n", key.symbol(), rate * 100.0));
            }
            md.push('\n');
        }

        let partial: Vec<_> = report.runs.iter().filter(|r| !r.fully_passed()).collect();
        if !partial.is_empty() {
            md.push_str("## Incomplete Trials\n\n");
            for result in partial {
                md.push_str(&format!("```\n{}```\n\n", trial_summary(result)));
            }
        }

        Ok(md)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::tests::sample_report;

    #[test]
    fn test_markdown_generation() {
        let md = MarkdownReporter::generate(&sample_report()).unwrap();

        assert!(md.contains("# Gradebench Evaluation Report"));
        assert!(md.contains("test-model"));
        assert!(md.contains("| Pass Rate | 50.0% |"));
        assert!(md.contains("| calculate_drift_impact | 50.0% |"));
        assert!(md.contains("Trial 2: 3/5 passed"));
        assert!(!md.contains("Trial 1:"));
    }
}
