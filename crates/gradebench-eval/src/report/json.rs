//! JSON report generation

use anyhow::Result;

use crate::metrics::EvaluationReport;

/// JSON report generator
pub struct JsonReporter;

impl JsonReporter {
    /// Generate a pretty-printed JSON report
    pub fn generate(report: &EvaluationReport) -> Result<String> {
        let json = serde_json::to_string_pretty(report)?;
        Ok(json)
    }

    /// Generate a compact JSON report (no pretty printing)
    pub fn generate_compact(report: &EvaluationReport) -> Result<String> {
        let json = serde_json::to_string(report)?;
        Ok(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::tests::sample_report;

    #[test]
    fn test_json_generation() {
        let json = JsonReporter::generate(&sample_report()).unwrap();
        assert!(json.contains("test-model"));
        assert!(json.contains("\"pass_rate\""));
        assert!(json.contains("\"too_easy\""));
    }

    #[test]
    fn test_compact_json_parses_back() {
        let json = JsonReporter::generate_compact(&sample_report()).unwrap();
        assert!(!json.contains('\n'));
        let parsed: EvaluationReport = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.total_trials, 2);
        assert_eq!(parsed.runs[0].results.len(), 5);
    }
}
