//! Aggregates trial results into an evaluation report

use std::collections::BTreeMap;

use chrono::Utc;

use super::types::{CalibrationBand, EvaluationReport, RunResult, ScoreHistogram};
use crate::runner::Schedule;
use crate::tasks::FunctionKey;

/// Computes summary metrics from trial results
pub struct MetricsAggregator {
    model: String,
    grading_mode: String,
    schedule: Schedule,
    band: CalibrationBand,
}

impl MetricsAggregator {
    pub fn new(
        model: impl Into<String>,
        grading_mode: impl Into<String>,
        schedule: Schedule,
        band: CalibrationBand,
    ) -> Self {
        Self {
            model: model.into(),
            grading_mode: grading_mode.into(),
            schedule,
            band,
        }
    }

    /// Aggregate results. Zero trials yields no pass rate and a `NoTrials` verdict.
    pub fn aggregate(&self, runs: Vec<RunResult>, wall_time_secs: f64) -> EvaluationReport {
        let total_trials = runs.len();
        let fully_passed = runs.iter().filter(|r| r.fully_passed()).count();

        let (pass_rate, mean_score) = if total_trials == 0 {
            (None, None)
        } else {
            let total = total_trials as f64;
            let score_sum: usize = runs.iter().map(|r| r.score).sum();
            (
                Some(fully_passed as f64 / total),
                Some(score_sum as f64 / total),
            )
        };

        let function_pass_rates = if total_trials == 0 {
            BTreeMap::new()
        } else {
            FunctionKey::ALL
                .iter()
                .map(|key| {
                    let passed = runs
                        .iter()
                        .filter(|r| r.results.get(key).is_some_and(|g| g.passed))
                        .count();
                    (*key, passed as f64 / total_trials as f64)
                })
                .collect()
        };

        EvaluationReport {
            total_trials,
            fully_passed,
            pass_rate,
            mean_score,
            histogram: ScoreHistogram::from_results(&runs),
            function_pass_rates,
            total_faults: runs.iter().map(|r| r.faults.len()).sum(),
            band: self.band,
            verdict: self.band.verdict(pass_rate),
            schedule: self.schedule,
            grading_mode: self.grading_mode.clone(),
            model: self.model.clone(),
            timestamp: Utc::now(),
            wall_time_secs,
            runs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::Verdict;

    fn scored(trial_id: usize, score: usize) -> RunResult {
        let mut result = RunResult::crashed(trial_id, "fixture");
        result.score = score;
        result
    }

    fn aggregator() -> MetricsAggregator {
        MetricsAggregator::new("test-model", "strict", Schedule::Parallel, CalibrationBand::default())
    }

    #[test]
    fn test_zero_trials() {
        let report = aggregator().aggregate(Vec::new(), 0.0);
        assert_eq!(report.total_trials, 0);
        assert!(report.pass_rate.is_none());
        assert!(report.mean_score.is_none());
        assert_eq!(report.verdict, Verdict::NoTrials);
    }

    #[test]
    fn test_pass_rate_is_exact() {
        let runs = vec![scored(1, 5), scored(2, 4), scored(3, 0), scored(4, 5)];
        let report = aggregator().aggregate(runs, 1.5);
        assert_eq!(report.fully_passed, 2);
        assert_eq!(report.pass_rate, Some(0.5));
        assert_eq!(report.mean_score, Some(3.5));
        assert_eq!(report.verdict, Verdict::TooEasy);
        assert_eq!(report.histogram.counts, [1, 0, 0, 0, 1, 2]);
    }

    #[test]
    fn test_within_band() {
        let mut runs: Vec<RunResult> = (1..=10).map(|i| scored(i, 3)).collect();
        runs[0].score = 5;
        let report = aggregator().aggregate(runs, 0.0);
        assert_eq!(report.pass_rate, Some(0.1));
        assert_eq!(report.verdict, Verdict::WithinBand);
    }
}
