//! Trial results and their aggregation

mod aggregator;
mod types;

pub use aggregator::MetricsAggregator;
pub use types::{
    CalibrationBand, EvaluationReport, RunResult, ScoreHistogram, TrialOutcome, Verdict,
};
