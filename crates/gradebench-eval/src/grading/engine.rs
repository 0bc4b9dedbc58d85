//! Grading engine
//!
//! Grades a submission by running every function's hidden vectors through a
//! [`SubmissionRuntime`]. Functions are graded independently, each in its own
//! scope, and the score is the number that pass.

use std::collections::BTreeMap;
use std::sync::Arc;

use futures::future::join_all;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use super::criteria::GradingMode;
use super::runtime::{CallOutcome, Invocation, RuntimeFault, SubmissionRuntime};
use crate::tasks::{FunctionKey, VectorSet};

/// Reason given when a symbol cannot be resolved
pub const REASON_NOT_FOUND: &str = "function not found";

/// Reason given to every function when the source fails to load
pub const REASON_GRADING_ERROR: &str = "grading error";

/// Verdict for one function
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionGrade {
    pub passed: bool,
    pub reason: String,
    pub vectors_passed: usize,
    pub vectors_total: usize,
}

impl FunctionGrade {
    fn failed(reason: impl Into<String>, vectors_total: usize) -> Self {
        Self {
            passed: false,
            reason: reason.into(),
            vectors_passed: 0,
            vectors_total,
        }
    }
}

/// Result of grading one submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradeReport {
    /// Per-function verdicts in report order
    pub results: BTreeMap<FunctionKey, FunctionGrade>,
    /// Number of passed functions, 0 through 5
    pub score: usize,
    /// Load or runtime diagnostic, if grading could not proceed normally
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl GradeReport {
    /// Build a report; the score is derived from the results
    pub fn new(results: BTreeMap<FunctionKey, FunctionGrade>, error: Option<String>) -> Self {
        let score = results.values().filter(|g| g.passed).count();
        Self {
            results,
            score,
            error,
        }
    }

    /// Every function fails with the same reason
    pub fn uniform_failure(
        vectors: &VectorSet,
        reason: &str,
        error: Option<String>,
    ) -> Self {
        let results = FunctionKey::ALL
            .iter()
            .map(|key| {
                let total = vectors.for_function(*key).len();
                (*key, FunctionGrade::failed(reason, total))
            })
            .collect();
        Self::new(results, error)
    }

    /// Whether every function passed
    pub fn is_perfect(&self) -> bool {
        self.score == FunctionKey::ALL.len()
    }

    pub fn get(&self, key: FunctionKey) -> Option<&FunctionGrade> {
        self.results.get(&key)
    }
}

/// Grades submitted source against the hidden vectors
#[derive(Clone)]
pub struct GradingEngine {
    runtime: Arc<dyn SubmissionRuntime>,
    vectors: Arc<VectorSet>,
    mode: GradingMode,
}

impl GradingEngine {
    pub fn new(runtime: Arc<dyn SubmissionRuntime>, vectors: VectorSet, mode: GradingMode) -> Self {
        Self {
            runtime,
            vectors: Arc::new(vectors),
            mode,
        }
    }

    pub fn mode(&self) -> &GradingMode {
        &self.mode
    }

    pub fn vectors(&self) -> &VectorSet {
        &self.vectors
    }

    /// Grade `source`. Deterministic for a given runtime and configuration.
    #[instrument(skip(self, source), fields(runtime = %self.runtime.name(), mode = %self.mode.label(), source_len = source.len()))]
    pub async fn grade(&self, source: &str) -> GradeReport {
        if source.trim().is_empty() {
            debug!("empty submission");
            return GradeReport::uniform_failure(&self.vectors, REASON_NOT_FOUND, None);
        }

        if let Err(fault) = self.runtime.load(source).await {
            warn!(error = %fault, "submission failed to load");
            let reason = match &fault {
                RuntimeFault::Load(_) => REASON_GRADING_ERROR.to_string(),
                RuntimeFault::Unavailable(_) => fault.to_string(),
            };
            return GradeReport::uniform_failure(&self.vectors, &reason, Some(fault.to_string()));
        }

        let grades = join_all(
            FunctionKey::ALL
                .iter()
                .map(|key| self.grade_function(source, *key)),
        )
        .await;

        let report = GradeReport::new(FunctionKey::ALL.into_iter().zip(grades).collect(), None);
        debug!(score = report.score, "graded submission");
        report
    }

    async fn grade_function(&self, source: &str, key: FunctionKey) -> FunctionGrade {
        let vectors = self.vectors.for_function(key);
        let calls: Vec<_> = vectors.iter().map(|v| v.call.clone()).collect();

        let outcomes = match self.runtime.invoke(source, key.symbol(), &calls).await {
            Ok(Invocation::Completed(outcomes)) => outcomes,
            Ok(Invocation::Missing) => return FunctionGrade::failed(REASON_NOT_FOUND, vectors.len()),
            Err(RuntimeFault::Load(message)) => {
                return FunctionGrade::failed(
                    format!("{}: {}", REASON_GRADING_ERROR, message),
                    vectors.len(),
                );
            }
            Err(fault) => return FunctionGrade::failed(fault.to_string(), vectors.len()),
        };

        let held: Vec<bool> = vectors
            .iter()
            .enumerate()
            .map(|(i, vector)| match outcomes.get(i) {
                Some(CallOutcome::Ok(value)) => vector.check.holds(value),
                Some(CallOutcome::Error(message)) => {
                    debug!(function = %key, vector = i + 1, error = %message, "vector raised");
                    false
                }
                None => false,
            })
            .collect();

        let (passed, reason) = self.mode.judge(key, &held);
        debug!(function = %key, passed, %reason, "graded function");
        FunctionGrade {
            passed,
            reason,
            vectors_passed: held.iter().filter(|ok| **ok).count(),
            vectors_total: held.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grading::NativeRuntime;
    use crate::tasks::{CallArgs, DriftOracle};
    use serde_json::{Value, json};

    fn engine(runtime: NativeRuntime, mode: GradingMode) -> GradingEngine {
        GradingEngine::new(Arc::new(runtime), VectorSet::default(), mode)
    }

    fn constant(value: Value) -> impl Fn(&CallArgs) -> Result<Value, String> + Send + Sync + 'static {
        move |_| Ok(value.clone())
    }

    #[tokio::test]
    async fn test_reference_scores_five() {
        let engine = engine(NativeRuntime::reference(DriftOracle::default()), GradingMode::Strict);
        let report = engine.grade("def detect_covariate_drift(...): ...").await;
        assert_eq!(report.score, 5);
        assert!(report.is_perfect());
        assert!(report.error.is_none());
        assert_eq!(
            report.get(FunctionKey::DetectConcept).unwrap().reason,
            "all 8 vectors passed"
        );
    }

    #[tokio::test]
    async fn test_empty_source_is_deterministic_zero() {
        let engine = engine(NativeRuntime::reference(DriftOracle::default()), GradingMode::Strict);
        let first = engine.grade("").await;
        let second = engine.grade("   \n\t").await;
        assert_eq!(first, second);
        assert_eq!(first.score, 0);
        assert!(first.results.values().all(|g| g.reason == REASON_NOT_FOUND));
    }

    #[tokio::test]
    async fn test_load_fault_short_circuits() {
        let runtime = NativeRuntime::reference(DriftOracle::default())
            .with_load_error("SyntaxError: invalid syntax");
        let report = engine(runtime, GradingMode::Strict).grade("def (").await;
        assert_eq!(report.score, 0);
        assert_eq!(report.results.len(), 5);
        assert!(report.results.values().all(|g| g.reason == REASON_GRADING_ERROR));
        assert_eq!(report.error.as_deref(), Some("SyntaxError: invalid syntax"));
    }

    #[tokio::test]
    async fn test_missing_symbol_fails_only_that_function() {
        let oracle = DriftOracle::default();
        let runtime = NativeRuntime::new().register("classify_drift", move |call| {
            let shifted = call.bool_arg(0, "input_shifted").unwrap_or(false);
            let dropped = call.bool_arg(1, "quality_dropped").unwrap_or(false);
            Ok(json!({"type": oracle.classify(shifted, dropped).as_str().to_uppercase()}))
        });
        let report = engine(runtime, GradingMode::Strict).grade("code").await;
        assert_eq!(report.score, 1);
        assert!(report.get(FunctionKey::Classify).unwrap().passed);
        assert_eq!(report.get(FunctionKey::Impact).unwrap().reason, REASON_NOT_FOUND);
    }

    #[tokio::test]
    async fn test_strict_lists_failed_vectors() {
        let runtime = NativeRuntime::new().register(
            "detect_covariate_drift",
            constant(json!({"detected": false, "drift": null})),
        );
        let report = engine(runtime, GradingMode::Strict).grade("code").await;
        let grade = report.get(FunctionKey::DetectCovariate).unwrap();
        assert!(!grade.passed);
        assert_eq!(grade.reason, "failed vectors: [1, 4, 6]");
        assert_eq!(grade.vectors_passed, 4);
        assert_eq!(grade.vectors_total, 7);
    }

    #[tokio::test]
    async fn test_calibration_accepts_partial_solutions() {
        // always-false passes 4/7 covariate vectors and 5/8 concept vectors
        let runtime = NativeRuntime::new()
            .register("detect_covariate_drift", constant(json!({"detected": false})))
            .register("detect_concept_drift", constant(json!({"detected": false})));
        let report = engine(runtime, GradingMode::calibration()).grade("code").await;

        let covariate = report.get(FunctionKey::DetectCovariate).unwrap();
        assert!(covariate.passed);
        assert_eq!(covariate.reason, "passed 4/7 vectors (band 3..=5)");

        let concept = report.get(FunctionKey::DetectConcept).unwrap();
        assert!(concept.passed);
        assert_eq!(report.score, 2);
    }

    #[tokio::test]
    async fn test_raising_vector_fails_only_itself() {
        let oracle = DriftOracle::default();
        let runtime = NativeRuntime::new().register("determine_response_action", move |call| {
            let severity = call.float_arg(1, "severity").unwrap_or_default();
            if call.str_arg(0, "drift_type") == Some("unknown") {
                return Err("ValueError: unknown drift type".to_string());
            }
            Ok(json!({"action": oracle.action(severity).as_str().to_lowercase()}))
        });
        let report = engine(runtime, GradingMode::Strict).grade("code").await;
        let grade = report.get(FunctionKey::Action).unwrap();
        assert_eq!(grade.vectors_passed, 7);
        assert_eq!(grade.reason, "failed vectors: [5, 9]");
    }

    #[tokio::test]
    async fn test_score_counts_passed_functions() {
        let report = engine(NativeRuntime::new(), GradingMode::Strict).grade("x = 1").await;
        assert_eq!(report.score, report.results.values().filter(|g| g.passed).count());
        assert_eq!(report.score, 0);
    }
}
