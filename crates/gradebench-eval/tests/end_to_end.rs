//! End-to-end runs: scripted provider, real session, grading, aggregation

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use gradebench_core::{
    ContentBlock, EvalOutput, ExpressionEvaluator, Message, ModelProvider, ProviderError,
    PythonInterpreter, SessionOptions, ToolExecutor, ToolSpec,
};
use gradebench_eval::{
    DriftOracle, EvalConfig, FunctionKey, GradingEngine, GradingMode, NativeRuntime,
    Orchestrator, PYTHON_REFERENCE_SOLUTION, PythonRuntime, Schedule, TrialOutcome, VectorSet,
    Verdict,
};
use serde_json::json;

/// Probes once with python_expression, then submits `code`
struct ScriptedProvider {
    code: String,
}

#[async_trait]
impl ModelProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    fn model(&self) -> &str {
        "scripted-model"
    }

    async fn complete(
        &self,
        messages: &[Message],
        _tools: &[ToolSpec],
    ) -> Result<Vec<ContentBlock>, ProviderError> {
        if messages.len() == 1 {
            return Ok(vec![
                ContentBlock::text("Let me check something first."),
                ContentBlock::tool_use("toolu_probe", "python_expression", json!({ "expression": "1 + 1" })),
            ]);
        }
        Ok(vec![ContentBlock::tool_use(
            "toolu_submit",
            "submit_answer",
            json!({ "code": self.code }),
        )])
    }
}

/// Every request fails with a transient fault
struct FlakyProvider {
    calls: AtomicUsize,
}

#[async_trait]
impl ModelProvider for FlakyProvider {
    fn name(&self) -> &str {
        "flaky"
    }

    fn model(&self) -> &str {
        "flaky-model"
    }

    async fn complete(
        &self,
        _messages: &[Message],
        _tools: &[ToolSpec],
    ) -> Result<Vec<ContentBlock>, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(ProviderError::http("flaky", 529, "overloaded"))
    }
}

struct EchoEvaluator;

#[async_trait]
impl ExpressionEvaluator for EchoEvaluator {
    async fn evaluate(&self, expression: &str) -> EvalOutput {
        EvalOutput::success(format!("evaluated {}\n", expression))
    }
}

fn native_engine(mode: GradingMode) -> GradingEngine {
    GradingEngine::new(
        Arc::new(NativeRuntime::reference(DriftOracle::default())),
        VectorSet::default(),
        mode,
    )
}

fn scripted(code: &str) -> Arc<dyn ModelProvider> {
    Arc::new(ScriptedProvider {
        code: code.to_string(),
    })
}

#[tokio::test]
async fn perfect_submissions_are_too_easy() {
    let orchestrator = Orchestrator::new(
        scripted("def detect_covariate_drift(*a): ..."),
        ToolExecutor::new(Arc::new(EchoEvaluator)),
        native_engine(GradingMode::Strict),
    );

    let report = orchestrator.run(10, Schedule::Parallel).await;

    assert_eq!(report.total_trials, 10);
    assert_eq!(report.fully_passed, 10);
    assert_eq!(report.pass_rate, Some(1.0));
    assert_eq!(report.verdict, Verdict::TooEasy);
    assert_eq!(report.histogram.counts, [0, 0, 0, 0, 0, 10]);
    for run in &report.runs {
        assert_eq!(run.outcome, TrialOutcome::Submitted);
        assert_eq!(run.steps_attempted, 2);
        assert_eq!(run.tool_calls, 2);
    }
}

#[tokio::test]
async fn zero_trials_have_no_verdict() {
    let orchestrator = Orchestrator::new(
        scripted("x = 1"),
        ToolExecutor::new(Arc::new(EchoEvaluator)),
        native_engine(GradingMode::Strict),
    );

    let report = orchestrator.run(0, Schedule::Sequential).await;
    assert_eq!(report.total_trials, 0);
    assert!(report.pass_rate.is_none());
    assert_eq!(report.verdict, Verdict::NoTrials);
}

#[tokio::test]
async fn transient_faults_exhaust_and_score_zero() {
    let provider = Arc::new(FlakyProvider {
        calls: AtomicUsize::new(0),
    });
    let orchestrator = Orchestrator::new(
        provider.clone(),
        ToolExecutor::new(Arc::new(EchoEvaluator)),
        native_engine(GradingMode::Strict),
    )
    .with_session_options(SessionOptions::default().with_max_steps(3));

    let report = orchestrator.run(2, Schedule::Sequential).await;

    assert_eq!(provider.calls.load(Ordering::SeqCst), 6);
    assert_eq!(report.fully_passed, 0);
    assert_eq!(report.total_faults, 6);
    assert_eq!(report.verdict, Verdict::TooHard);
    for run in &report.runs {
        assert_eq!(run.outcome, TrialOutcome::Exhausted);
        assert_eq!(run.score, 0);
        assert!(
            run.results
                .values()
                .all(|grade| grade.reason == "function not found")
        );
    }
}

#[tokio::test]
async fn calibration_mode_rejects_a_perfect_oracle() {
    let orchestrator = Orchestrator::new(
        scripted("solution"),
        ToolExecutor::new(Arc::new(EchoEvaluator)),
        native_engine(GradingMode::calibration()),
    );

    let report = orchestrator.run(1, Schedule::Sequential).await;
    let run = &report.runs[0];
    assert_eq!(run.outcome, TrialOutcome::Submitted);
    assert!(!run.results[&FunctionKey::Impact].passed);
    assert!(run.score < 5);
}

#[tokio::test]
async fn python_reference_passes_end_to_end() {
    let interpreter = PythonInterpreter::default();
    if !interpreter.is_available().await {
        return;
    }

    let config = EvalConfig::default().with_max_steps(4);
    let orchestrator = Orchestrator::from_config(
        &config,
        scripted(PYTHON_REFERENCE_SOLUTION),
        ToolExecutor::python(interpreter.clone()),
        Arc::new(PythonRuntime::new(interpreter)),
    )
    .unwrap();

    let report = orchestrator.run(2, Schedule::Parallel).await;
    assert_eq!(report.fully_passed, 2, "{:#?}", report.runs);
    assert_eq!(report.pass_rate, Some(1.0));
}
