//! Trial orchestration
//!
//! Runs N independent trials (session, then grading) and aggregates them into
//! an [`EvaluationReport`]. No trial fault escapes: a panicking trial becomes a
//! score-0 result carrying a diagnostic.

use std::any::Any;
use std::sync::Arc;
use std::time::Instant;

use futures::future::join_all;
use gradebench_core::{AgentSession, ModelProvider, SessionOptions, ToolExecutor};
use tokio::sync::Semaphore;
use tracing::{Instrument, error, info, info_span};

use super::config::{EvalConfig, Schedule};
use crate::grading::{GradingEngine, SubmissionRuntime};
use crate::metrics::{CalibrationBand, EvaluationReport, MetricsAggregator, RunResult, TrialOutcome};
use crate::tasks::TaskPrompt;

/// Callback receiving each trial's result
pub type ProgressCallback = Box<dyn Fn(&RunResult) + Send + Sync>;

/// Read-only state shared by every trial
struct TrialContext {
    provider: Arc<dyn ModelProvider>,
    executor: ToolExecutor,
    engine: GradingEngine,
    prompt: TaskPrompt,
    options: SessionOptions,
}

impl TrialContext {
    async fn run_trial(&self, trial_id: usize) -> RunResult {
        let started = Instant::now();

        let session = AgentSession::new(
            self.provider.clone(),
            self.executor.clone(),
            self.prompt.tools.clone(),
        )
        .with_options(self.options.clone());
        let report = session.run(&self.prompt.text).await;

        // no submission grades as empty source
        let grade = self.engine.grade(report.submission().unwrap_or("")).await;

        let result = RunResult::new(
            trial_id,
            TrialOutcome::from_session(&report.outcome),
            report.steps_attempted,
            report.tool_calls,
            report.faults,
            grade,
            started.elapsed().as_secs_f64(),
        );
        info!(
            score = result.score,
            outcome = result.outcome.label(),
            steps = result.steps_attempted,
            "trial complete"
        );
        result
    }
}

/// Runs trials and aggregates their results
pub struct Orchestrator {
    provider: Arc<dyn ModelProvider>,
    executor: ToolExecutor,
    engine: GradingEngine,
    prompt: TaskPrompt,
    options: SessionOptions,
    model: String,
    band: CalibrationBand,
    max_concurrency: Option<usize>,
    progress_callback: Option<ProgressCallback>,
}

impl Orchestrator {
    /// Create an orchestrator with the built-in prompt and default limits
    pub fn new(provider: Arc<dyn ModelProvider>, executor: ToolExecutor, engine: GradingEngine) -> Self {
        let model = provider.model().to_string();
        Self {
            provider,
            executor,
            engine,
            prompt: TaskPrompt::default(),
            options: SessionOptions::default(),
            model,
            band: CalibrationBand::default(),
            max_concurrency: None,
            progress_callback: None,
        }
    }

    /// Wire everything the config describes around the given provider and runtime
    pub fn from_config(
        config: &EvalConfig,
        provider: Arc<dyn ModelProvider>,
        executor: ToolExecutor,
        runtime: Arc<dyn SubmissionRuntime>,
    ) -> anyhow::Result<Self> {
        let engine = GradingEngine::new(runtime, config.vector_set(), config.grading.clone());
        let mut orchestrator = Self::new(provider, executor, engine)
            .with_prompt(config.prompt()?)
            .with_session_options(config.session_options())
            .with_band(config.target_band);
        orchestrator.max_concurrency = config.max_concurrency;
        Ok(orchestrator)
    }

    pub fn with_prompt(mut self, prompt: TaskPrompt) -> Self {
        self.prompt = prompt;
        self
    }

    pub fn with_session_options(mut self, options: SessionOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_band(mut self, band: CalibrationBand) -> Self {
        self.band = band;
        self
    }

    /// Cap the number of trials running at once
    pub fn with_max_concurrency(mut self, limit: usize) -> Self {
        self.max_concurrency = Some(limit);
        self
    }

    /// Set progress callback
    pub fn set_progress_callback(&mut self, callback: ProgressCallback) {
        self.progress_callback = Some(callback);
    }

    fn trial_context(&self) -> Arc<TrialContext> {
        Arc::new(TrialContext {
            provider: self.provider.clone(),
            executor: self.executor.clone(),
            engine: self.engine.clone(),
            prompt: self.prompt.clone(),
            options: self.options.clone(),
        })
    }

    /// Run `num_trials` trials and aggregate them
    pub async fn run(&self, num_trials: usize, schedule: Schedule) -> EvaluationReport {
        let started = Instant::now();
        info!(num_trials, %schedule, model = %self.model, "starting evaluation");

        let context = self.trial_context();
        let runs = match schedule {
            Schedule::Parallel => self.run_parallel(context, num_trials).await,
            Schedule::Sequential => self.run_sequential(context, num_trials).await,
        };

        let aggregator = MetricsAggregator::new(
            &self.model,
            self.engine.mode().label(),
            schedule,
            self.band,
        );
        let report = aggregator.aggregate(runs, started.elapsed().as_secs_f64());
        info!(
            fully_passed = report.fully_passed,
            total = report.total_trials,
            verdict = ?report.verdict,
            "evaluation complete"
        );
        report
    }

    async fn run_parallel(&self, context: Arc<TrialContext>, num_trials: usize) -> Vec<RunResult> {
        let semaphore = self
            .max_concurrency
            .map(|limit| Arc::new(Semaphore::new(limit.max(1))));

        let handles: Vec<_> = (1..=num_trials)
            .map(|trial_id| {
                let context = context.clone();
                let semaphore = semaphore.clone();
                tokio::spawn(
                    async move {
                        let _permit = match semaphore {
                            Some(semaphore) => semaphore.acquire_owned().await.ok(),
                            None => None,
                        };
                        context.run_trial(trial_id).await
                    }
                    .instrument(info_span!("trial", trial_id)),
                )
            })
            .collect();

        // join_all keeps spawn order, so slot i holds trial i + 1
        let runs: Vec<RunResult> = join_all(handles)
            .await
            .into_iter()
            .enumerate()
            .map(|(index, joined)| match joined {
                Ok(result) => result,
                Err(e) => crashed(index + 1, e),
            })
            .collect();

        for result in &runs {
            self.emit_progress(result);
        }
        runs
    }

    async fn run_sequential(&self, context: Arc<TrialContext>, num_trials: usize) -> Vec<RunResult> {
        let mut runs = Vec::with_capacity(num_trials);
        for trial_id in 1..=num_trials {
            let context = context.clone();
            let handle = tokio::spawn(
                async move { context.run_trial(trial_id).await }
                    .instrument(info_span!("trial", trial_id)),
            );
            let result = match handle.await {
                Ok(result) => result,
                Err(e) => crashed(trial_id, e),
            };
            self.emit_progress(&result);
            runs.push(result);
        }
        runs
    }

    fn emit_progress(&self, result: &RunResult) {
        if let Some(callback) = &self.progress_callback {
            callback(result);
        }
    }
}

fn crashed(trial_id: usize, e: tokio::task::JoinError) -> RunResult {
    let diagnostic = if e.is_panic() {
        format!("trial panicked: {}", panic_message(e.into_panic()))
    } else {
        format!("trial cancelled: {}", e)
    };
    error!(trial_id, %diagnostic, "trial crashed");
    RunResult::crashed(trial_id, diagnostic)
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
