//! Agent session state machine
//!
//! A session drives one model conversation from the seeded prompt to a
//! submission, step exhaustion, or an aborting provider fault.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{Instrument, debug, info, info_span, warn};
use uuid::Uuid;

use super::retry::{FaultAction, RetryPolicy, StepFault};
use super::transcript::Transcript;
use crate::llm::{ContentBlock, ModelProvider};
use crate::tools::{ToolCall, ToolExecutor, ToolSpec};

/// Default step budget per session
pub const DEFAULT_MAX_STEPS: usize = 20;

/// Session limits
#[derive(Debug, Clone, PartialEq)]
pub struct SessionOptions {
    /// Provider requests allowed before the session is exhausted
    pub max_steps: usize,
    /// Fault policy
    pub retry: RetryPolicy,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            max_steps: DEFAULT_MAX_STEPS,
            retry: RetryPolicy::default(),
        }
    }
}

impl SessionOptions {
    /// Set the step budget
    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }

    /// Set the fault policy
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}

/// How a session ended
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SessionOutcome {
    /// The model submitted code
    Submitted { code: String },
    /// The step budget ran out without a submission
    Exhausted,
    /// A provider fault ended the session
    Aborted { fault: StepFault },
}

impl SessionOutcome {
    /// Short label for summaries
    pub fn label(&self) -> &'static str {
        match self {
            SessionOutcome::Submitted { .. } => "submitted",
            SessionOutcome::Exhausted => "exhausted",
            SessionOutcome::Aborted { .. } => "aborted",
        }
    }
}

/// Everything observed while running a session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionReport {
    /// Identifier used in logs
    pub session_id: Uuid,
    /// Terminal state
    pub outcome: SessionOutcome,
    /// Provider requests issued
    pub steps_attempted: usize,
    /// Faults in step order
    pub faults: Vec<StepFault>,
    /// Tool calls dispatched
    pub tool_calls: usize,
    /// Full conversation
    pub transcript: Transcript,
}

impl SessionReport {
    /// The submitted source, if any
    pub fn submission(&self) -> Option<&str> {
        match &self.outcome {
            SessionOutcome::Submitted { code } => Some(code),
            _ => None,
        }
    }
}

/// One model conversation driving toward a submission
pub struct AgentSession {
    provider: Arc<dyn ModelProvider>,
    executor: ToolExecutor,
    tools: Vec<ToolSpec>,
    options: SessionOptions,
}

impl AgentSession {
    /// Create a session with default limits
    pub fn new(provider: Arc<dyn ModelProvider>, executor: ToolExecutor, tools: Vec<ToolSpec>) -> Self {
        Self {
            provider,
            executor,
            tools,
            options: SessionOptions::default(),
        }
    }

    /// Replace the session limits
    pub fn with_options(mut self, options: SessionOptions) -> Self {
        self.options = options;
        self
    }

    /// Run the conversation to a terminal state. Never fails; faults land in the report.
    pub async fn run(&self, prompt: &str) -> SessionReport {
        let session_id = Uuid::new_v4();
        let span = info_span!("session", session_id = %session_id);
        self.drive(session_id, prompt).instrument(span).await
    }

    async fn drive(&self, session_id: Uuid, prompt: &str) -> SessionReport {
        let mut transcript = Transcript::seeded(prompt);
        let mut faults = Vec::new();
        let mut tool_calls = 0;
        let mut steps_attempted = 0;

        for step in 1..=self.options.max_steps {
            steps_attempted = step;
            let messages = transcript.messages();

            let blocks = match self.provider.complete(&messages, &self.tools).await {
                Ok(blocks) => blocks,
                Err(error) => {
                    let fault = StepFault::new(step, &error);
                    warn!(step, fault_kind = %fault.kind, error = %fault.message, "provider fault");
                    faults.push(fault.clone());

                    if self.options.retry.on_fault(&error) == FaultAction::Abort {
                        return SessionReport {
                            session_id,
                            outcome: SessionOutcome::Aborted { fault },
                            steps_attempted,
                            faults,
                            tool_calls,
                            transcript,
                        };
                    }
                    if !self.options.retry.backoff.is_zero() {
                        tokio::time::sleep(self.options.retry.backoff).await;
                    }
                    continue;
                }
            };

            let calls: Vec<ToolCall> = blocks.iter().filter_map(ToolCall::from_block).collect();
            if calls.is_empty() {
                debug!(step, "no tool calls in response");
                continue;
            }

            let mut results = Vec::with_capacity(calls.len());
            let mut submission: Option<String> = None;
            for call in &calls {
                let outcome = self.executor.dispatch(call).await;
                tool_calls += 1;

                let payload = match outcome.submission {
                    Some(code) if submission.is_none() => {
                        submission = Some(code);
                        outcome.payload
                    }
                    Some(_) => json!({ "submitted": true, "ignored": true }),
                    None => outcome.payload,
                };
                results.push(ContentBlock::tool_result(&call.id, &payload));
            }
            transcript.push_exchange(blocks, results);

            if let Some(code) = submission {
                info!(step, code_len = code.len(), "answer submitted");
                return SessionReport {
                    session_id,
                    outcome: SessionOutcome::Submitted { code },
                    steps_attempted,
                    faults,
                    tool_calls,
                    transcript,
                };
            }
        }

        info!(max_steps = self.options.max_steps, "step budget exhausted");
        SessionReport {
            session_id,
            outcome: SessionOutcome::Exhausted,
            steps_attempted,
            faults,
            tool_calls,
            transcript,
        }
    }
}
