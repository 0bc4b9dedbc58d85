//! Core plumbing for gradebench
//!
//! Provides the model provider capability and message model, the task tool
//! executor backed by a Python interpreter, and the agent session that drives
//! one tool-calling conversation to a submission.

pub mod agent;
pub mod error;
pub mod llm;
pub mod python;
pub mod tools;

pub use agent::{
    AgentSession, RetryPolicy, SessionOptions, SessionOutcome, SessionReport, StepFault,
    Transcript,
};
pub use error::{HarnessError, HarnessResult};
pub use llm::{
    AnthropicProvider, BlockingModelProvider, BlockingProvider, ContentBlock, FaultKind, Message,
    MessageRole, ModelConfig, ModelProvider, ProviderError,
};
pub use python::{PythonConfig, PythonInterpreter};
pub use tools::{EvalOutput, ExpressionEvaluator, ToolCall, ToolExecutor, ToolInvocation, ToolSpec};
