//! Task tools: specs, parsed invocations and their executor

pub mod executor;
pub mod types;

pub use executor::{ExpressionEvaluator, ToolExecutor, ToolOutcome};
pub use types::{
    EvalOutput, PYTHON_EXPRESSION, SUBMIT_ANSWER, ToolCall, ToolInvocation, ToolSpec, UnknownTool,
};

#[cfg(test)]
pub use executor::MockExpressionEvaluator;
