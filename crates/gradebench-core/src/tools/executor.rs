//! Tool executor
//!
//! Maps parsed tool invocations onto their side effects and the JSON payloads
//! returned to the model.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Value, json};
use tracing::{debug, instrument};

use super::types::{EvalOutput, ToolCall, ToolInvocation, UnknownTool};
use crate::python::PythonInterpreter;

/// Runs expressions on behalf of the model
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ExpressionEvaluator: Send + Sync {
    /// Evaluate in a namespace scoped to this single call
    async fn evaluate(&self, expression: &str) -> EvalOutput;
}

const EVAL_DRIVER: &str = r#"
import contextlib, io, json, sys
src = sys.stdin.read()
buf = io.StringIO()
try:
    with contextlib.redirect_stdout(buf):
        exec(compile(src, "<expression>", "exec"), {"__name__": "__main__"})
    out = buf.getvalue()
    payload = {"result": out if out else "OK", "error": None}
except BaseException as e:
    payload = {"result": None, "error": str(e)}
sys.__stdout__.write(json.dumps(payload))
sys.__stdout__.flush()
"#;

#[async_trait]
impl ExpressionEvaluator for PythonInterpreter {
    async fn evaluate(&self, expression: &str) -> EvalOutput {
        match self.run_driver(EVAL_DRIVER, expression).await {
            Ok(stdout) => serde_json::from_str::<EvalOutput>(stdout.trim()).unwrap_or_else(|e| {
                EvalOutput::failure(format!("unreadable interpreter output: {}", e))
            }),
            Err(e) => EvalOutput::failure(e.to_string()),
        }
    }
}

/// What a dispatched tool call produced
#[derive(Debug, Clone, PartialEq)]
pub struct ToolOutcome {
    /// JSON payload returned to the model
    pub payload: Value,
    /// Code accepted by a submission
    pub submission: Option<String>,
}

impl ToolOutcome {
    fn reply(payload: Value) -> Self {
        Self {
            payload,
            submission: None,
        }
    }
}

/// Executes the task's tools
#[derive(Clone)]
pub struct ToolExecutor {
    evaluator: Arc<dyn ExpressionEvaluator>,
}

impl ToolExecutor {
    /// Create an executor backed by the given evaluator
    pub fn new(evaluator: Arc<dyn ExpressionEvaluator>) -> Self {
        Self { evaluator }
    }

    /// Executor backed by a Python interpreter
    pub fn python(interpreter: PythonInterpreter) -> Self {
        Self::new(Arc::new(interpreter))
    }

    /// Evaluate an expression. Failures come back in `error`, never as `Err`.
    pub async fn evaluate(&self, expression: &str) -> EvalOutput {
        self.evaluator.evaluate(expression).await
    }

    /// Accept a submission without validation
    pub fn submit(&self, _code: &str) -> Value {
        json!({ "submitted": true })
    }

    /// Parse and run a tool call
    #[instrument(skip(self, call), fields(tool = %call.name, call_id = %call.id), level = "debug")]
    pub async fn dispatch(&self, call: &ToolCall) -> ToolOutcome {
        let invocation = match ToolInvocation::try_from(call) {
            Ok(invocation) => invocation,
            Err(UnknownTool(name)) => {
                debug!(tool = %name, "unknown tool requested");
                return ToolOutcome::reply(json!({ "error": "unknown tool" }));
            }
        };

        match invocation {
            ToolInvocation::Eval { expression } => {
                let output = self.evaluate(&expression).await;
                ToolOutcome::reply(json!(output))
            }
            ToolInvocation::Submit { code } => ToolOutcome {
                payload: self.submit(&code),
                submission: Some(code),
            },
        }
    }
}
