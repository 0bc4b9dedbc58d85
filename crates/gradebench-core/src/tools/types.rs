//! Tool-related type definitions

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::llm::ContentBlock;

/// Name of the expression evaluation tool
pub const PYTHON_EXPRESSION: &str = "python_expression";

/// Name of the answer submission tool
pub const SUBMIT_ANSWER: &str = "submit_answer";

/// Tool definition advertised to the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolSpec {
    /// Tool name
    pub name: String,
    /// Human-readable description
    pub description: String,
    /// JSON schema of the input object
    pub input_schema: Value,
}

impl ToolSpec {
    /// A tool taking a single required string field
    pub fn single_string_field(
        name: impl Into<String>,
        description: impl Into<String>,
        field: &str,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema: json!({
                "type": "object",
                "properties": { field: { "type": "string" } },
                "required": [field],
            }),
        }
    }

    /// The two fixed tools every session exposes, in advertised order
    pub fn task_tools() -> Vec<ToolSpec> {
        vec![
            Self::single_string_field(PYTHON_EXPRESSION, "Execute Python code", "expression"),
            Self::single_string_field(SUBMIT_ANSWER, "Submit final code", "code"),
        ]
    }
}

/// A tool call emitted by the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Call identifier, echoed back in the result
    pub id: String,
    /// Requested tool name
    pub name: String,
    /// Input mapping
    pub input: Map<String, Value>,
}

impl ToolCall {
    /// Create a new tool call
    pub fn new(id: impl Into<String>, name: impl Into<String>, input: Map<String, Value>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            input,
        }
    }

    /// Pull a tool call out of a content block, if it is one
    pub fn from_block(block: &ContentBlock) -> Option<Self> {
        match block {
            ContentBlock::ToolUse { id, name, input } => Some(Self {
                id: id.clone(),
                name: name.clone(),
                input: input.as_object().cloned().unwrap_or_default(),
            }),
            _ => None,
        }
    }

    /// String input field; missing or non-string values read as empty
    pub fn string_field(&self, key: &str) -> String {
        self.input
            .get(key)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    }
}

/// The closed set of tools a session understands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolInvocation {
    /// Evaluate an expression in a fresh interpreter
    Eval { expression: String },
    /// Submit the final answer
    Submit { code: String },
}

/// A tool call naming a tool outside [`ToolInvocation`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownTool(pub String);

impl TryFrom<&ToolCall> for ToolInvocation {
    type Error = UnknownTool;

    fn try_from(call: &ToolCall) -> Result<Self, Self::Error> {
        match call.name.as_str() {
            PYTHON_EXPRESSION => Ok(ToolInvocation::Eval {
                expression: call.string_field("expression"),
            }),
            SUBMIT_ANSWER => Ok(ToolInvocation::Submit {
                code: call.string_field("code"),
            }),
            other => Err(UnknownTool(other.to_string())),
        }
    }
}

/// Structured result of evaluating an expression
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvalOutput {
    /// Captured stdout, or `"OK"` when nothing was printed
    pub result: Option<String>,
    /// Failure message
    pub error: Option<String>,
}

impl EvalOutput {
    /// Successful evaluation; empty output reads as `"OK"`
    pub fn success(stdout: impl Into<String>) -> Self {
        let stdout = stdout.into();
        Self {
            result: Some(if stdout.is_empty() {
                "OK".to_string()
            } else {
                stdout
            }),
            error: None,
        }
    }

    /// Failed evaluation
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            result: None,
            error: Some(message.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call(name: &str, input: Value) -> ToolCall {
        ToolCall::new("id-1", name, input.as_object().cloned().unwrap_or_default())
    }

    #[test]
    fn test_task_tools_schema() {
        let tools = ToolSpec::task_tools();
        assert_eq!(tools.len(), 2);
        assert_eq!(tools[0].name, PYTHON_EXPRESSION);
        assert_eq!(tools[0].input_schema["required"], json!(["expression"]));
        assert_eq!(tools[1].name, SUBMIT_ANSWER);
        assert_eq!(tools[1].input_schema["properties"]["code"]["type"], "string");
    }

    #[test]
    fn test_invocation_parsing() {
        assert_eq!(
            ToolInvocation::try_from(&call(PYTHON_EXPRESSION, json!({"expression": "1+1"}))),
            Ok(ToolInvocation::Eval {
                expression: "1+1".to_string()
            })
        );
        assert_eq!(
            ToolInvocation::try_from(&call(SUBMIT_ANSWER, json!({"code": "x = 1"}))),
            Ok(ToolInvocation::Submit {
                code: "x = 1".to_string()
            })
        );
        assert_eq!(
            ToolInvocation::try_from(&call("bash", json!({}))),
            Err(UnknownTool("bash".to_string()))
        );
    }

    #[test]
    fn test_missing_fields_default_to_empty() {
        let parsed = ToolInvocation::try_from(&call(SUBMIT_ANSWER, json!({"other": 3}))).unwrap();
        assert_eq!(parsed, ToolInvocation::Submit { code: String::new() });

        let parsed = ToolInvocation::try_from(&call(PYTHON_EXPRESSION, json!({"expression": 5}))).unwrap();
        assert_eq!(parsed, ToolInvocation::Eval { expression: String::new() });
    }

    #[test]
    fn test_from_block_ignores_text() {
        assert!(ToolCall::from_block(&ContentBlock::text("hi")).is_none());
        let block = ContentBlock::tool_use("t1", SUBMIT_ANSWER, json!("not an object"));
        let call = ToolCall::from_block(&block).unwrap();
        assert!(call.input.is_empty());
    }

    #[test]
    fn test_eval_output_ok_placeholder() {
        assert_eq!(EvalOutput::success("").result.as_deref(), Some("OK"));
        assert_eq!(EvalOutput::success("42\n").result.as_deref(), Some("42\n"));
        let failed = EvalOutput::failure("NameError: x");
        assert!(failed.result.is_none());
        assert_eq!(failed.error.as_deref(), Some("NameError: x"));
    }
}
