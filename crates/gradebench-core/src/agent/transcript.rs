//! Conversation transcript
//!
//! The transcript is an append-only log of turn deltas. The request payload
//! is derived from it on demand, so nothing ever edits a sent message.

use serde::{Deserialize, Serialize};

use crate::llm::{ContentBlock, Message};

/// One appended turn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TurnDelta {
    /// The initial user prompt
    Prompt { text: String },
    /// Blocks returned by the model
    Assistant { blocks: Vec<ContentBlock> },
    /// Tool results answering the preceding assistant turn
    ToolResults { blocks: Vec<ContentBlock> },
}

/// Append-only conversation log owned by one session
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Transcript {
    deltas: Vec<TurnDelta>,
}

impl Transcript {
    /// Start a transcript with the user prompt
    pub fn seeded(prompt: impl Into<String>) -> Self {
        Self {
            deltas: vec![TurnDelta::Prompt {
                text: prompt.into(),
            }],
        }
    }

    /// Record an assistant turn and the results answering its tool calls
    pub fn push_exchange(&mut self, assistant: Vec<ContentBlock>, results: Vec<ContentBlock>) {
        self.deltas.push(TurnDelta::Assistant { blocks: assistant });
        self.deltas.push(TurnDelta::ToolResults { blocks: results });
    }

    /// All deltas in append order
    pub fn deltas(&self) -> &[TurnDelta] {
        &self.deltas
    }

    /// Number of completed assistant turns
    pub fn assistant_turns(&self) -> usize {
        self.deltas
            .iter()
            .filter(|d| matches!(d, TurnDelta::Assistant { .. }))
            .count()
    }

    /// Fold the log into the message list sent to the provider
    pub fn messages(&self) -> Vec<Message> {
        self.deltas
            .iter()
            .map(|delta| match delta {
                TurnDelta::Prompt { text } => Message::user(text.clone()),
                TurnDelta::Assistant { blocks } => Message::assistant(blocks.clone()),
                TurnDelta::ToolResults { blocks } => Message::user_blocks(blocks.clone()),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::MessageRole;
    use serde_json::json;

    #[test]
    fn test_fold_alternates_roles() {
        let mut transcript = Transcript::seeded("solve it");
        transcript.push_exchange(
            vec![
                ContentBlock::text("checking"),
                ContentBlock::tool_use("a", "python_expression", json!({"expression": "1"})),
                ContentBlock::tool_use("b", "python_expression", json!({"expression": "2"})),
            ],
            vec![
                ContentBlock::tool_result("a", &json!({"result": "OK", "error": null})),
                ContentBlock::tool_result("b", &json!({"result": "OK", "error": null})),
            ],
        );

        let messages = transcript.messages();
        let roles: Vec<MessageRole> = messages.iter().map(|m| m.role).collect();
        assert_eq!(
            roles,
            vec![MessageRole::User, MessageRole::Assistant, MessageRole::User]
        );
        assert_eq!(messages[0].text(), "solve it");

        let uses = messages[1].content.iter().filter(|b| b.is_tool_use()).count();
        let results = messages[2].content.len();
        assert_eq!(uses, results);
        assert_eq!(transcript.assistant_turns(), 1);
    }

    #[test]
    fn test_seeded_has_single_prompt() {
        let transcript = Transcript::seeded("hi");
        assert_eq!(transcript.deltas().len(), 1);
        assert_eq!(transcript.messages(), vec![Message::user("hi")]);
    }
}
