//! Anthropic Messages API provider

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::instrument;

use super::{ContentBlock, Message, ModelProvider, ProviderError};
use crate::tools::ToolSpec;

const PROVIDER_NAME: &str = "Anthropic";

/// Default API base URL
pub const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";

/// Default `anthropic-version` header value
pub const DEFAULT_API_VERSION: &str = "2023-06-01";

/// Connection settings for the Anthropic provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Model identifier
    #[serde(default = "default_model")]
    pub model: String,

    /// Maximum tokens per response
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// API base URL
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// API version header
    #[serde(default = "default_api_version")]
    pub api_version: String,

    /// API key; never written back out
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,
}

fn default_model() -> String {
    "claude-sonnet-4-5".to_string()
}

fn default_max_tokens() -> u32 {
    3000
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_api_version() -> String {
    DEFAULT_API_VERSION.to_string()
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            max_tokens: default_max_tokens(),
            base_url: default_base_url(),
            api_version: default_api_version(),
            api_key: None,
        }
    }
}

/// Anthropic provider
pub struct AnthropicProvider {
    config: ModelConfig,
    http_client: Client,
}

impl AnthropicProvider {
    /// Create a new Anthropic provider; fails without an API key
    pub fn new(config: ModelConfig) -> Result<Self, ProviderError> {
        Self::with_client(config, Client::new())
    }

    /// Create a provider reusing an existing HTTP client
    pub fn with_client(config: ModelConfig, http_client: Client) -> Result<Self, ProviderError> {
        if config.api_key.as_deref().is_none_or(str::is_empty) {
            return Err(ProviderError::config(
                PROVIDER_NAME,
                "no API key configured (set ANTHROPIC_API_KEY)",
            ));
        }
        Ok(Self {
            config,
            http_client,
        })
    }

    fn request_body(&self, messages: &[Message], tools: &[ToolSpec]) -> Value {
        let mut body = json!({
            "model": self.config.model,
            "max_tokens": self.config.max_tokens,
            "messages": messages,
        });
        if !tools.is_empty() {
            body["tools"] = json!(tools);
        }
        body
    }
}

#[async_trait]
impl ModelProvider for AnthropicProvider {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    fn model(&self) -> &str {
        &self.config.model
    }

    #[instrument(skip(self, messages, tools), fields(model = %self.config.model, messages = messages.len()), level = "debug")]
    async fn complete(
        &self,
        messages: &[Message],
        tools: &[ToolSpec],
    ) -> Result<Vec<ContentBlock>, ProviderError> {
        let url = format!("{}/v1/messages", self.config.base_url.trim_end_matches('/'));

        let mut request = self
            .http_client
            .post(&url)
            .header("anthropic-version", &self.config.api_version)
            .json(&self.request_body(messages, tools));

        if let Some(api_key) = &self.config.api_key {
            request = request.header("x-api-key", api_key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ProviderError::network(PROVIDER_NAME, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::http(PROVIDER_NAME, status.as_u16(), &body));
        }

        let response_json: Value = response
            .json()
            .await
            .map_err(|e| ProviderError::parse(PROVIDER_NAME, e.to_string()))?;

        parse_anthropic(&response_json)
    }
}

/// Extract content blocks from a Messages API response body.
///
/// Unknown block types (thinking, server tools) are skipped. A body without a
/// `content` array is a parse error.
pub fn parse_anthropic(response: &Value) -> Result<Vec<ContentBlock>, ProviderError> {
    let content = response["content"].as_array().ok_or_else(|| {
        ProviderError::parse(PROVIDER_NAME, "response has no content array")
    })?;

    let mut blocks = Vec::with_capacity(content.len());
    for block in content {
        match block["type"].as_str() {
            Some("text") => {
                if let Some(text) = block["text"].as_str() {
                    blocks.push(ContentBlock::text(text));
                }
            }
            Some("tool_use") => {
                let input = match &block["input"] {
                    Value::Null => json!({}),
                    other => other.clone(),
                };
                blocks.push(ContentBlock::tool_use(
                    block["id"].as_str().unwrap_or_default(),
                    block["name"].as_str().unwrap_or_default(),
                    input,
                ));
            }
            other => {
                tracing::debug!(block_type = ?other, "skipping unsupported content block");
            }
        }
    }

    if let Some(usage) = response["usage"].as_object() {
        let input_tokens = usage.get("input_tokens").and_then(Value::as_u64).unwrap_or(0);
        let output_tokens = usage.get("output_tokens").and_then(Value::as_u64).unwrap_or(0);
        tracing::debug!(input_tokens, output_tokens, "llm request completed");
    }

    Ok(blocks)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_text_and_tool_use() {
        let body = json!({
            "content": [
                {"type": "text", "text": "Let me test."},
                {"type": "tool_use", "id": "toolu_01", "name": "python_expression", "input": {"expression": "print(1)"}},
                {"type": "thinking", "thinking": "hidden"}
            ],
            "usage": {"input_tokens": 10, "output_tokens": 5}
        });

        let blocks = parse_anthropic(&body).unwrap();
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0], ContentBlock::text("Let me test."));
        assert_eq!(
            blocks[1],
            ContentBlock::tool_use("toolu_01", "python_expression", json!({"expression": "print(1)"}))
        );
    }

    #[test]
    fn test_parse_missing_input_defaults_to_empty_object() {
        let body = json!({"content": [{"type": "tool_use", "id": "a", "name": "submit_answer"}]});
        let blocks = parse_anthropic(&body).unwrap();
        assert_eq!(blocks[0], ContentBlock::tool_use("a", "submit_answer", json!({})));
    }

    #[test]
    fn test_parse_without_content_is_terminal() {
        let err = parse_anthropic(&json!({"type": "error"})).unwrap_err();
        assert!(!err.is_transient());
    }

    #[test]
    fn test_provider_requires_api_key() {
        let err = AnthropicProvider::new(ModelConfig::default()).err().unwrap();
        assert!(matches!(err, ProviderError::Config { .. }));

        let config = ModelConfig {
            api_key: Some("sk-test".to_string()),
            ..Default::default()
        };
        let provider = AnthropicProvider::new(config).unwrap();
        assert_eq!(provider.name(), "Anthropic");
    }

    #[test]
    fn test_request_body_shape() {
        let config = ModelConfig {
            api_key: Some("sk-test".to_string()),
            max_tokens: 128,
            ..Default::default()
        };
        let provider = AnthropicProvider::new(config).unwrap();
        let body = provider.request_body(&[Message::user("hello")], &ToolSpec::task_tools());

        assert_eq!(body["max_tokens"], 128);
        assert_eq!(body["messages"][0]["role"], "user");
        assert_eq!(body["messages"][0]["content"][0]["text"], "hello");
        assert_eq!(body["tools"][0]["name"], "python_expression");
        assert_eq!(body["tools"][1]["input_schema"]["required"][0], "code");
    }

    #[test]
    fn test_api_key_is_not_serialized() {
        let config = ModelConfig {
            api_key: Some("sk-secret".to_string()),
            ..Default::default()
        };
        let text = serde_json::to_string(&config).unwrap();
        assert!(!text.contains("sk-secret"));
    }
}
