//! Model provider integration

pub mod anthropic;
pub mod fault;
pub mod messages;
pub mod provider;

pub use anthropic::{AnthropicProvider, ModelConfig, parse_anthropic};
pub use fault::{FaultKind, ProviderError, sanitize_provider_error_text};
pub use messages::{ContentBlock, Message, MessageRole};
pub use provider::{BlockingModelProvider, BlockingProvider, ModelProvider};

#[cfg(test)]
pub use provider::MockModelProvider;
