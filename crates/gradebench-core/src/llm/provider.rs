//! Model provider capability

use std::sync::Arc;

use async_trait::async_trait;

use super::{ContentBlock, Message, ProviderError};
use crate::tools::ToolSpec;

/// Anything that can answer a conversation with content blocks.
///
/// Transport and authentication are the implementor's concern; the session only
/// needs this shape.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ModelProvider: Send + Sync {
    /// Provider name used in logs and reports
    fn name(&self) -> &str;

    /// Model identifier used in logs and reports
    fn model(&self) -> &str;

    /// Send the full conversation and tool specs, returning the model's blocks
    async fn complete(
        &self,
        messages: &[Message],
        tools: &[ToolSpec],
    ) -> Result<Vec<ContentBlock>, ProviderError>;
}

#[async_trait]
impl<P: ModelProvider + ?Sized> ModelProvider for Arc<P> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn model(&self) -> &str {
        (**self).model()
    }

    async fn complete(
        &self,
        messages: &[Message],
        tools: &[ToolSpec],
    ) -> Result<Vec<ContentBlock>, ProviderError> {
        (**self).complete(messages, tools).await
    }
}

/// A provider whose client blocks the calling thread
pub trait BlockingModelProvider: Send + Sync + 'static {
    /// Provider name used in logs and reports
    fn name(&self) -> &str;

    /// Model identifier used in logs and reports
    fn model(&self) -> &str;

    /// Blocking completion call
    fn complete_blocking(
        &self,
        messages: &[Message],
        tools: &[ToolSpec],
    ) -> Result<Vec<ContentBlock>, ProviderError>;
}

/// Runs a [`BlockingModelProvider`] on tokio's blocking pool so concurrent
/// sessions keep making progress while one waits on its model.
pub struct BlockingProvider<P> {
    inner: Arc<P>,
}

impl<P: BlockingModelProvider> BlockingProvider<P> {
    /// Wrap a blocking provider
    pub fn new(inner: P) -> Self {
        Self {
            inner: Arc::new(inner),
        }
    }
}

#[async_trait]
impl<P: BlockingModelProvider> ModelProvider for BlockingProvider<P> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn model(&self) -> &str {
        self.inner.model()
    }

    async fn complete(
        &self,
        messages: &[Message],
        tools: &[ToolSpec],
    ) -> Result<Vec<ContentBlock>, ProviderError> {
        let inner = Arc::clone(&self.inner);
        let messages = messages.to_vec();
        let tools = tools.to_vec();

        tokio::task::spawn_blocking(move || inner.complete_blocking(&messages, &tools))
            .await
            .map_err(|e| ProviderError::terminal(format!("blocking provider worker failed: {}", e)))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct EchoProvider;

    impl BlockingModelProvider for EchoProvider {
        fn name(&self) -> &str {
            "echo"
        }

        fn model(&self) -> &str {
            "echo-1"
        }

        fn complete_blocking(
            &self,
            messages: &[Message],
            _tools: &[ToolSpec],
        ) -> Result<Vec<ContentBlock>, ProviderError> {
            std::thread::sleep(std::time::Duration::from_millis(5));
            Ok(vec![ContentBlock::text(format!("{} messages", messages.len()))])
        }
    }

    #[tokio::test]
    async fn test_blocking_provider_runs_off_the_async_thread() {
        let provider = BlockingProvider::new(EchoProvider);
        assert_eq!(provider.name(), "echo");
        assert_eq!(provider.model(), "echo-1");

        let blocks = provider
            .complete(&[Message::user("hi")], &[])
            .await
            .unwrap();
        assert_eq!(blocks, vec![ContentBlock::text("1 messages")]);
    }

    #[tokio::test]
    async fn test_arc_provider_delegates() {
        let provider: Arc<dyn ModelProvider> = Arc::new(BlockingProvider::new(EchoProvider));
        let blocks = provider.complete(&[], &[]).await.unwrap();
        assert_eq!(blocks, vec![ContentBlock::text("0 messages")]);
    }
}
