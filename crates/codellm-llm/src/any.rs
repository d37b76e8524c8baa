#[cfg(feature = "mock")]
use crate::mock::MockProvider;
use crate::ollama::OllamaProvider;

use crate::provider::{LlmProvider, Message};

/// Generates a match over all `AnyProvider` variants, binding the inner provider
/// and evaluating the given closure for each arm.
macro_rules! delegate_provider {
    ($self:expr, |$p:ident| $expr:expr) => {
        match $self {
            AnyProvider::Ollama($p) => $expr,
            #[cfg(feature = "mock")]
            AnyProvider::Mock($p) => $expr,
        }
    };
}

#[derive(Debug, Clone)]
pub enum AnyProvider {
    Ollama(OllamaProvider),
    #[cfg(feature = "mock")]
    Mock(MockProvider),
}

impl LlmProvider for AnyProvider {
    async fn chat(&self, messages: &[Message]) -> Result<String, crate::LlmError> {
        delegate_provider!(self, |p| p.chat(messages).await)
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, crate::LlmError> {
        delegate_provider!(self, |p| p.embed(text).await)
    }

    fn supports_embeddings(&self) -> bool {
        delegate_provider!(self, |p| p.supports_embeddings())
    }

    fn name(&self) -> &str {
        delegate_provider!(self, |p| p.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn any_ollama_name() {
        let provider = AnyProvider::Ollama(OllamaProvider::new("http://localhost:11434", "test"));
        assert_eq!(provider.name(), "ollama");
        assert!(provider.supports_embeddings());
    }

    #[cfg(feature = "mock")]
    #[tokio::test]
    async fn any_mock_embed_delegates() {
        let mock = MockProvider::default().with_embedding(vec![0.5, 0.5]);
        let provider = AnyProvider::Mock(mock.clone());
        assert_eq!(provider.embed("hello").await.unwrap(), vec![0.5, 0.5]);
        assert_eq!(mock.embed_calls(), 1);
    }

    #[cfg(feature = "mock")]
    #[tokio::test]
    async fn any_mock_chat_delegates() {
        let provider =
            AnyProvider::Mock(MockProvider::with_responses(vec!["summary of file".into()]));
        let reply = provider.chat(&[Message::user("hi")]).await.unwrap();
        assert_eq!(reply, "summary of file");
    }
}
