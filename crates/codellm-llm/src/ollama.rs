use ollama_rs::Ollama;
use ollama_rs::generation::chat::ChatMessage;
use ollama_rs::generation::chat::request::ChatMessageRequest;
use ollama_rs::generation::embeddings::request::{EmbeddingsInput, GenerateEmbeddingsRequest};

use crate::error::LlmError;
use crate::provider::{LlmProvider, Message, Role};

const PROVIDER: &str = "ollama";
const DEFAULT_PORT: u16 = 11434;

/// One Ollama model, used for chat or embeddings depending on the service it serves.
#[derive(Debug, Clone)]
pub struct OllamaProvider {
    client: Ollama,
    model: String,
}

impl OllamaProvider {
    /// `base_url` is `scheme://host[:port]`; the port defaults to 11434.
    #[must_use]
    pub fn new(base_url: &str, model: impl Into<String>) -> Self {
        let (host, port) = split_endpoint(base_url);
        Self {
            client: Ollama::new(host, port),
            model: model.into(),
        }
    }

    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }
}

fn request_failed(what: &str, e: &impl std::fmt::Display) -> LlmError {
    LlmError::Other(format!("Ollama {what} request failed: {e}"))
}

impl LlmProvider for OllamaProvider {
    async fn chat(&self, messages: &[Message]) -> Result<String, LlmError> {
        let history = messages.iter().map(to_ollama).collect();
        let request = ChatMessageRequest::new(self.model.clone(), history);
        tracing::debug!(model = %self.model, messages = messages.len(), "ollama chat");

        let reply = self
            .client
            .send_chat_messages(request)
            .await
            .map_err(|e| request_failed("chat", &e))?
            .message
            .content;
        if reply.is_empty() {
            return Err(LlmError::EmptyResponse {
                provider: PROVIDER.into(),
            });
        }
        Ok(reply)
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, LlmError> {
        let request =
            GenerateEmbeddingsRequest::new(self.model.clone(), EmbeddingsInput::from(text));
        tracing::debug!(model = %self.model, chars = text.len(), "ollama embed");

        let mut embeddings = self
            .client
            .generate_embeddings(request)
            .await
            .map_err(|e| request_failed("embedding", &e))?
            .embeddings;
        if embeddings.is_empty() {
            return Err(LlmError::EmptyResponse {
                provider: PROVIDER.into(),
            });
        }
        Ok(embeddings.swap_remove(0))
    }

    fn supports_embeddings(&self) -> bool {
        true
    }

    #[allow(clippy::unnecessary_literal_bound)]
    fn name(&self) -> &str {
        PROVIDER
    }
}

fn to_ollama(message: &Message) -> ChatMessage {
    let content = message.content.clone();
    match message.role {
        Role::System => ChatMessage::system(content),
        Role::User => ChatMessage::user(content),
        Role::Assistant => ChatMessage::assistant(content),
    }
}

/// The Ollama client takes host and port separately.
fn split_endpoint(base_url: &str) -> (String, u16) {
    let url = base_url.trim_end_matches('/');
    url.rsplit_once(':')
        .and_then(|(host, port)| Some((host.to_owned(), port.parse().ok()?)))
        .unwrap_or_else(|| (url.to_owned(), DEFAULT_PORT))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_with_explicit_port() {
        assert_eq!(
            split_endpoint("http://gpu-box:8080/"),
            ("http://gpu-box".to_owned(), 8080)
        );
    }

    #[test]
    fn endpoint_without_port_uses_default() {
        assert_eq!(
            split_endpoint("https://ollama.internal"),
            ("https://ollama.internal".to_owned(), DEFAULT_PORT)
        );
    }

    #[test]
    fn endpoint_with_garbage_port_is_kept_whole() {
        let (host, port) = split_endpoint("http://host:abc");
        assert_eq!(host, "http://host:abc");
        assert_eq!(port, DEFAULT_PORT);
    }

    #[test]
    fn messages_keep_role_and_content() {
        let system = to_ollama(&Message::system("summarize"));
        assert_eq!(system.content, "summarize");
        let user = to_ollama(&Message::user("File: a.rs"));
        assert_eq!(user.content, "File: a.rs");
    }

    #[test]
    fn provider_reports_model() {
        let provider = OllamaProvider::new("http://localhost:11434", "nomic-embed-text");
        assert_eq!(provider.model(), "nomic-embed-text");
        assert_eq!(provider.name(), "ollama");
        assert!(provider.supports_embeddings());
    }
}
