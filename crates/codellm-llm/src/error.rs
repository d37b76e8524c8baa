#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("empty response from {provider}")]
    EmptyResponse { provider: String },

    #[error("embedding not supported by {provider}")]
    EmbedUnsupported { provider: String },

    #[error("{0}")]
    Other(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_response_display() {
        let err = LlmError::EmptyResponse {
            provider: "ollama".into(),
        };
        assert_eq!(err.to_string(), "empty response from ollama");
    }

    #[test]
    fn embed_unsupported_display() {
        let err = LlmError::EmbedUnsupported {
            provider: "mock".into(),
        };
        assert_eq!(err.to_string(), "embedding not supported by mock");
    }
}
