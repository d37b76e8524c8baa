use super::Config;

fn parse_enum<T: serde::de::DeserializeOwned>(key: &str, value: &str) -> Option<T> {
    let parsed = serde_json::from_value(serde_json::Value::String(value.to_owned())).ok();
    if parsed.is_none() {
        tracing::warn!("ignoring invalid {key} value: {value}");
    }
    parsed
}

impl Config {
    pub(crate) fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("CODELLM_LOG_LEVEL")
            && let Some(level) = parse_enum("CODELLM_LOG_LEVEL", &v)
        {
            self.log_level = level;
        }
        if let Ok(v) = std::env::var("CODELLM_PROJECT_PATH") {
            self.paths.project = v.into();
        }
        if let Ok(v) = std::env::var("CODELLM_VECTOR_BACKEND")
            && let Some(backend) = parse_enum("CODELLM_VECTOR_BACKEND", &v)
        {
            self.vector_store.backend = backend;
        }
        if let Ok(v) = std::env::var("CODELLM_QDRANT_URL") {
            self.vector_store.url = v;
        }
        if let Ok(v) = std::env::var("CODELLM_OLLAMA_URL") {
            self.llms.embedding.base_url.clone_from(&v);
            self.llms.summarization.base_url.clone_from(&v);
            self.llms.agent.base_url = v;
        }
        if let Ok(v) = std::env::var("CODELLM_EMBEDDING_MODEL") {
            self.llms.embedding.model = v;
        }
        if let Ok(v) = std::env::var("CODELLM_SUMMARIZATION_MODEL") {
            self.llms.summarization.model = v;
        }
        if let Ok(v) = std::env::var("CODELLM_AGENT_MODEL") {
            self.llms.agent.model = v;
        }
    }
}
