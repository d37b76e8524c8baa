use std::path::PathBuf;

use codellm_tools::{ToolsConfig, default_tools};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub log_level: LogLevel,
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub llms: LlmsConfig,
    #[serde(default)]
    pub vector_store: VectorStoreConfig,
    #[serde(default = "default_tools")]
    pub tools: ToolsConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: LogLevel::default(),
            paths: PathsConfig::default(),
            llms: LlmsConfig::default(),
            vector_store: VectorStoreConfig::default(),
            tools: default_tools(),
        }
    }
}

/// Verbosity used when `RUST_LOG` is not set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    None,
    Error,
    Warn,
    #[default]
    Info,
    Debug,
}

impl LogLevel {
    /// Directive understood by `tracing_subscriber::EnvFilter`.
    #[must_use]
    pub fn as_filter(self) -> &'static str {
        match self {
            Self::None => "off",
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
        }
    }
}

fn default_project_path() -> PathBuf {
    PathBuf::from(".")
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PathsConfig {
    /// Root every tool resolves its paths against.
    #[serde(default = "default_project_path")]
    pub project: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            project: default_project_path(),
        }
    }
}

/// LLM provider backend selector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    #[default]
    Ollama,
    #[cfg(feature = "mock")]
    Mock,
}

impl ProviderKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ollama => "ollama",
            #[cfg(feature = "mock")]
            Self::Mock => "mock",
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn default_base_url() -> String {
    "http://localhost:11434".into()
}

fn default_embedding_model() -> String {
    "nomic-embed-text".into()
}

fn default_chat_model() -> String {
    "llama3.1".into()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LlmConfig {
    #[serde(default)]
    pub provider: ProviderKind,
    pub model: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl LlmConfig {
    fn with_model(model: String) -> Self {
        Self {
            provider: ProviderKind::default(),
            model,
            base_url: default_base_url(),
        }
    }
}

fn default_embedding() -> LlmConfig {
    LlmConfig::with_model(default_embedding_model())
}

fn default_chat() -> LlmConfig {
    LlmConfig::with_model(default_chat_model())
}

/// One provider per service.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LlmsConfig {
    #[serde(default = "default_embedding")]
    pub embedding: LlmConfig,
    #[serde(default = "default_chat")]
    pub summarization: LlmConfig,
    #[serde(default = "default_chat")]
    pub agent: LlmConfig,
}

impl Default for LlmsConfig {
    fn default() -> Self {
        Self {
            embedding: default_embedding(),
            summarization: default_chat(),
            agent: default_chat(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VectorBackend {
    Memory,
    #[default]
    Qdrant,
}

fn default_qdrant_url() -> String {
    "http://localhost:6334".into()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct VectorStoreConfig {
    #[serde(default)]
    pub backend: VectorBackend,
    #[serde(default = "default_qdrant_url")]
    pub url: String,
}

impl Default for VectorStoreConfig {
    fn default() -> Self {
        Self {
            backend: VectorBackend::default(),
            url: default_qdrant_url(),
        }
    }
}
