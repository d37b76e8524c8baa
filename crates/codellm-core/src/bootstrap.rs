//! Application bootstrap: config resolution, provider, vector store and tool construction.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use codellm_llm::any::AnyProvider;
#[cfg(feature = "mock")]
use codellm_llm::mock::MockProvider;
use codellm_llm::ollama::OllamaProvider;
use codellm_memory::{InMemoryVectorStore, QdrantOps, VectorStore};
use codellm_tools::{ToolContext, ToolRegistry};

use crate::config::{Config, LlmConfig, ProviderKind, VectorBackend, VectorStoreConfig};

/// One provider per service, shared by every tool.
#[derive(Debug, Clone)]
pub struct Services {
    pub embedding: Arc<AnyProvider>,
    pub summarization: Arc<AnyProvider>,
    /// Reserved for the question-answering orchestrator; no tool consumes it.
    pub agent: Arc<AnyProvider>,
}

pub struct AppBuilder {
    config: Config,
    config_path: PathBuf,
}

impl AppBuilder {
    /// Load the config at `config_path`, or defaults when it does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but is invalid.
    pub fn load(config_path: &Path) -> anyhow::Result<Self> {
        let config = Config::load(config_path)?;
        Ok(Self::new(config, config_path))
    }

    #[must_use]
    pub fn new(config: Config, config_path: impl Into<PathBuf>) -> Self {
        Self {
            config,
            config_path: config_path.into(),
        }
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    #[must_use]
    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// # Errors
    ///
    /// Returns an error if a configured provider cannot be created.
    pub fn build_services(&self) -> anyhow::Result<Services> {
        let llms = &self.config.llms;
        Ok(Services {
            embedding: Arc::new(
                create_provider(&llms.embedding).context("failed to create embedding provider")?,
            ),
            summarization: Arc::new(
                create_provider(&llms.summarization)
                    .context("failed to create summarization provider")?,
            ),
            agent: Arc::new(
                create_provider(&llms.agent).context("failed to create agent provider")?,
            ),
        })
    }

    /// # Errors
    ///
    /// Returns an error if the Qdrant client cannot be created.
    pub fn build_store(&self) -> anyhow::Result<Arc<dyn VectorStore>> {
        create_vector_store(&self.config.vector_store)
    }

    #[must_use]
    pub fn tool_context(&self, services: &Services, store: Arc<dyn VectorStore>) -> ToolContext {
        ToolContext::new(
            self.config.paths.project.clone(),
            Arc::clone(&services.embedding),
            Arc::clone(&services.summarization),
            store,
        )
    }

    /// Build every enabled tool against the given services and store.
    ///
    /// # Errors
    ///
    /// Returns an error naming the first tool that fails to construct.
    pub async fn build_registry_with(
        &self,
        services: &Services,
        store: Arc<dyn VectorStore>,
    ) -> anyhow::Result<ToolRegistry> {
        let ctx = self.tool_context(services, store);
        let registry = ToolRegistry::from_config(&self.config.tools, &ctx)
            .await
            .context("failed to build tool registry")?;
        tracing::info!(
            tools = registry.len(),
            project = %self.config.paths.project.display(),
            "tools ready"
        );
        Ok(registry)
    }

    /// Build providers, the vector store and the tool registry from config.
    ///
    /// # Errors
    ///
    /// Returns an error if any provider, the store or a tool cannot be built.
    pub async fn build_registry(&self) -> anyhow::Result<ToolRegistry> {
        let services = self.build_services()?;
        let store = self.build_store()?;
        self.build_registry_with(&services, store).await
    }
}

/// # Errors
///
/// Returns an error if the provider kind is not available in this build.
pub fn create_provider(config: &LlmConfig) -> anyhow::Result<AnyProvider> {
    tracing::debug!(provider = %config.provider, model = %config.model, "creating provider");
    match config.provider {
        ProviderKind::Ollama => Ok(AnyProvider::Ollama(OllamaProvider::new(
            &config.base_url,
            config.model.as_str(),
        ))),
        #[cfg(feature = "mock")]
        ProviderKind::Mock => Ok(AnyProvider::Mock(MockProvider::default())),
    }
}

/// # Errors
///
/// Returns an error if the Qdrant client cannot be created from the configured url.
pub fn create_vector_store(config: &VectorStoreConfig) -> anyhow::Result<Arc<dyn VectorStore>> {
    match config.backend {
        VectorBackend::Memory => {
            tracing::debug!("using in-memory vector store");
            Ok(Arc::new(InMemoryVectorStore::new()))
        }
        VectorBackend::Qdrant => {
            tracing::debug!(url = %config.url, "using qdrant vector store");
            let ops = QdrantOps::new(&config.url)
                .with_context(|| format!("failed to create qdrant client for {}", config.url))?;
            Ok(Arc::new(ops))
        }
    }
}
