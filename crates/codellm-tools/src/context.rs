use std::path::{Path, PathBuf};
use std::sync::Arc;

use codellm_llm::any::AnyProvider;
use codellm_memory::{VectorDbClient, VectorStore};

/// Shared services handed to every tool at construction.
#[derive(Clone)]
pub struct ToolContext {
    project_path: PathBuf,
    embedding: Arc<AnyProvider>,
    summarization: Arc<AnyProvider>,
    store: Arc<dyn VectorStore>,
}

impl std::fmt::Debug for ToolContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolContext")
            .field("project_path", &self.project_path)
            .finish_non_exhaustive()
    }
}

impl ToolContext {
    #[must_use]
    pub fn new(
        project_path: impl Into<PathBuf>,
        embedding: Arc<AnyProvider>,
        summarization: Arc<AnyProvider>,
        store: Arc<dyn VectorStore>,
    ) -> Self {
        Self {
            project_path: project_path.into(),
            embedding,
            summarization,
            store,
        }
    }

    #[must_use]
    pub fn project_path(&self) -> &Path {
        &self.project_path
    }

    #[must_use]
    pub fn summarization(&self) -> &Arc<AnyProvider> {
        &self.summarization
    }

    /// A client on `collection` that embeds with the embedding provider.
    #[must_use]
    pub fn vector_client(&self, collection: &str) -> VectorDbClient {
        VectorDbClient::new(
            Arc::clone(&self.store),
            collection,
            Arc::clone(&self.embedding),
        )
    }
}
