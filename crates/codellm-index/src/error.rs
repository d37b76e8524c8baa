//! Error types for codellm-index.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    /// A matched file could not be read.
    #[error("failed to read {}: {source}", path.display())]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Traversal stopped at `path`; files dispatched before it stay processed.
    #[error("traversal aborted at {}: {source}", path.display())]
    Aborted {
        path: PathBuf,
        #[source]
        source: Box<IndexError>,
    },

    #[error("invalid glob pattern: {0}")]
    Glob(#[from] ignore::Error),

    /// A directory entry under the root could not be listed.
    #[error("failed to walk project tree: {0}")]
    Walk(#[source] ignore::Error),

    #[error("embedding failed: {0}")]
    Embedding(#[source] codellm_llm::LlmError),

    #[error("summarization failed: {0}")]
    Summarize(#[source] codellm_llm::LlmError),

    #[error("vector store error: {0}")]
    VectorStore(#[from] codellm_memory::VectorStoreError),
}

impl IndexError {
    /// The path at which a traversal was aborted, if any.
    #[must_use]
    pub fn aborted_path(&self) -> Option<&std::path::Path> {
        match self {
            Self::Aborted { path, .. } => Some(path),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, IndexError>;
