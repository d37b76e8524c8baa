use std::collections::HashMap;
use std::sync::Arc;

use codellm_llm::LlmProvider;
use codellm_llm::any::AnyProvider;

use crate::document::{
    IndexedDocument, KEY_FILE_CONTENT_HASH, KEY_FILE_PATH_HASH, QueryInput, QueryResult,
};
use crate::vector_store::{VectorStore, VectorStoreError};

/// Upper bound on `num_results` for a single query.
pub const MAX_QUERY_RESULTS: usize = 9;

const DIMENSION_PROBE: &str = "dimension probe";

/// A vector store handle bound to one collection and one embedding provider.
#[derive(Clone)]
pub struct VectorDbClient {
    store: Arc<dyn VectorStore>,
    collection: String,
    embedder: Arc<AnyProvider>,
}

impl std::fmt::Debug for VectorDbClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VectorDbClient")
            .field("collection", &self.collection)
            .field("embedder", &self.embedder.name())
            .finish_non_exhaustive()
    }
}

impl VectorDbClient {
    #[must_use]
    pub fn new(
        store: Arc<dyn VectorStore>,
        collection: impl Into<String>,
        embedder: Arc<AnyProvider>,
    ) -> Self {
        Self {
            store,
            collection: collection.into(),
            embedder,
        }
    }

    #[must_use]
    pub fn collection(&self) -> &str {
        &self.collection
    }

    #[must_use]
    pub fn embedder(&self) -> &AnyProvider {
        &self.embedder
    }

    /// Ensure the collection exists, sized to the provider's embedding dimension.
    ///
    /// The dimension is probed with one `embed` call, made only when the
    /// collection does not exist yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the probe embedding fails or the backend cannot
    /// create the collection.
    pub async fn init(&self) -> Result<(), VectorStoreError> {
        if self.store.collection_exists(&self.collection).await? {
            return Ok(());
        }
        let probe = self.embedder.embed(DIMENSION_PROBE).await?;
        let vector_size = u64::try_from(probe.len())
            .map_err(|e| VectorStoreError::Collection(e.to_string()))?;
        self.store
            .ensure_collection(&self.collection, vector_size)
            .await?;
        tracing::debug!(collection = %self.collection, vector_size, "vector collection ready");
        Ok(())
    }

    /// Insert or replace the document keyed by its id.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the write.
    pub async fn upsert(&self, document: IndexedDocument) -> Result<(), VectorStoreError> {
        self.store
            .upsert(&self.collection, vec![document.into_point()])
            .await
    }

    /// Return up to `num_results` documents nearest to `input`, closest first.
    ///
    /// # Errors
    ///
    /// Returns `InvalidQuery` if `num_results` is outside `1..=MAX_QUERY_RESULTS`,
    /// and propagates embedding and backend failures.
    pub async fn query(
        &self,
        input: QueryInput,
        num_results: usize,
    ) -> Result<Vec<QueryResult>, VectorStoreError> {
        if !(1..=MAX_QUERY_RESULTS).contains(&num_results) {
            return Err(VectorStoreError::InvalidQuery(format!(
                "num_results must be between 1 and {MAX_QUERY_RESULTS}, got {num_results}"
            )));
        }

        let vector = match input {
            QueryInput::Text(text) => self.embedder.embed(&text).await?,
            QueryInput::Vector(vector) => vector,
        };

        let limit = u64::try_from(num_results)
            .map_err(|e| VectorStoreError::InvalidQuery(e.to_string()))?;
        let points = self.store.search(&self.collection, vector, limit).await?;
        points.into_iter().map(QueryResult::try_from).collect()
    }

    /// Stored `file_path_hash -> file_content_hash` pairs for the collection.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend scroll fails.
    pub async fn stored_fingerprints(&self) -> Result<HashMap<String, String>, VectorStoreError> {
        let stored = self
            .store
            .scroll_all(&self.collection, KEY_FILE_PATH_HASH, &[KEY_FILE_CONTENT_HASH])
            .await?;
        Ok(stored
            .into_iter()
            .filter_map(|(path_hash, mut fields)| {
                fields
                    .remove(KEY_FILE_CONTENT_HASH)
                    .map(|content_hash| (path_hash, content_hash))
            })
            .collect())
    }

    /// # Errors
    ///
    /// Returns an error if the backend rejects the deletion.
    pub async fn delete(&self, ids: Vec<String>) -> Result<(), VectorStoreError> {
        self.store.delete_by_ids(&self.collection, ids).await
    }
}
