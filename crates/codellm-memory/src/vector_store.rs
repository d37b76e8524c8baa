use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;

#[derive(Debug, thiserror::Error)]
pub enum VectorStoreError {
    #[error("connection error: {0}")]
    Connection(String),
    #[error("collection error: {0}")]
    Collection(String),
    #[error("collection {0} not initialized")]
    CollectionNotFound(String),
    #[error("upsert error: {0}")]
    Upsert(String),
    #[error("search error: {0}")]
    Search(String),
    #[error("delete error: {0}")]
    Delete(String),
    #[error("scroll error: {0}")]
    Scroll(String),
    #[error("embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
    #[error("serialization error: {0}")]
    Serialization(String),
    #[error("invalid query: {0}")]
    InvalidQuery(String),
    #[error("embedding error: {0}")]
    Embedding(#[from] codellm_llm::LlmError),
}

#[derive(Debug, Clone)]
pub struct VectorPoint {
    pub id: String,
    pub vector: Vec<f32>,
    pub payload: HashMap<String, serde_json::Value>,
}

/// A search hit. `score` is the cosine similarity reported by the backend
/// (higher is closer).
#[derive(Debug, Clone)]
pub struct ScoredVectorPoint {
    pub id: String,
    pub score: f32,
    pub payload: HashMap<String, serde_json::Value>,
}

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// `key_field` value -> string payload fields of the point.
pub type ScrollResult = HashMap<String, HashMap<String, String>>;

/// Contract every vector-store backend adapter satisfies.
///
/// Backend-specific behavior (distance metric, persistence, connection
/// lifecycle) stays behind this trait. Implementations must be safe for
/// concurrent `search` and `upsert` calls.
pub trait VectorStore: Send + Sync {
    /// Create the collection if absent. Idempotent.
    fn ensure_collection(
        &self,
        collection: &str,
        vector_size: u64,
    ) -> BoxFuture<'_, Result<(), VectorStoreError>>;

    fn collection_exists(&self, collection: &str) -> BoxFuture<'_, Result<bool, VectorStoreError>>;

    /// Insert or replace points keyed by id.
    fn upsert(
        &self,
        collection: &str,
        points: Vec<VectorPoint>,
    ) -> BoxFuture<'_, Result<(), VectorStoreError>>;

    /// Return at most `limit` points, closest first. Must fail if the
    /// collection was never created.
    fn search(
        &self,
        collection: &str,
        vector: Vec<f32>,
        limit: u64,
    ) -> BoxFuture<'_, Result<Vec<ScoredVectorPoint>, VectorStoreError>>;

    fn delete_by_ids(
        &self,
        collection: &str,
        ids: Vec<String>,
    ) -> BoxFuture<'_, Result<(), VectorStoreError>>;

    /// Every point keyed by its `key_field` payload value, carrying only the
    /// string payload entries named in `fields`.
    fn scroll_all(
        &self,
        collection: &str,
        key_field: &str,
        fields: &[&str],
    ) -> BoxFuture<'_, Result<ScrollResult, VectorStoreError>>;
}
