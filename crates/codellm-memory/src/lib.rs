//! Vector store abstraction: one contract over interchangeable backend engines.

pub mod client;
pub mod document;
pub mod in_memory_store;
pub mod qdrant_ops;
pub mod vector_store;

pub use client::{MAX_QUERY_RESULTS, VectorDbClient};
pub use document::{DocumentMetadata, IndexedDocument, QueryInput, QueryResult, point_id};
pub use in_memory_store::InMemoryVectorStore;
pub use qdrant_ops::QdrantOps;
pub use vector_store::{
    BoxFuture, ScoredVectorPoint, ScrollResult, VectorPoint, VectorStore, VectorStoreError,
};
