use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::vector_store::{ScoredVectorPoint, VectorPoint, VectorStoreError};

const POINT_NAMESPACE: Uuid = Uuid::from_u128(0x6c0d_3e4f_9a1b_4c7e_8d2f_51a0_b3c4_d5e6);

pub(crate) const KEY_FILE_PATH: &str = "filePath";
pub(crate) const KEY_FILE_PATH_HASH: &str = "filePathHash";
pub(crate) const KEY_FILE_CONTENT_HASH: &str = "fileContentHash";
pub(crate) const KEY_FILE_CONTENT: &str = "fileContent";
pub(crate) const KEY_DOCUMENT: &str = "document";

/// Stable point id for a file, derived from its path hash.
#[must_use]
pub fn point_id(file_path_hash: &str) -> String {
    Uuid::new_v5(&POINT_NAMESPACE, file_path_hash.as_bytes()).to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentMetadata {
    pub file_path: String,
    pub file_path_hash: String,
    pub file_content_hash: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_content: Option<String>,
}

/// One file's entry in a collection.
#[derive(Debug, Clone)]
pub struct IndexedDocument {
    pub id: String,
    pub embedding_vector: Vec<f32>,
    /// Text that was embedded: a summary, or the raw content.
    pub document: String,
    pub metadata: DocumentMetadata,
}

impl IndexedDocument {
    #[must_use]
    pub fn new(embedding_vector: Vec<f32>, document: String, metadata: DocumentMetadata) -> Self {
        Self {
            id: point_id(&metadata.file_path_hash),
            embedding_vector,
            document,
            metadata,
        }
    }

    pub(crate) fn into_point(self) -> VectorPoint {
        let mut payload = HashMap::from([
            (KEY_DOCUMENT.to_owned(), self.document.into()),
            (KEY_FILE_PATH.to_owned(), self.metadata.file_path.into()),
            (
                KEY_FILE_PATH_HASH.to_owned(),
                self.metadata.file_path_hash.into(),
            ),
            (
                KEY_FILE_CONTENT_HASH.to_owned(),
                self.metadata.file_content_hash.into(),
            ),
        ]);
        if let Some(content) = self.metadata.file_content {
            payload.insert(KEY_FILE_CONTENT.to_owned(), content.into());
        }
        VectorPoint {
            id: self.id,
            vector: self.embedding_vector,
            payload,
        }
    }
}

#[derive(Debug, Clone)]
pub enum QueryInput {
    Text(String),
    Vector(Vec<f32>),
}

impl From<&str> for QueryInput {
    fn from(text: &str) -> Self {
        Self::Text(text.to_owned())
    }
}

impl From<String> for QueryInput {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<Vec<f32>> for QueryInput {
    fn from(vector: Vec<f32>) -> Self {
        Self::Vector(vector)
    }
}

/// A retrieved document. `distance` is `1 - cosine similarity`: lower is closer.
#[derive(Debug, Clone, Serialize)]
pub struct QueryResult {
    pub id: String,
    pub document: String,
    pub distance: f32,
    pub metadata: DocumentMetadata,
}

fn payload_str(
    payload: &HashMap<String, serde_json::Value>,
    key: &str,
) -> Result<String, VectorStoreError> {
    payload
        .get(key)
        .and_then(serde_json::Value::as_str)
        .map(str::to_owned)
        .ok_or_else(|| VectorStoreError::Serialization(format!("payload missing {key}")))
}

impl TryFrom<ScoredVectorPoint> for QueryResult {
    type Error = VectorStoreError;

    fn try_from(point: ScoredVectorPoint) -> Result<Self, Self::Error> {
        let payload = &point.payload;
        let metadata = DocumentMetadata {
            file_path: payload_str(payload, KEY_FILE_PATH)?,
            file_path_hash: payload_str(payload, KEY_FILE_PATH_HASH)?,
            file_content_hash: payload_str(payload, KEY_FILE_CONTENT_HASH)?,
            file_content: payload
                .get(KEY_FILE_CONTENT)
                .and_then(serde_json::Value::as_str)
                .map(str::to_owned),
        };
        Ok(Self {
            document: payload_str(payload, KEY_DOCUMENT)?,
            distance: 1.0 - point.score,
            id: point.id,
            metadata,
        })
    }
}
