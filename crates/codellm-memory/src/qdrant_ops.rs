//! Qdrant backend adapter.

use std::collections::HashMap;

use qdrant_client::Qdrant;
use qdrant_client::qdrant::{
    CreateCollectionBuilder, DeletePointsBuilder, Distance, PayloadIncludeSelector, PointId,
    PointStruct, PointsIdsList, ScoredPoint, ScrollPointsBuilder, SearchPointsBuilder,
    UpsertPointsBuilder, Value, VectorParamsBuilder, point_id::PointIdOptions, value::Kind,
};

use crate::vector_store::{
    BoxFuture, ScoredVectorPoint, ScrollResult, VectorPoint, VectorStore, VectorStoreError,
};

type QdrantResult<T> = Result<T, Box<qdrant_client::QdrantError>>;

const SCROLL_PAGE: u32 = 100;

/// Thin wrapper over the [`Qdrant`] gRPC client. Collections use cosine distance.
#[derive(Clone)]
pub struct QdrantOps {
    client: Qdrant,
}

impl std::fmt::Debug for QdrantOps {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QdrantOps").finish_non_exhaustive()
    }
}

impl QdrantOps {
    /// # Errors
    ///
    /// Returns an error if the Qdrant client cannot be created from `url`.
    pub fn new(url: &str) -> QdrantResult<Self> {
        let client = Qdrant::from_url(url).build().map_err(Box::new)?;
        Ok(Self { client })
    }

    /// Create a cosine collection unless it already exists.
    ///
    /// # Errors
    ///
    /// Returns an error if Qdrant cannot be reached or collection creation fails.
    pub async fn ensure_collection(&self, collection: &str, vector_size: u64) -> QdrantResult<()> {
        if self.collection_exists(collection).await? {
            return Ok(());
        }
        self.client
            .create_collection(
                CreateCollectionBuilder::new(collection)
                    .vectors_config(VectorParamsBuilder::new(vector_size, Distance::Cosine)),
            )
            .await
            .map_err(Box::new)?;
        tracing::debug!(collection, vector_size, "created qdrant collection");
        Ok(())
    }

    /// # Errors
    ///
    /// Returns an error if Qdrant cannot be reached.
    pub async fn collection_exists(&self, collection: &str) -> QdrantResult<bool> {
        self.client
            .collection_exists(collection)
            .await
            .map_err(Box::new)
    }

    /// # Errors
    ///
    /// Returns an error if the collection cannot be deleted.
    pub async fn delete_collection(&self, collection: &str) -> QdrantResult<()> {
        self.client
            .delete_collection(collection)
            .await
            .map_err(Box::new)?;
        Ok(())
    }

    async fn upsert_points(&self, collection: &str, points: Vec<PointStruct>) -> QdrantResult<()> {
        self.client
            .upsert_points(UpsertPointsBuilder::new(collection, points).wait(true))
            .await
            .map_err(Box::new)?;
        Ok(())
    }

    async fn search_points(
        &self,
        collection: &str,
        vector: Vec<f32>,
        limit: u64,
    ) -> QdrantResult<Vec<ScoredPoint>> {
        let builder = SearchPointsBuilder::new(collection, vector, limit).with_payload(true);
        let results = self.client.search_points(builder).await.map_err(Box::new)?;
        Ok(results.result)
    }

    async fn delete_points(&self, collection: &str, ids: Vec<PointId>) -> QdrantResult<()> {
        if ids.is_empty() {
            return Ok(());
        }
        self.client
            .delete_points(
                DeletePointsBuilder::new(collection)
                    .points(PointsIdsList { ids })
                    .wait(true),
            )
            .await
            .map_err(Box::new)?;
        Ok(())
    }

    async fn scroll_points(
        &self,
        collection: &str,
        key_field: &str,
        fields: &[String],
    ) -> QdrantResult<ScrollResult> {
        let mut result = ScrollResult::new();
        let mut offset: Option<PointId> = None;
        let selector = payload_selector(key_field, fields);

        loop {
            let mut page = ScrollPointsBuilder::new(collection)
                .with_payload(selector.clone())
                .with_vectors(false)
                .limit(SCROLL_PAGE);
            if let Some(from) = offset.take() {
                page = page.offset(from);
            }
            let response = self.client.scroll(page).await.map_err(Box::new)?;

            result.extend(response.result.iter().filter_map(|point| {
                let mut values = string_fields(&point.payload);
                let key = values.get(key_field)?.clone();
                values.retain(|name, _| fields.contains(name));
                Some((key, values))
            }));

            offset = response.next_page_offset;
            if offset.is_none() {
                return Ok(result);
            }
        }
    }

    /// Distinguishes a missing collection from other failures after a
    /// request error.
    async fn classify(
        &self,
        collection: String,
        message: String,
        fallback: fn(String) -> VectorStoreError,
    ) -> VectorStoreError {
        match self.collection_exists(&collection).await {
            Ok(false) => VectorStoreError::CollectionNotFound(collection),
            _ => fallback(message),
        }
    }
}

fn to_point_struct(point: VectorPoint) -> Result<PointStruct, VectorStoreError> {
    let payload: HashMap<String, Value> = serde_json::from_value(
        serde_json::Value::Object(point.payload.into_iter().collect()),
    )
    .map_err(|e| VectorStoreError::Serialization(e.to_string()))?;
    Ok(PointStruct::new(point.id, point.vector, payload))
}

/// Payload selector fetching only the scroll key and the requested fields.
fn payload_selector(key_field: &str, fields: &[String]) -> PayloadIncludeSelector {
    let mut names = vec![key_field.to_owned()];
    names.extend(fields.iter().filter(|f| *f != key_field).cloned());
    PayloadIncludeSelector { fields: names }
}

fn string_fields(payload: &HashMap<String, Value>) -> HashMap<String, String> {
    payload
        .iter()
        .filter_map(|(k, v)| match &v.kind {
            Some(Kind::StringValue(s)) => Some((k.clone(), s.clone())),
            _ => None,
        })
        .collect()
}

/// Scalar payload values only; lists and structs are never written by this crate.
fn to_json(value: Value) -> Option<serde_json::Value> {
    Some(match value.kind? {
        Kind::StringValue(s) => serde_json::Value::String(s),
        Kind::IntegerValue(i) => i.into(),
        Kind::DoubleValue(d) => serde_json::Number::from_f64(d)?.into(),
        Kind::BoolValue(b) => b.into(),
        _ => return None,
    })
}

fn from_scored_point(point: ScoredPoint) -> ScoredVectorPoint {
    let id = match point.id.and_then(|pid| pid.point_id_options) {
        Some(PointIdOptions::Uuid(u)) => u,
        Some(PointIdOptions::Num(n)) => n.to_string(),
        None => String::new(),
    };
    let payload = point
        .payload
        .into_iter()
        .filter_map(|(k, v)| Some((k, to_json(v)?)))
        .collect();

    ScoredVectorPoint {
        id,
        score: point.score,
        payload,
    }
}

impl VectorStore for QdrantOps {
    fn ensure_collection(
        &self,
        collection: &str,
        vector_size: u64,
    ) -> BoxFuture<'_, Result<(), VectorStoreError>> {
        let collection = collection.to_owned();
        Box::pin(async move {
            self.ensure_collection(&collection, vector_size)
                .await
                .map_err(|e| VectorStoreError::Collection(e.to_string()))
        })
    }

    fn collection_exists(&self, collection: &str) -> BoxFuture<'_, Result<bool, VectorStoreError>> {
        let collection = collection.to_owned();
        Box::pin(async move {
            self.collection_exists(&collection)
                .await
                .map_err(|e| VectorStoreError::Connection(e.to_string()))
        })
    }

    fn upsert(
        &self,
        collection: &str,
        points: Vec<VectorPoint>,
    ) -> BoxFuture<'_, Result<(), VectorStoreError>> {
        let collection = collection.to_owned();
        Box::pin(async move {
            let points = points
                .into_iter()
                .map(to_point_struct)
                .collect::<Result<Vec<_>, _>>()?;
            match self.upsert_points(&collection, points).await {
                Ok(()) => Ok(()),
                Err(e) => Err(self
                    .classify(collection, e.to_string(), VectorStoreError::Upsert)
                    .await),
            }
        })
    }

    fn search(
        &self,
        collection: &str,
        vector: Vec<f32>,
        limit: u64,
    ) -> BoxFuture<'_, Result<Vec<ScoredVectorPoint>, VectorStoreError>> {
        let collection = collection.to_owned();
        Box::pin(async move {
            match self.search_points(&collection, vector, limit).await {
                Ok(points) => Ok(points.into_iter().map(from_scored_point).collect()),
                Err(e) => Err(self
                    .classify(collection, e.to_string(), VectorStoreError::Search)
                    .await),
            }
        })
    }

    fn delete_by_ids(
        &self,
        collection: &str,
        ids: Vec<String>,
    ) -> BoxFuture<'_, Result<(), VectorStoreError>> {
        let collection = collection.to_owned();
        Box::pin(async move {
            let point_ids: Vec<PointId> = ids.into_iter().map(PointId::from).collect();
            self.delete_points(&collection, point_ids)
                .await
                .map_err(|e| VectorStoreError::Delete(e.to_string()))
        })
    }

    fn scroll_all(
        &self,
        collection: &str,
        key_field: &str,
        fields: &[&str],
    ) -> BoxFuture<'_, Result<ScrollResult, VectorStoreError>> {
        let collection = collection.to_owned();
        let key_field = key_field.to_owned();
        let fields: Vec<String> = fields.iter().map(|&f| f.to_owned()).collect();
        Box::pin(async move {
            match self.scroll_points(&collection, &key_field, &fields).await {
                Ok(result) => Ok(result),
                Err(e) => Err(self
                    .classify(collection, e.to_string(), VectorStoreError::Scroll)
                    .await),
            }
        })
    }
}
