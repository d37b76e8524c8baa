use std::collections::{BTreeMap, HashMap};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::vector_store::{
    BoxFuture, ScoredVectorPoint, ScrollResult, VectorPoint, VectorStore, VectorStoreError,
};

type Collections = HashMap<String, Collection>;

struct Collection {
    dimension: usize,
    points: BTreeMap<String, VectorPoint>,
}

impl Collection {
    fn accepts(&self, vector: &[f32]) -> Result<(), VectorStoreError> {
        if vector.len() != self.dimension {
            return Err(VectorStoreError::DimensionMismatch {
                expected: self.dimension,
                actual: vector.len(),
            });
        }
        Ok(())
    }
}

/// Process-local backend. Scores are cosine similarity; nothing is persisted.
#[derive(Default)]
pub struct InMemoryVectorStore {
    collections: RwLock<Collections>,
}

impl std::fmt::Debug for InMemoryVectorStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<String> = self
            .read(VectorStoreError::Collection)
            .map(|cols| cols.keys().cloned().collect())
            .unwrap_or_default();
        names.sort();
        f.debug_struct("InMemoryVectorStore")
            .field("collections", &names)
            .finish()
    }
}

impl InMemoryVectorStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of points stored in `collection`, `None` if it does not exist.
    #[must_use]
    pub fn len(&self, collection: &str) -> Option<usize> {
        let cols = self.read(VectorStoreError::Collection).ok()?;
        cols.get(collection).map(|c| c.points.len())
    }

    fn read(
        &self,
        err: fn(String) -> VectorStoreError,
    ) -> Result<RwLockReadGuard<'_, Collections>, VectorStoreError> {
        self.collections.read().map_err(|e| err(e.to_string()))
    }

    fn write(
        &self,
        err: fn(String) -> VectorStoreError,
    ) -> Result<RwLockWriteGuard<'_, Collections>, VectorStoreError> {
        self.collections.write().map_err(|e| err(e.to_string()))
    }
}

fn existing<'a>(cols: &'a Collections, name: &str) -> Result<&'a Collection, VectorStoreError> {
    cols.get(name)
        .ok_or_else(|| VectorStoreError::CollectionNotFound(name.to_owned()))
}

fn existing_mut<'a>(
    cols: &'a mut Collections,
    name: &str,
) -> Result<&'a mut Collection, VectorStoreError> {
    cols.get_mut(name)
        .ok_or_else(|| VectorStoreError::CollectionNotFound(name.to_owned()))
}

/// Cosine similarity; 0 when either vector has no magnitude.
fn cosine(a: &[f32], b: &[f32]) -> f32 {
    let (dot, aa, bb) = a
        .iter()
        .zip(b)
        .fold((0.0f32, 0.0f32, 0.0f32), |(dot, aa, bb), (x, y)| {
            (dot + x * y, aa + x * x, bb + y * y)
        });
    let denom = aa.sqrt() * bb.sqrt();
    if denom == 0.0 { 0.0 } else { dot / denom }
}

impl VectorStore for InMemoryVectorStore {
    fn ensure_collection(
        &self,
        collection: &str,
        vector_size: u64,
    ) -> BoxFuture<'_, Result<(), VectorStoreError>> {
        let name = collection.to_owned();
        Box::pin(async move {
            let dimension = usize::try_from(vector_size)
                .map_err(|e| VectorStoreError::Collection(e.to_string()))?;
            self.write(VectorStoreError::Collection)?
                .entry(name)
                .or_insert_with(|| Collection {
                    dimension,
                    points: BTreeMap::new(),
                });
            Ok(())
        })
    }

    fn collection_exists(&self, collection: &str) -> BoxFuture<'_, Result<bool, VectorStoreError>> {
        let name = collection.to_owned();
        Box::pin(async move { Ok(self.read(VectorStoreError::Collection)?.contains_key(&name)) })
    }

    fn upsert(
        &self,
        collection: &str,
        points: Vec<VectorPoint>,
    ) -> BoxFuture<'_, Result<(), VectorStoreError>> {
        let name = collection.to_owned();
        Box::pin(async move {
            let mut cols = self.write(VectorStoreError::Upsert)?;
            let target = existing_mut(&mut cols, &name)?;
            points.iter().try_for_each(|p| target.accepts(&p.vector))?;
            target
                .points
                .extend(points.into_iter().map(|p| (p.id.clone(), p)));
            Ok(())
        })
    }

    fn search(
        &self,
        collection: &str,
        vector: Vec<f32>,
        limit: u64,
    ) -> BoxFuture<'_, Result<Vec<ScoredVectorPoint>, VectorStoreError>> {
        let name = collection.to_owned();
        Box::pin(async move {
            let cols = self.read(VectorStoreError::Search)?;
            let source = existing(&cols, &name)?;
            source.accepts(&vector)?;

            // points iterate in id order, so the stable sort breaks ties by id
            let mut hits: Vec<ScoredVectorPoint> = source
                .points
                .values()
                .map(|p| ScoredVectorPoint {
                    id: p.id.clone(),
                    score: cosine(&vector, &p.vector),
                    payload: p.payload.clone(),
                })
                .collect();
            hits.sort_by(|a, b| b.score.total_cmp(&a.score));
            hits.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
            Ok(hits)
        })
    }

    fn delete_by_ids(
        &self,
        collection: &str,
        ids: Vec<String>,
    ) -> BoxFuture<'_, Result<(), VectorStoreError>> {
        let name = collection.to_owned();
        Box::pin(async move {
            let mut cols = self.write(VectorStoreError::Delete)?;
            let target = existing_mut(&mut cols, &name)?;
            target.points.retain(|id, _| !ids.contains(id));
            Ok(())
        })
    }

    fn scroll_all(
        &self,
        collection: &str,
        key_field: &str,
        fields: &[&str],
    ) -> BoxFuture<'_, Result<ScrollResult, VectorStoreError>> {
        let name = collection.to_owned();
        let key_field = key_field.to_owned();
        let wanted: Vec<String> = fields.iter().map(|&f| f.to_owned()).collect();
        Box::pin(async move {
            let cols = self.read(VectorStoreError::Scroll)?;
            let source = existing(&cols, &name)?;
            let entries = source.points.values().filter_map(|p| {
                let key = p.payload.get(&key_field)?.as_str()?.to_owned();
                let fields = wanted
                    .iter()
                    .filter_map(|f| Some((f.clone(), p.payload.get(f)?.as_str()?.to_owned())))
                    .collect();
                Some((key, fields))
            });
            Ok(entries.collect())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(id: &str, vector: &[f32]) -> VectorPoint {
        VectorPoint {
            id: id.into(),
            vector: vector.to_vec(),
            payload: HashMap::from([("filePathHash".into(), serde_json::json!(id))]),
        }
    }

    async fn store_with(points: &[(&str, &[f32])]) -> InMemoryVectorStore {
        let store = InMemoryVectorStore::new();
        store.ensure_collection("files", 3).await.unwrap();
        let points = points.iter().map(|(id, v)| point(id, v)).collect();
        store.upsert("files", points).await.unwrap();
        store
    }

    #[tokio::test]
    async fn ensure_collection_keeps_existing_points() {
        let store = store_with(&[("a", &[1.0, 0.0, 0.0])]).await;
        store.ensure_collection("files", 3).await.unwrap();
        assert!(store.collection_exists("files").await.unwrap());
        assert_eq!(store.len("files"), Some(1));
        assert_eq!(store.len("other"), None);
    }

    #[tokio::test]
    async fn upsert_same_id_replaces() {
        let store = store_with(&[("a", &[1.0, 0.0, 0.0])]).await;
        store
            .upsert("files", vec![point("a", &[0.0, 1.0, 0.0])])
            .await
            .unwrap();
        assert_eq!(store.len("files"), Some(1));

        let hits = store.search("files", vec![0.0, 1.0, 0.0], 9).await.unwrap();
        assert!((hits[0].score - 1.0).abs() < 1e-6);
    }

    #[tokio::test]
    async fn search_is_closest_first_and_bounded() {
        let store = store_with(&[
            ("far", &[0.0, 0.0, 1.0]),
            ("near", &[1.0, 0.0, 0.0]),
            ("mid", &[0.7, 0.7, 0.0]),
        ])
        .await;
        let hits = store.search("files", vec![1.0, 0.0, 0.0], 2).await.unwrap();
        let ids: Vec<&str> = hits.iter().map(|h| h.id.as_str()).collect();
        assert_eq!(ids, ["near", "mid"]);
    }

    #[tokio::test]
    async fn equal_scores_break_ties_by_id() {
        let store = store_with(&[("b", &[1.0, 0.0, 0.0]), ("a", &[1.0, 0.0, 0.0])]).await;
        let hits = store.search("files", vec![1.0, 0.0, 0.0], 2).await.unwrap();
        assert_eq!(hits[0].id, "a");
        assert_eq!(hits[1].id, "b");
    }

    #[tokio::test]
    async fn missing_collection_is_reported() {
        let store = InMemoryVectorStore::new();
        let search = store.search("nope", vec![1.0], 1).await.unwrap_err();
        let upsert = store.upsert("nope", vec![]).await.unwrap_err();
        let scroll = store.scroll_all("nope", "k", &[]).await.unwrap_err();
        for err in [search, upsert, scroll] {
            assert!(matches!(err, VectorStoreError::CollectionNotFound(ref c) if c == "nope"));
        }
    }

    #[tokio::test]
    async fn wrong_dimension_rejects_whole_batch() {
        let store = store_with(&[]).await;
        let err = store
            .upsert(
                "files",
                vec![point("ok", &[1.0, 0.0, 0.0]), point("short", &[1.0, 0.0])],
            )
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            VectorStoreError::DimensionMismatch {
                expected: 3,
                actual: 2
            }
        ));
        assert_eq!(store.len("files"), Some(0));

        let err = store.search("files", vec![1.0], 1).await.unwrap_err();
        assert!(matches!(err, VectorStoreError::DimensionMismatch { .. }));
    }

    #[tokio::test]
    async fn delete_ignores_unknown_ids() {
        let store = store_with(&[("a", &[1.0, 0.0, 0.0]), ("b", &[0.0, 1.0, 0.0])]).await;
        store
            .delete_by_ids("files", vec!["a".into(), "zzz".into()])
            .await
            .unwrap();
        assert_eq!(store.len("files"), Some(1));
    }

    #[tokio::test]
    async fn scroll_keeps_requested_string_fields_only() {
        let store = store_with(&[]).await;
        let mut p = point("a", &[1.0, 0.0, 0.0]);
        p.payload
            .insert("fileContentHash".into(), serde_json::json!("h1"));
        p.payload.insert("size".into(), serde_json::json!(42));
        p.payload.insert("document".into(), serde_json::json!("long summary"));
        let mut unkeyed = point("b", &[0.0, 1.0, 0.0]);
        unkeyed.payload.clear();
        store.upsert("files", vec![p, unkeyed]).await.unwrap();

        let scrolled = store
            .scroll_all("files", "filePathHash", &["fileContentHash", "size"])
            .await
            .unwrap();
        assert_eq!(scrolled.len(), 1);
        assert_eq!(scrolled["a"]["fileContentHash"], "h1");
        assert!(!scrolled["a"].contains_key("size"));
        assert!(!scrolled["a"].contains_key("document"));
    }

    #[test]
    fn cosine_edge_cases() {
        assert!(cosine(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-6);
        assert!((cosine(&[2.0, 0.0], &[5.0, 0.0]) - 1.0).abs() < 1e-6);
        assert!(cosine(&[0.0, 0.0], &[1.0, 0.0]).abs() < 1e-6);
    }

    #[tokio::test]
    async fn debug_lists_collections() {
        let store = store_with(&[]).await;
        assert!(format!("{store:?}").contains("files"));
    }
}
