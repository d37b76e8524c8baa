//! Incremental vectorization: traverse → fingerprint → summarize → embed → upsert.

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::Arc;

use codellm_llm::LlmProvider;
use codellm_llm::any::AnyProvider;
use codellm_memory::{DocumentMetadata, IndexedDocument, VectorDbClient, point_id};

use crate::error::{IndexError, Result};
use crate::fingerprint::FileFingerprint;
use crate::prompt::SummarizePrompt;
use crate::traversal::{DEFAULT_CONCURRENCY, TraversalOptions, process_files};

#[derive(Debug, Clone)]
pub struct VectorizeConfig {
    pub path: PathBuf,
    pub include: Vec<String>,
    pub exclude: Vec<String>,
    pub concurrency: usize,
    /// Store the raw file content alongside the embedded text.
    pub include_content: bool,
    /// Delete entries for files no longer matched, after a fully successful run.
    pub prune: bool,
    pub respect_gitignore: bool,
}

impl VectorizeConfig {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            include: Vec::new(),
            exclude: Vec::new(),
            concurrency: DEFAULT_CONCURRENCY,
            include_content: true,
            prune: false,
            respect_gitignore: false,
        }
    }

    fn traversal(&self) -> TraversalOptions {
        TraversalOptions {
            path: self.path.clone(),
            include: self.include.clone(),
            exclude: self.exclude.clone(),
            concurrency: self.concurrency,
            respect_gitignore: self.respect_gitignore,
        }
    }
}

/// Outcome of one `vectorize_files` run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VectorizeStats {
    pub added: usize,
    pub updated: usize,
    pub unchanged: usize,
    pub removed: usize,
}

impl VectorizeStats {
    /// Files matched by the traversal.
    #[must_use]
    pub fn scanned(&self) -> usize {
        self.added + self.updated + self.unchanged
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FileOutcome {
    Added,
    Updated,
    Unchanged,
}

pub struct Vectorizer {
    client: VectorDbClient,
    summarizer: Arc<AnyProvider>,
    config: VectorizeConfig,
}

impl Vectorizer {
    #[must_use]
    pub fn new(
        client: VectorDbClient,
        summarizer: Arc<AnyProvider>,
        config: VectorizeConfig,
    ) -> Self {
        Self {
            client,
            summarizer,
            config,
        }
    }

    #[must_use]
    pub fn client(&self) -> &VectorDbClient {
        &self.client
    }

    #[must_use]
    pub fn config(&self) -> &VectorizeConfig {
        &self.config
    }

    /// Bring the collection up to date with the files on disk.
    ///
    /// Files whose stored content hash matches are skipped without any
    /// provider or store call. With `summarize`, the embedded text is the
    /// model's summary; otherwise it is the raw content.
    ///
    /// # Errors
    ///
    /// Returns the first failure. Files upserted before it stay committed.
    pub async fn vectorize_files(
        &self,
        summarize: Option<&SummarizePrompt>,
    ) -> Result<VectorizeStats> {
        self.client.init().await?;
        let stored = self.client.stored_fingerprints().await?;
        let collection = self.client.collection();
        tracing::debug!(collection, stored = stored.len(), "vectorization started");

        let outcomes = process_files(&self.config.traversal(), |fp| {
            self.vectorize_file(fp, &stored, summarize)
        })
        .await?;

        let mut stats = VectorizeStats::default();
        let mut seen = HashSet::with_capacity(outcomes.len());
        for (path_hash, outcome) in outcomes {
            match outcome {
                FileOutcome::Added => stats.added += 1,
                FileOutcome::Updated => stats.updated += 1,
                FileOutcome::Unchanged => stats.unchanged += 1,
            }
            seen.insert(path_hash);
        }

        if self.config.prune {
            stats.removed = self.prune(&stored, &seen).await?;
        }

        tracing::info!(
            collection,
            added = stats.added,
            updated = stats.updated,
            unchanged = stats.unchanged,
            removed = stats.removed,
            "vectorization complete"
        );
        Ok(stats)
    }

    async fn vectorize_file(
        &self,
        fp: FileFingerprint,
        stored: &HashMap<String, String>,
        summarize: Option<&SummarizePrompt>,
    ) -> Result<(String, FileOutcome)> {
        let previous = stored.get(&fp.file_path_hash).map(String::as_str);
        let file_path = fp.display_path();
        if fp.is_unchanged(previous) {
            tracing::debug!(file = %file_path, "unchanged");
            return Ok((fp.file_path_hash, FileOutcome::Unchanged));
        }

        let content = fp.content_lossy();
        let document = match summarize {
            Some(prompt) => self
                .summarizer
                .chat(&prompt.messages(&file_path, &content))
                .await
                .map_err(IndexError::Summarize)?,
            None => content.clone(),
        };

        let vector = self
            .client
            .embedder()
            .embed(&document)
            .await
            .map_err(IndexError::Embedding)?;

        let metadata = DocumentMetadata {
            file_path: file_path.clone(),
            file_path_hash: fp.file_path_hash.clone(),
            file_content_hash: fp.file_content_hash,
            file_content: self.config.include_content.then_some(content),
        };
        self.client
            .upsert(IndexedDocument::new(vector, document, metadata))
            .await?;

        let outcome = if previous.is_some() {
            FileOutcome::Updated
        } else {
            FileOutcome::Added
        };
        tracing::debug!(file = %file_path, ?outcome, "vectorized");
        Ok((fp.file_path_hash, outcome))
    }

    async fn prune(
        &self,
        stored: &HashMap<String, String>,
        seen: &HashSet<String>,
    ) -> Result<usize> {
        let stale: Vec<String> = stored
            .keys()
            .filter(|hash| !seen.contains(*hash))
            .map(|hash| point_id(hash))
            .collect();
        let removed = stale.len();
        if removed > 0 {
            self.client.delete(stale).await?;
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use codellm_llm::mock::MockProvider;
    use codellm_memory::{
        BoxFuture, InMemoryVectorStore, ScoredVectorPoint, ScrollResult, VectorPoint, VectorStore,
        VectorStoreError,
    };

    use super::*;

    /// Wraps the in-memory store, counting writes and optionally failing one.
    #[derive(Default)]
    struct CountingStore {
        inner: InMemoryVectorStore,
        upserts: AtomicUsize,
        deletes: AtomicUsize,
        fail_on_upsert: Option<usize>,
    }

    impl VectorStore for CountingStore {
        fn ensure_collection(
            &self,
            collection: &str,
            vector_size: u64,
        ) -> BoxFuture<'_, std::result::Result<(), VectorStoreError>> {
            self.inner.ensure_collection(collection, vector_size)
        }

        fn collection_exists(
            &self,
            collection: &str,
        ) -> BoxFuture<'_, std::result::Result<bool, VectorStoreError>> {
            self.inner.collection_exists(collection)
        }

        fn upsert(
            &self,
            collection: &str,
            points: Vec<VectorPoint>,
        ) -> BoxFuture<'_, std::result::Result<(), VectorStoreError>> {
            let n = self.upserts.fetch_add(1, Ordering::SeqCst) + 1;
            if self.fail_on_upsert == Some(n) {
                return Box::pin(async { Err(VectorStoreError::Upsert("injected".into())) });
            }
            self.inner.upsert(collection, points)
        }

        fn search(
            &self,
            collection: &str,
            vector: Vec<f32>,
            limit: u64,
        ) -> BoxFuture<'_, std::result::Result<Vec<ScoredVectorPoint>, VectorStoreError>> {
            self.inner.search(collection, vector, limit)
        }

        fn delete_by_ids(
            &self,
            collection: &str,
            ids: Vec<String>,
        ) -> BoxFuture<'_, std::result::Result<(), VectorStoreError>> {
            self.deletes.fetch_add(1, Ordering::SeqCst);
            self.inner.delete_by_ids(collection, ids)
        }

        fn scroll_all(
            &self,
            collection: &str,
            key_field: &str,
            fields: &[&str],
        ) -> BoxFuture<'_, std::result::Result<ScrollResult, VectorStoreError>> {
            self.inner.scroll_all(collection, key_field, fields)
        }
    }

    const COLLECTION: &str = "codeSummaryQuery";
    const STORED_FIELDS: [&str; 4] = ["document", "fileContent", "fileContentHash", "filePathHash"];

    struct Harness {
        dir: tempfile::TempDir,
        store: Arc<CountingStore>,
        embedder: MockProvider,
        summarizer: MockProvider,
    }

    impl Harness {
        fn new(files: &[(&str, &str)]) -> Self {
            Self::with_store(files, CountingStore::default())
        }

        fn with_store(files: &[(&str, &str)], store: CountingStore) -> Self {
            let dir = tempfile::tempdir().unwrap();
            for (name, content) in files {
                write(&dir, name, content);
            }
            Self {
                dir,
                store: Arc::new(store),
                embedder: MockProvider::default(),
                summarizer: MockProvider::with_responses(Vec::new()),
            }
        }

        fn vectorizer(&self, configure: impl FnOnce(&mut VectorizeConfig)) -> Vectorizer {
            let mut config = VectorizeConfig::new(self.dir.path());
            config.include = vec!["**/*.rs".into()];
            config.concurrency = 1;
            configure(&mut config);
            let client = VectorDbClient::new(
                self.store.clone(),
                COLLECTION,
                Arc::new(AnyProvider::Mock(self.embedder.clone())),
            );
            Vectorizer::new(
                client,
                Arc::new(AnyProvider::Mock(self.summarizer.clone())),
                config,
            )
        }

        async fn stored(&self) -> ScrollResult {
            self.store
                .inner
                .scroll_all(COLLECTION, "filePath", &STORED_FIELDS)
                .await
                .unwrap()
        }

        fn upserts(&self) -> usize {
            self.store.upserts.load(Ordering::SeqCst)
        }
    }

    fn write(dir: &tempfile::TempDir, name: &str, content: &str) {
        let path = dir.path().join(name);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    #[tokio::test]
    async fn first_run_adds_every_file() {
        let h = Harness::new(&[
            ("a.rs", "fn a() {}"),
            ("src/b.rs", "fn b() {}"),
            ("c.md", "# c"),
        ]);
        let stats = h.vectorizer(|_| {}).vectorize_files(None).await.unwrap();

        assert_eq!(
            stats,
            VectorizeStats {
                added: 2,
                ..VectorizeStats::default()
            }
        );
        let stored = h.stored().await;
        assert_eq!(stored.len(), 2);
        assert_eq!(stored["src/b.rs"]["document"], "fn b() {}");
        assert_eq!(stored["src/b.rs"]["fileContent"], "fn b() {}");
    }

    #[tokio::test]
    async fn rerun_on_unchanged_tree_makes_no_calls() {
        let h = Harness::new(&[("a.rs", "fn a() {}"), ("b.rs", "fn b() {}")]);
        let prompt = SummarizePrompt::code_summary();
        let vectorizer = h.vectorizer(|_| {});
        vectorizer.vectorize_files(Some(&prompt)).await.unwrap();

        let embeds = h.embedder.embed_calls();
        let chats = h.summarizer.chat_calls();
        let upserts = h.upserts();
        let before = h.stored().await;

        let stats = vectorizer.vectorize_files(Some(&prompt)).await.unwrap();
        assert_eq!(stats.unchanged, 2);
        assert_eq!(stats.scanned(), 2);
        assert_eq!(h.embedder.embed_calls(), embeds);
        assert_eq!(h.summarizer.chat_calls(), chats);
        assert_eq!(h.upserts(), upserts);
        assert_eq!(h.stored().await, before);
    }

    #[tokio::test]
    async fn one_byte_change_reembeds_only_that_file() {
        let h = Harness::new(&[("a.rs", "fn a() {}"), ("b.rs", "fn b() {}")]);
        let vectorizer = h.vectorizer(|_| {});
        vectorizer.vectorize_files(None).await.unwrap();
        let embeds = h.embedder.embed_calls();

        write(&h.dir, "b.rs", "fn c() {}");
        let stats = vectorizer.vectorize_files(None).await.unwrap();

        assert_eq!(stats.updated, 1);
        assert_eq!(stats.unchanged, 1);
        assert_eq!(h.embedder.embed_calls(), embeds + 1);
        assert_eq!(h.stored().await["b.rs"]["document"], "fn c() {}");
    }

    #[tokio::test]
    async fn rename_keeps_stale_entry_without_prune() {
        let h = Harness::new(&[("old.rs", "fn x() {}")]);
        let vectorizer = h.vectorizer(|_| {});
        vectorizer.vectorize_files(None).await.unwrap();

        std::fs::rename(h.dir.path().join("old.rs"), h.dir.path().join("new.rs")).unwrap();
        let stats = vectorizer.vectorize_files(None).await.unwrap();

        assert_eq!(stats.added, 1);
        assert_eq!(stats.removed, 0);
        let stored = h.stored().await;
        assert!(stored.contains_key("old.rs"));
        assert!(stored.contains_key("new.rs"));
        assert_eq!(h.store.deletes.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn prune_removes_unseen_entries() {
        let h = Harness::new(&[("old.rs", "fn x() {}"), ("kept.rs", "fn k() {}")]);
        h.vectorizer(|_| {}).vectorize_files(None).await.unwrap();

        std::fs::remove_file(h.dir.path().join("old.rs")).unwrap();
        let stats = h
            .vectorizer(|c| c.prune = true)
            .vectorize_files(None)
            .await
            .unwrap();

        assert_eq!(stats.removed, 1);
        assert_eq!(stats.unchanged, 1);
        let stored = h.stored().await;
        assert_eq!(stored.len(), 1);
        assert!(stored.contains_key("kept.rs"));
    }

    #[tokio::test]
    async fn summary_is_embedded_when_prompt_given() {
        let h = Harness::new(&[("a.rs", "fn a() {}")]);
        let stats = h
            .vectorizer(|c| c.include_content = false)
            .vectorize_files(Some(&SummarizePrompt::code_summary()))
            .await
            .unwrap();

        assert_eq!(stats.added, 1);
        assert_eq!(h.summarizer.chat_calls(), 1);
        let stored = h.stored().await;
        assert_eq!(stored["a.rs"]["document"], "mock response");
        assert!(!stored["a.rs"].contains_key("fileContent"));
    }

    #[tokio::test]
    async fn failure_aborts_and_rerun_heals() {
        let store = CountingStore {
            fail_on_upsert: Some(2),
            ..CountingStore::default()
        };
        let h = Harness::with_store(
            &[("a.rs", "fn a() {}"), ("b.rs", "fn b() {}"), ("c.rs", "fn c() {}")],
            store,
        );
        let vectorizer = h.vectorizer(|_| {});

        let err = vectorizer.vectorize_files(None).await.unwrap_err();
        assert_eq!(err.aborted_path(), Some(std::path::Path::new("b.rs")));
        let stored = h.stored().await;
        assert_eq!(stored.len(), 1);
        assert!(stored.contains_key("a.rs"));

        let stats = vectorizer.vectorize_files(None).await.unwrap();
        assert_eq!(stats.unchanged, 1);
        assert_eq!(stats.added, 2);
        assert_eq!(h.stored().await.len(), 3);
    }

    #[tokio::test]
    async fn summarizer_failure_is_reported() {
        let mut h = Harness::new(&[("a.rs", "fn a() {}")]);
        h.summarizer = MockProvider::failing();
        let err = h
            .vectorizer(|_| {})
            .vectorize_files(Some(&SummarizePrompt::code_summary()))
            .await
            .unwrap_err();

        let IndexError::Aborted { source, .. } = err else {
            panic!("expected Aborted");
        };
        assert!(matches!(*source, IndexError::Summarize(_)));
        assert_eq!(h.upserts(), 0);
    }

    #[tokio::test]
    async fn embedding_failure_fails_init() {
        let mut h = Harness::new(&[("a.rs", "fn a() {}")]);
        h.embedder = MockProvider::failing();
        let err = h.vectorizer(|_| {}).vectorize_files(None).await.unwrap_err();
        assert!(matches!(
            err,
            IndexError::VectorStore(VectorStoreError::Embedding(_))
        ));
    }
}
