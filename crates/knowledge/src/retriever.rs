//! Similar-plot retrieval over the knowledge store.

use std::sync::Arc;
use storyweaver_core::error::KnowledgeError;
use storyweaver_core::knowledge::KnowledgeRecord;
use storyweaver_core::Embedder;
use tracing::{debug, warn};

use crate::store::KnowledgeStore;
use crate::vector::rank_records;

/// Finds past plots close to a new one.
///
/// Without an embedder, retrieval is always empty. An embedding failure is
/// logged and also yields an empty result; only an unreadable store is an
/// error.
pub struct Retriever {
    store: KnowledgeStore,
    embedder: Option<Arc<dyn Embedder>>,
    threshold: f32,
}

impl Retriever {
    pub fn new(store: KnowledgeStore, embedder: Option<Arc<dyn Embedder>>, threshold: f32) -> Self {
        Self {
            store,
            embedder,
            threshold,
        }
    }

    pub fn store(&self) -> &KnowledgeStore {
        &self.store
    }

    /// Embed `text`, or `None` when embedding is unavailable or fails.
    pub async fn embed(&self, text: &str) -> Option<Vec<f32>> {
        let embedder = self.embedder.as_ref()?;
        match embedder.embed(text).await {
            Ok(vector) => Some(vector),
            Err(e) => {
                warn!(model = embedder.model(), error = %e, "Embedding failed");
                None
            }
        }
    }

    /// Up to `top_k` stored records scoring above the threshold, best first.
    pub async fn retrieve_similar(
        &self,
        plot: &str,
        top_k: usize,
    ) -> Result<Vec<KnowledgeRecord>, KnowledgeError> {
        if self.embedder.is_none() || top_k == 0 {
            return Ok(Vec::new());
        }

        let kb = self.store.load()?;
        if kb.is_empty() {
            return Ok(Vec::new());
        }

        let Some(query) = self.embed(plot).await else {
            return Ok(Vec::new());
        };

        let ranked = rank_records(kb.plots, &query, self.threshold, top_k);
        debug!(
            matches = ranked.len(),
            best = ranked.first().map(|(_, s)| *s).unwrap_or_default(),
            "Retrieved similar plots"
        );
        Ok(ranked.into_iter().map(|(record, _)| record).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::new_record;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use storyweaver_core::error::ProviderError;
    use storyweaver_core::storyboard::Storyboard;

    /// Maps a plot to a vector by keyword; counts calls.
    struct KeywordEmbedder {
        calls: Mutex<usize>,
    }

    impl KeywordEmbedder {
        fn new() -> Self {
            Self {
                calls: Mutex::new(0),
            }
        }
    }

    #[async_trait]
    impl Embedder for KeywordEmbedder {
        fn model(&self) -> &str {
            "keyword"
        }

        async fn embed(&self, text: &str) -> Result<Vec<f32>, ProviderError> {
            *self.calls.lock().unwrap() += 1;
            Ok(if text.contains("heist") {
                vec![1.0, 0.0]
            } else if text.contains("vault") {
                vec![0.9, 0.1]
            } else {
                vec![0.0, 1.0]
            })
        }
    }

    struct BrokenEmbedder;

    #[async_trait]
    impl Embedder for BrokenEmbedder {
        fn model(&self) -> &str {
            "broken"
        }

        async fn embed(&self, _text: &str) -> Result<Vec<f32>, ProviderError> {
            Err(ProviderError::Network("unreachable".into()))
        }
    }

    fn empty_storyboard() -> Storyboard {
        Storyboard {
            title: "t".into(),
            scenes: vec![],
        }
    }

    fn seeded_store(dir: &tempfile::TempDir) -> KnowledgeStore {
        let store = KnowledgeStore::new(dir.path().join("kb.json"));
        let sb = empty_storyboard();
        store.append(new_record("a love story", &sb, vec![0.0, 1.0])).unwrap();
        store.append(new_record("a vault job", &sb, vec![0.9, 0.1])).unwrap();
        store.append(new_record("a heist", &sb, vec![1.0, 0.0])).unwrap();
        store
    }

    #[tokio::test]
    async fn returns_best_matches_first() {
        let dir = tempfile::tempdir().unwrap();
        let retriever = Retriever::new(seeded_store(&dir), Some(Arc::new(KeywordEmbedder::new())), 0.7);

        let similar = retriever.retrieve_similar("another heist", 2).await.unwrap();
        let plots: Vec<_> = similar.iter().map(|r| r.plot.as_str()).collect();
        assert_eq!(plots, vec!["a heist", "a vault job"]);
    }

    #[tokio::test]
    async fn top_k_limits_results() {
        let dir = tempfile::tempdir().unwrap();
        let retriever = Retriever::new(seeded_store(&dir), Some(Arc::new(KeywordEmbedder::new())), 0.7);
        assert_eq!(retriever.retrieve_similar("another heist", 1).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn high_threshold_filters() {
        let dir = tempfile::tempdir().unwrap();
        let retriever = Retriever::new(seeded_store(&dir), Some(Arc::new(KeywordEmbedder::new())), 0.995);
        let similar = retriever.retrieve_similar("a vault", 5).await.unwrap();
        // The heist vector scores ~0.994; only the exact vault vector clears.
        assert_eq!(similar.len(), 1);
        assert_eq!(similar[0].plot, "a vault job");
    }

    #[tokio::test]
    async fn no_embedder_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let retriever = Retriever::new(seeded_store(&dir), None, 0.7);
        assert!(retriever.retrieve_similar("a heist", 2).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn empty_store_skips_embedding() {
        let dir = tempfile::tempdir().unwrap();
        let embedder = Arc::new(KeywordEmbedder::new());
        let retriever = Retriever::new(
            KnowledgeStore::new(dir.path().join("kb.json")),
            Some(embedder.clone()),
            0.7,
        );

        assert!(retriever.retrieve_similar("a heist", 2).await.unwrap().is_empty());
        assert_eq!(*embedder.calls.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn embedding_failure_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let retriever = Retriever::new(seeded_store(&dir), Some(Arc::new(BrokenEmbedder)), 0.7);
        assert!(retriever.retrieve_similar("a heist", 2).await.unwrap().is_empty());
        assert!(retriever.embed("a heist").await.is_none());
    }

    #[tokio::test]
    async fn corrupt_store_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kb.json");
        std::fs::write(&path, "{broken").unwrap();

        let retriever = Retriever::new(KnowledgeStore::new(path), Some(Arc::new(KeywordEmbedder::new())), 0.7);
        assert!(retriever.retrieve_similar("a heist", 2).await.is_err());
    }
}
