//! RAG Retriever (C6): embed the claim once, query the current-affairs
//! collection (and, unless restricted, the static general-knowledge
//! collection too), and lift results into `EvidenceItem`s.

use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};

use lru::LruCache;

use crate::constants::{COLLECTION_CURRENT_AFFAIRS_24H, COLLECTION_STATIC_GK};
use crate::evidence::{EvidenceItem, EvidenceSource};
use crate::providers::EmbeddingClient;
use crate::storage::Storage;

/// The orchestrator's widen loop re-retrieves with the same claim text
/// across iterations; this bounds how many distinct claim embeddings are
/// kept around per retriever instance.
const EMBEDDING_CACHE_SIZE: usize = 64;

pub struct RagRetriever {
    embedder: Arc<dyn EmbeddingClient>,
    storage: Arc<Storage>,
    embedding_cache: Mutex<LruCache<String, Vec<f32>>>,
}

impl RagRetriever {
    pub fn new(embedder: Arc<dyn EmbeddingClient>, storage: Arc<Storage>) -> Self {
        Self {
            embedder,
            storage,
            embedding_cache: Mutex::new(LruCache::new(NonZeroUsize::new(EMBEDDING_CACHE_SIZE).unwrap())),
        }
    }

    /// Retrieve up to `top_k` items per collection, deduplicated by URL
    /// across collections (first occurrence wins). Any per-collection query
    /// failure is logged and skipped. Returns `[]` on embed failure or an
    /// empty/whitespace-only claim.
    pub async fn retrieve(&self, claim: &str, top_k: usize, current_affairs_only: bool) -> Vec<EvidenceItem> {
        if claim.trim().is_empty() {
            return Vec::new();
        }

        if let Some(cached) = self.embedding_cache.lock().expect("embedding cache lock poisoned").get(claim) {
            return self.query_collections(cached.clone(), top_k, current_affairs_only);
        }

        let embedding = match self.embedder.embed(std::slice::from_ref(&claim.to_string())).await {
            Ok(mut vecs) if !vecs.is_empty() => vecs.remove(0),
            Ok(_) => return Vec::new(),
            Err(e) => {
                tracing::warn!("RAG embed failed for claim: {e}");
                return Vec::new();
            }
        };
        self.embedding_cache
            .lock()
            .expect("embedding cache lock poisoned")
            .put(claim.to_string(), embedding.clone());

        self.query_collections(embedding, top_k, current_affairs_only)
    }

    fn query_collections(&self, embedding: Vec<f32>, top_k: usize, current_affairs_only: bool) -> Vec<EvidenceItem> {
        let mut collections = vec![COLLECTION_CURRENT_AFFAIRS_24H];
        if !current_affairs_only {
            collections.push(COLLECTION_STATIC_GK);
        }

        let mut seen_urls = std::collections::HashSet::new();
        let mut items = Vec::new();

        for name in collections {
            let matches = match self.storage.query(name, &embedding, top_k) {
                Ok(m) => m,
                Err(e) => {
                    tracing::warn!("RAG query failed for collection {name}: {e}");
                    continue;
                }
            };
            for m in matches {
                let url = m.metadata.get("url").cloned().unwrap_or_default();
                let url = url.trim().to_string();
                if url.is_empty() || !seen_urls.insert(url.clone()) {
                    continue;
                }
                let title = m.metadata.get("title").cloned().unwrap_or_default();
                let snippet = m.metadata.get("snippet").cloned().unwrap_or_else(|| m.content.clone());
                let source = m.metadata.get("source").cloned().unwrap_or_default();
                let mut item = EvidenceItem::new(
                    title.chars().take(500).collect::<String>(),
                    url,
                    snippet.chars().take(1000).collect::<String>(),
                    EvidenceSource::from_str(&source),
                );
                item.score = m.score;
                items.push(item);
            }
        }

        items
    }
}
