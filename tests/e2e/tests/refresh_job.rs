//! Knowledge-base refresh job: atomic promotion into the live collection,
//! the chunk-id/url invariant, and the "nothing crawled, nothing touched"
//! safety rule.

use std::collections::HashSet;
use std::sync::Arc;

use sha2::{Digest, Sha256};
use verity_core::{run_refresh, RefreshConfig, SearchHit, Storage};
use verity_e2e::mocks::{EmptyWebSearch, FixedEmbedder, FixedWebSearch};

const TEST_DIMENSIONS: usize = 4;
const TEST_VECTOR: [f32; 4] = [0.1, 0.2, 0.3, 0.4];

fn config(queries: Vec<&str>) -> RefreshConfig {
    RefreshConfig {
        queries: queries.into_iter().map(String::from).collect(),
        num_results_per_query: 10,
        chunk_max_chars: 512,
        chunk_overlap: 100,
        embed_batch_size: 100,
        credible_domains: ["reuters.com".to_string(), "apnews.com".to_string()].into_iter().collect(),
    }
}

#[tokio::test]
async fn zero_search_results_leaves_live_collection_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let storage = Storage::new(Some(dir.path().to_path_buf()), TEST_DIMENSIONS).unwrap();
    let search: Arc<dyn verity_core::WebSearchClient> = Arc::new(EmptyWebSearch);
    let embedder: Arc<dyn verity_core::EmbeddingClient> = Arc::new(FixedEmbedder::new(TEST_VECTOR.to_vec()));

    let outcome = run_refresh(&storage, &search, &embedder, &config(vec!["today's top news"])).await.unwrap();

    assert!(outcome.skipped);
    assert_eq!(outcome.chunks_ingested, 0);
    let live = storage.query("current_affairs_24h", &TEST_VECTOR, 5).unwrap();
    assert!(live.is_empty());
}

/// After a successful refresh, every chunk id in the live collection starts
/// with `ca_` and its first 16 hex characters equal `sha256(url)[0:16]`.
#[tokio::test]
async fn successful_refresh_promotes_chunks_whose_ids_derive_from_url_sha256() {
    let dir = tempfile::tempdir().unwrap();
    let storage = Storage::new(Some(dir.path().to_path_buf()), TEST_DIMENSIONS).unwrap();

    let hits = vec![
        SearchHit {
            title: "Major event unfolds".to_string(),
            url: "https://reuters.com/world/2026/major-event-unfolds".to_string(),
            snippet: "Reporters on the ground describe a major event unfolding overnight.".to_string(),
        },
        SearchHit {
            title: "Second major story".to_string(),
            url: "https://apnews.com/article/second-major-story".to_string(),
            snippet: "A second major story developed in parallel, officials say.".to_string(),
        },
    ];
    let search: Arc<dyn verity_core::WebSearchClient> = Arc::new(FixedWebSearch::new(hits.clone()));
    let embedder: Arc<dyn verity_core::EmbeddingClient> = Arc::new(FixedEmbedder::new(TEST_VECTOR.to_vec()));

    let outcome = run_refresh(&storage, &search, &embedder, &config(vec!["today's top news"])).await.unwrap();
    assert!(!outcome.skipped);
    assert_eq!(outcome.chunks_ingested, 2);

    let live = storage.query("current_affairs_24h", &TEST_VECTOR, 10).unwrap();
    assert_eq!(live.len(), 2);

    let urls: HashSet<String> = hits.iter().map(|h| h.url.clone()).collect();
    for m in &live {
        assert!(m.id.starts_with("ca_"));
        let url = m.metadata.get("url").expect("metadata carries url");
        assert!(urls.contains(url));
        let digest = Sha256::digest(url.as_bytes());
        let expected_prefix = format!("{digest:x}")[..16].to_string();
        let id_prefix = m.id.strip_prefix("ca_").unwrap().split('_').next().unwrap();
        assert_eq!(id_prefix, expected_prefix);
    }
}

/// A prior refresh's promoted collection survives a subsequent failed
/// refresh attempt (embedding outage) unchanged, since promotion only
/// happens after every batch embeds successfully.
#[tokio::test]
async fn failed_refresh_does_not_disturb_a_previously_promoted_collection() {
    use verity_e2e::mocks::FailingEmbedder;

    let dir = tempfile::tempdir().unwrap();
    let storage = Storage::new(Some(dir.path().to_path_buf()), TEST_DIMENSIONS).unwrap();

    let hits = vec![SearchHit {
        title: "Story one".to_string(),
        url: "https://reuters.com/world/2026/story-one".to_string(),
        snippet: "First successful refresh content.".to_string(),
    }];
    let search: Arc<dyn verity_core::WebSearchClient> = Arc::new(FixedWebSearch::new(hits));
    let embedder: Arc<dyn verity_core::EmbeddingClient> = Arc::new(FixedEmbedder::new(TEST_VECTOR.to_vec()));
    run_refresh(&storage, &search, &embedder, &config(vec!["today's top news"])).await.unwrap();

    let failing_embedder: Arc<dyn verity_core::EmbeddingClient> = Arc::new(FailingEmbedder);
    let second_hits = vec![SearchHit {
        title: "Story two".to_string(),
        url: "https://apnews.com/article/story-two".to_string(),
        snippet: "Second refresh attempt that fails to embed.".to_string(),
    }];
    let search2: Arc<dyn verity_core::WebSearchClient> = Arc::new(FixedWebSearch::new(second_hits));
    let result = run_refresh(&storage, &search2, &failing_embedder, &config(vec!["today's top news"])).await;
    assert!(result.is_err());

    let live = storage.query("current_affairs_24h", &TEST_VECTOR, 10).unwrap();
    assert_eq!(live.len(), 1);
    assert_eq!(live[0].metadata.get("url").unwrap(), "https://reuters.com/world/2026/story-one");
}
