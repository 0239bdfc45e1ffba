//! KB Refresh Job (C14): re-crawls a fixed set of current-affairs queries,
//! chunks and embeds the results into a temp collection, then atomically
//! promotes it over the live `current_affairs_24h` collection via
//! [`Storage::clone_collection`]. Runs on an interval driven by a background
//! `tokio::spawn`ed task in the server binary, and is also exposed as a
//! standalone subcommand for manual/cron invocation.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use sha2::{Digest, Sha256};

use crate::constants::{COLLECTION_CURRENT_AFFAIRS_24H, REFRESH_TEMP_COLLECTION};
use crate::error::RefreshError;
use crate::evidence::SearchHit;
use crate::providers::{EmbeddingClient, WebSearchClient};
use crate::storage::Storage;

#[derive(Debug, Clone)]
pub struct RefreshConfig {
    pub queries: Vec<String>,
    pub num_results_per_query: usize,
    pub chunk_max_chars: usize,
    pub chunk_overlap: usize,
    pub embed_batch_size: usize,
    pub credible_domains: HashSet<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshOutcome {
    pub sources_crawled: usize,
    pub chunks_ingested: usize,
    pub skipped: bool,
}

struct RetainedResult {
    url: String,
    title: String,
    snippet: String,
}

/// Crawl every query, partitioning hits into credible (domain in the
/// allowlist) vs. other, concatenated credible-first, deduped by URL with
/// first occurrence winning (§4.14 steps 1-2).
async fn crawl(search: &Arc<dyn WebSearchClient>, config: &RefreshConfig) -> Vec<RetainedResult> {
    let mut credible = Vec::new();
    let mut other = Vec::new();
    let mut seen = HashSet::new();

    for query in &config.queries {
        let hits: Vec<SearchHit> = search.search(query, config.num_results_per_query).await;
        for hit in hits {
            let url = hit.url.trim().to_string();
            if url.is_empty() || !seen.insert(url.clone()) {
                continue;
            }
            let retained = RetainedResult { url: url.clone(), title: hit.title, snippet: hit.snippet };
            if crate::credibility::is_credible(&url, &config.credible_domains) {
                credible.push(retained);
            } else {
                other.push(retained);
            }
        }
    }

    credible.extend(other);
    credible
}

/// Sliding-window chunking (§4.14 step 3): windows of `max_chars`, each
/// extended backward to the nearest `". "` when possible, stepping forward
/// by `max_chars - overlap` and guarding `start >= end`.
fn chunk_content(content: &str, max_chars: usize, overlap: usize) -> Vec<String> {
    let chars: Vec<char> = content.chars().collect();
    if chars.len() <= max_chars {
        return vec![content.to_string()];
    }

    let step = max_chars.saturating_sub(overlap).max(1);
    let mut chunks = Vec::new();
    let mut start = 0usize;

    while start < chars.len() {
        let mut end = (start + max_chars).min(chars.len());
        if end < chars.len() {
            if let Some(back) = find_backward_boundary(&chars, start, end) {
                end = back;
            }
        }
        if start >= end {
            break;
        }
        chunks.push(chars[start..end].iter().collect());
        if end >= chars.len() {
            break;
        }
        start += step;
    }

    chunks
}

/// Search backward from `end` for the nearest `". "` boundary, within
/// `[start, end)`. Returns the index just after the period-space when found.
fn find_backward_boundary(chars: &[char], start: usize, end: usize) -> Option<usize> {
    let mut i = end;
    while i > start + 1 {
        if chars[i - 2] == '.' && chars[i - 1] == ' ' {
            return Some(i);
        }
        i -= 1;
    }
    None
}

fn chunk_id(url: &str, idx: usize) -> String {
    let digest = Sha256::digest(url.as_bytes());
    let hex = format!("{digest:x}");
    format!("ca_{}_{idx}", &hex[..16.min(hex.len())])
}

/// Run the full refresh: crawl, chunk, embed in batches into the temp
/// collection, then atomically promote it over the live collection.
/// Skips without touching the live collection if crawling yields nothing;
/// aborts without promotion if any embedding batch fails.
pub async fn run_refresh(
    storage: &Storage,
    search: &Arc<dyn WebSearchClient>,
    embedder: &Arc<dyn EmbeddingClient>,
    config: &RefreshConfig,
) -> Result<RefreshOutcome, RefreshError> {
    let retained = crawl(search, config).await;
    if retained.is_empty() {
        tracing::info!("refresh job: no results crawled, skipping");
        return Ok(RefreshOutcome { sources_crawled: 0, chunks_ingested: 0, skipped: true });
    }

    let mut ids = Vec::new();
    let mut documents = Vec::new();
    let mut metadatas = Vec::new();

    for result in &retained {
        let content = format!("{}\n\n{}", result.title, result.snippet);
        for (idx, chunk) in chunk_content(&content, config.chunk_max_chars, config.chunk_overlap).into_iter().enumerate() {
            let mut metadata = HashMap::new();
            metadata.insert("url".to_string(), result.url.clone());
            metadata.insert("title".to_string(), result.title.clone());
            metadata.insert("snippet".to_string(), result.snippet.clone());
            metadata.insert("source".to_string(), "web".to_string());

            ids.push(chunk_id(&result.url, idx));
            documents.push(chunk);
            metadatas.push(metadata);
        }
    }

    storage.delete(REFRESH_TEMP_COLLECTION)?;

    let total_chunks = ids.len();
    for batch_start in (0..total_chunks).step_by(config.embed_batch_size.max(1)) {
        let batch_end = (batch_start + config.embed_batch_size.max(1)).min(total_chunks);
        let batch_documents = &documents[batch_start..batch_end];
        let embeddings = embedder.embed(batch_documents).await?;
        storage.add(
            REFRESH_TEMP_COLLECTION,
            &ids[batch_start..batch_end],
            batch_documents,
            &metadatas[batch_start..batch_end],
            &embeddings,
        )?;
    }

    storage.clone_collection(REFRESH_TEMP_COLLECTION, COLLECTION_CURRENT_AFFAIRS_24H)?;

    Ok(RefreshOutcome { sources_crawled: retained.len(), chunks_ingested: total_chunks, skipped: false })
}
