//! Reranker (C9): hybrid scoring of merged evidence by relevance to the
//! claim, URL shape, and source preference.
//!
//! Uses fastembed's cross-encoder for semantic relevance when the model is
//! loaded, falling back to BM25-like term overlap scoring otherwise. Model
//! load or predict failures return the input unchanged rather than failing
//! the request.

use std::collections::HashMap;

#[cfg(feature = "embeddings")]
use fastembed::{RerankInitOptions, RerankerModel, TextRerank};

use crate::credibility::{domain_of, is_homepage_url, source_preference, url_quality};
use crate::evidence::EvidenceItem;

const MAX_DOC_CHARS: usize = 512;
const MAX_PER_DOMAIN: usize = 2;

#[derive(Debug, Clone)]
pub struct RerankerConfig {
    pub top_k: usize,
}

impl Default for RerankerConfig {
    fn default() -> Self {
        Self { top_k: 10 }
    }
}

/// Hybrid reranker. The cross-encoder model is not loaded at construction;
/// call `init_cross_encoder()` during startup, not in tests or hot paths.
pub struct Reranker {
    config: RerankerConfig,
    #[cfg(feature = "embeddings")]
    cross_encoder: Option<TextRerank>,
}

impl Default for Reranker {
    fn default() -> Self {
        Self::new(RerankerConfig::default())
    }
}

impl Reranker {
    pub fn new(config: RerankerConfig) -> Self {
        Self {
            config,
            #[cfg(feature = "embeddings")]
            cross_encoder: None,
        }
    }

    #[cfg(feature = "embeddings")]
    pub fn init_cross_encoder(&mut self) {
        if self.cross_encoder.is_some() {
            return;
        }
        let options = RerankInitOptions::new(RerankerModel::JINARerankerV1TurboEn)
            .with_show_download_progress(false);
        match TextRerank::try_new(options) {
            Ok(model) => {
                tracing::info!("cross-encoder reranker loaded");
                self.cross_encoder = Some(model);
            }
            Err(e) => {
                tracing::warn!("cross-encoder unavailable, using BM25 fallback: {e}");
            }
        }
    }

    pub fn has_cross_encoder(&self) -> bool {
        #[cfg(feature = "embeddings")]
        {
            self.cross_encoder.is_some()
        }
        #[cfg(not(feature = "embeddings"))]
        {
            false
        }
    }

    pub fn config(&self) -> &RerankerConfig {
        &self.config
    }

    /// Score `(claim, doc)` pairs with the cross-encoder if loaded, else the
    /// BM25-like fallback. Returns `None` on cross-encoder failure so the
    /// caller falls through to the fallback rather than failing the request.
    fn relevance_scores(&mut self, claim: &str, docs: &[String]) -> Vec<f32> {
        #[cfg(feature = "embeddings")]
        if let Some(ref mut model) = self.cross_encoder {
            let refs: Vec<&str> = docs.iter().map(String::as_str).collect();
            match model.rerank(claim, &refs, false, None) {
                Ok(results) => {
                    let mut by_index: HashMap<usize, f32> =
                        results.into_iter().map(|r| (r.index, r.score)).collect();
                    return (0..docs.len()).map(|i| by_index.remove(&i).unwrap_or(0.0)).collect();
                }
                Err(e) => {
                    tracing::warn!("cross-encoder predict failed, using BM25 fallback: {e}");
                }
            }
        }
        docs.iter().map(|doc| bm25_like_score(claim, doc)).collect()
    }

    /// Rerank the merged evidence list by hybrid score, returning at most
    /// `top_k` items with a per-domain cap of 2. Returns the input unchanged
    /// if `claim` or `items` is empty.
    pub fn rerank(&mut self, claim: &str, items: Vec<EvidenceItem>) -> Vec<EvidenceItem> {
        if claim.is_empty() || items.is_empty() {
            return items;
        }

        let before = items.len();
        let items: Vec<EvidenceItem> = items.into_iter().filter(|i| !is_homepage_url(&i.url)).collect();
        if before != items.len() {
            tracing::info!("reranker: filtered {} homepage URLs before reranking", before - items.len());
        }
        if items.is_empty() {
            return Vec::new();
        }

        let docs: Vec<String> = items
            .iter()
            .map(|item| {
                let doc = format!("{}\n{}", item.title, item.snippet);
                let doc = doc.trim();
                if doc.chars().count() > MAX_DOC_CHARS {
                    let truncated: String = doc.chars().take(MAX_DOC_CHARS - 3).collect();
                    format!("{truncated}...")
                } else if doc.is_empty() {
                    "(no content)".to_string()
                } else {
                    doc.to_string()
                }
            })
            .collect();

        let relevance = self.relevance_scores(claim, &docs);
        if relevance.len() != items.len() {
            tracing::warn!("reranker score length mismatch, returning evidence unchanged");
            return items;
        }

        let min_rel = relevance.iter().cloned().fold(f32::INFINITY, f32::min);
        let max_rel = relevance.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
        let range = if max_rel != min_rel { max_rel - min_rel } else { 1.0 };

        let mut scored: Vec<(f32, EvidenceItem)> = items
            .into_iter()
            .zip(relevance.iter())
            .map(|(mut item, &rel)| {
                let norm_rel = if max_rel != min_rel { (rel - min_rel) / range } else { 0.5 };
                let uq = url_quality(&item.url);
                let src_pref = source_preference(item.source.as_str());
                let hybrid = 0.7 * norm_rel + 0.2 * uq + 0.1 * src_pref;
                item.score = hybrid;
                (hybrid, item)
            })
            .collect();

        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));

        let mut result = Vec::with_capacity(self.config.top_k);
        let mut domain_count: HashMap<String, usize> = HashMap::new();
        for (_, item) in scored {
            if result.len() >= self.config.top_k {
                break;
            }
            let domain = domain_of(&item.url);
            let count = domain_count.entry(domain).or_insert(0);
            if !domain_of(&item.url).is_empty() && *count >= MAX_PER_DOMAIN {
                continue;
            }
            *count += 1;
            result.push(item);
        }

        result
    }
}

fn bm25_like_score(claim: &str, doc: &str) -> f32 {
    let claim_lower = claim.to_lowercase();
    let terms: Vec<&str> = claim_lower.split_whitespace().collect();
    let doc_lower = doc.to_lowercase();
    let doc_len = doc.len() as f32;
    if doc_len == 0.0 || terms.is_empty() {
        return 0.0;
    }

    let k1 = 1.2_f32;
    let b = 0.75_f32;
    let avg_doc_len = 500.0_f32;

    let mut score = 0.0;
    for term in &terms {
        let tf = doc_lower.matches(term).count() as f32;
        if tf > 0.0 {
            let numerator = tf * (k1 + 1.0);
            let denominator = tf + k1 * (1.0 - b + b * (doc_len / avg_doc_len));
            score += numerator / denominator;
        }
    }
    score / terms.len() as f32
}
