//! Merger (C8): combine web and RAG evidence lists, web items first so they
//! win ties on URL, dropping duplicates and homepage URLs.

use std::collections::HashSet;

use crate::credibility::is_homepage_url;
use crate::evidence::EvidenceItem;

/// Merge `web` and `rag` evidence, in that order, dropping empty/duplicate
/// URLs and homepage URLs. Survivors keep their input order.
pub fn merge(web: Vec<EvidenceItem>, rag: Vec<EvidenceItem>) -> Vec<EvidenceItem> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut out = Vec::with_capacity(web.len() + rag.len());
    for item in web.into_iter().chain(rag.into_iter()) {
        if item.url.is_empty() {
            continue;
        }
        if !seen.insert(item.url.clone()) {
            continue;
        }
        if is_homepage_url(&item.url) {
            continue;
        }
        out.push(item);
    }
    out
}
