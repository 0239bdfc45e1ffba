//! Web Agent (C7): turns the claim into a handful of search queries via
//! `crate::planner`, fires each at the configured search provider, and lifts
//! hits into `EvidenceItem`s.

use std::sync::Arc;

use crate::evidence::{EvidenceItem, EvidenceSource};
use crate::planner;
use crate::providers::WebSearchClient;

pub struct WebAgent {
    search: Arc<dyn WebSearchClient>,
}

impl WebAgent {
    pub fn new(search: Arc<dyn WebSearchClient>) -> Self {
        Self { search }
    }

    /// Plan queries for `claim`, run each against the search provider, and
    /// merge hits into `EvidenceItem`s, deduplicated by URL across queries
    /// (first occurrence wins). The search provider itself fails soft, so
    /// this never errors.
    pub async fn fetch_evidence(&self, claim: &str, num_per_query: usize) -> Vec<EvidenceItem> {
        let queries = planner::plan(claim);
        if queries.is_empty() {
            return Vec::new();
        }

        let mut seen_urls = std::collections::HashSet::new();
        let mut items = Vec::new();

        for query in queries {
            let hits = self.search.search(&query, num_per_query).await;
            for hit in hits {
                let url = hit.url.trim().to_string();
                if url.is_empty() || !seen_urls.insert(url.clone()) {
                    continue;
                }
                items.push(EvidenceItem::new(hit.title, url, hit.snippet, EvidenceSource::Web));
            }
        }

        items
    }
}
