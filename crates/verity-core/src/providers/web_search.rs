use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

use super::WebSearchClient;
use crate::evidence::SearchHit;

/// Calls a SerpAPI-shaped JSON search endpoint over HTTP.
pub struct SerpHttpClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl SerpHttpClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_default();
        Self { client, base_url: base_url.into(), api_key: api_key.into() }
    }
}

#[derive(Debug, Deserialize, Default)]
struct SerpResponse {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    organic_results: Vec<SerpOrganicResult>,
}

#[derive(Debug, Deserialize, Default)]
struct SerpOrganicResult {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    link: Option<String>,
    #[serde(default)]
    snippet: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

#[async_trait]
impl WebSearchClient for SerpHttpClient {
    async fn search(&self, query: &str, max_results: usize) -> Vec<SearchHit> {
        let query = query.trim();
        if self.api_key.is_empty() || query.is_empty() {
            return Vec::new();
        }
        let num = max_results.min(20);
        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("engine", "google"),
                ("q", query),
                ("api_key", self.api_key.as_str()),
            ])
            .query(&[("num", num)])
            .send()
            .await;

        let response = match response {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!("SERP request failed: {e}");
                return Vec::new();
            }
        };

        let parsed: SerpResponse = match response.json().await {
            Ok(p) => p,
            Err(e) => {
                tracing::warn!("SERP response decode failed: {e}");
                return Vec::new();
            }
        };

        if let Some(err) = parsed.error {
            tracing::warn!("SERP API error: {err}");
            return Vec::new();
        }

        parsed
            .organic_results
            .into_iter()
            .filter_map(|item| {
                let url = item.link.unwrap_or_default().trim().to_string();
                if url.is_empty() {
                    return None;
                }
                let title = item.title.unwrap_or_default().trim().to_string();
                let title = if title.is_empty() { "No title".to_string() } else { title };
                let snippet = item
                    .snippet
                    .filter(|s| !s.trim().is_empty())
                    .or(item.description)
                    .unwrap_or_default()
                    .trim()
                    .to_string();
                Some(SearchHit {
                    title: title.chars().take(500).collect(),
                    url,
                    snippet: snippet.chars().take(1000).collect(),
                })
            })
            .collect()
    }
}

/// Always returns no results. Used when no search API key is configured.
pub struct NullWebSearchClient;

#[async_trait]
impl WebSearchClient for NullWebSearchClient {
    async fn search(&self, _query: &str, _max_results: usize) -> Vec<SearchHit> {
        Vec::new()
    }
}
