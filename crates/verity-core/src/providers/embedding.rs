use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

use super::EmbeddingClient;
use crate::error::EmbeddingError;

/// Calls an OpenAI-compatible `/embeddings` endpoint.
pub struct OpenAiEmbeddingClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl OpenAiEmbeddingClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_default();
        Self { client, base_url: base_url.into(), api_key: api_key.into(), model: model.into() }
    }
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingDatum>,
}

#[derive(Deserialize)]
struct EmbeddingDatum {
    index: usize,
    embedding: Vec<f32>,
}

#[async_trait]
impl EmbeddingClient for OpenAiEmbeddingClient {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let url = format!("{}/embeddings", self.base_url.trim_end_matches('/'));
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&EmbeddingRequest { model: &self.model, input: texts })
            .send()
            .await
            .map_err(|e| EmbeddingError::Request(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(EmbeddingError::Request(format!("status {status}: {body}")));
        }

        let parsed: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| EmbeddingError::InvalidResponse(e.to_string()))?;

        let mut by_index: HashMap<usize, Vec<f32>> =
            parsed.data.into_iter().map(|d| (d.index, d.embedding)).collect();

        let mut out = Vec::with_capacity(texts.len());
        for i in 0..texts.len() {
            let vec = by_index
                .remove(&i)
                .ok_or_else(|| EmbeddingError::InvalidResponse(format!("missing embedding at index {i}")))?;
            out.push(vec);
        }
        Ok(out)
    }
}

/// Always errors. Used as a safe default when no embedding provider is
/// configured; callers (RAG retriever, KB refresh) treat this the same as
/// any other provider failure.
pub struct NullEmbeddingClient;

#[async_trait]
impl EmbeddingClient for NullEmbeddingClient {
    async fn embed(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        Err(EmbeddingError::Request("no embedding provider configured".to_string()))
    }
}
