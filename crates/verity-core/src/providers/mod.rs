//! Capability traits for the variation points the orchestrator depends on:
//! web search, embedding, and LLM calls. Concrete implementations live in
//! the sibling modules; tests substitute fakes behind `Arc<dyn Trait>`.

mod embedding;
mod llm;
mod web_search;

pub use embedding::{NullEmbeddingClient, OpenAiEmbeddingClient};
pub use llm::{NullLlmClient, OpenAiLlmClient};
pub use web_search::{NullWebSearchClient, SerpHttpClient};

use async_trait::async_trait;

use crate::error::{EmbeddingError, LlmError};
use crate::evidence::SearchHit;

/// Live web search, shaped around SerpAPI-style JSON results. Fails soft:
/// the orchestrator never sees an error from this trait.
#[async_trait]
pub trait WebSearchClient: Send + Sync {
    async fn search(&self, query: &str, max_results: usize) -> Vec<SearchHit>;
}

/// Text embedding, order-preserving. The one provider trait allowed to
/// propagate an error, since embedding is required for both retrieval and
/// knowledge-base ingestion.
#[async_trait]
pub trait EmbeddingClient: Send + Sync {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError>;
}

/// Chat-completion style LLM calls used for stance classification, rationale
/// generation, and claim decomposition. Callers always treat failure as a
/// signal to fall back to a rule-based default, never as a propagated error.
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(&self, system_prompt: &str, user_prompt: &str) -> Result<String, LlmError>;
}
