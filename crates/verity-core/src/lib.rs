//! # Verity Core
//!
//! Evidence-gathering and verdict-formation engine for natural-language claim
//! verification. Given a claim, the pipeline:
//!
//! - Normalizes and validates intake (NFKC, length bounds)
//! - Plans search queries from the claim's key phrases
//! - Gathers evidence from live web search and a local RAG knowledge base
//!   in parallel, widening scope on empty results
//! - Reranks and deduplicates evidence by relevance, URL quality, and
//!   source preference, capped per domain
//! - Classifies each source's stance toward the claim with a single
//!   batched LLM call
//! - Forms a deterministic verdict, with credibility-aware citation
//!   shaping and LLM-generated rationale
//! - Routes ambiguous results to a process-local review queue
//!
//! A companion refresh job periodically re-crawls a fixed set of current
//! affairs queries to keep the knowledge base current, promoting a freshly
//! built collection atomically once it succeeds.
//!
//! ## Feature Flags
//!
//! - `embeddings` (default): local ONNX cross-encoder reranking via fastembed
//! - `vector-search` (default): HNSW vector search via USearch
//! - `bundled-sqlite` (default): statically linked SQLite for the sidecar store
//! - `full`: all of the above, used by verity-server

pub mod claim;
pub mod config;
pub mod constants;
pub mod credibility;
pub mod decompose;
pub mod error;
pub mod evaluator;
pub mod evidence;
pub mod merger;
pub mod orchestrator;
pub mod planner;
pub mod providers;
pub mod refresh;
pub mod retrieval;
pub mod review;
pub mod search;
pub mod stance;
pub mod storage;
pub mod verdict;

pub use claim::{intake, normalize, validate, Claim};
pub use config::Config;
pub use error::{EmbeddingError, IntakeError, LlmError, OrchestratorError, SearchError, VectorStoreError};
pub use evidence::{Citation, EvidenceItem, EvidenceSource, SearchHit, Stance, Verdict};
pub use orchestrator::{Orchestrator, OrchestratorConfig, OrchestratorOutcome};
pub use providers::{EmbeddingClient, LlmClient, WebSearchClient};
pub use refresh::{run_refresh, RefreshConfig, RefreshOutcome};
pub use retrieval::{RagRetriever, WebAgent};
pub use review::{PendingReview, ReviewDecision, ReviewQueue};
pub use search::{Reranker, RerankerConfig};
pub use storage::Storage;
pub use verdict::VerdictResult;
