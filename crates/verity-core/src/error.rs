//! Crate-wide error taxonomy.
//!
//! The library-internal layers use manual `Display` + `std::error::Error`
//! impls (non_exhaustive), while the storage layer uses `thiserror` with
//! `#[from]` conversions, since rusqlite/usearch errors need to compose.

/// Claim intake failures. Client-visible: the HTTP layer maps this to `400`.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntakeError {
    Empty,
    TooLong { max: usize, actual: usize },
}

impl std::fmt::Display for IntakeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IntakeError::Empty => write!(f, "claim is empty after normalization"),
            IntakeError::TooLong { max, actual } => {
                write!(f, "claim length {actual} exceeds maximum {max}")
            }
        }
    }
}

impl std::error::Error for IntakeError {}

/// Embedding provider failures. This is the one transient-external layer that
/// is allowed to propagate, because embedding is required for both retrieval
/// and knowledge-base ingestion.
#[non_exhaustive]
#[derive(Debug, Clone)]
pub enum EmbeddingError {
    Request(String),
    InvalidResponse(String),
}

impl std::fmt::Display for EmbeddingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EmbeddingError::Request(e) => write!(f, "embedding request failed: {e}"),
            EmbeddingError::InvalidResponse(e) => write!(f, "embedding response invalid: {e}"),
        }
    }
}

impl std::error::Error for EmbeddingError {}

/// LLM provider failures (stance classification, rationale generation,
/// decomposition). Always caught at the call site; never propagates.
#[non_exhaustive]
#[derive(Debug, Clone)]
pub enum LlmError {
    Request(String),
    InvalidResponse(String),
}

impl std::fmt::Display for LlmError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LlmError::Request(e) => write!(f, "LLM request failed: {e}"),
            LlmError::InvalidResponse(e) => write!(f, "LLM response invalid: {e}"),
        }
    }
}

impl std::error::Error for LlmError {}

/// Web search provider failures. Always caught at the call site; the web
/// agent never raises.
#[non_exhaustive]
#[derive(Debug, Clone)]
pub enum SearchError {
    Request(String),
    ProviderError(String),
}

impl std::fmt::Display for SearchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SearchError::Request(e) => write!(f, "search request failed: {e}"),
            SearchError::ProviderError(e) => write!(f, "search provider error: {e}"),
        }
    }
}

impl std::error::Error for SearchError {}

/// Vector store failures (sqlite sidecar + HNSW index).
#[derive(Debug, thiserror::Error)]
pub enum VectorStoreError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("vector index error: {0}")]
    Index(String),
    #[error("length mismatch: ids={ids}, documents={documents}, metadatas={metadatas}, embeddings={embeddings}")]
    LengthMismatch {
        ids: usize,
        documents: usize,
        metadatas: usize,
        embeddings: usize,
    },
}

/// Top-level orchestrator failure. Caught by the per-request timeout wrapper
/// and mapped to the safe `Not Enough Evidence` result; never surfaced raw.
#[derive(Debug, Clone)]
pub enum OrchestratorError {
    Timeout,
    Embedding(EmbeddingError),
}

impl std::fmt::Display for OrchestratorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrchestratorError::Timeout => write!(f, "verification timed out"),
            OrchestratorError::Embedding(e) => write!(f, "embedding failed: {e}"),
        }
    }
}

impl std::error::Error for OrchestratorError {}

/// KB refresh job failures. Any variant aborts the refresh without
/// promoting the temp collection, leaving the live collection untouched.
#[derive(Debug, thiserror::Error)]
pub enum RefreshError {
    #[error("embedding failed: {0}")]
    Embedding(#[from] EmbeddingError),
    #[error("vector store error: {0}")]
    Storage(#[from] VectorStoreError),
}
