//! Configuration (C18): environment-sourced settings, parsed once at startup
//! into an immutable [`Config`], centralized and typed instead of scattered
//! at each call site.

use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Duration;

use crate::constants::{DEFAULT_CREDIBLE_DOMAINS, DEFAULT_CURRENT_AFFAIRS_QUERIES};

/// Crate-wide tunables, read once from the environment. Never re-read
/// mid-request: clone/share behind an `Arc` instead.
#[derive(Debug, Clone)]
pub struct Config {
    pub claim_max_length: usize,

    pub rag_top_k: usize,
    pub rag_embedding_model: String,

    pub agentic_loop_max_iter: usize,
    pub min_sources_for_verdict: usize,
    pub request_timeout: Duration,

    pub rerank_model: String,
    pub rerank_top_k: usize,

    pub credible_domains: HashSet<String>,

    pub refresh_queries: Vec<String>,
    pub refresh_num_results_per_query: usize,
    pub refresh_chunk_max_chars: usize,
    pub refresh_chunk_overlap: usize,
    pub refresh_embed_batch_size: usize,
    pub refresh_interval_hours: u64,

    pub decompose_enabled: bool,
    pub decompose_min_claim_length: usize,
    pub decompose_max_subclaims: usize,

    pub data_dir: Option<PathBuf>,

    pub openai_api_key: String,
    pub openai_llm_model: String,
    pub openai_embedding_model: String,
    pub openai_base_url: String,

    pub serp_api_key: String,
    pub serp_api_base_url: String,
    pub serp_request_timeout: Duration,

    pub host: String,
    pub port: u16,
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}

fn env_string_or(key: &str, default: &str) -> String {
    std::env::var(key).ok().filter(|v| !v.is_empty()).unwrap_or_else(|| default.to_string())
}

fn env_csv(key: &str) -> Vec<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.split(',').map(|s| s.trim().to_string()).filter(|s| !s.is_empty()).collect())
        .unwrap_or_default()
}

impl Config {
    /// Parse configuration from the process environment. Unset variables
    /// fall back to their documented defaults; malformed numeric values
    /// fall back the same way rather than failing startup.
    pub fn from_env() -> Self {
        let credible_domains = {
            let configured = env_csv("CREDIBLE_DOMAINS");
            if configured.is_empty() {
                DEFAULT_CREDIBLE_DOMAINS.iter().map(|s| s.to_string()).collect()
            } else {
                configured.into_iter().collect()
            }
        };

        let refresh_queries = {
            let configured = env_csv("REFRESH_QUERIES");
            if configured.is_empty() {
                DEFAULT_CURRENT_AFFAIRS_QUERIES.iter().map(|s| s.to_string()).collect()
            } else {
                configured
            }
        };

        let data_dir = std::env::var("VERITY_DATA_DIR").ok().filter(|v| !v.is_empty()).map(PathBuf::from);

        Self {
            claim_max_length: env_or("CLAIM_MAX_LENGTH", 2000),

            rag_top_k: env_or("RAG_TOP_K", 10),
            rag_embedding_model: env_string_or("RAG_EMBEDDING_MODEL", "text-embedding-3-small"),

            agentic_loop_max_iter: env_or("AGENTIC_LOOP_MAX_ITER", 3),
            min_sources_for_verdict: env_or("MIN_SOURCES_FOR_VERDICT", 1),
            request_timeout: Duration::from_secs(env_or("REQUEST_TIMEOUT_SECS", 30)),

            rerank_model: env_string_or("RERANK_MODEL", "cross-encoder"),
            rerank_top_k: env_or("RERANK_TOP_K", 25),

            credible_domains,

            refresh_queries,
            refresh_num_results_per_query: env_or("REFRESH_NUM_RESULTS_PER_QUERY", 10),
            refresh_chunk_max_chars: env_or("REFRESH_CHUNK_MAX_CHARS", 512),
            refresh_chunk_overlap: env_or("REFRESH_CHUNK_OVERLAP", 100),
            refresh_embed_batch_size: env_or("REFRESH_EMBED_BATCH_SIZE", 100),
            refresh_interval_hours: env_or("REFRESH_INTERVAL_HOURS", 24),

            decompose_enabled: env_or("DECOMPOSE_ENABLED", false),
            decompose_min_claim_length: env_or("DECOMPOSE_MIN_CLAIM_LENGTH", 40),
            decompose_max_subclaims: env_or("DECOMPOSE_MAX_SUBCLAIMS", 5),

            data_dir,

            openai_api_key: env_string_or("OPENAI_API_KEY", ""),
            openai_llm_model: env_string_or("OPENAI_LLM_MODEL", "gpt-4o-mini"),
            openai_embedding_model: env_string_or("OPENAI_EMBEDDING_MODEL", "text-embedding-3-small"),
            openai_base_url: env_string_or("OPENAI_BASE_URL", "https://api.openai.com/v1"),

            serp_api_key: env_string_or("SERP_API_KEY", ""),
            serp_api_base_url: env_string_or("SERP_API_BASE_URL", "https://serpapi.com/search"),
            serp_request_timeout: Duration::from_secs(env_or("SERP_REQUEST_TIMEOUT_SEC", 15)),

            host: env_string_or("HOST", "127.0.0.1"),
            port: env_or("PORT", 8080),
        }
    }
}
