//! Verity Server - Natural-Language Claim Verification
//!
//! An HTTP service that takes a claim, gathers evidence from live web search
//! and a local RAG knowledge base, forms a verdict, and routes ambiguous
//! results to a process-local review queue.
//!
//! Pipeline:
//! - Claim intake (NFKC normalization, length bounds)
//! - Query planning from the claim's key phrases
//! - Parallel web + RAG evidence gathering, widening scope on empty results
//! - Hybrid rerank (cross-encoder or BM25-like fallback) with per-domain cap
//! - Batched stance classification
//! - Deterministic verdict formation with credibility-aware citations
//!
//! A background job periodically refreshes the current-affairs knowledge
//! base by re-crawling a fixed query set and atomically swapping it in.

mod protocol;

use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info, warn, Level};
use tracing_subscriber::EnvFilter;

use verity_core::{
    providers::{NullEmbeddingClient, NullLlmClient, OpenAiEmbeddingClient, OpenAiLlmClient, SerpHttpClient},
    refresh::RefreshConfig,
    retrieval::{RagRetriever, WebAgent},
    search::{Reranker, RerankerConfig},
    Config, EmbeddingClient, LlmClient, Orchestrator, OrchestratorConfig, ReviewQueue, Storage,
    WebSearchClient,
};

use crate::protocol::AppState;

/// Dimensions for `text-embedding-3-small`, the default embedding model.
/// Only correct if `OPENAI_EMBEDDING_MODEL` stays on that model; a custom
/// model with a different dimensionality needs this changed to match.
const EMBEDDING_DIMENSIONS: usize = 1536;

fn build_embedder(config: &Config) -> Arc<dyn EmbeddingClient> {
    if config.openai_api_key.is_empty() {
        warn!("OPENAI_API_KEY not set, embedding calls will fail (RAG retrieval and KB refresh degraded)");
        return Arc::new(NullEmbeddingClient);
    }
    Arc::new(OpenAiEmbeddingClient::new(
        config.openai_base_url.clone(),
        config.openai_api_key.clone(),
        config.openai_embedding_model.clone(),
        Duration::from_secs(30),
    ))
}

fn build_llm(config: &Config) -> Arc<dyn LlmClient> {
    if config.openai_api_key.is_empty() {
        warn!("OPENAI_API_KEY not set, LLM calls will fail (stance classification and rationale generation degraded)");
        return Arc::new(NullLlmClient);
    }
    Arc::new(OpenAiLlmClient::new(
        config.openai_base_url.clone(),
        config.openai_api_key.clone(),
        config.openai_llm_model.clone(),
        Duration::from_secs(30),
    ))
}

fn build_search(config: &Config) -> Arc<dyn WebSearchClient> {
    if config.serp_api_key.is_empty() {
        warn!("SERP_API_KEY not set, web search will return no results");
    }
    Arc::new(SerpHttpClient::new(
        config.serp_api_base_url.clone(),
        config.serp_api_key.clone(),
        config.serp_request_timeout,
    ))
}

fn refresh_config(config: &Config) -> RefreshConfig {
    RefreshConfig {
        queries: config.refresh_queries.clone(),
        num_results_per_query: config.refresh_num_results_per_query,
        chunk_max_chars: config.refresh_chunk_max_chars,
        chunk_overlap: config.refresh_chunk_overlap,
        embed_batch_size: config.refresh_embed_batch_size,
        credible_domains: config.credible_domains.clone(),
    }
}

/// Spawn the periodic knowledge-base refresh job: runs once shortly after
/// startup, then on a `REFRESH_INTERVAL_HOURS` interval.
fn spawn_refresh_job(
    storage: Arc<Storage>,
    search: Arc<dyn WebSearchClient>,
    embedder: Arc<dyn EmbeddingClient>,
    config: Arc<Config>,
) {
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(5)).await;
        loop {
            let refresh_cfg = refresh_config(&config);
            match verity_core::refresh::run_refresh(&storage, &search, &embedder, &refresh_cfg).await {
                Ok(outcome) if outcome.skipped => {
                    info!("KB refresh skipped: no results crawled");
                }
                Ok(outcome) => {
                    info!(
                        sources_crawled = outcome.sources_crawled,
                        chunks_ingested = outcome.chunks_ingested,
                        "KB refresh complete"
                    );
                }
                Err(e) => {
                    warn!("KB refresh failed, live collection untouched: {e}");
                }
            }
            tokio::time::sleep(Duration::from_secs(config.refresh_interval_hours * 3600)).await;
        }
    });
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .with_target(false)
        .init();

    info!("Verity Server v{} starting...", env!("CARGO_PKG_VERSION"));

    let config = Arc::new(Config::from_env());

    let storage = match Storage::new(config.data_dir.clone(), EMBEDDING_DIMENSIONS) {
        Ok(s) => Arc::new(s),
        Err(e) => {
            error!("Failed to initialize storage: {e}");
            std::process::exit(1);
        }
    };
    info!("Storage initialized");

    let embedder = build_embedder(&config);
    let llm = build_llm(&config);
    let search = build_search(&config);

    let web_agent = WebAgent::new(Arc::clone(&search));
    let rag_retriever = RagRetriever::new(Arc::clone(&embedder), Arc::clone(&storage));
    let mut reranker = Reranker::new(RerankerConfig { top_k: config.rerank_top_k });

    #[cfg(feature = "embeddings")]
    {
        info!("loading cross-encoder reranker...");
        reranker.init_cross_encoder();
    }
    if !reranker.has_cross_encoder() {
        info!("reranker running with BM25-like fallback scoring");
    }

    let orchestrator_config = OrchestratorConfig {
        max_iter: config.agentic_loop_max_iter,
        initial_top_k: config.rag_top_k,
        min_sources_for_verdict: config.min_sources_for_verdict,
        credible_domains: config.credible_domains.clone(),
        request_timeout: config.request_timeout,
    };
    let orchestrator =
        Arc::new(Orchestrator::new(web_agent, rag_retriever, reranker, Arc::clone(&llm), orchestrator_config));

    let review_queue = Arc::new(ReviewQueue::new());

    spawn_refresh_job(Arc::clone(&storage), Arc::clone(&search), Arc::clone(&embedder), Arc::clone(&config));

    let state = AppState { orchestrator, review_queue, config: Arc::clone(&config), llm: Arc::clone(&llm) };
    let app = protocol::build_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(l) => l,
        Err(e) => {
            error!("Failed to bind {addr}: {e}");
            std::process::exit(1);
        }
    };
    info!("Listening on {addr}");

    if let Err(e) = axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await {
        error!("Server error: {e}");
        std::process::exit(1);
    }

    info!("Verity Server shutting down");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c().await.expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
