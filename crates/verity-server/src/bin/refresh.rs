//! Standalone knowledge-base refresh job, for manual or cron invocation
//! outside the long-running server process (§4.14).

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing::{error, info, warn, Level};
use tracing_subscriber::EnvFilter;

use verity_core::providers::{NullEmbeddingClient, OpenAiEmbeddingClient, SerpHttpClient};
use verity_core::refresh::RefreshConfig;
use verity_core::{Config, EmbeddingClient, Storage, WebSearchClient};

const EMBEDDING_DIMENSIONS: usize = 1536;

#[derive(Parser)]
#[command(name = "verity-refresh", about = "Re-crawl and rebuild the current-affairs knowledge base once")]
struct Args {
    /// Override the data directory the knowledge base lives in.
    #[arg(long)]
    data_dir: Option<std::path::PathBuf>,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .with_target(false)
        .init();

    let args = Args::parse();
    let mut config = Config::from_env();
    if let Some(data_dir) = args.data_dir {
        config.data_dir = Some(data_dir);
    }

    let storage = match Storage::new(config.data_dir.clone(), EMBEDDING_DIMENSIONS) {
        Ok(s) => s,
        Err(e) => {
            error!("Failed to initialize storage: {e}");
            std::process::exit(1);
        }
    };

    let embedder: Arc<dyn EmbeddingClient> = if config.openai_api_key.is_empty() {
        warn!("OPENAI_API_KEY not set, refresh cannot embed anything");
        Arc::new(NullEmbeddingClient)
    } else {
        Arc::new(OpenAiEmbeddingClient::new(
            config.openai_base_url.clone(),
            config.openai_api_key.clone(),
            config.openai_embedding_model.clone(),
            Duration::from_secs(30),
        ))
    };
    let search: Arc<dyn WebSearchClient> =
        Arc::new(SerpHttpClient::new(config.serp_api_base_url.clone(), config.serp_api_key.clone(), config.serp_request_timeout));

    let refresh_config = RefreshConfig {
        queries: config.refresh_queries.clone(),
        num_results_per_query: config.refresh_num_results_per_query,
        chunk_max_chars: config.refresh_chunk_max_chars,
        chunk_overlap: config.refresh_chunk_overlap,
        embed_batch_size: config.refresh_embed_batch_size,
        credible_domains: config.credible_domains.clone(),
    };

    match verity_core::refresh::run_refresh(&storage, &search, &embedder, &refresh_config).await {
        Ok(outcome) if outcome.skipped => {
            info!("refresh skipped: no results crawled");
        }
        Ok(outcome) => {
            info!(
                sources_crawled = outcome.sources_crawled,
                chunks_ingested = outcome.chunks_ingested,
                "refresh complete"
            );
        }
        Err(e) => {
            error!("refresh failed: {e}");
            std::process::exit(1);
        }
    }
}
