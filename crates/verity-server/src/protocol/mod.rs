//! HTTP surface (§6): five routes over the verification pipeline, a
//! process-local review queue, and the knowledge-base refresh job state.
//! CORS fully open via `tower-http` — this service has no notion of
//! authenticated callers.

pub mod http;

use std::sync::Arc;

use axum::Router;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use verity_core::{Config, LlmClient, Orchestrator, ReviewQueue};

#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<Orchestrator>,
    pub review_queue: Arc<ReviewQueue>,
    pub config: Arc<Config>,
    /// Shared with the orchestrator's stance/rationale calls; the HTTP layer
    /// borrows it for the decompose/aggregate supplement (§4.15), which sits
    /// above the orchestrator rather than inside its single-claim loop.
    pub llm: Arc<dyn LlmClient>,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(http::routes())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .layer(CatchPanicLayer::custom(handle_panic))
        .with_state(state)
}

/// A panic unwinding out of a request handler is pipeline-fatal (§7): caught
/// here rather than left to tear down the connection, and mapped to the same
/// `503` the orchestrator's own timeout path produces.
fn handle_panic(err: Box<dyn std::any::Any + Send + 'static>) -> axum::response::Response {
    let message = if let Some(s) = err.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    };
    tracing::error!(panic = %message, "request handler panicked");
    http::pipeline_failure_response()
}
