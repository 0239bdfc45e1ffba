//! Route handlers for the claim-verification HTTP surface (§6).

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};
use axum::routing::{get, post};
use axum::Router;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use verity_core::orchestrator::make_claim_id;
use verity_core::{decompose, Citation, IntakeError, ReviewDecision, Verdict, VerdictResult};

use super::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/verify", post(verify))
        .route("/pending_reviews", get(list_pending_reviews))
        .route("/pending_reviews/{id}", get(get_pending_review))
        .route("/review/{id}", post(resolve_review))
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
}

async fn health() -> impl IntoResponse {
    Json(HealthResponse { status: "ok" })
}

#[derive(Deserialize)]
struct VerifyRequest {
    claim: String,
}

#[derive(Serialize)]
struct VerifyResponse {
    verdict: Verdict,
    reasoning: String,
    citations: Vec<Citation>,
}

#[derive(Serialize)]
struct ErrorResponse {
    detail: String,
}

const PIPELINE_FAILURE_DETAIL: &str = "verification pipeline failed; please retry";

/// `503` with a generic detail (§6/§7): the pipeline-fatal counterpart to the
/// client-visible `400` intake rejection. Never exposes the underlying
/// timeout/panic cause to the caller.
pub(crate) fn pipeline_failure_response() -> axum::response::Response {
    (StatusCode::SERVICE_UNAVAILABLE, Json(ErrorResponse { detail: PIPELINE_FAILURE_DETAIL.to_string() }))
        .into_response()
}

async fn verify(State(state): State<AppState>, Json(req): Json<VerifyRequest>) -> axum::response::Response {
    let claim = match verity_core::intake(&req.claim, state.config.claim_max_length) {
        Ok(c) => c,
        Err(e) => {
            let detail = match e {
                IntakeError::Empty => "claim is empty".to_string(),
                IntakeError::TooLong { max, actual } => {
                    format!("claim length {actual} exceeds maximum {max}")
                }
                _ => "invalid claim".to_string(),
            };
            return (StatusCode::BAD_REQUEST, Json(ErrorResponse { detail })).into_response();
        }
    };

    let subclaims = decompose::decompose(
        &state.llm,
        claim.as_str(),
        state.config.decompose_enabled,
        state.config.decompose_min_claim_length,
        state.config.decompose_max_subclaims,
    )
    .await;

    let (result, requires_review) = if subclaims.len() <= 1 {
        let outcome = state.orchestrator.verify(claim.as_str()).await;
        if outcome.pipeline_error {
            tracing::warn!("pipeline-fatal verification outcome (timeout)");
            return pipeline_failure_response();
        }
        let requires_review = outcome.requires_review;
        (VerdictResult { verdict: outcome.verdict, reasoning: outcome.reasoning, citations: outcome.citations }, requires_review)
    } else {
        let mut tasks = tokio::task::JoinSet::new();
        for (idx, sub) in subclaims.iter().cloned().enumerate() {
            let orchestrator = state.orchestrator.clone();
            tasks.spawn(async move { (idx, orchestrator.verify(&sub).await) });
        }
        let mut outcomes = vec![None; subclaims.len()];
        let mut pipeline_fatal = false;
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((idx, outcome)) => {
                    pipeline_fatal |= outcome.pipeline_error;
                    outcomes[idx] = Some(outcome);
                }
                Err(join_error) => {
                    tracing::error!("sub-claim verification task failed: {join_error}");
                    pipeline_fatal = true;
                }
            }
        }
        if pipeline_fatal {
            return pipeline_failure_response();
        }
        let requires_review = outcomes.iter().flatten().any(|o| o.requires_review);
        let sub_results: Vec<VerdictResult> = outcomes
            .into_iter()
            .map(|o| {
                let outcome = o.expect("every non-panicked sub-claim task reports back");
                VerdictResult { verdict: outcome.verdict, reasoning: outcome.reasoning, citations: outcome.citations }
            })
            .collect();
        let aggregated = decompose::aggregate(&state.llm, claim.as_str(), &subclaims, sub_results).await;
        (aggregated, requires_review)
    };

    if requires_review {
        let claim_id = make_claim_id(claim.as_str());
        state.review_queue.insert(
            claim_id,
            verity_core::PendingReview {
                claim: claim.into_string(),
                verdict: result.verdict,
                reasoning: result.reasoning.clone(),
                citations: result.citations.clone(),
                created_at: Utc::now(),
            },
        );
    }

    Json(VerifyResponse { verdict: result.verdict, reasoning: result.reasoning, citations: result.citations })
        .into_response()
}

#[derive(Serialize)]
struct PendingReviewsResponse {
    claim_ids: Vec<String>,
}

async fn list_pending_reviews(State(state): State<AppState>) -> impl IntoResponse {
    Json(PendingReviewsResponse { claim_ids: state.review_queue.list_ids() })
}

#[derive(Serialize)]
struct PendingReviewResponse {
    claim: String,
    verdict: Verdict,
    reasoning: String,
    citations: Vec<Citation>,
    created_at: chrono::DateTime<Utc>,
}

async fn get_pending_review(State(state): State<AppState>, Path(id): Path<String>) -> axum::response::Response {
    match state.review_queue.get(&id) {
        Some(review) => Json(PendingReviewResponse {
            claim: review.claim,
            verdict: review.verdict,
            reasoning: review.reasoning,
            citations: review.citations,
            created_at: review.created_at,
        })
        .into_response(),
        None => (StatusCode::NOT_FOUND, Json(ErrorResponse { detail: "no pending review for that id".to_string() }))
            .into_response(),
    }
}

#[derive(Deserialize, Default)]
struct ReviewRequest {
    verdict: Option<Verdict>,
    reasoning: Option<String>,
}

#[derive(Serialize)]
struct StatusResponse {
    status: &'static str,
}

async fn resolve_review(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<ReviewRequest>,
) -> axum::response::Response {
    let decision = ReviewDecision { verdict: req.verdict, reasoning: req.reasoning };
    if state.review_queue.resolve(&id, decision) {
        Json(StatusResponse { status: "ok" }).into_response()
    } else {
        (StatusCode::NOT_FOUND, Json(ErrorResponse { detail: "no pending review for that id".to_string() }))
            .into_response()
    }
}
