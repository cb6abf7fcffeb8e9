//! HTTP boundary.
//!
//! One primary endpoint turns a request bundle into an intent; everything
//! else is diagnostics. Gate rejections travel as successful responses with
//! `intent.rejected = true` — only contract violations become HTTP errors.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tracing::warn;

use agent::{QuotePipeline, RequestBundle};
use common::logger::{TraceId, annotate_span, root_span};
use common::time::{now_ms, now_unix};
use domain::{Explainability, QuoteIntent};
use state::store::MakerStats;
use state::{FillLedger, FillRecord, RevertRecord, StateStore};

use crate::error::ApiError;

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<QuotePipeline>,
    pub store: Arc<StateStore>,
    pub ledger: Option<Arc<dyn FillLedger>>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/intent", post(post_intent))
        .route("/health", get(health))
        .route("/fills", post(post_fill))
        .route("/reverts", post(post_revert))
        .route("/makers/:maker/stats", get(maker_stats))
        .with_state(state)
}

#[derive(Debug, Serialize, Deserialize)]
pub struct IntentResponse {
    pub intent: QuoteIntent,
    pub explainability: Explainability,
}

async fn post_intent(
    State(app): State<AppState>,
    Json(bundle): Json<RequestBundle>,
) -> Result<Json<IntentResponse>, ApiError> {
    bundle
        .request
        .validate()
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;
    bundle
        .policy
        .validate()
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let trace_id = TraceId::default();
    let span = root_span("intent", &trace_id);
    let _guard = span.enter();
    annotate_span(
        &bundle.policy.maker,
        &format!("{}/{}", bundle.request.token_in, bundle.request.token_out),
    );

    let outcome = app
        .pipeline
        .quote(&bundle, now_unix())
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    Ok(Json(IntentResponse {
        intent: outcome.intent,
        explainability: outcome.explain,
    }))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub supported_chains: Vec<u64>,
    pub timestamp_ms: u64,
}

async fn health(State(app): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        service: "strategy-agent".to_string(),
        supported_chains: app.pipeline.supported_chains().to_vec(),
        timestamp_ms: now_ms(),
    })
}

#[derive(Debug, Serialize)]
struct RecordedResponse {
    status: &'static str,
}

/// Advisory settlement outcome; failures to persist are logged, not
/// surfaced — the ledger never gates anything.
async fn post_fill(
    State(app): State<AppState>,
    Json(mut rec): Json<FillRecord>,
) -> Json<RecordedResponse> {
    if rec.recorded_at_ms == 0 {
        rec.recorded_at_ms = now_ms();
    }

    app.store.record_fill(rec.clone());

    if let Some(ledger) = &app.ledger {
        if let Err(e) = ledger.record_fill(&rec).await {
            warn!(error = %e, maker = %rec.maker, nonce = rec.nonce, "fill ledger write failed");
        }
    }

    Json(RecordedResponse { status: "recorded" })
}

async fn post_revert(
    State(app): State<AppState>,
    Json(mut rec): Json<RevertRecord>,
) -> Json<RecordedResponse> {
    if rec.recorded_at_ms == 0 {
        rec.recorded_at_ms = now_ms();
    }

    app.store.record_revert(rec.clone());

    if let Some(ledger) = &app.ledger {
        if let Err(e) = ledger.record_revert(&rec).await {
            warn!(error = %e, maker = %rec.maker, nonce = rec.nonce, "revert ledger write failed");
        }
    }

    Json(RecordedResponse { status: "recorded" })
}

async fn maker_stats(
    State(app): State<AppState>,
    Path(maker): Path<String>,
) -> Json<MakerStats> {
    Json(app.store.maker_stats(&maker))
}
