//! HTTP trigger surface: one endpoint to run a check cycle, one for
//! liveness.

use crate::cycle::{self, AppContext};
use crate::models::PairOutcome;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;

#[derive(Debug, Serialize)]
pub struct CycleResponse {
    pub success: bool,
    pub results: Vec<PairOutcome>,
}

pub fn router(ctx: Arc<AppContext>) -> Router {
    Router::new()
        .route("/index", get(run_checks))
        .route("/health", get(health))
        .with_state(ctx)
}

/// Run one full cycle across all configured pairs. Per-pair failures are
/// already contained in the results, so this always answers 200.
async fn run_checks(State(ctx): State<Arc<AppContext>>) -> Json<CycleResponse> {
    let results = cycle::run_cycle(&ctx).await;
    Json(CycleResponse {
        success: true,
        results,
    })
}

async fn health(State(ctx): State<Arc<AppContext>>) -> impl IntoResponse {
    match ctx.endpoints.current() {
        Ok(current_rpc) => Json(json!({
            "status": "ok",
            "currentRpc": current_rpc,
            "timestamp": chrono::Utc::now().to_rfc3339(),
        }))
        .into_response(),
        Err(err) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "status": "error", "error": err.to_string() })),
        )
            .into_response(),
    }
}
