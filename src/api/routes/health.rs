//! Health Routes
//!
//! - GET /health/live - Liveness probe (process is alive)
//! - GET /health/ready - Readiness probe (collection and chart reachable)
//! - GET /health - Full health status

use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;

use crate::api::dto::HealthResponse;
use crate::api::state::AppState;

/// GET /health/live
pub async fn liveness() -> StatusCode {
    StatusCode::OK
}

/// GET /health/ready
pub async fn readiness(State(state): State<Arc<AppState>>) -> StatusCode {
    if check_collection(&state).await && check_session(&state) {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

/// GET /health
pub async fn full_health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let collection_ok = check_collection(&state).await;
    let session_ok = check_session(&state);

    let overall_status = if collection_ok && session_ok {
        "healthy"
    } else if collection_ok || session_ok {
        "degraded"
    } else {
        "unhealthy"
    };

    Json(HealthResponse {
        status: overall_status.to_string(),
        collection: status_label(collection_ok),
        chart: status_label(session_ok),
        viewers: state.ws_connection_count().await,
        max_viewers: state.ws_hub.max_connections(),
        uptime_seconds: state.uptime_seconds(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

async fn check_collection(state: &AppState) -> bool {
    state.collection.list().await.is_ok()
}

fn check_session(state: &AppState) -> bool {
    !state.session.is_closed()
}

fn status_label(ok: bool) -> String {
    let label = if ok { "ok" } else { "error" };
    label.to_string()
}
