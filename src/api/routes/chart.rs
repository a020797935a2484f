//! Chart Routes
//!
//! - GET / - Viewer page
//! - GET /chart.svg - Current frame as SVG
//! - GET /api/v1/chart - Session snapshot (mirror records and sampled frame)
//! - POST /api/v1/chart/pointer - Deliver a pointer event for a slice

use axum::{
    extract::State,
    http::header,
    response::{Html, IntoResponse},
    Json,
};
use std::sync::Arc;

use crate::api::dto::{PointerRequest, PointerResponse};
use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;
use crate::session::SessionSnapshot;

const INDEX_HTML: &str = include_str!("../../../assets/index.html");

/// GET /
pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// GET /chart.svg
pub async fn chart_svg(State(state): State<Arc<AppState>>) -> ApiResult<impl IntoResponse> {
    let snapshot = state.session.snapshot().await?;
    Ok(([(header::CONTENT_TYPE, "image/svg+xml")], snapshot.svg))
}

/// GET /api/v1/chart
pub async fn chart_snapshot(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<SessionSnapshot>> {
    Ok(Json(state.session.snapshot().await?))
}

/// POST /api/v1/chart/pointer
///
/// Unknown slices and misses produce no effects rather than an error; the
/// viewer may be a frame behind.
pub async fn pointer(
    State(state): State<Arc<AppState>>,
    Json(req): Json<PointerRequest>,
) -> ApiResult<Json<PointerResponse>> {
    let event = req.event();
    let slice = match (req.slice, req.canvas_x, req.canvas_y) {
        (Some(slice), _, _) => Some(slice),
        (None, Some(x), Some(y)) => state.session.hit_test(x, y).await?,
        _ => {
            return Err(ApiError::Validation(
                "Either slice or canvas_x and canvas_y is required".to_string(),
            ))
        }
    };

    let effects = match slice {
        Some(slice) => state.session.pointer(slice, event).await?,
        None => Vec::new(),
    };
    Ok(Json(PointerResponse { effects }))
}
