//! Expense Pie REST API
//!
//! HTTP surface for the live chart, built with Axum.
//!
//! # Endpoints
//!
//! ## Expenses
//! - `GET /api/v1/expenses` - List expenses
//! - `POST /api/v1/expenses` - Add an expense
//! - `PUT /api/v1/expenses/:id` - Replace an expense
//! - `DELETE /api/v1/expenses/:id` - Delete an expense
//!
//! ## Chart
//! - `GET /` - Viewer page
//! - `GET /chart.svg` - Current frame
//! - `GET /api/v1/chart` - Session snapshot
//! - `POST /api/v1/chart/pointer` - Pointer event for a slice or canvas point
//!
//! ## Health
//! - `GET /health/live` - Liveness probe
//! - `GET /health/ready` - Readiness probe
//! - `GET /health` - Full health status
//!
//! ## WebSocket
//! - `GET /ws` - Live frames and pointer events
//!
//! # Example
//!
//! ```rust,no_run
//! use expense_pie::api::{serve, AppState};
//! use expense_pie::config::Config;
//! use expense_pie::feed::ChangeFeed;
//! use expense_pie::session::ChartSession;
//! use expense_pie::store::MemoryCollection;
//! use expense_pie::websocket::{ConnectionHub, HubConfig};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::default();
//!     let collection = Arc::new(MemoryCollection::new());
//!     let hub = Arc::new(ConnectionHub::new(HubConfig::default()));
//!
//!     let feed = ChangeFeed::subscribe(collection.as_ref()).await?;
//!     let (session, _task) = ChartSession::new(collection.clone(), &config.chart)
//!         .with_hub(Arc::clone(&hub))
//!         .spawn(feed);
//!
//!     serve(AppState::new(collection, session, config, hub)).await?;
//!     Ok(())
//! }
//! ```

pub mod dto;
pub mod error;
pub mod routes;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use state::AppState;

use axum::{
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::websocket::websocket_handler;

/// Build the API router with all routes and middleware
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        // Expense routes
        .route(
            "/expenses",
            get(routes::expenses::list_expenses).post(routes::expenses::create_expense),
        )
        .route(
            "/expenses/:id",
            put(routes::expenses::update_expense).delete(routes::expenses::delete_expense),
        )
        // Chart routes
        .route("/chart", get(routes::chart::chart_snapshot))
        .route("/chart/pointer", post(routes::chart::pointer));

    let health_routes = Router::new()
        .route("/live", get(routes::health::liveness))
        .route("/ready", get(routes::health::readiness))
        .route("/", get(routes::health::full_health));

    let shared_state = Arc::new(state);

    Router::new()
        .route("/", get(routes::chart::index))
        .route("/chart.svg", get(routes::chart::chart_svg))
        .route("/ws", get(websocket_handler))
        .nest("/api/v1", api_routes)
        .nest("/health", health_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(shared_state)
}

/// Start the API server on the configured address
pub async fn serve(state: AppState) -> Result<(), ApiError> {
    let addr = state.config.api.addr();
    let router = build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Expense chart listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ApiError::Internal(format!("Server error: {}", e)))?;

    tracing::info!("Expense chart shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
