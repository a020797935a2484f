//! Application State
//!
//! Shared state accessible by all API handlers.
//! Wrapped in Arc for thread-safe sharing across async tasks.

use std::sync::Arc;
use std::time::Instant;

use crate::config::Config;
use crate::session::SessionHandle;
use crate::store::ExpenseCollection;
use crate::websocket::ConnectionHub;

/// Shared application state for all handlers
#[derive(Clone)]
pub struct AppState {
    /// Source of truth for expenses
    pub collection: Arc<dyn ExpenseCollection>,
    /// Handle to the running chart session
    pub session: SessionHandle,
    /// Server and chart configuration
    pub config: Arc<Config>,
    /// Server start time for uptime tracking
    pub start_time: Instant,
    /// WebSocket connection hub for live frames
    pub ws_hub: Arc<ConnectionHub>,
}

impl AppState {
    pub fn new(
        collection: Arc<dyn ExpenseCollection>,
        session: SessionHandle,
        config: Config,
        ws_hub: Arc<ConnectionHub>,
    ) -> Self {
        Self {
            collection,
            session,
            config: Arc::new(config),
            start_time: Instant::now(),
            ws_hub,
        }
    }

    /// Get server uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// Get WebSocket connection count
    pub async fn ws_connection_count(&self) -> usize {
        self.ws_hub.connection_count().await
    }
}
