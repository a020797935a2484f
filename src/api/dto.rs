//! Data Transfer Objects
//!
//! Request and response types for the API endpoints.
//! These types are serialized/deserialized to/from JSON.

use serde::{Deserialize, Serialize};

use crate::interaction::{Effect, PointerEvent, PointerKind};
use crate::store::{Expense, ExpenseFields, ExpenseId};

// ============================================
// EXPENSE DTOs
// ============================================

/// Create or replace an expense
#[derive(Debug, Clone, Deserialize)]
pub struct ExpenseRequest {
    pub name: String,
    pub cost: f64,
}

impl ExpenseRequest {
    /// Trimmed fields ready for the collection
    pub fn into_fields(self) -> ExpenseFields {
        ExpenseFields::new(self.name.trim(), self.cost)
    }
}

/// A single expense
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpenseResponse {
    pub id: ExpenseId,
    pub name: String,
    pub cost: f64,
}

impl From<Expense> for ExpenseResponse {
    fn from(expense: Expense) -> Self {
        Self {
            id: expense.id,
            name: expense.name,
            cost: expense.cost,
        }
    }
}

/// Expense listing in collection order
#[derive(Debug, Serialize, Deserialize)]
pub struct ExpenseListResponse {
    pub expenses: Vec<ExpenseResponse>,
    pub total: usize,
    /// Sum of all costs
    pub total_cost: f64,
}

// ============================================
// CHART DTOs
// ============================================

/// Pointer event posted for a slice
///
/// Without `slice`, the slice is found by hit testing `canvas_x`/`canvas_y`.
#[derive(Debug, Clone, Deserialize)]
pub struct PointerRequest {
    pub slice: Option<ExpenseId>,
    pub canvas_x: Option<f64>,
    pub canvas_y: Option<f64>,
    pub event: PointerKind,
    #[serde(default)]
    pub page_x: f64,
    #[serde(default)]
    pub page_y: f64,
}

impl PointerRequest {
    pub fn event(&self) -> PointerEvent {
        PointerEvent::new(self.event, self.page_x, self.page_y)
    }
}

/// Effects produced by a pointer event
#[derive(Debug, Serialize)]
pub struct PointerResponse {
    pub effects: Vec<Effect>,
}

// ============================================
// HEALTH DTOs
// ============================================

/// Full health status response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Overall status: healthy, degraded, unhealthy
    pub status: String,
    /// Collection status
    pub collection: String,
    /// Chart session status
    pub chart: String,
    /// Connected WebSocket viewers
    pub viewers: usize,
    /// Viewer limit before new connections are refused
    pub max_viewers: usize,
    /// Server uptime in seconds
    pub uptime_seconds: u64,
    /// Application version
    pub version: String,
}
