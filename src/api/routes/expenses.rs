//! Expense Routes
//!
//! Writes go to the collection; the chart picks them up from its
//! subscription like any other change.
//!
//! - GET /api/v1/expenses - List expenses in collection order
//! - POST /api/v1/expenses - Add an expense
//! - PUT /api/v1/expenses/:id - Replace an expense
//! - DELETE /api/v1/expenses/:id - Delete an expense

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::api::dto::{ExpenseListResponse, ExpenseRequest, ExpenseResponse};
use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;
use crate::store::{Expense, ExpenseId};

/// GET /api/v1/expenses
pub async fn list_expenses(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<ExpenseListResponse>> {
    let expenses = state.collection.list().await?;
    let total_cost = expenses.iter().map(|e| e.cost).sum();

    Ok(Json(ExpenseListResponse {
        total: expenses.len(),
        total_cost,
        expenses: expenses.into_iter().map(ExpenseResponse::from).collect(),
    }))
}

/// POST /api/v1/expenses
pub async fn create_expense(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ExpenseRequest>,
) -> ApiResult<(StatusCode, Json<ExpenseResponse>)> {
    let fields = req.into_fields();
    fields.validate()?;

    let id = state.collection.add(fields.clone()).await?;

    tracing::info!(id = %id, name = %fields.name, cost = fields.cost, "Created expense");

    Ok((
        StatusCode::CREATED,
        Json(Expense::from_fields(id, fields).into()),
    ))
}

/// PUT /api/v1/expenses/:id
pub async fn update_expense(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<ExpenseRequest>,
) -> ApiResult<Json<ExpenseResponse>> {
    let id = parse_id(id)?;
    let fields = req.into_fields();
    fields.validate()?;

    state.collection.update(&id, fields.clone()).await?;

    tracing::info!(id = %id, "Updated expense");

    Ok(Json(Expense::from_fields(id, fields).into()))
}

/// DELETE /api/v1/expenses/:id
pub async fn delete_expense(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let id = parse_id(id)?;
    state.collection.delete(&id).await?;

    tracing::info!(id = %id, "Deleted expense");

    Ok(StatusCode::NO_CONTENT)
}

fn parse_id(raw: String) -> ApiResult<ExpenseId> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ApiError::Validation("Expense id must not be empty".to_string()));
    }
    Ok(ExpenseId::new(trimmed))
}
