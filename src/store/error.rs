//! Collection error types

use thiserror::Error;

use super::types::ExpenseId;

/// Errors that can occur when talking to the expense collection
#[derive(Error, Debug)]
pub enum StoreError {
    /// Requested expense does not exist
    #[error("Expense not found: {0}")]
    NotFound(ExpenseId),

    /// Expense body failed validation
    #[error("Invalid expense: {0}")]
    InvalidExpense(String),

    /// The collection is no longer accepting requests
    #[error("Collection closed")]
    Closed,
}

/// Result type alias for collection operations
pub type StoreResult<T> = Result<T, StoreError>;
