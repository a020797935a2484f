//! Expense collection seam
//!
//! The chart only ever sees the collection through this trait: it subscribes
//! once for change batches and sends delete requests back.

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::error::{StoreError, StoreResult};
use super::types::{ChangeBatch, Expense, ExpenseFields, ExpenseId};

/// Receiving end of a collection subscription
pub type ChangeStream = mpsc::UnboundedReceiver<ChangeBatch>;

/// A single write inside an atomic batch
#[derive(Debug, Clone, PartialEq)]
pub enum Write {
    /// Insert a new document, the collection assigns the id
    Add(ExpenseFields),
    /// Replace the body of an existing document
    Set(ExpenseId, ExpenseFields),
    /// Delete an existing document
    Delete(ExpenseId),
}

/// An ordered (cost ascending) collection of expense documents
#[async_trait]
pub trait ExpenseCollection: Send + Sync {
    /// Subscribe to change batches
    ///
    /// The first batch lists every current record as `Added`, in cost order.
    async fn subscribe(&self) -> StoreResult<ChangeStream>;

    /// Current records in cost order
    async fn list(&self) -> StoreResult<Vec<Expense>>;

    /// Apply several writes atomically, emitting a single change batch
    ///
    /// Returns the ids touched, in write order.
    async fn write_batch(&self, writes: Vec<Write>) -> StoreResult<Vec<ExpenseId>>;

    async fn add(&self, fields: ExpenseFields) -> StoreResult<ExpenseId> {
        let ids = self.write_batch(vec![Write::Add(fields)]).await?;
        ids.into_iter().next().ok_or(StoreError::Closed)
    }

    async fn update(&self, id: &ExpenseId, fields: ExpenseFields) -> StoreResult<()> {
        self.write_batch(vec![Write::Set(id.clone(), fields)])
            .await
            .map(|_| ())
    }

    async fn delete(&self, id: &ExpenseId) -> StoreResult<()> {
        self.write_batch(vec![Write::Delete(id.clone())])
            .await
            .map(|_| ())
    }
}
