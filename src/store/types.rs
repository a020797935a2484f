//! Core data types for the expense collection
//!
//! This module defines the records and change notifications exchanged between
//! the collection and everything downstream of it:
//! - `Expense`: A single expense record with its collection-assigned id
//! - `ExpenseFields`: The writable body of an expense
//! - `Change` and `ChangeBatch`: Incremental change notifications

use serde::{Deserialize, Serialize};
use std::fmt;

use super::error::{StoreError, StoreResult};

/// Opaque identity assigned by the collection
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExpenseId(String);

impl ExpenseId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh random id
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ExpenseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ExpenseId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for ExpenseId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// A single expense record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    /// Collection-assigned identity
    pub id: ExpenseId,
    /// Human-readable name, doubles as the color category
    pub name: String,
    /// Non-negative amount
    pub cost: f64,
}

impl Expense {
    pub fn new(id: impl Into<ExpenseId>, name: impl Into<String>, cost: f64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            cost,
        }
    }

    /// Build a record from an id and a document body
    pub fn from_fields(id: ExpenseId, fields: ExpenseFields) -> Self {
        Self {
            id,
            name: fields.name,
            cost: fields.cost,
        }
    }

    pub fn fields(&self) -> ExpenseFields {
        ExpenseFields {
            name: self.name.clone(),
            cost: self.cost,
        }
    }
}

/// The writable body of an expense document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseFields {
    pub name: String,
    pub cost: f64,
}

impl ExpenseFields {
    pub fn new(name: impl Into<String>, cost: f64) -> Self {
        Self {
            name: name.into(),
            cost,
        }
    }

    /// Reject bodies the chart cannot draw
    pub fn validate(&self) -> StoreResult<()> {
        if self.name.trim().is_empty() {
            return Err(StoreError::InvalidExpense(
                "name must not be empty".to_string(),
            ));
        }
        if !self.cost.is_finite() || self.cost < 0.0 {
            return Err(StoreError::InvalidExpense(format!(
                "cost must be a finite non-negative number, got {}",
                self.cost
            )));
        }
        Ok(())
    }
}

/// Kind of change reported by the collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    Added,
    Modified,
    Removed,
}

/// One entry of a change batch
///
/// Removed entries carry the last known record so the id is always present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Change {
    pub kind: ChangeKind,
    pub expense: Expense,
}

impl Change {
    pub fn added(expense: Expense) -> Self {
        Self {
            kind: ChangeKind::Added,
            expense,
        }
    }

    pub fn modified(expense: Expense) -> Self {
        Self {
            kind: ChangeKind::Modified,
            expense,
        }
    }

    pub fn removed(expense: Expense) -> Self {
        Self {
            kind: ChangeKind::Removed,
            expense,
        }
    }

    pub fn id(&self) -> &ExpenseId {
        &self.expense.id
    }
}

/// Changes delivered together in one notification
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChangeBatch {
    pub changes: Vec<Change>,
}

impl ChangeBatch {
    pub fn new(changes: Vec<Change>) -> Self {
        Self { changes }
    }

    /// Builder method: append a change
    pub fn with(mut self, change: Change) -> Self {
        self.changes.push(change);
        self
    }

    pub fn push(&mut self, change: Change) {
        self.changes.push(change);
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Change> {
        self.changes.iter()
    }

    /// Count entries of one kind
    pub fn count(&self, kind: ChangeKind) -> usize {
        self.changes.iter().filter(|c| c.kind == kind).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fields_validation() {
        assert!(ExpenseFields::new("Coffee", 5.0).validate().is_ok());
        assert!(ExpenseFields::new("Free lunch", 0.0).validate().is_ok());

        assert!(ExpenseFields::new("  ", 5.0).validate().is_err());
        assert!(ExpenseFields::new("Debt", -1.0).validate().is_err());
        assert!(ExpenseFields::new("Broken", f64::NAN).validate().is_err());
        assert!(ExpenseFields::new("Huge", f64::INFINITY).validate().is_err());
    }

    #[test]
    fn test_generated_ids_are_unique() {
        let a = ExpenseId::generate();
        let b = ExpenseId::generate();
        assert_ne!(a, b);
        assert!(!a.as_str().is_empty());
    }

    #[test]
    fn test_change_serialize() {
        let change = Change::removed(Expense::new("2", "Rent", 1000.0));
        let json = serde_json::to_string(&change).unwrap();
        assert!(json.contains("\"kind\":\"removed\""));
        assert!(json.contains("\"id\":\"2\""));
    }

    #[test]
    fn test_batch_counts() {
        let batch = ChangeBatch::default()
            .with(Change::added(Expense::new("1", "Coffee", 5.0)))
            .with(Change::added(Expense::new("2", "Rent", 1000.0)))
            .with(Change::removed(Expense::new("2", "Rent", 1000.0)));

        assert_eq!(batch.len(), 3);
        assert_eq!(batch.count(ChangeKind::Added), 2);
        assert_eq!(batch.count(ChangeKind::Removed), 1);
        assert_eq!(batch.count(ChangeKind::Modified), 0);
    }
}
