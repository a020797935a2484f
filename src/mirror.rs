//! Local Mirror
//!
//! In-memory copy of the collection's current state, kept in step with the
//! change feed. Records keep the position they were first seen at: a
//! modification replaces the entry in place even when the collection's own
//! cost order would move it.

use crate::store::{Change, ChangeBatch, ChangeKind, Expense, ExpenseId};

/// Ordered in-memory copy of the expense collection
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LocalMirror {
    records: Vec<Expense>,
}

impl LocalMirror {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a single change
    ///
    /// Added and modified entries upsert on id, so a repeated `Added` for a
    /// live id never creates a duplicate.
    pub fn apply(&mut self, change: &Change) {
        match change.kind {
            ChangeKind::Added | ChangeKind::Modified => self.upsert(&change.expense, change.kind),
            ChangeKind::Removed => {
                let before = self.records.len();
                self.records.retain(|e| e.id != change.expense.id);
                if self.records.len() == before {
                    tracing::debug!(id = %change.expense.id, "Removal for unknown expense ignored");
                }
            }
        }
    }

    /// Apply every change of a batch in delivery order
    pub fn apply_batch(&mut self, batch: &ChangeBatch) {
        for change in batch.iter() {
            self.apply(change);
        }
    }

    fn upsert(&mut self, expense: &Expense, kind: ChangeKind) {
        match self.position(&expense.id) {
            Some(pos) => {
                if kind == ChangeKind::Added {
                    tracing::debug!(id = %expense.id, "Duplicate add treated as update");
                }
                self.records[pos] = expense.clone();
            }
            None => {
                if kind == ChangeKind::Modified {
                    tracing::debug!(id = %expense.id, "Modification for unknown expense appended");
                }
                self.records.push(expense.clone());
            }
        }
    }

    pub fn records(&self) -> &[Expense] {
        &self.records
    }

    pub fn get(&self, id: &ExpenseId) -> Option<&Expense> {
        self.records.iter().find(|e| &e.id == id)
    }

    pub fn position(&self, id: &ExpenseId) -> Option<usize> {
        self.records.iter().position(|e| &e.id == id)
    }

    pub fn total_cost(&self) -> f64 {
        self.records.iter().map(|e| e.cost).sum()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
