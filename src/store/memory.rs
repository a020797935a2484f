//! In-memory expense collection
//!
//! Keeps documents ordered by cost ascending and fans every committed write
//! out to its subscribers as one change batch. Writes and notifications happen
//! under the same lock, so subscribers observe batches in commit order.

use async_trait::async_trait;
use tokio::sync::{mpsc, RwLock};

use super::collection::{ChangeStream, ExpenseCollection, Write};
use super::error::{StoreError, StoreResult};
use super::types::{Change, ChangeBatch, Expense, ExpenseFields, ExpenseId};

/// In-process collection backing the chart
pub struct MemoryCollection {
    inner: RwLock<Inner>,
}

#[derive(Default)]
struct Inner {
    /// Documents sorted by cost, ties in insertion order
    docs: Vec<Expense>,
    /// Live subscriptions
    subscribers: Vec<mpsc::UnboundedSender<ChangeBatch>>,
}

impl MemoryCollection {
    /// Create an empty collection
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner::default()),
        }
    }

    /// Create a collection pre-populated with documents
    pub fn with_seed(seed: impl IntoIterator<Item = ExpenseFields>) -> StoreResult<Self> {
        let mut docs = Vec::new();
        for fields in seed {
            fields.validate()?;
            insert_sorted(&mut docs, Expense::from_fields(ExpenseId::generate(), fields));
        }

        Ok(Self {
            inner: RwLock::new(Inner {
                docs,
                subscribers: Vec::new(),
            }),
        })
    }

    /// Number of live subscriptions
    pub async fn subscriber_count(&self) -> usize {
        self.inner
            .read()
            .await
            .subscribers
            .iter()
            .filter(|s| !s.is_closed())
            .count()
    }

    /// Number of stored documents
    pub async fn len(&self) -> usize {
        self.inner.read().await.docs.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl Default for MemoryCollection {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ExpenseCollection for MemoryCollection {
    async fn subscribe(&self) -> StoreResult<ChangeStream> {
        let mut inner = self.inner.write().await;
        let (tx, rx) = mpsc::unbounded_channel();

        let initial = ChangeBatch::new(inner.docs.iter().cloned().map(Change::added).collect());
        tx.send(initial).map_err(|_| StoreError::Closed)?;
        inner.subscribers.push(tx);

        tracing::debug!(
            documents = inner.docs.len(),
            subscribers = inner.subscribers.len(),
            "New collection subscription"
        );

        Ok(rx)
    }

    async fn list(&self) -> StoreResult<Vec<Expense>> {
        Ok(self.inner.read().await.docs.clone())
    }

    async fn write_batch(&self, writes: Vec<Write>) -> StoreResult<Vec<ExpenseId>> {
        let mut inner = self.inner.write().await;

        // Stage on a copy so a failing write leaves the collection untouched
        let mut docs = inner.docs.clone();
        let mut batch = ChangeBatch::default();
        let mut touched = Vec::with_capacity(writes.len());

        for write in writes {
            match write {
                Write::Add(fields) => {
                    fields.validate()?;
                    let expense = Expense::from_fields(ExpenseId::generate(), fields);
                    touched.push(expense.id.clone());
                    insert_sorted(&mut docs, expense.clone());
                    batch.push(Change::added(expense));
                }
                Write::Set(id, fields) => {
                    fields.validate()?;
                    let pos = docs
                        .iter()
                        .position(|e| e.id == id)
                        .ok_or_else(|| StoreError::NotFound(id.clone()))?;
                    docs.remove(pos);
                    let expense = Expense::from_fields(id.clone(), fields);
                    insert_sorted(&mut docs, expense.clone());
                    touched.push(id);
                    batch.push(Change::modified(expense));
                }
                Write::Delete(id) => {
                    let pos = docs
                        .iter()
                        .position(|e| e.id == id)
                        .ok_or_else(|| StoreError::NotFound(id.clone()))?;
                    let expense = docs.remove(pos);
                    touched.push(id);
                    batch.push(Change::removed(expense));
                }
            }
        }

        inner.docs = docs;

        if !batch.is_empty() {
            // Drop subscriptions whose receiver has gone away
            inner
                .subscribers
                .retain(|tx| tx.send(batch.clone()).is_ok());

            tracing::debug!(
                changes = batch.len(),
                subscribers = inner.subscribers.len(),
                "Committed collection batch"
            );
        }

        Ok(touched)
    }
}

/// Insert keeping cost order; equal costs go after existing ones
fn insert_sorted(docs: &mut Vec<Expense>, expense: Expense) {
    let pos = docs.partition_point(|e| e.cost <= expense.cost);
    docs.insert(pos, expense);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::ChangeKind;

    #[tokio::test]
    async fn test_initial_batch_in_cost_order() {
        let collection = MemoryCollection::with_seed(vec![
            ExpenseFields::new("Rent", 1000.0),
            ExpenseFields::new("Coffee", 5.0),
            ExpenseFields::new("Books", 40.0),
        ])
        .unwrap();

        let mut stream = collection.subscribe().await.unwrap();
        let batch = stream.recv().await.unwrap();

        assert_eq!(batch.len(), 3);
        assert_eq!(batch.count(ChangeKind::Added), 3);
        let names: Vec<_> = batch.iter().map(|c| c.expense.name.as_str()).collect();
        assert_eq!(names, vec!["Coffee", "Books", "Rent"]);
    }

    #[tokio::test]
    async fn test_empty_collection_sends_empty_initial_batch() {
        let collection = MemoryCollection::new();
        let mut stream = collection.subscribe().await.unwrap();

        let batch = stream.recv().await.unwrap();
        assert!(batch.is_empty());
    }

    #[tokio::test]
    async fn test_each_write_emits_one_batch() {
        let collection = MemoryCollection::new();
        let mut stream = collection.subscribe().await.unwrap();
        stream.recv().await.unwrap();

        let id = collection
            .add(ExpenseFields::new("Coffee", 5.0))
            .await
            .unwrap();
        let batch = stream.recv().await.unwrap();
        assert_eq!(batch.changes, vec![Change::added(Expense::new(id.clone(), "Coffee", 5.0))]);

        collection
            .update(&id, ExpenseFields::new("Coffee", 50.0))
            .await
            .unwrap();
        let batch = stream.recv().await.unwrap();
        assert_eq!(batch.changes, vec![Change::modified(Expense::new(id.clone(), "Coffee", 50.0))]);

        collection.delete(&id).await.unwrap();
        let batch = stream.recv().await.unwrap();
        assert_eq!(batch.len(), 1);
        assert_eq!(batch.changes[0].kind, ChangeKind::Removed);
        assert_eq!(batch.changes[0].id(), &id);

        assert!(stream.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_write_batch_is_atomic() {
        let collection = MemoryCollection::new();
        let mut stream = collection.subscribe().await.unwrap();
        stream.recv().await.unwrap();

        let result = collection
            .write_batch(vec![
                Write::Add(ExpenseFields::new("Coffee", 5.0)),
                Write::Delete(ExpenseId::new("missing")),
            ])
            .await;

        assert!(matches!(result, Err(StoreError::NotFound(_))));
        assert!(collection.is_empty().await);
        assert!(stream.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_write_batch_single_notification() {
        let collection = MemoryCollection::new();
        let mut stream = collection.subscribe().await.unwrap();
        stream.recv().await.unwrap();

        let ids = collection
            .write_batch(vec![
                Write::Add(ExpenseFields::new("Coffee", 5.0)),
                Write::Add(ExpenseFields::new("Rent", 1000.0)),
            ])
            .await
            .unwrap();
        assert_eq!(ids.len(), 2);

        let batch = stream.recv().await.unwrap();
        assert_eq!(batch.len(), 2);
        assert!(stream.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_list_reorders_on_update() {
        let collection = MemoryCollection::new();
        let coffee = collection
            .add(ExpenseFields::new("Coffee", 5.0))
            .await
            .unwrap();
        collection
            .add(ExpenseFields::new("Rent", 1000.0))
            .await
            .unwrap();

        collection
            .update(&coffee, ExpenseFields::new("Coffee", 5000.0))
            .await
            .unwrap();

        let names: Vec<_> = collection
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.name)
            .collect();
        assert_eq!(names, vec!["Rent", "Coffee"]);
    }

    #[tokio::test]
    async fn test_invalid_fields_rejected() {
        let collection = MemoryCollection::new();
        let result = collection.add(ExpenseFields::new("", 5.0)).await;
        assert!(matches!(result, Err(StoreError::InvalidExpense(_))));

        let result = MemoryCollection::with_seed(vec![ExpenseFields::new("Debt", -3.0)]);
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_dropped_subscriber_is_pruned() {
        let collection = MemoryCollection::new();
        let stream = collection.subscribe().await.unwrap();
        assert_eq!(collection.subscriber_count().await, 1);

        drop(stream);
        collection
            .add(ExpenseFields::new("Coffee", 5.0))
            .await
            .unwrap();
        assert_eq!(collection.subscriber_count().await, 0);
    }
}
