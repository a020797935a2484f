//! Change Feed Adapter
//!
//! Subscribes to the collection and turns each delivered batch into mirror
//! updates followed by exactly one render cycle.

use std::time::Instant;

use crate::chart::{ChartRenderer, RenderSummary};
use crate::mirror::LocalMirror;
use crate::store::{ChangeBatch, ChangeKind, ChangeStream, ExpenseCollection, StoreResult};

/// A live subscription to the expense collection
pub struct ChangeFeed {
    stream: ChangeStream,
    batches: u64,
}

impl ChangeFeed {
    /// Subscribe once to the collection
    pub async fn subscribe(collection: &dyn ExpenseCollection) -> StoreResult<Self> {
        let stream = collection.subscribe().await?;
        Ok(Self::from_stream(stream))
    }

    pub fn from_stream(stream: ChangeStream) -> Self {
        Self { stream, batches: 0 }
    }

    /// Wait for the next batch; `None` once the collection drops the subscription
    pub async fn next_batch(&mut self) -> Option<ChangeBatch> {
        let batch = self.stream.recv().await?;
        self.batches += 1;
        Some(batch)
    }

    /// Batches delivered so far
    pub fn batches_received(&self) -> u64 {
        self.batches
    }
}

/// Apply a whole batch to the mirror, then render once
pub fn apply_batch(
    mirror: &mut LocalMirror,
    renderer: &mut ChartRenderer,
    batch: &ChangeBatch,
    now: Instant,
) -> RenderSummary {
    mirror.apply_batch(batch);

    tracing::debug!(
        added = batch.count(ChangeKind::Added),
        modified = batch.count(ChangeKind::Modified),
        removed = batch.count(ChangeKind::Removed),
        records = mirror.len(),
        "Applied change batch"
    );

    renderer.render(mirror.records(), now)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{Change, Expense, ExpenseFields, MemoryCollection};

    #[test]
    fn test_one_render_per_batch() {
        let mut mirror = LocalMirror::new();
        let mut renderer = ChartRenderer::default();
        let now = Instant::now();

        let batch = ChangeBatch::default()
            .with(Change::added(Expense::new("1", "Coffee", 5.0)))
            .with(Change::added(Expense::new("2", "Rent", 1000.0)))
            .with(Change::modified(Expense::new("1", "Coffee", 50.0)));

        let summary = apply_batch(&mut mirror, &mut renderer, &batch, now);

        assert_eq!(renderer.cycles(), 1);
        assert_eq!(summary.entered, 2);
        // The render sees the state after the whole batch
        assert_eq!(renderer.slice(&"1".into()).unwrap().datum.expense.cost, 50.0);
    }

    #[test]
    fn test_empty_batch_still_renders() {
        let mut mirror = LocalMirror::new();
        let mut renderer = ChartRenderer::default();
        let summary = apply_batch(&mut mirror, &mut renderer, &ChangeBatch::default(), Instant::now());
        assert_eq!(summary.cycle, 1);
        assert_eq!(summary.entered, 0);
    }

    #[tokio::test]
    async fn test_subscribe_receives_initial_and_live_batches() {
        let collection = MemoryCollection::with_seed(vec![ExpenseFields::new("Rent", 1000.0)]).unwrap();
        let mut feed = ChangeFeed::subscribe(&collection).await.unwrap();

        let initial = feed.next_batch().await.unwrap();
        assert_eq!(initial.len(), 1);

        collection.add(ExpenseFields::new("Coffee", 5.0)).await.unwrap();
        let live = feed.next_batch().await.unwrap();
        assert_eq!(live.count(ChangeKind::Added), 1);
        assert_eq!(feed.batches_received(), 2);
    }

    #[tokio::test]
    async fn test_feed_ends_when_collection_dropped() {
        let collection = MemoryCollection::new();
        let mut feed = ChangeFeed::subscribe(&collection).await.unwrap();
        feed.next_batch().await.unwrap();

        drop(collection);
        assert!(feed.next_batch().await.is_none());
    }
}
