//! Expense Collection
//!
//! The external source of truth the chart mirrors:
//!
//! - **types**: Expense records and change notifications
//! - **collection**: The `ExpenseCollection` seam (subscribe, write, delete)
//! - **memory**: In-process collection ordered by cost
//! - **error**: Error types
//!
//! # Example
//!
//! ```rust,no_run
//! use expense_pie::store::{ExpenseCollection, ExpenseFields, MemoryCollection};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let collection = MemoryCollection::new();
//!     let mut changes = collection.subscribe().await?;
//!
//!     collection.add(ExpenseFields::new("Coffee", 5.0)).await?;
//!
//!     while let Some(batch) = changes.recv().await {
//!         println!("{} changes", batch.len());
//!     }
//!     Ok(())
//! }
//! ```

pub mod collection;
pub mod error;
pub mod memory;
pub mod types;

pub use collection::{ChangeStream, ExpenseCollection, Write};
pub use error::{StoreError, StoreResult};
pub use memory::MemoryCollection;
pub use types::{Change, ChangeBatch, ChangeKind, Expense, ExpenseFields, ExpenseId};
