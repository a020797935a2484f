//! # Expense Pie
//!
//! A live donut chart of expenses. Each expense in an external collection is
//! one slice sized by cost; the chart stays in sync with the collection and
//! animates every change.
//!
//! ## Features
//!
//! - **Live mirror**: Ordered local copy kept consistent with a change feed
//! - **Keyed transitions**: Slices grow in, resize and collapse out over 750 ms
//! - **Interaction**: Hover highlight with tooltip, click to delete
//! - **Real-time**: Frames pushed to browsers over WebSocket
//!
//! ## Modules
//!
//! - [`store`]: Expense collection seam and in-memory collection
//! - [`mirror`]: Local ordered mirror
//! - [`feed`]: Change feed adapter (mirror update then render)
//! - [`chart`]: Layout, reconciliation, transitions and SVG output
//! - [`interaction`]: Pointer events to effects
//! - [`legend`]: Legend and tooltip presentation
//! - [`session`]: Task owning the chart state
//! - [`api`]: REST API and viewer page with Axum
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use expense_pie::chart::ChartRenderer;
//! use expense_pie::feed::{self, ChangeFeed};
//! use expense_pie::mirror::LocalMirror;
//! use expense_pie::store::{ExpenseCollection, ExpenseFields, MemoryCollection};
//! use std::time::Instant;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let collection = MemoryCollection::new();
//!     let mut changes = ChangeFeed::subscribe(&collection).await?;
//!
//!     collection.add(ExpenseFields::new("Coffee", 5.0)).await?;
//!     collection.add(ExpenseFields::new("Rent", 1000.0)).await?;
//!
//!     let mut mirror = LocalMirror::new();
//!     let mut renderer = ChartRenderer::default();
//!     for _ in 0..3 {
//!         if let Some(batch) = changes.next_batch().await {
//!             feed::apply_batch(&mut mirror, &mut renderer, &batch, Instant::now());
//!         }
//!     }
//!
//!     println!("{} slices", renderer.elements().len());
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod chart;
pub mod config;
pub mod feed;
pub mod interaction;
pub mod legend;
pub mod mirror;
pub mod session;
pub mod store;
pub mod websocket;

// Re-export top-level types for convenience
pub use store::{
    Change, ChangeBatch, ChangeKind, Expense, ExpenseCollection, ExpenseFields, ExpenseId,
    MemoryCollection, StoreError, StoreResult,
};

pub use chart::{ChartRenderer, Frame, RenderSettings, Rgb, SvgCanvas};

pub use feed::ChangeFeed;

pub use mirror::LocalMirror;

pub use interaction::{Effect, PointerEvent, PointerKind};

pub use session::{ChartSession, SessionError, SessionHandle, SessionSnapshot};

pub use api::{build_router, serve, ApiError, AppState};

pub use websocket::{websocket_handler, ClientMessage, ConnectionHub, HubConfig, ServerMessage};

pub use config::{ApiConfig, ChartConfig, Config, ConfigError, LoggingConfig};
