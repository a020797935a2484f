//! Chart Renderer
//!
//! Turns mirror snapshots into an animated donut chart:
//!
//! - **layout**: Cost-proportional slice angles in record order
//! - **reconcile**: Keyed enter/update/exit join against displayed slices
//! - **renderer**: Displayed slice state and transitions
//! - **tween**: Eased interpolation over time
//! - **arc**: Arc geometry and SVG path data
//! - **color**: Colors and the name-to-color ordinal scale
//! - **svg**: Frame serialization
//!
//! # Render Cycle
//!
//! ```text
//!   records → color domain → pie layout → keyed join ─┬─ exit:   collapse to end angle, remove
//!                                                     ├─ update: tween from on-screen arc
//!                                                     └─ enter:  grow from end angle
//! ```
//!
//! # Example
//!
//! ```rust
//! use expense_pie::chart::{ChartRenderer, SvgCanvas};
//! use expense_pie::store::Expense;
//! use std::time::{Duration, Instant};
//!
//! let mut renderer = ChartRenderer::default();
//! let now = Instant::now();
//! renderer.render(&[Expense::new("1", "Coffee", 5.0)], now);
//!
//! let later = now + Duration::from_millis(750);
//! renderer.tick(later);
//! let svg = SvgCanvas::default().render(&renderer.frame(later));
//! assert!(svg.contains("Coffee"));
//! ```

pub mod arc;
pub mod color;
pub mod layout;
pub mod reconcile;
pub mod renderer;
pub mod svg;
pub mod tween;

pub use arc::{arc_path, ArcState};
pub use color::{OrdinalScale, Rgb, SET3};
pub use layout::{pie_layout, PieSlice};
pub use reconcile::{join, JoinPlan};
pub use renderer::{
    ChartRenderer, Frame, RenderSettings, RenderSummary, SliceElement, SlicePhase, SliceShape,
};
pub use svg::SvgCanvas;
pub use tween::{Easing, Lerp, Tween};
