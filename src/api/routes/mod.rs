//! API Routes
//!
//! Route handlers organized by functionality.

pub mod chart;
pub mod expenses;
pub mod health;
