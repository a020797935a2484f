//! Pie layout
//!
//! Turns the mirror's records into angular slices. Slices follow record order
//! exactly; they are never re-sorted by value, so a slice keeps its place
//! across updates even when its cost rank changes.

use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;

use super::arc::ArcState;
use crate::store::{Expense, ExpenseId};

/// One wedge of the pie, bound to the record it was computed from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PieSlice {
    pub expense: Expense,
    /// Position in the record sequence
    pub index: usize,
    pub start_angle: f64,
    pub end_angle: f64,
}

impl PieSlice {
    pub fn id(&self) -> &ExpenseId {
        &self.expense.id
    }

    pub fn arc(&self) -> ArcState {
        ArcState::new(self.start_angle, self.end_angle)
    }

    pub fn span(&self) -> f64 {
        self.end_angle - self.start_angle
    }

    /// Share of the full turn, in `[0, 1]`
    pub fn fraction(&self) -> f64 {
        self.span() / TAU
    }
}

/// Lay out records as consecutive slices starting at 12 o'clock
///
/// Each span is proportional to the record's cost. When every cost is zero the
/// turn is shared equally so the chart still shows each record.
pub fn pie_layout(records: &[Expense]) -> Vec<PieSlice> {
    let total: f64 = records.iter().map(|e| e.cost.max(0.0)).sum();
    let equal_share = total <= 0.0;
    let n = records.len();

    let mut angle = 0.0;
    records
        .iter()
        .enumerate()
        .map(|(index, expense)| {
            let span = if equal_share {
                TAU / n as f64
            } else {
                expense.cost.max(0.0) / total * TAU
            };
            let start_angle = angle;
            // Pin the final edge to exactly one turn, never behind its start
            let end_angle = if index + 1 == n {
                TAU.max(start_angle)
            } else {
                angle + span
            };
            angle = end_angle;

            PieSlice {
                expense: expense.clone(),
                index,
                start_angle,
                end_angle,
            }
        })
        .collect()
}
