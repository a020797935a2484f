//! Keyed data join
//!
//! Matches the slices currently on display against a freshly computed layout
//! by record id, splitting them into enter, update and exit groups. Matching
//! by id rather than position means a record removed from the middle exits on
//! its own instead of its neighbours morphing into each other's data.

use std::collections::HashSet;

use super::layout::PieSlice;
use crate::store::ExpenseId;

/// Result of joining new slices against displayed ones
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JoinPlan {
    /// New slices with no displayed counterpart
    pub enter: Vec<PieSlice>,
    /// New slices whose id is already displayed
    pub update: Vec<PieSlice>,
    /// Displayed ids absent from the new layout, in display order
    pub exit: Vec<ExpenseId>,
}

impl JoinPlan {
    pub fn is_empty(&self) -> bool {
        self.enter.is_empty() && self.update.is_empty() && self.exit.is_empty()
    }
}

/// Split `next` against the ids currently displayed
pub fn join<'a>(
    displayed: impl IntoIterator<Item = &'a ExpenseId>,
    next: Vec<PieSlice>,
) -> JoinPlan {
    let displayed: Vec<&ExpenseId> = displayed.into_iter().collect();
    let shown: HashSet<&ExpenseId> = displayed.iter().copied().collect();
    let incoming: HashSet<ExpenseId> = next.iter().map(|s| s.id().clone()).collect();

    let mut plan = JoinPlan::default();
    for slice in next {
        if shown.contains(slice.id()) {
            plan.update.push(slice);
        } else {
            plan.enter.push(slice);
        }
    }

    plan.exit = displayed
        .into_iter()
        .filter(|id| !incoming.contains(*id))
        .cloned()
        .collect();

    plan
}
