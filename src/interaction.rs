//! Interaction Layer
//!
//! Pointer handling as a pure function: a pointer event on a slice yields a
//! list of effects (highlight, tooltip updates, delete request). Executing the
//! effects is left to the session, which owns the renderer and the collection.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::chart::{PieSlice, Rgb};
use crate::legend::{PointerPosition, Tooltip};
use crate::store::ExpenseId;

/// Pointer event kinds delivered for a slice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointerKind {
    Over,
    Move,
    Out,
    Click,
}

/// A pointer event at a page position
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerEvent {
    pub kind: PointerKind,
    pub position: PointerPosition,
}

impl PointerEvent {
    pub fn new(kind: PointerKind, page_x: f64, page_y: f64) -> Self {
        Self {
            kind,
            position: PointerPosition::new(page_x, page_y),
        }
    }

    pub fn over(page_x: f64, page_y: f64) -> Self {
        Self::new(PointerKind::Over, page_x, page_y)
    }

    pub fn moved(page_x: f64, page_y: f64) -> Self {
        Self::new(PointerKind::Move, page_x, page_y)
    }

    pub fn out(page_x: f64, page_y: f64) -> Self {
        Self::new(PointerKind::Out, page_x, page_y)
    }

    pub fn click(page_x: f64, page_y: f64) -> Self {
        Self::new(PointerKind::Click, page_x, page_y)
    }
}

/// Side effect requested by a pointer event
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Effect {
    /// Fade the slice fill to the highlight color
    Highlight {
        id: ExpenseId,
        color: Rgb,
        duration_ms: u64,
    },
    /// Fade the slice fill back to its category color
    RestoreFill {
        id: ExpenseId,
        color: Rgb,
        duration_ms: u64,
    },
    ShowTooltip { tooltip: Tooltip },
    MoveTooltip { position: PointerPosition },
    HideTooltip,
    /// Ask the collection to delete the record
    RequestDelete { id: ExpenseId },
}

impl Effect {
    /// Whether the effect only concerns the client that produced the event
    pub fn is_tooltip(&self) -> bool {
        matches!(
            self,
            Effect::ShowTooltip { .. } | Effect::MoveTooltip { .. } | Effect::HideTooltip
        )
    }
}

/// Hover and tooltip settings
#[derive(Debug, Clone, PartialEq)]
pub struct InteractionSettings {
    pub highlight: Rgb,
    pub hover_duration: Duration,
    pub currency_symbol: String,
}

impl Default for InteractionSettings {
    fn default() -> Self {
        Self {
            highlight: Rgb::WHITE,
            hover_duration: Duration::from_millis(300),
            currency_symbol: "$".to_string(),
        }
    }
}

/// Effects for a pointer event on a slice
pub fn respond(
    event: &PointerEvent,
    slice: &PieSlice,
    category_color: Rgb,
    settings: &InteractionSettings,
) -> Vec<Effect> {
    let id = slice.id().clone();
    let duration_ms = settings.hover_duration.as_millis() as u64;

    match event.kind {
        PointerKind::Over => vec![
            Effect::Highlight {
                id,
                color: settings.highlight,
                duration_ms,
            },
            Effect::ShowTooltip {
                tooltip: Tooltip::new(
                    slice.expense.name.clone(),
                    slice.expense.cost,
                    event.position,
                    &settings.currency_symbol,
                ),
            },
        ],
        PointerKind::Move => vec![Effect::MoveTooltip {
            position: event.position,
        }],
        PointerKind::Out => vec![
            Effect::RestoreFill {
                id,
                color: category_color,
                duration_ms,
            },
            Effect::HideTooltip,
        ],
        PointerKind::Click => vec![Effect::RequestDelete { id }],
    }
}
