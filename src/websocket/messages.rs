//! WebSocket Message Types
//!
//! Messages exchanged between chart viewers and the server.

use serde::{Deserialize, Serialize};

use crate::interaction::{Effect, PointerEvent, PointerKind};
use crate::legend::translate_style;
use crate::store::ExpenseId;

/// Messages sent from client to server
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Pointer activity over a slice
    Pointer {
        /// Id of the slice under the pointer
        slice: ExpenseId,
        event: PointerKind,
        page_x: f64,
        page_y: f64,
    },
    /// Ping for keepalive
    Ping,
}

impl ClientMessage {
    /// Slice id and pointer event for pointer messages
    pub fn pointer_event(&self) -> Option<(ExpenseId, PointerEvent)> {
        match self {
            ClientMessage::Pointer {
                slice,
                event,
                page_x,
                page_y,
            } => Some((slice.clone(), PointerEvent::new(*event, *page_x, *page_y))),
            ClientMessage::Ping => None,
        }
    }
}

/// Messages sent from server to client
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Connection established
    Connected {
        /// Unique connection identifier
        connection_id: String,
    },
    /// Full chart SVG at one animation frame
    Frame { svg: String },
    /// Show the tooltip
    Tooltip {
        html: String,
        /// Inline style placing the tooltip
        style: String,
    },
    /// Move the tooltip to follow the pointer
    TooltipMoved { style: String },
    TooltipHidden,
    /// Pong response to ping
    Pong,
    /// Error message
    Error {
        /// Error description
        message: String,
    },
}

impl ServerMessage {
    /// Client-facing message for a tooltip effect
    pub fn from_effect(effect: &Effect) -> Option<Self> {
        match effect {
            Effect::ShowTooltip { tooltip } => Some(ServerMessage::Tooltip {
                html: tooltip.html(),
                style: tooltip.style(),
            }),
            Effect::MoveTooltip { position } => Some(ServerMessage::TooltipMoved {
                style: translate_style(*position),
            }),
            Effect::HideTooltip => Some(ServerMessage::TooltipHidden),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::legend::{PointerPosition, Tooltip};

    #[test]
    fn test_client_message_deserialize_pointer() {
        let json = r#"{"type": "pointer", "slice": "abc", "event": "over", "page_x": 10.0, "page_y": 20.5}"#;
        let msg: ClientMessage = serde_json::from_str(json).unwrap();
        let (id, event) = msg.pointer_event().unwrap();
        assert_eq!(id, ExpenseId::new("abc"));
        assert_eq!(event, PointerEvent::over(10.0, 20.5));
    }

    #[test]
    fn test_client_message_deserialize_ping() {
        let json = r#"{"type": "ping"}"#;
        let msg: ClientMessage = serde_json::from_str(json).unwrap();
        assert!(matches!(msg, ClientMessage::Ping));
        assert!(msg.pointer_event().is_none());
    }

    #[test]
    fn test_unknown_pointer_kind_rejected() {
        let json = r#"{"type": "pointer", "slice": "abc", "event": "wheel", "page_x": 0, "page_y": 0}"#;
        assert!(serde_json::from_str::<ClientMessage>(json).is_err());
    }

    #[test]
    fn test_server_message_serialize_frame() {
        let msg = ServerMessage::Frame {
            svg: "<svg></svg>".to_string(),
        };
        let json = serde_json::to_string(&msg).unwrap();
        assert_eq!(json, r#"{"type":"frame","svg":"<svg></svg>"}"#);
    }

    #[test]
    fn test_server_message_serialize_connected() {
        let msg = ServerMessage::Connected {
            connection_id: "abc-123".to_string(),
        };
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains("\"type\":\"connected\""));
        assert!(json.contains("\"connection_id\":\"abc-123\""));
    }

    #[test]
    fn test_from_effect() {
        let tooltip = Tooltip::new("Coffee", 5.0, PointerPosition::new(1.0, 2.0), "$");
        match ServerMessage::from_effect(&Effect::ShowTooltip { tooltip }) {
            Some(ServerMessage::Tooltip { html, style }) => {
                assert!(html.contains("Coffee"));
                assert_eq!(style, "transform: translate(1px,2px)");
            }
            other => panic!("Expected Tooltip, got {:?}", other),
        }

        assert!(matches!(
            ServerMessage::from_effect(&Effect::HideTooltip),
            Some(ServerMessage::TooltipHidden)
        ));
        assert!(ServerMessage::from_effect(&Effect::RequestDelete {
            id: ExpenseId::new("1")
        })
        .is_none());
    }
}
