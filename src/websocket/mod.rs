//! WebSocket Live Chart
//!
//! Streams animated chart frames to viewers and carries their pointer events
//! back to the chart session.
//!
//! ## Architecture
//!
//! - **ConnectionHub**: Tracks connected viewers and fans out frames
//! - **Handler**: Handles WebSocket upgrade and message processing
//! - **Messages**: Defines client and server message formats
//!
//! ## Example
//!
//! ```javascript
//! // Browser
//! const ws = new WebSocket('ws://localhost:8090/ws');
//!
//! ws.onmessage = (event) => {
//!   const msg = JSON.parse(event.data);
//!   if (msg.type === 'frame') chart.innerHTML = msg.svg;
//! };
//!
//! path.onmouseover = (e) => ws.send(JSON.stringify({
//!   type: 'pointer', slice: path.dataset.id, event: 'over',
//!   page_x: e.pageX, page_y: e.pageY,
//! }));
//! ```

mod handler;
mod hub;
mod messages;

pub use handler::websocket_handler;
pub use hub::{ConnectionHub, ConnectionId, HubConfig, HubError};
pub use messages::{ClientMessage, ServerMessage};
