//! Chart Session
//!
//! The single owner of the mirror, the renderer and the hover state. Feed
//! batches, pointer commands, snapshot requests and animation ticks are all
//! serialized through one `select!` loop, so chart state needs no locks.
//!
//! The session also remembers which slice each WebSocket viewer is hovering.
//! A highlight is only restored once no viewer hovers the slice, and a viewer
//! whose hovered slice starts exiting is told to hide its tooltip.
//!
//! ```text
//!   collection ──batches──▶ ┌──────────────┐ ──frames──▶ ConnectionHub
//!   SessionHandle ─cmds───▶ │ ChartSession │
//!   frame ticker ─────────▶ └──────────────┘ ──delete──▶ collection
//! ```

use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::chart::{ChartRenderer, Frame, RenderSummary, SlicePhase, SvgCanvas};
use crate::config::ChartConfig;
use crate::feed::{self, ChangeFeed};
use crate::interaction::{respond, Effect, InteractionSettings, PointerEvent, PointerKind};
use crate::mirror::LocalMirror;
use crate::store::{ChangeBatch, Expense, ExpenseCollection, ExpenseId};
use crate::websocket::{ConnectionHub, ConnectionId, ServerMessage};

/// Pending commands before senders wait
const COMMAND_CAPACITY: usize = 256;

/// Requests handled by the session loop
pub enum SessionCommand {
    Pointer {
        /// WebSocket viewer the event came from, if any
        viewer: Option<ConnectionId>,
        id: ExpenseId,
        event: PointerEvent,
        reply: oneshot::Sender<Vec<Effect>>,
    },
    /// A viewer went away; release whatever it was hovering
    Leave { viewer: ConnectionId },
    /// Resolve the slice under a point in canvas coordinates
    HitTest {
        x: f64,
        y: f64,
        reply: oneshot::Sender<Option<ExpenseId>>,
    },
    Snapshot {
        reply: oneshot::Sender<SessionSnapshot>,
    },
    Shutdown,
}

/// Point-in-time view of the session
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    /// Mirror contents in mirror order
    pub records: Vec<Expense>,
    pub frame: Frame,
    pub svg: String,
    pub cycles: u64,
    pub animating: bool,
}

/// Errors returned by session handles
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Chart session closed")]
    Closed,
}

/// Cloneable handle for talking to a running session
#[derive(Clone)]
pub struct SessionHandle {
    tx: mpsc::Sender<SessionCommand>,
}

impl SessionHandle {
    /// Deliver a pointer event for a slice and get back the effects it produced
    pub async fn pointer(
        &self,
        id: ExpenseId,
        event: PointerEvent,
    ) -> Result<Vec<Effect>, SessionError> {
        self.send_pointer(None, id, event).await
    }

    /// Pointer event from a WebSocket viewer, whose hover is tracked
    pub async fn viewer_pointer(
        &self,
        viewer: &str,
        id: ExpenseId,
        event: PointerEvent,
    ) -> Result<Vec<Effect>, SessionError> {
        self.send_pointer(Some(viewer.to_string()), id, event).await
    }

    async fn send_pointer(
        &self,
        viewer: Option<ConnectionId>,
        id: ExpenseId,
        event: PointerEvent,
    ) -> Result<Vec<Effect>, SessionError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(SessionCommand::Pointer {
                viewer,
                id,
                event,
                reply,
            })
            .await
            .map_err(|_| SessionError::Closed)?;
        rx.await.map_err(|_| SessionError::Closed)
    }

    /// Tell the session a viewer disconnected
    pub async fn leave(&self, viewer: &str) {
        let _ = self
            .tx
            .send(SessionCommand::Leave {
                viewer: viewer.to_string(),
            })
            .await;
    }

    pub async fn hit_test(&self, x: f64, y: f64) -> Result<Option<ExpenseId>, SessionError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(SessionCommand::HitTest { x, y, reply })
            .await
            .map_err(|_| SessionError::Closed)?;
        rx.await.map_err(|_| SessionError::Closed)
    }

    pub async fn snapshot(&self) -> Result<SessionSnapshot, SessionError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(SessionCommand::Snapshot { reply })
            .await
            .map_err(|_| SessionError::Closed)?;
        rx.await.map_err(|_| SessionError::Closed)
    }

    /// Ask the session loop to stop
    pub async fn shutdown(&self) {
        let _ = self.tx.send(SessionCommand::Shutdown).await;
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Owner of all chart state
pub struct ChartSession {
    collection: Arc<dyn ExpenseCollection>,
    mirror: LocalMirror,
    renderer: ChartRenderer,
    canvas: SvgCanvas,
    interaction: InteractionSettings,
    frame_interval: Duration,
    hub: Option<Arc<ConnectionHub>>,
    /// Slice each viewer is hovering
    hovers: HashMap<ConnectionId, ExpenseId>,
}

impl ChartSession {
    pub fn new(collection: Arc<dyn ExpenseCollection>, config: &ChartConfig) -> Self {
        Self {
            collection,
            mirror: LocalMirror::new(),
            renderer: ChartRenderer::new(config.render_settings()),
            canvas: SvgCanvas::from_config(config),
            interaction: config.interaction_settings(),
            frame_interval: config.frame_interval(),
            hub: None,
            hovers: HashMap::new(),
        }
    }

    /// Builder method: push frames to WebSocket viewers
    pub fn with_hub(mut self, hub: Arc<ConnectionHub>) -> Self {
        self.hub = Some(hub);
        self
    }

    /// Apply a feed batch and run one render cycle
    pub fn apply_batch(&mut self, batch: &ChangeBatch, now: Instant) -> RenderSummary {
        feed::apply_batch(&mut self.mirror, &mut self.renderer, batch, now)
    }

    /// Run a pointer event through the interaction layer and execute its effects
    ///
    /// Fill effects are applied to the renderer and delete requests are sent to
    /// the collection. Tooltip effects are returned for the requesting client.
    pub fn handle_pointer(
        &mut self,
        id: &ExpenseId,
        event: &PointerEvent,
        now: Instant,
    ) -> Vec<Effect> {
        self.pointer_from(None, id, event, now)
    }

    /// Same as `handle_pointer`, recording the hover of a WebSocket viewer
    pub fn handle_viewer_pointer(
        &mut self,
        viewer: &str,
        id: &ExpenseId,
        event: &PointerEvent,
        now: Instant,
    ) -> Vec<Effect> {
        self.pointer_from(Some(viewer), id, event, now)
    }

    fn pointer_from(
        &mut self,
        viewer: Option<&str>,
        id: &ExpenseId,
        event: &PointerEvent,
        now: Instant,
    ) -> Vec<Effect> {
        let Some(element) = self.renderer.slice(id) else {
            tracing::debug!(id = %id, "Pointer event for unknown slice ignored");
            return Vec::new();
        };
        if event.kind == PointerKind::Click && element.phase == SlicePhase::Exiting {
            tracing::debug!(id = %id, "Click on exiting slice ignored");
            return Vec::new();
        }

        let datum = element.datum.clone();
        let category = self.renderer.category_color(id).unwrap_or(element.category);
        let effects = respond(event, &datum, category, &self.interaction);

        if let Some(viewer) = viewer {
            self.track_hover(viewer, id, event.kind, now);
        }
        // Another viewer still over the slice keeps it highlighted
        let held = self.hovers.values().any(|hovered| hovered == id);

        for effect in &effects {
            match effect {
                Effect::Highlight {
                    id,
                    color,
                    duration_ms,
                } => {
                    self.renderer
                        .highlight(id, *color, Duration::from_millis(*duration_ms), now);
                }
                Effect::RestoreFill { .. } if held => {}
                Effect::RestoreFill {
                    id,
                    color,
                    duration_ms,
                } => {
                    self.renderer
                        .restore(id, *color, Duration::from_millis(*duration_ms), now);
                }
                Effect::RequestDelete { id } => self.request_delete(id.clone()),
                Effect::ShowTooltip { .. } | Effect::MoveTooltip { .. } | Effect::HideTooltip => {}
            }
        }

        effects
    }

    fn track_hover(&mut self, viewer: &str, id: &ExpenseId, kind: PointerKind, now: Instant) {
        match kind {
            PointerKind::Over => {
                if let Some(previous) = self.hovers.insert(viewer.to_string(), id.clone()) {
                    if &previous != id {
                        self.release(&previous, now);
                    }
                }
            }
            PointerKind::Out => {
                if self.hovers.get(viewer) == Some(id) {
                    self.hovers.remove(viewer);
                }
            }
            PointerKind::Move | PointerKind::Click => {}
        }
    }

    /// Fade a slice back to its category color unless a viewer still hovers it
    fn release(&mut self, id: &ExpenseId, now: Instant) {
        if self.hovers.values().any(|hovered| hovered == id) {
            return;
        }
        if let Some(color) = self.renderer.category_color(id) {
            self.renderer
                .restore(id, color, self.interaction.hover_duration, now);
        }
    }

    /// Forget a disconnected viewer and release its hovered slice
    pub fn leave_viewer(&mut self, viewer: &str, now: Instant) {
        if let Some(id) = self.hovers.remove(viewer) {
            tracing::debug!(connection_id = %viewer, id = %id, "Viewer left while hovering");
            self.release(&id, now);
        }
    }

    /// Drop hovers on slices that are exiting or gone
    ///
    /// Returns the viewers whose tooltip should be hidden.
    pub fn prune_hovers(&mut self) -> Vec<ConnectionId> {
        let renderer = &self.renderer;
        let mut released = Vec::new();
        self.hovers.retain(|viewer, id| {
            let live = renderer
                .slice(id)
                .is_some_and(|element| element.phase != SlicePhase::Exiting);
            if !live {
                released.push(viewer.clone());
            }
            live
        });
        released
    }

    /// Fire-and-forget delete; the slice only goes away once the feed echoes it
    fn request_delete(&self, id: ExpenseId) {
        tracing::info!(id = %id, "Delete requested from chart");
        let collection = Arc::clone(&self.collection);
        tokio::spawn(async move {
            if let Err(e) = collection.delete(&id).await {
                tracing::warn!(id = %id, error = %e, "Delete request failed");
            }
        });
    }

    /// Slice drawn under a point given in canvas coordinates
    pub fn hit_test(&self, x: f64, y: f64, now: Instant) -> Option<ExpenseId> {
        let (cx, cy) = self.canvas.to_chart(x, y);
        self.renderer
            .frame(now)
            .slice_at(cx, cy)
            .map(|shape| shape.id.clone())
    }

    pub fn snapshot(&self, now: Instant) -> SessionSnapshot {
        let frame = self.renderer.frame(now);
        SessionSnapshot {
            records: self.mirror.records().to_vec(),
            svg: self.canvas.render(&frame),
            frame,
            cycles: self.renderer.cycles(),
            animating: self.renderer.is_animating(),
        }
    }

    pub fn mirror(&self) -> &LocalMirror {
        &self.mirror
    }

    pub fn renderer(&self) -> &ChartRenderer {
        &self.renderer
    }

    async fn publish_frame(&self, now: Instant) {
        if let Some(hub) = &self.hub {
            let svg = self.canvas.render(&self.renderer.frame(now));
            hub.broadcast(ServerMessage::Frame { svg }).await;
        }
    }

    async fn hide_tooltips(&self, viewers: &[ConnectionId]) {
        let Some(hub) = &self.hub else { return };
        for viewer in viewers {
            tracing::debug!(connection_id = %viewer, "Hovered slice exited, hiding tooltip");
            let _ = hub.send_to(viewer, ServerMessage::TooltipHidden).await;
        }
    }

    async fn handle_command(&mut self, command: SessionCommand) {
        match command {
            SessionCommand::Pointer {
                viewer,
                id,
                event,
                reply,
            } => {
                let effects = self.pointer_from(viewer.as_deref(), &id, &event, Instant::now());
                let _ = reply.send(effects);
            }
            SessionCommand::Leave { viewer } => self.leave_viewer(&viewer, Instant::now()),
            SessionCommand::HitTest { x, y, reply } => {
                let _ = reply.send(self.hit_test(x, y, Instant::now()));
            }
            SessionCommand::Snapshot { reply } => {
                let _ = reply.send(self.snapshot(Instant::now()));
            }
            SessionCommand::Shutdown => {}
        }
    }

    /// Drive the session until shutdown or until every handle is dropped
    pub async fn run(mut self, mut feed: ChangeFeed, mut commands: mpsc::Receiver<SessionCommand>) {
        let mut ticker = tokio::time::interval(self.frame_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut feed_open = true;

        tracing::info!("Chart session started");

        loop {
            let animating = self.renderer.is_animating();

            tokio::select! {
                biased;

                batch = feed.next_batch(), if feed_open => match batch {
                    Some(batch) => {
                        let now = Instant::now();
                        self.apply_batch(&batch, now);
                        let released = self.prune_hovers();
                        self.hide_tooltips(&released).await;
                        self.publish_frame(now).await;
                    }
                    None => {
                        tracing::warn!("Change feed closed, keeping last chart state");
                        feed_open = false;
                    }
                },
                command = commands.recv() => match command {
                    Some(SessionCommand::Shutdown) | None => break,
                    Some(command) => self.handle_command(command).await,
                },
                _ = ticker.tick(), if animating => {
                    let now = Instant::now();
                    self.renderer.tick(now);
                    self.publish_frame(now).await;
                }
            }
        }

        tracing::info!(
            cycles = self.renderer.cycles(),
            batches = feed.batches_received(),
            "Chart session stopped"
        );
    }

    /// Spawn the session loop on the runtime
    pub fn spawn(self, feed: ChangeFeed) -> (SessionHandle, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(COMMAND_CAPACITY);
        let task = tokio::spawn(self.run(feed, rx));
        (SessionHandle { tx }, task)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{ChangeKind, ExpenseFields, MemoryCollection};
    use crate::websocket::HubConfig;
    use std::f64::consts::TAU;

    const FULL: Duration = Duration::from_millis(750);

    async fn setup() -> (Arc<MemoryCollection>, ChangeFeed, ChartSession) {
        let collection = Arc::new(MemoryCollection::new());
        let feed = ChangeFeed::subscribe(collection.as_ref()).await.unwrap();
        let session = ChartSession::new(collection.clone(), &ChartConfig::default());
        (collection, feed, session)
    }

    /// Pull the next batch from the feed into the session
    async fn pump(feed: &mut ChangeFeed, session: &mut ChartSession, now: Instant) -> ChangeBatch {
        let batch = feed.next_batch().await.unwrap();
        session.apply_batch(&batch, now);
        batch
    }

    fn fraction(session: &ChartSession, id: &ExpenseId) -> f64 {
        session.renderer().slice(id).unwrap().datum.fraction()
    }

    #[tokio::test]
    async fn test_coffee_and_rent_lifecycle() {
        let (collection, mut feed, mut session) = setup().await;
        let t0 = Instant::now();
        pump(&mut feed, &mut session, t0).await;

        let coffee = collection.add(ExpenseFields::new("Coffee", 5.0)).await.unwrap();
        let rent = collection.add(ExpenseFields::new("Rent", 1000.0)).await.unwrap();
        pump(&mut feed, &mut session, t0).await;
        pump(&mut feed, &mut session, t0).await;

        let names: Vec<_> = session.mirror().records().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Coffee", "Rent"]);
        assert!((fraction(&session, &coffee) - 5.0 / 1005.0).abs() < 1e-12);

        // Modified in place
        let t1 = t0 + FULL;
        collection
            .update(&coffee, ExpenseFields::new("Coffee", 50.0))
            .await
            .unwrap();
        pump(&mut feed, &mut session, t1).await;
        assert_eq!(session.mirror().position(&coffee), Some(0));
        assert_eq!(session.mirror().records()[0].cost, 50.0);
        assert!((fraction(&session, &coffee) - 50.0 / 1050.0).abs() < 1e-12);

        // Removed: Rent collapses then leaves the display
        let t2 = t1 + FULL;
        collection.delete(&rent).await.unwrap();
        pump(&mut feed, &mut session, t2).await;
        assert_eq!(session.mirror().len(), 1);
        assert_eq!(
            session.renderer().slice(&rent).unwrap().phase,
            SlicePhase::Exiting
        );

        let snapshot = session.snapshot(t2 + FULL);
        let rent_shape = snapshot.frame.slices.iter().find(|s| s.id == rent).unwrap();
        assert_eq!(rent_shape.arc.span(), 0.0);

        session.renderer.tick(t2 + FULL);
        assert!(session.renderer().slice(&rent).is_none());
        let frame = session.renderer().frame(t2 + FULL);
        assert!((frame.live_span() - TAU).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_click_waits_for_feed_echo() {
        let (collection, mut feed, mut session) = setup().await;
        let t0 = Instant::now();
        pump(&mut feed, &mut session, t0).await;

        let coffee = collection.add(ExpenseFields::new("Coffee", 5.0)).await.unwrap();
        pump(&mut feed, &mut session, t0).await;

        let effects = session.handle_pointer(&coffee, &PointerEvent::click(1.0, 1.0), t0);
        assert_eq!(effects, vec![Effect::RequestDelete { id: coffee.clone() }]);

        // No optimistic removal
        assert_eq!(session.mirror().len(), 1);
        assert_eq!(
            session.renderer().slice(&coffee).unwrap().phase,
            SlicePhase::Entering
        );

        let batch = pump(&mut feed, &mut session, t0).await;
        assert_eq!(batch.count(ChangeKind::Removed), 1);
        assert!(session.mirror().is_empty());
        assert!(collection.is_empty().await);
    }

    #[tokio::test]
    async fn test_hover_highlights_and_restores() {
        let (collection, mut feed, mut session) = setup().await;
        let t0 = Instant::now();
        pump(&mut feed, &mut session, t0).await;
        let coffee = collection.add(ExpenseFields::new("Coffee", 5.0)).await.unwrap();
        pump(&mut feed, &mut session, t0).await;

        let effects = session.handle_pointer(&coffee, &PointerEvent::over(5.0, 6.0), t0);
        assert_eq!(effects.len(), 2);
        assert!(effects[1].is_tooltip());
        let element = session.renderer().slice(&coffee).unwrap();
        assert!(element.highlighted);
        assert_eq!(element.fill, crate::chart::Rgb::WHITE);

        session.handle_pointer(&coffee, &PointerEvent::out(5.0, 6.0), t0 + FULL);
        let element = session.renderer().slice(&coffee).unwrap();
        assert!(!element.highlighted);
        assert_eq!(element.fill, element.category);
    }

    #[tokio::test]
    async fn test_exiting_hover_hides_viewer_tooltip() {
        let (collection, mut feed, mut session) = setup().await;
        let t0 = Instant::now();
        pump(&mut feed, &mut session, t0).await;
        let coffee = collection.add(ExpenseFields::new("Coffee", 5.0)).await.unwrap();
        let rent = collection.add(ExpenseFields::new("Rent", 1000.0)).await.unwrap();
        pump(&mut feed, &mut session, t0).await;
        pump(&mut feed, &mut session, t0).await;

        session.handle_viewer_pointer("a", &coffee, &PointerEvent::over(1.0, 1.0), t0);
        session.handle_viewer_pointer("b", &rent, &PointerEvent::over(1.0, 1.0), t0);
        assert!(session.prune_hovers().is_empty());

        // Deleted by the click while still under the pointer
        collection.delete(&coffee).await.unwrap();
        pump(&mut feed, &mut session, t0 + FULL).await;
        assert_eq!(session.prune_hovers(), vec!["a".to_string()]);
        assert!(session.prune_hovers().is_empty());
    }

    #[tokio::test]
    async fn test_highlight_held_while_another_viewer_hovers() {
        let (collection, mut feed, mut session) = setup().await;
        let t0 = Instant::now();
        pump(&mut feed, &mut session, t0).await;
        let coffee = collection.add(ExpenseFields::new("Coffee", 5.0)).await.unwrap();
        pump(&mut feed, &mut session, t0).await;

        session.handle_viewer_pointer("a", &coffee, &PointerEvent::over(1.0, 1.0), t0);
        session.handle_viewer_pointer("b", &coffee, &PointerEvent::over(2.0, 2.0), t0);

        let effects = session.handle_viewer_pointer("a", &coffee, &PointerEvent::out(1.0, 1.0), t0);
        // The leaving viewer still gets its tooltip hidden
        assert!(effects.contains(&Effect::HideTooltip));
        assert!(session.renderer().slice(&coffee).unwrap().highlighted);

        session.handle_viewer_pointer("b", &coffee, &PointerEvent::out(2.0, 2.0), t0);
        assert!(!session.renderer().slice(&coffee).unwrap().highlighted);
    }

    #[tokio::test]
    async fn test_leaving_viewer_releases_highlight() {
        let (collection, mut feed, mut session) = setup().await;
        let t0 = Instant::now();
        pump(&mut feed, &mut session, t0).await;
        let coffee = collection.add(ExpenseFields::new("Coffee", 5.0)).await.unwrap();
        let rent = collection.add(ExpenseFields::new("Rent", 1000.0)).await.unwrap();
        pump(&mut feed, &mut session, t0).await;
        pump(&mut feed, &mut session, t0).await;

        // Moving straight onto another slice releases the first
        session.handle_viewer_pointer("a", &coffee, &PointerEvent::over(1.0, 1.0), t0);
        session.handle_viewer_pointer("a", &rent, &PointerEvent::over(1.0, 1.0), t0);
        assert!(!session.renderer().slice(&coffee).unwrap().highlighted);
        assert!(session.renderer().slice(&rent).unwrap().highlighted);

        session.leave_viewer("a", t0);
        assert!(!session.renderer().slice(&rent).unwrap().highlighted);
        assert!(session.renderer().is_animating());
    }

    #[tokio::test]
    async fn test_hit_test_in_canvas_coordinates() {
        let (collection, mut feed, mut session) = setup().await;
        let t0 = Instant::now();
        pump(&mut feed, &mut session, t0).await;
        let coffee = collection.add(ExpenseFields::new("Coffee", 5.0)).await.unwrap();
        pump(&mut feed, &mut session, t0).await;
        session.renderer.tick(t0 + FULL);

        // Center is (155, 155); 100px to the right sits on the ring
        assert_eq!(session.hit_test(255.0, 155.0, t0 + FULL), Some(coffee));
        assert_eq!(session.hit_test(155.0, 155.0, t0 + FULL), None);
    }

    #[tokio::test]
    async fn test_pointer_on_unknown_slice() {
        let (_collection, _feed, mut session) = setup().await;
        let effects = session.handle_pointer(
            &ExpenseId::new("ghost"),
            &PointerEvent::click(0.0, 0.0),
            Instant::now(),
        );
        assert!(effects.is_empty());
    }

    #[tokio::test]
    async fn test_click_on_exiting_slice_ignored() {
        let (collection, mut feed, mut session) = setup().await;
        let t0 = Instant::now();
        pump(&mut feed, &mut session, t0).await;
        let coffee = collection.add(ExpenseFields::new("Coffee", 5.0)).await.unwrap();
        pump(&mut feed, &mut session, t0).await;
        collection.delete(&coffee).await.unwrap();
        pump(&mut feed, &mut session, t0 + FULL).await;

        let effects = session.handle_pointer(&coffee, &PointerEvent::click(0.0, 0.0), t0 + FULL);
        assert!(effects.is_empty());
    }

    #[tokio::test]
    async fn test_spawned_session_serves_snapshots() {
        let collection = Arc::new(MemoryCollection::with_seed(vec![ExpenseFields::new("Rent", 1000.0)]).unwrap());
        let feed = ChangeFeed::subscribe(collection.as_ref()).await.unwrap();
        let (handle, task) = ChartSession::new(collection.clone(), &ChartConfig::default()).spawn(feed);

        let coffee = collection.add(ExpenseFields::new("Coffee", 5.0)).await.unwrap();

        let snapshot = tokio::time::timeout(Duration::from_secs(5), async {
            loop {
                let snapshot = handle.snapshot().await.unwrap();
                if snapshot.records.len() == 2 {
                    return snapshot;
                }
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .unwrap();

        assert_eq!(snapshot.records[0].name, "Rent");
        assert_eq!(snapshot.records[1].name, "Coffee");
        assert!(snapshot.svg.contains("Coffee"));

        let effects = handle.pointer(coffee, PointerEvent::moved(1.0, 2.0)).await.unwrap();
        assert_eq!(effects.len(), 1);

        handle.shutdown().await;
        task.await.unwrap();
        assert!(handle.snapshot().await.is_err());
    }

    #[tokio::test]
    async fn test_failed_delete_keeps_session_alive() {
        let collection = Arc::new(MemoryCollection::with_seed(vec![ExpenseFields::new("Rent", 1000.0)]).unwrap());
        let mut feed = ChangeFeed::subscribe(collection.as_ref()).await.unwrap();
        let mut session = ChartSession::new(collection.clone(), &ChartConfig::default());
        let t0 = Instant::now();
        pump(&mut feed, &mut session, t0).await;
        let rent = session.mirror().records()[0].id.clone();

        // Removed behind the chart's back before the click lands
        collection.delete(&rent).await.unwrap();
        session.handle_pointer(&rent, &PointerEvent::click(0.0, 0.0), t0);
        tokio::task::yield_now().await;

        // Only the external removal reaches the feed
        let batch = pump(&mut feed, &mut session, t0).await;
        assert_eq!(batch.count(ChangeKind::Removed), 1);
        assert!(session.mirror().is_empty());
    }

    #[tokio::test]
    async fn test_frames_pushed_to_hub() {
        let collection = Arc::new(MemoryCollection::new());
        let feed = ChangeFeed::subscribe(collection.as_ref()).await.unwrap();
        let hub = Arc::new(ConnectionHub::new(HubConfig::default()));
        let (tx, mut rx) = mpsc::unbounded_channel();
        hub.register(tx).await.unwrap();

        let (handle, task) = ChartSession::new(collection.clone(), &ChartConfig::default())
            .with_hub(Arc::clone(&hub))
            .spawn(feed);
        collection.add(ExpenseFields::new("Coffee", 5.0)).await.unwrap();

        let svg = tokio::time::timeout(Duration::from_secs(5), async {
            loop {
                if let Some(ServerMessage::Frame { svg }) = rx.recv().await {
                    if svg.contains("Coffee") {
                        return svg;
                    }
                }
            }
        })
        .await
        .unwrap();
        assert!(svg.contains("<path class=\"arc\""));

        handle.shutdown().await;
        task.await.unwrap();
    }
}
