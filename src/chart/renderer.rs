//! Chart Renderer
//!
//! Owns the displayed slices and animates them between successive mirror
//! snapshots. Each displayed slice carries its own last-known arc, so a new
//! render cycle always starts interpolating from what is actually on screen,
//! even when the previous transition has not finished yet.

use serde::Serialize;
use std::collections::HashMap;
use std::time::{Duration, Instant};

use super::arc::{angle_of, ArcState};
use super::color::{OrdinalScale, Rgb};
use super::layout::{pie_layout, PieSlice};
use super::reconcile::join;
use super::tween::Tween;
use crate::legend::{legend_entries, LegendEntry};
use crate::store::{Expense, ExpenseId};

/// Renderer settings
#[derive(Debug, Clone)]
pub struct RenderSettings {
    /// Shape transition duration for enter, update and exit
    pub transition: Duration,
    pub outer_radius: f64,
    pub inner_radius: f64,
    /// Category color range
    pub scheme: Vec<Rgb>,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            transition: Duration::from_millis(750),
            outer_radius: 150.0,
            inner_radius: 75.0,
            scheme: OrdinalScale::set3().range().to_vec(),
        }
    }
}

/// Reconciliation state of a displayed slice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SlicePhase {
    Entering,
    Updating,
    Exiting,
    Idle,
}

/// A slice on display
#[derive(Debug, Clone)]
pub struct SliceElement {
    /// Datum bound by the most recent render cycle
    pub datum: PieSlice,
    /// Last-known displayed arc, captured whenever a transition starts or settles
    pub current: ArcState,
    shape: Option<Tween<ArcState>>,
    /// Target fill
    pub fill: Rgb,
    fill_tween: Option<Tween<Rgb>>,
    /// Category color at the last bind
    pub category: Rgb,
    pub phase: SlicePhase,
    pub highlighted: bool,
}

impl SliceElement {
    pub fn id(&self) -> &ExpenseId {
        self.datum.id()
    }

    pub fn arc_at(&self, now: Instant) -> ArcState {
        self.shape
            .as_ref()
            .map(|t| t.sample(now))
            .unwrap_or(self.current)
    }

    pub fn fill_at(&self, now: Instant) -> Rgb {
        self.fill_tween
            .as_ref()
            .map(|t| t.sample(now))
            .unwrap_or(self.fill)
    }

    pub fn is_animating(&self) -> bool {
        self.shape.is_some() || self.fill_tween.is_some()
    }

    /// Start a shape transition from the arc on screen right now
    fn transition_to(&mut self, target: ArcState, now: Instant, duration: Duration) {
        self.current = self.arc_at(now);
        self.shape = Some(Tween::new(self.current, target, now, duration));
    }

    fn fade_to(&mut self, color: Rgb, now: Instant, duration: Duration) {
        let from = self.fill_at(now);
        self.fill = color;
        self.fill_tween = Some(Tween::new(from, color, now, duration));
    }

    /// Settle finished transitions; returns true once an exit has completed
    fn settle(&mut self, now: Instant) -> bool {
        if let Some(shape) = self.shape.as_ref().filter(|t| t.is_finished(now)) {
            self.current = shape.to;
            self.shape = None;
            if self.phase == SlicePhase::Exiting {
                return true;
            }
            self.phase = SlicePhase::Idle;
        }
        if self.fill_tween.as_ref().is_some_and(|t| t.is_finished(now)) {
            self.fill_tween = None;
        }
        false
    }
}

/// Counts from one render cycle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RenderSummary {
    pub cycle: u64,
    pub entered: usize,
    pub updated: usize,
    pub exited: usize,
}

/// One drawable slice sampled at a point in time
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SliceShape {
    pub id: ExpenseId,
    pub name: String,
    pub cost: f64,
    pub arc: ArcState,
    pub fill: Rgb,
    pub exiting: bool,
}

/// Everything needed to draw the chart at one instant
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Frame {
    /// Slices in paint order
    pub slices: Vec<SliceShape>,
    pub legend: Vec<LegendEntry>,
    pub outer_radius: f64,
    pub inner_radius: f64,
}

impl Frame {
    /// Slice under a point given relative to the chart center
    ///
    /// Live slices win over exiting ones; among equals the last painted wins.
    pub fn slice_at(&self, x: f64, y: f64) -> Option<&SliceShape> {
        let r = x.hypot(y);
        if r < self.inner_radius || r > self.outer_radius {
            return None;
        }
        let angle = angle_of(x, y);
        let hits = || self.slices.iter().rev().filter(move |s| s.arc.contains(angle));
        hits().find(|s| !s.exiting).or_else(|| hits().next())
    }

    /// Sum of the spans of slices that are not exiting
    pub fn live_span(&self) -> f64 {
        self.slices
            .iter()
            .filter(|s| !s.exiting)
            .map(|s| s.arc.span())
            .sum()
    }
}

/// Animated pie chart state
pub struct ChartRenderer {
    settings: RenderSettings,
    colors: OrdinalScale,
    /// Displayed slices in paint order
    elements: Vec<SliceElement>,
    cycles: u64,
}

impl ChartRenderer {
    pub fn new(settings: RenderSettings) -> Self {
        let colors = OrdinalScale::new(settings.scheme.clone());
        Self {
            settings,
            colors,
            elements: Vec::new(),
            cycles: 0,
        }
    }

    /// Run one render cycle against a mirror snapshot
    pub fn render(&mut self, records: &[Expense], now: Instant) -> RenderSummary {
        let duration = self.settings.transition;
        self.colors.set_domain(records.iter().map(|e| e.name.clone()));

        let plan = join(self.elements.iter().map(|e| e.id()), pie_layout(records));
        let positions: HashMap<ExpenseId, usize> = self
            .elements
            .iter()
            .enumerate()
            .map(|(i, e)| (e.id().clone(), i))
            .collect();

        let mut summary = RenderSummary {
            cycle: self.cycles + 1,
            entered: plan.enter.len(),
            updated: plan.update.len(),
            exited: 0,
        };

        for id in &plan.exit {
            let Some(&i) = positions.get(id) else { continue };
            let element = &mut self.elements[i];
            // An exit already under way keeps its own clock
            if element.phase != SlicePhase::Exiting {
                let end = element.arc_at(now).end_angle;
                element.transition_to(ArcState::collapsed_at(end), now, duration);
                element.phase = SlicePhase::Exiting;
                summary.exited += 1;
            }
        }

        for slice in plan.update {
            let Some(&i) = positions.get(slice.id()) else { continue };
            let category = self.colors.color(&slice.expense.name);
            let element = &mut self.elements[i];

            element.transition_to(slice.arc(), now, duration);
            element.phase = SlicePhase::Updating;
            element.category = category;
            if !element.highlighted && element.fill != category {
                element.fade_to(category, now, duration);
            }
            element.datum = slice;
        }

        for slice in plan.enter {
            let category = self.colors.color(&slice.expense.name);
            let anchor = ArcState::collapsed_at(slice.end_angle);
            self.elements.push(SliceElement {
                current: anchor,
                shape: Some(Tween::new(anchor, slice.arc(), now, duration)),
                fill: category,
                fill_tween: None,
                category,
                phase: SlicePhase::Entering,
                highlighted: false,
                datum: slice,
            });
        }

        self.cycles += 1;

        tracing::debug!(
            cycle = summary.cycle,
            entered = summary.entered,
            updated = summary.updated,
            exited = summary.exited,
            "Render cycle"
        );

        summary
    }

    /// Advance to `now`: settle finished transitions and drop finished exits
    ///
    /// Returns whether anything is still animating.
    pub fn tick(&mut self, now: Instant) -> bool {
        self.elements.retain_mut(|e| !e.settle(now));
        self.is_animating()
    }

    pub fn is_animating(&self) -> bool {
        self.elements.iter().any(SliceElement::is_animating)
    }

    /// Animate a slice's fill to a highlight color
    pub fn highlight(&mut self, id: &ExpenseId, color: Rgb, duration: Duration, now: Instant) -> bool {
        self.fade(id, color, duration, now, true)
    }

    /// Animate a slice's fill back to a category color
    pub fn restore(&mut self, id: &ExpenseId, color: Rgb, duration: Duration, now: Instant) -> bool {
        self.fade(id, color, duration, now, false)
    }

    fn fade(&mut self, id: &ExpenseId, color: Rgb, duration: Duration, now: Instant, highlighted: bool) -> bool {
        match self.elements.iter_mut().find(|e| e.id() == id) {
            Some(element) => {
                element.highlighted = highlighted;
                element.fade_to(color, now, duration);
                true
            }
            None => false,
        }
    }

    /// Sample every displayed slice at `now`
    pub fn frame(&self, now: Instant) -> Frame {
        Frame {
            slices: self
                .elements
                .iter()
                .map(|e| SliceShape {
                    id: e.id().clone(),
                    name: e.datum.expense.name.clone(),
                    cost: e.datum.expense.cost,
                    arc: e.arc_at(now),
                    fill: e.fill_at(now),
                    exiting: e.phase == SlicePhase::Exiting,
                })
                .collect(),
            legend: legend_entries(&self.colors),
            outer_radius: self.settings.outer_radius,
            inner_radius: self.settings.inner_radius,
        }
    }

    pub fn slice(&self, id: &ExpenseId) -> Option<&SliceElement> {
        self.elements.iter().find(|e| e.id() == id)
    }

    pub fn elements(&self) -> &[SliceElement] {
        &self.elements
    }

    /// Current category color for a name, falling back to a slice's last bind
    pub fn category_color(&self, id: &ExpenseId) -> Option<Rgb> {
        let element = self.slice(id)?;
        Some(
            self.colors
                .lookup(&element.datum.expense.name)
                .unwrap_or(element.category),
        )
    }

    pub fn colors(&self) -> &OrdinalScale {
        &self.colors
    }

    pub fn settings(&self) -> &RenderSettings {
        &self.settings
    }

    /// Number of render cycles run so far
    pub fn cycles(&self) -> u64 {
        self.cycles
    }
}

impl Default for ChartRenderer {
    fn default() -> Self {
        Self::new(RenderSettings::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::TAU;

    const HALF: Duration = Duration::from_millis(375);
    const FULL: Duration = Duration::from_millis(750);

    fn coffee(cost: f64) -> Expense {
        Expense::new("1", "Coffee", cost)
    }

    fn rent() -> Expense {
        Expense::new("2", "Rent", 1000.0)
    }

    fn id(s: &str) -> ExpenseId {
        ExpenseId::new(s)
    }

    #[test]
    fn test_enter_grows_from_end_angle() {
        let mut renderer = ChartRenderer::default();
        let t0 = Instant::now();
        let summary = renderer.render(&[coffee(5.0), rent()], t0);
        assert_eq!(summary.entered, 2);
        assert_eq!(summary.cycle, 1);

        let target = renderer.slice(&id("1")).unwrap().datum.arc();
        let start = renderer.slice(&id("1")).unwrap().arc_at(t0);
        assert_eq!(start, ArcState::collapsed_at(target.end_angle));

        let mid = renderer.slice(&id("1")).unwrap().arc_at(t0 + HALF);
        assert_eq!(mid.end_angle, target.end_angle);
        assert!(mid.start_angle < target.end_angle && mid.start_angle > target.start_angle);

        assert_eq!(renderer.slice(&id("1")).unwrap().arc_at(t0 + FULL), target);
        assert!(!renderer.tick(t0 + FULL));
        assert_eq!(renderer.slice(&id("1")).unwrap().phase, SlicePhase::Idle);
    }

    #[test]
    fn test_settled_frame_covers_full_turn() {
        let mut renderer = ChartRenderer::default();
        let t0 = Instant::now();
        renderer.render(&[coffee(5.0), rent()], t0);
        renderer.tick(t0 + FULL);

        let frame = renderer.frame(t0 + FULL);
        assert!((frame.live_span() - TAU).abs() < 1e-9);
        let coffee_span = frame.slices[0].arc.span();
        assert!((coffee_span / TAU - 5.0 / 1005.0).abs() < 1e-12);
    }

    #[test]
    fn test_update_interpolates_to_new_span() {
        let mut renderer = ChartRenderer::default();
        let t0 = Instant::now();
        renderer.render(&[coffee(5.0), rent()], t0);
        renderer.tick(t0 + FULL);

        let t1 = t0 + FULL;
        let summary = renderer.render(&[coffee(50.0), rent()], t1);
        assert_eq!(summary.updated, 2);
        assert_eq!(summary.entered, 0);

        let before = (5.0 / 1005.0) * TAU;
        let after = (50.0 / 1050.0) * TAU;
        let element = renderer.slice(&id("1")).unwrap();
        assert!((element.arc_at(t1).span() - before).abs() < 1e-9);
        let mid = element.arc_at(t1 + HALF).span();
        assert!(mid > before && mid < after);
        assert!((element.arc_at(t1 + FULL).span() - after).abs() < 1e-9);
    }

    #[test]
    fn test_superseded_transition_starts_from_screen_state() {
        let mut renderer = ChartRenderer::default();
        let t0 = Instant::now();
        renderer.render(&[coffee(5.0), rent()], t0);

        // Halfway through the entrance, a new cycle arrives
        let t1 = t0 + HALF;
        let on_screen = renderer.slice(&id("2")).unwrap().arc_at(t1);
        renderer.render(&[coffee(50.0), rent()], t1);

        let element = renderer.slice(&id("2")).unwrap();
        assert_eq!(element.current, on_screen);
        assert_eq!(element.arc_at(t1), on_screen);
        assert_eq!(element.phase, SlicePhase::Updating);
    }

    #[test]
    fn test_exit_counted_once() {
        let mut renderer = ChartRenderer::default();
        let t0 = Instant::now();
        renderer.render(&[coffee(5.0), rent()], t0);
        assert_eq!(renderer.render(&[coffee(5.0)], t0 + HALF).exited, 1);

        // Rent is still collapsing; this cycle removes nothing new
        let summary = renderer.render(&[coffee(6.0)], t0 + HALF + HALF / 2);
        assert_eq!(
            summary,
            RenderSummary {
                cycle: 3,
                entered: 0,
                updated: 1,
                exited: 0,
            }
        );
        assert_eq!(renderer.slice(&id("2")).unwrap().phase, SlicePhase::Exiting);
    }

    #[test]
    fn test_exit_collapses_then_removes() {
        let mut renderer = ChartRenderer::default();
        let t0 = Instant::now();
        renderer.render(&[coffee(50.0), rent()], t0);
        renderer.tick(t0 + FULL);

        let t1 = t0 + FULL;
        let summary = renderer.render(&[coffee(50.0)], t1);
        assert_eq!(summary.exited, 1);

        let exiting = renderer.slice(&id("2")).unwrap();
        assert_eq!(exiting.phase, SlicePhase::Exiting);
        let end = exiting.arc_at(t1).end_angle;
        let mid = exiting.arc_at(t1 + HALF);
        assert_eq!(mid.end_angle, end);
        assert!(mid.span() > 0.0);
        assert_eq!(exiting.arc_at(t1 + FULL).span(), 0.0);

        // Still drawn until the exit finishes
        assert!(renderer.tick(t1 + HALF));
        assert_eq!(renderer.elements().len(), 2);
        renderer.tick(t1 + FULL);
        assert!(renderer.slice(&id("2")).is_none());
        assert_eq!(renderer.elements().len(), 1);
    }

    #[test]
    fn test_reappearing_record_revives_exiting_slice() {
        let mut renderer = ChartRenderer::default();
        let t0 = Instant::now();
        renderer.render(&[coffee(5.0), rent()], t0);
        renderer.tick(t0 + FULL);

        let t1 = t0 + FULL;
        renderer.render(&[coffee(5.0)], t1);
        let summary = renderer.render(&[coffee(5.0), rent()], t1 + HALF);

        assert_eq!(summary.updated, 2);
        assert_eq!(summary.entered, 0);
        assert_eq!(renderer.slice(&id("2")).unwrap().phase, SlicePhase::Updating);
        renderer.tick(t1 + HALF + FULL);
        assert!(renderer.slice(&id("2")).is_some());
    }

    #[test]
    fn test_repeated_removal_keeps_exit_clock() {
        let mut renderer = ChartRenderer::default();
        let t0 = Instant::now();
        renderer.render(&[coffee(5.0), rent()], t0);
        renderer.tick(t0 + FULL);

        let t1 = t0 + FULL;
        renderer.render(&[coffee(5.0)], t1);
        renderer.render(&[coffee(6.0)], t1 + HALF);
        renderer.tick(t1 + FULL);
        assert!(renderer.slice(&id("2")).is_none());
    }

    #[test]
    fn test_highlight_does_not_interrupt_entrance() {
        let mut renderer = ChartRenderer::default();
        let t0 = Instant::now();
        renderer.render(&[coffee(5.0)], t0);

        let t1 = t0 + Duration::from_millis(100);
        assert!(renderer.highlight(&id("1"), Rgb::WHITE, Duration::from_millis(300), t1));

        let element = renderer.slice(&id("1")).unwrap();
        assert_eq!(element.phase, SlicePhase::Entering);
        assert_eq!(element.fill_at(t1 + Duration::from_millis(300)), Rgb::WHITE);
        assert!((element.arc_at(t0 + FULL).span() - TAU).abs() < 1e-9);
    }

    #[test]
    fn test_highlighted_slice_keeps_highlight_through_update() {
        let mut renderer = ChartRenderer::default();
        let t0 = Instant::now();
        renderer.render(&[coffee(5.0), rent()], t0);
        renderer.highlight(&id("1"), Rgb::WHITE, Duration::from_millis(300), t0);
        renderer.render(&[coffee(50.0), rent()], t0 + HALF);

        let element = renderer.slice(&id("1")).unwrap();
        assert!(element.highlighted);
        assert_eq!(element.fill, Rgb::WHITE);

        let category = renderer.category_color(&id("1")).unwrap();
        renderer.restore(&id("1"), category, Duration::from_millis(300), t0 + FULL);
        let element = renderer.slice(&id("1")).unwrap();
        assert_eq!(element.fill_at(t0 + FULL + FULL), category);
        assert!(!element.highlighted);
    }

    #[test]
    fn test_fade_unknown_slice() {
        let mut renderer = ChartRenderer::default();
        assert!(!renderer.highlight(&id("9"), Rgb::WHITE, FULL, Instant::now()));
    }

    #[test]
    fn test_frame_hit_testing() {
        let mut renderer = ChartRenderer::default();
        let t0 = Instant::now();
        renderer.render(&[Expense::new("a", "A", 1.0), Expense::new("b", "B", 1.0)], t0);
        renderer.tick(t0 + FULL);
        let frame = renderer.frame(t0 + FULL);

        // Right half is "a" (clockwise from 12 o'clock), left half is "b"
        assert_eq!(frame.slice_at(100.0, 0.0).unwrap().id, id("a"));
        assert_eq!(frame.slice_at(-100.0, 0.0).unwrap().id, id("b"));
        // Inside the hole and outside the ring
        assert!(frame.slice_at(10.0, 0.0).is_none());
        assert!(frame.slice_at(200.0, 0.0).is_none());
    }

    #[test]
    fn test_frame_legend_follows_domain() {
        let mut renderer = ChartRenderer::default();
        let t0 = Instant::now();
        renderer.render(&[coffee(5.0), rent()], t0);
        let names: Vec<_> = renderer
            .frame(t0)
            .legend
            .into_iter()
            .map(|e| e.name)
            .collect();
        assert_eq!(names, vec!["Coffee", "Rent"]);
    }
}
