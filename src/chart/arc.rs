//! Arc geometry
//!
//! Angles are in radians, measured clockwise from 12 o'clock, matching the
//! SVG coordinate system where y grows downward.

use serde::{Deserialize, Serialize};
use std::f64::consts::{PI, TAU};
use std::fmt::Write as _;

use super::tween::Lerp;

/// Spans closer than this to a full turn are drawn as a complete ring
const FULL_TURN_EPSILON: f64 = 1e-6;

/// The interpolatable part of a slice: its angular extent
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArcState {
    pub start_angle: f64,
    pub end_angle: f64,
}

impl ArcState {
    pub fn new(start_angle: f64, end_angle: f64) -> Self {
        Self {
            start_angle,
            end_angle,
        }
    }

    /// Zero-width arc anchored at `angle`
    pub fn collapsed_at(angle: f64) -> Self {
        Self::new(angle, angle)
    }

    pub fn span(&self) -> f64 {
        self.end_angle - self.start_angle
    }

    /// Whether `angle` (normalized to `[0, 2π)`) falls inside this arc
    pub fn contains(&self, angle: f64) -> bool {
        self.span() > 0.0 && angle >= self.start_angle && angle < self.end_angle
    }
}

impl Lerp for ArcState {
    fn lerp(&self, to: &Self, t: f64) -> Self {
        ArcState::new(
            self.start_angle.lerp(&to.start_angle, t),
            self.end_angle.lerp(&to.end_angle, t),
        )
    }
}

/// Point on a circle of radius `r` at `angle`
fn polar(r: f64, angle: f64) -> (f64, f64) {
    (r * angle.sin(), -r * angle.cos())
}

/// Angle of the point `(x, y)` relative to the center, in `[0, 2π)`
pub fn angle_of(x: f64, y: f64) -> f64 {
    let a = x.atan2(-y);
    if a < 0.0 {
        a + TAU
    } else {
        a
    }
}

/// SVG path data for an annular sector
///
/// A zero-width arc still produces a valid (degenerate) path so entering and
/// exiting slices can be drawn at every frame.
pub fn arc_path(arc: &ArcState, outer: f64, inner: f64) -> String {
    let span = arc.span().abs();
    let mut d = String::new();

    if span >= TAU - FULL_TURN_EPSILON {
        // A single SVG arc command cannot draw a full circle: use two halves
        let _ = write!(
            d,
            "M0,{o0}A{o},{o},0,1,1,0,{o1}A{o},{o},0,1,1,0,{o0}",
            o = fmt(outer),
            o0 = fmt(-outer),
            o1 = fmt(outer),
        );
        if inner > 0.0 {
            let _ = write!(
                d,
                "M0,{i0}A{i},{i},0,1,0,0,{i1}A{i},{i},0,1,0,0,{i0}",
                i = fmt(inner),
                i0 = fmt(-inner),
                i1 = fmt(inner),
            );
        }
        d.push('Z');
        return d;
    }

    let large = if span > PI { 1 } else { 0 };
    let (ox0, oy0) = polar(outer, arc.start_angle);
    let (ox1, oy1) = polar(outer, arc.end_angle);
    let _ = write!(
        d,
        "M{},{}A{r},{r},0,{large},1,{},{}",
        fmt(ox0),
        fmt(oy0),
        fmt(ox1),
        fmt(oy1),
        r = fmt(outer),
    );

    if inner > 0.0 {
        let (ix1, iy1) = polar(inner, arc.end_angle);
        let (ix0, iy0) = polar(inner, arc.start_angle);
        let _ = write!(
            d,
            "L{},{}A{r},{r},0,{large},0,{},{}",
            fmt(ix1),
            fmt(iy1),
            fmt(ix0),
            fmt(iy0),
            r = fmt(inner),
        );
    } else {
        d.push_str("L0,0");
    }
    d.push('Z');
    d
}

/// Compact coordinate formatting, three decimals without trailing zeros
fn fmt(v: f64) -> String {
    let v = (v * 1000.0).round() / 1000.0;
    // Avoid "-0"
    let v = if v == 0.0 { 0.0 } else { v };
    format!("{}", v)
}
