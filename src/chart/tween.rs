//! Timed interpolation between two values

use std::time::{Duration, Instant};

/// Values that can be blended linearly
pub trait Lerp: Sized {
    /// Blend towards `to`, `t` in `[0, 1]`
    fn lerp(&self, to: &Self, t: f64) -> Self;
}

impl Lerp for f64 {
    fn lerp(&self, to: &Self, t: f64) -> Self {
        self + (to - self) * t
    }
}

/// Easing curve applied to transition progress
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Easing {
    Linear,
    /// Symmetric cubic, the default for chart transitions
    #[default]
    CubicInOut,
}

impl Easing {
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::CubicInOut => {
                let t = t * 2.0;
                if t <= 1.0 {
                    t * t * t / 2.0
                } else {
                    let t = t - 2.0;
                    (t * t * t + 2.0) / 2.0
                }
            }
        }
    }
}

/// A running transition from one value to another
#[derive(Debug, Clone, PartialEq)]
pub struct Tween<T> {
    pub from: T,
    pub to: T,
    pub started: Instant,
    pub duration: Duration,
    pub easing: Easing,
}

impl<T: Lerp + Clone> Tween<T> {
    pub fn new(from: T, to: T, started: Instant, duration: Duration) -> Self {
        Self {
            from,
            to,
            started,
            duration,
            easing: Easing::default(),
        }
    }

    /// Builder method: set the easing curve
    pub fn easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    /// Raw progress in `[0, 1]`
    pub fn progress(&self, now: Instant) -> f64 {
        if self.duration.is_zero() {
            return 1.0;
        }
        let elapsed = now.saturating_duration_since(self.started);
        (elapsed.as_secs_f64() / self.duration.as_secs_f64()).min(1.0)
    }

    pub fn is_finished(&self, now: Instant) -> bool {
        self.progress(now) >= 1.0
    }

    /// Value at `now`
    pub fn sample(&self, now: Instant) -> T {
        let t = self.progress(now);
        if t >= 1.0 {
            return self.to.clone();
        }
        self.from.lerp(&self.to, self.easing.apply(t))
    }
}
