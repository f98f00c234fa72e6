//! Eased interpolation of a value reference.
//!
//! An [`Interpolator`] drives a [`ValueRef`] from `start` to `end` over a
//! fixed duration. Reversing the owning list plays the tween backwards
//! towards `start`.

use super::{Action, ActionContext, Span};
use crate::value::{Value, ValueRef};

/// Easing functions for smooth interpolation.
///
/// These functions transform a linear `t` value (0.0 to 1.0) to create
/// different acceleration/deceleration curves.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Easing {
    /// Constant speed (no easing).
    #[default]
    Linear,
    /// Starts slow, accelerates (quadratic).
    QuadIn,
    /// Starts fast, decelerates (quadratic).
    QuadOut,
    /// Slow start and end (quadratic).
    QuadInOut,
    /// Starts slow, accelerates (cubic).
    CubicIn,
    /// Starts fast, decelerates (cubic).
    CubicOut,
    /// Slow start and end (cubic).
    CubicInOut,
}

/// Apply an easing function to a normalized time value.
///
/// The input `t` is clamped to [0.0, 1.0] and transformed according to the
/// easing curve.
pub fn ease(e: Easing, t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    match e {
        Easing::Linear => t,
        Easing::QuadIn => t * t,
        Easing::QuadOut => t * (2.0 - t),
        Easing::QuadInOut => {
            if t < 0.5 {
                2.0 * t * t
            } else {
                -1.0 + (4.0 - 2.0 * t) * t
            }
        }
        Easing::CubicIn => t * t * t,
        Easing::CubicOut => {
            let p = t - 1.0;
            p * p * p + 1.0
        }
        Easing::CubicInOut => {
            if t < 0.5 {
                4.0 * t * t * t
            } else {
                let p = 2.0 * t - 2.0;
                0.5 * p * p * p + 1.0
            }
        }
    }
}

/// Tween of a [`ValueRef`] between two values.
#[derive(Debug)]
pub struct Interpolator {
    target: ValueRef,
    /// `None` captures the target's value on enter.
    start: Option<Value>,
    end: Value,
    seconds: f64,
    easing: Easing,
}

impl Interpolator {
    /// Tween from the target's current value to `end`.
    pub fn to(target: ValueRef, end: impl Into<Value>, seconds: f64) -> Self {
        Self {
            target,
            start: None,
            end: end.into(),
            seconds,
            easing: Easing::Linear,
        }
    }

    /// Tween from `start` to `end`.
    pub fn between(
        target: ValueRef,
        start: impl Into<Value>,
        end: impl Into<Value>,
        seconds: f64,
    ) -> Self {
        Self {
            start: Some(start.into()),
            ..Self::to(target, end, seconds)
        }
    }

    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }
}

impl Action for Interpolator {
    fn span(&self) -> Span {
        Span::seconds(self.seconds)
    }

    fn enter(&mut self, _ctx: &mut ActionContext<'_>) {
        if self.start.is_none() {
            self.start = Some(self.target.read());
        }
    }

    fn update(&mut self, progress: f64, _ctx: &mut ActionContext<'_>) {
        let start = self.start.unwrap_or(self.end);
        self.target
            .write(start.lerp(&self.end, ease(self.easing, progress)));
    }

    fn label(&self) -> &str {
        "interpolator"
    }
}
