//! Second-order dynamics solver.
//!
//! A spring-like system that chases a moving target, tuned with three designer
//! parameters instead of raw spring constants:
//!
//! - `frequency` (`f`, Hz) – how fast the system responds and the frequency it
//!   oscillates at when underdamped
//! - `damping` (`z`) – `0` never settles, `(0, 1)` overshoots then settles,
//!   `1` is critical damping, `> 1` settles slowly without overshoot
//! - `response` (`r`) – initial response to a change of target; negative
//!   values anticipate in the opposite direction, values above `1` overshoot
//!
//! The continuous system is
//!
//! ```text
//! y + k1·y' + k2·y'' = x + k3·x'
//! ```
//!
//! with `k1 = z / (π·f)`, `k2 = 1 / (2π·f)²` and `k3 = r·z / (2π·f)`.
//!
//! Each step integrates with semi-implicit Euler. When exact motion is not
//! required, or the step is small relative to the system (`ω·dt < z`), `k2` is
//! clamped so the explicit step cannot go unstable. Otherwise the step uses
//! pole matching: the coefficients are chosen so the discrete system has
//! exactly the poles of the continuous one.
//!
//! The recurrence is scalar; vector values are solved axis by axis.
//!
//! A step long enough for the system to settle many times over (such as a
//! fast-forward) skips the integration and rests the system on its target.

use arrayvec::ArrayVec;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

use crate::value::Value;

/// Decay time constants after which a single step snaps the system to rest
/// at its target.
pub const SETTLE_HORIZON: f64 = 50.0;

/// Radians of oscillation a single step may span before its phase is
/// meaningless. Bounds undamped systems, which never decay.
pub const MAX_RESOLVED_PHASE: f64 = 1.0e6;

/// Designer-facing tuning of a [`SecondOrderDynamics`] system.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DynamicsParams {
    /// Natural frequency in Hz. Must be positive.
    pub frequency: f64,
    /// Damping ratio. Must be non-negative.
    pub damping: f64,
    /// Initial response factor.
    pub response: f64,
    /// Use pole matching for fast systems instead of the clamped step.
    pub accurate: bool,
}

impl Default for DynamicsParams {
    fn default() -> Self {
        Self {
            frequency: 1.0,
            damping: 1.0,
            response: 0.0,
            accurate: true,
        }
    }
}

impl DynamicsParams {
    pub fn new(frequency: f64, damping: f64, response: f64) -> Self {
        Self {
            frequency,
            damping,
            response,
            accurate: true,
        }
    }

    pub fn with_accurate(mut self, accurate: bool) -> Self {
        self.accurate = accurate;
        self
    }
}

/// Constants derived from [`DynamicsParams`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DynamicsConstants {
    /// `ω = 2π·f`
    pub angular_frequency: f64,
    pub damping: f64,
    /// `ω·sqrt(|z² − 1|)`
    pub pole_range: f64,
    /// Velocity feedback.
    pub k1: f64,
    /// Acceleration feedback.
    pub k2: f64,
    /// Anticipation.
    pub k3: f64,
}

impl DynamicsConstants {
    /// # Panics
    ///
    /// Panics if `frequency <= 0` or `damping < 0`.
    pub fn from_params(params: &DynamicsParams) -> Self {
        assert!(
            params.frequency > 0.0,
            "dynamics frequency must be positive, got {}",
            params.frequency
        );
        assert!(
            params.damping >= 0.0,
            "dynamics damping must be non-negative, got {}",
            params.damping
        );
        let f = params.frequency;
        let z = params.damping;
        let w = 2.0 * PI * f;
        Self {
            angular_frequency: w,
            damping: z,
            pole_range: w * (z * z - 1.0).abs().sqrt(),
            k1: z / (PI * f),
            k2: 1.0 / (w * w),
            k3: params.response * z / w,
        }
    }

    /// Rate at which the slowest mode of the system decays, in 1/s.
    /// Zero for an undamped system.
    pub fn decay_rate(&self) -> f64 {
        let w = self.angular_frequency;
        let z = self.damping;
        if z < 1.0 {
            z * w
        } else {
            w / (z + (z * z - 1.0).sqrt())
        }
    }

    /// `true` if a step of `dt` seconds is too long to integrate and should
    /// rest the system on its target instead.
    pub fn settles_within(&self, dt: f64) -> bool {
        self.decay_rate() * dt >= SETTLE_HORIZON
            || self.angular_frequency * dt >= MAX_RESOLVED_PHASE
    }

    /// Effective `(k1, k2)` for a step of `dt` seconds.
    pub fn stable_gains(&self, dt: f64, accurate: bool) -> (f64, f64) {
        let w = self.angular_frequency;
        let z = self.damping;
        if !accurate || w * dt < z {
            let k2 = self
                .k2
                .max(dt * dt / 2.0 + dt * self.k1 / 2.0)
                .max(dt * self.k1);
            (self.k1, k2)
        } else {
            let pole = (-z * w * dt).exp();
            let trace = if z <= 1.0 {
                2.0 * pole * (self.pole_range * dt).cos()
            } else {
                // 2·pole·cosh(range·dt) as the sum of the two real poles.
                let s = (z * z - 1.0).sqrt();
                (-w * dt / (z + s)).exp() + (-(z + s) * w * dt).exp()
            };
            let det = pole * pole;
            let t = dt / (1.0 + det - trace);
            ((1.0 - det) * t, t * dt)
        }
    }
}

/// State of a second-order system following a target.
#[derive(Debug, Clone, PartialEq)]
pub struct SecondOrderDynamics {
    params: DynamicsParams,
    constants: DynamicsConstants,
    start: Value,
    position: Value,
    velocity: Value,
    previous_target: Value,
}

impl SecondOrderDynamics {
    /// A system at rest at `start`.
    pub fn new(params: DynamicsParams, start: impl Into<Value>) -> Self {
        let start = start.into();
        Self {
            constants: DynamicsConstants::from_params(&params),
            params,
            start,
            position: start,
            velocity: start.zero_like(),
            previous_target: start,
        }
    }

    pub fn params(&self) -> &DynamicsParams {
        &self.params
    }

    pub fn constants(&self) -> &DynamicsConstants {
        &self.constants
    }

    /// Retune the system without disturbing its state.
    pub fn set_params(&mut self, params: DynamicsParams) {
        self.constants = DynamicsConstants::from_params(&params);
        self.params = params;
    }

    pub fn start(&self) -> Value {
        self.start
    }

    pub fn position(&self) -> Value {
        self.position
    }

    pub fn velocity(&self) -> Value {
        self.velocity
    }

    /// Put the system back at rest at `start`.
    pub fn reset(&mut self, start: impl Into<Value>) {
        let start = start.into();
        self.start = start;
        self.position = start;
        self.velocity = start.zero_like();
        self.previous_target = start;
    }

    /// Advance by `dt` towards `target` and return the new position.
    ///
    /// Without `target_velocity` the velocity is estimated from the previous
    /// target. A zero `dt` leaves the state untouched. A step the system
    /// settles within (see [`DynamicsConstants::settles_within`]), or one that
    /// would leave the state non-finite, puts the system at rest on the target.
    ///
    /// # Panics
    ///
    /// Panics if `target` (or `target_velocity`) does not have the shape of
    /// the system.
    pub fn update(&mut self, dt: f64, target: Value, target_velocity: Option<Value>) -> Value {
        assert!(
            target.same_shape(&self.position),
            "dynamics target has {} components, system has {}",
            target.dimension(),
            self.position.dimension()
        );
        if dt <= 0.0 {
            self.previous_target = target;
            return self.position;
        }

        let target_velocity = match target_velocity {
            Some(v) => {
                assert!(
                    v.same_shape(&target),
                    "dynamics target velocity shape does not match target"
                );
                v
            }
            None => target.zip_with(&self.previous_target, |x, prev| (x - prev) / dt),
        };
        self.previous_target = target;

        if self.constants.settles_within(dt) {
            return self.snap_to(target);
        }

        let (k1, k2) = self.constants.stable_gains(dt, self.params.accurate);
        let k3 = self.constants.k3;

        let mut position: ArrayVec<f64, 4> = self.position.components();
        let mut velocity: ArrayVec<f64, 4> = self.velocity.components();
        let x = target.components();
        let xd = target_velocity.components();
        for axis in 0..position.len() {
            position[axis] += velocity[axis] * dt;
            velocity[axis] +=
                (x[axis] + k3 * xd[axis] - position[axis] - k1 * velocity[axis]) * dt / k2;
        }
        if position.iter().chain(velocity.iter()).any(|c| !c.is_finite()) {
            return self.snap_to(target);
        }
        self.position = self.position.with_components(&position);
        self.velocity = self.velocity.with_components(&velocity);
        self.position
    }

    /// Put the system at rest on `target` and return it.
    fn snap_to(&mut self, target: Value) -> Value {
        self.position = target;
        self.velocity = target.zero_like();
        self.position
    }

    /// `true` when position and velocity are both within `tolerance` of rest
    /// at `target`.
    pub fn is_settled(&self, target: &Value, tolerance: f64) -> bool {
        self.position.distance_max(target) <= tolerance
            && self.velocity.distance_max(&self.velocity.zero_like()) <= tolerance
    }
}
