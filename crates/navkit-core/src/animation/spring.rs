#![forbid(unsafe_code)]

//! Damped spring used to drive transition progress.
//!
//! The spring integrates
//!
//!   a = -stiffness × (position - target) - damping × velocity
//!
//! with semi-implicit Euler. Navigation transitions use it on the normalized
//! 0.0 → 1.0 progress, critically damped so screens glide in without bouncing
//! past their resting place.
//!
//! # Invariants
//!
//! 1. Stiffness is at least [`MIN_STIFFNESS`]; damping is non-negative.
//! 2. Once at rest, the position equals the target exactly and the spring
//!    stays at rest until [`Animation::reset`] wakes it.
//! 3. A tick of any length is subdivided into steps of at most 4ms.
//!
//! # Failure Modes
//!
//! - Zero damping: the spring oscillates forever and never reports complete.
//!   The engine tolerates this (completion is by convergence) but the host
//!   loop will keep ticking.

use std::time::Duration;

use super::Animation;

/// Maximum integration step.
const MAX_STEP_SECS: f64 = 0.004;

/// Position delta below which the spring may come to rest.
const DEFAULT_REST_THRESHOLD: f64 = 0.001;

/// Velocity below which the spring may come to rest.
const DEFAULT_VELOCITY_THRESHOLD: f64 = 0.01;

/// Lower bound on stiffness.
pub const MIN_STIFFNESS: f64 = 0.1;

/// A damped harmonic oscillator.
#[derive(Debug, Clone)]
pub struct Spring {
    position: f64,
    velocity: f64,
    target: f64,
    initial: f64,
    stiffness: f64,
    damping: f64,
    rest_threshold: f64,
    velocity_threshold: f64,
    at_rest: bool,
}

impl Spring {
    /// Spring from `initial` toward `target`, stiffness 170 and damping 26.
    #[must_use]
    pub fn new(initial: f64, target: f64) -> Self {
        Self {
            position: initial,
            velocity: 0.0,
            target,
            initial,
            stiffness: 170.0,
            damping: 26.0,
            rest_threshold: DEFAULT_REST_THRESHOLD,
            velocity_threshold: DEFAULT_VELOCITY_THRESHOLD,
            at_rest: false,
        }
    }

    /// Spring from 0.0 to 1.0.
    #[must_use]
    pub fn normalized() -> Self {
        Self::new(0.0, 1.0)
    }

    /// Set stiffness (builder pattern).
    #[must_use]
    pub fn with_stiffness(mut self, k: f64) -> Self {
        self.stiffness = if k.is_finite() {
            k.max(MIN_STIFFNESS)
        } else {
            MIN_STIFFNESS
        };
        self
    }

    /// Set damping (builder pattern).
    #[must_use]
    pub fn with_damping(mut self, c: f64) -> Self {
        self.damping = if c.is_finite() { c.max(0.0) } else { 0.0 };
        self
    }

    /// Current (unclamped) position.
    #[inline]
    #[must_use]
    pub fn position(&self) -> f64 {
        self.position
    }

    /// Current velocity.
    #[inline]
    #[must_use]
    pub fn velocity(&self) -> f64 {
        self.velocity
    }

    /// Current target.
    #[inline]
    #[must_use]
    pub fn target(&self) -> f64 {
        self.target
    }

    /// Stiffness parameter.
    #[inline]
    #[must_use]
    pub fn stiffness(&self) -> f64 {
        self.stiffness
    }

    /// Damping parameter.
    #[inline]
    #[must_use]
    pub fn damping(&self) -> f64 {
        self.damping
    }

    /// Damping at which this spring is critically damped.
    #[must_use]
    pub fn critical_damping(&self) -> f64 {
        2.0 * self.stiffness.sqrt()
    }

    fn step(&mut self, dt: f64) {
        let displacement = self.position - self.target;
        let acceleration = -self.stiffness * displacement - self.damping * self.velocity;
        self.velocity += acceleration * dt;
        self.position += self.velocity * dt;
    }

    fn advance(&mut self, dt: Duration) {
        if self.at_rest {
            return;
        }
        let mut remaining = dt.as_secs_f64();
        while remaining > 0.0 {
            let step_dt = remaining.min(MAX_STEP_SECS);
            self.step(step_dt);
            remaining -= step_dt;
        }
        if (self.position - self.target).abs() < self.rest_threshold
            && self.velocity.abs() < self.velocity_threshold
        {
            self.position = self.target;
            self.velocity = 0.0;
            self.at_rest = true;
        }
    }
}

impl Animation for Spring {
    fn tick(&mut self, dt: Duration) {
        self.advance(dt);
    }

    fn is_complete(&self) -> bool {
        self.at_rest
    }

    /// Position clamped to [0.0, 1.0].
    fn value(&self) -> f64 {
        self.position.clamp(0.0, 1.0)
    }

    fn reset(&mut self) {
        self.position = self.initial;
        self.velocity = 0.0;
        self.at_rest = false;
    }
}
