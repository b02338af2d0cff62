#![forbid(unsafe_code)]

//! Animation primitives used to drive transition progress.
//!
//! Everything here is time-driven and host-agnostic: the host's frame loop
//! calls [`Animation::tick`] with the elapsed [`Duration`] and reads back a
//! normalized [`Animation::value`].
//!
//! | Type | Motion |
//! |------|--------|
//! | [`Spring`] | Damped harmonic oscillator (critically damped for navigation) |
//! | [`ProgressDriver`] | Whatever a [`TransitionCurve`] resolves to: instant, spring, or timed ease |
//!
//! # Invariants
//!
//! 1. `value()` of a driver starts at 0.0 and settles at exactly 1.0.
//! 2. `is_complete()` never flips back to `false` without `reset()`.
//! 3. [`ease_out_cubic`] maps 0.0 to 0.0 and 1.0 to 1.0 and clamps its input.

pub mod spring;

use std::time::Duration;

pub use spring::Spring;

/// A time-driven animation producing a normalized value.
pub trait Animation {
    /// Advance by `dt`.
    fn tick(&mut self, dt: Duration);

    /// Whether the animation has settled.
    fn is_complete(&self) -> bool;

    /// Current normalized value.
    fn value(&self) -> f64;

    /// Return to the initial state.
    fn reset(&mut self);
}

/// Signature shared by all easing curves.
pub type EasingFn = fn(f64) -> f64;

/// Cubic ease-out. Used for the cube rotation so the fold decelerates into place.
#[inline]
pub fn ease_out_cubic(t: f64) -> f64 {
    let inv = 1.0 - t.clamp(0.0, 1.0);
    1.0 - inv * inv * inv
}

// ---------------------------------------------------------------------------
// Curves
// ---------------------------------------------------------------------------

/// How a transition moves from its pre-transition extreme to rest.
///
/// This is configuration, not logic: the engine asks the curve for a
/// [`ProgressDriver`] and never branches on the style itself.
#[derive(Debug, Clone, Copy)]
pub enum TransitionCurve {
    /// Zero duration. Settles on the first tick.
    Instant,
    /// Damped spring on the normalized progress.
    Spring {
        /// Restoring force.
        stiffness: f64,
        /// Velocity drag.
        damping: f64,
    },
    /// Fixed-duration eased interpolation.
    Timed {
        /// Total duration.
        duration: Duration,
        /// Easing applied to `elapsed / duration`.
        easing: EasingFn,
    },
}

impl TransitionCurve {
    /// A critically damped spring with the given response time.
    ///
    /// Response is the period of the undamped oscillator, so
    /// `stiffness = (2π / response)²` and `damping = 2√stiffness`.
    #[must_use]
    pub fn critically_damped(response: Duration) -> Self {
        let response = response.as_secs_f64().max(1e-3);
        let omega = std::f64::consts::TAU / response;
        let stiffness = omega * omega;
        Self::Spring {
            stiffness,
            damping: 2.0 * stiffness.sqrt(),
        }
    }

    /// Cubic ease-out over `duration`.
    #[must_use]
    pub fn ease_out(duration: Duration) -> Self {
        Self::Timed {
            duration,
            easing: ease_out_cubic,
        }
    }

    /// Build a fresh driver at progress 0.0.
    #[must_use]
    pub fn driver(&self) -> ProgressDriver {
        match *self {
            Self::Instant => ProgressDriver::Instant { fired: false },
            Self::Spring { stiffness, damping } => ProgressDriver::Spring(
                Spring::normalized()
                    .with_stiffness(stiffness)
                    .with_damping(damping),
            ),
            Self::Timed { duration, .. } if duration.is_zero() => {
                ProgressDriver::Instant { fired: false }
            }
            Self::Timed { duration, easing } => ProgressDriver::Timed {
                elapsed: Duration::ZERO,
                duration,
                easing,
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Driver
// ---------------------------------------------------------------------------

/// Produces the eased 0.0 → 1.0 fraction that the engine interpolates with.
#[derive(Debug, Clone)]
pub enum ProgressDriver {
    /// Jumps to 1.0 on the first tick, including a zero-length one.
    Instant {
        /// Whether the first tick has happened.
        fired: bool,
    },
    /// Spring-driven fraction.
    Spring(Spring),
    /// Duration-driven fraction.
    Timed {
        /// Time spent so far.
        elapsed: Duration,
        /// Total duration (non-zero).
        duration: Duration,
        /// Easing applied to the linear fraction.
        easing: EasingFn,
    },
}

impl Animation for ProgressDriver {
    fn tick(&mut self, dt: Duration) {
        match self {
            Self::Instant { fired } => *fired = true,
            Self::Spring(spring) => spring.tick(dt),
            Self::Timed {
                elapsed, duration, ..
            } => {
                *elapsed = elapsed.saturating_add(dt).min(*duration);
            }
        }
    }

    fn is_complete(&self) -> bool {
        match self {
            Self::Instant { fired } => *fired,
            Self::Spring(spring) => spring.is_complete(),
            Self::Timed {
                elapsed, duration, ..
            } => elapsed >= duration,
        }
    }

    fn value(&self) -> f64 {
        match self {
            Self::Instant { fired } => {
                if *fired {
                    1.0
                } else {
                    0.0
                }
            }
            // Unclamped: a critically damped spring does not overshoot, and an
            // underdamped one configured by the host should be allowed to.
            Self::Spring(spring) => spring.position(),
            Self::Timed {
                elapsed,
                duration,
                easing,
            } => easing(elapsed.as_secs_f64() / duration.as_secs_f64()),
        }
    }

    fn reset(&mut self) {
        match self {
            Self::Instant { fired } => *fired = false,
            Self::Spring(spring) => spring.reset(),
            Self::Timed { elapsed, .. } => *elapsed = Duration::ZERO,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
