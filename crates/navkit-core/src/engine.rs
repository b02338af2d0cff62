#![forbid(unsafe_code)]

//! Animation-progress engine.
//!
//! Owns the [`ProgressVector`] and moves it from a start vector (the
//! pre-transition extreme, or wherever a drag left it) to a target vector
//! (the settled values, or back to rest on a cancelled drag).
//!
//! ```text
//!   Idle ──begin──▶ Resetting ──drive / reverse_to──▶ Animating
//!    ▲                                                  │ tick: converged
//!    └──────────────finish────────── Completing ◀───────┘
//! ```
//!
//! The engine never looks at the animation style beyond recording it. The
//! curve that moves the vector is handed in by the caller, usually picked
//! from a [`CurveSet`].
//!
//! # Invariants
//!
//! 1. `begin` only succeeds from `Idle`; the lock keeps callers from racing it.
//! 2. `tick` reports [`EngineTick::Completed`] exactly once per transition,
//!    after the driver is at rest and opacity is within epsilon of its target.
//! 3. Once completed, the vector equals the target exactly.

use std::time::Duration;

use crate::animation::{Animation, ProgressDriver, TransitionCurve};
use crate::transition::{AnimationStyle, TransitionKind};

/// Default completion tolerance on opacity.
pub const DEFAULT_COMPLETION_EPSILON: f64 = 1e-3;

/// Default settled scale component.
pub const DEFAULT_SCALE_FACTOR: f64 = 0.46;

// ---------------------------------------------------------------------------
// ProgressVector
// ---------------------------------------------------------------------------

/// The four animatable progress values.
///
/// These are abstract progress components; [`RenderProjector`](crate::projector::RenderProjector)
/// turns them into per-screen frames.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ProgressVector {
    pub opacity: f64,
    pub offset: f64,
    pub scale: f64,
    pub rotation: f64,
}

impl ProgressVector {
    pub const fn new(opacity: f64, offset: f64, scale: f64, rotation: f64) -> Self {
        Self {
            opacity,
            offset,
            scale,
            rotation,
        }
    }

    /// Where a transition of `kind` starts.
    ///
    /// Forward transitions start one extent past the trailing edge; pops
    /// start one extent before it with the rotation fully applied.
    pub fn pre(kind: TransitionKind, extent: f64) -> Self {
        if kind.is_forward() {
            Self::new(0.0, extent, 0.0, 0.0)
        } else {
            Self::new(0.0, -extent, 0.0, 1.0)
        }
    }

    /// Where a transition of `kind` comes to rest.
    pub fn settled(kind: TransitionKind, scale_factor: f64) -> Self {
        let rotation = if kind.is_forward() { 1.0 } else { 0.0 };
        Self::new(1.0, 0.0, scale_factor, rotation)
    }

    /// Component-wise interpolation. `t` is not clamped.
    #[must_use]
    pub fn lerp(self, to: Self, t: f64) -> Self {
        let mix = |a: f64, b: f64| a + (b - a) * t;
        Self {
            opacity: mix(self.opacity, to.opacity),
            offset: mix(self.offset, to.offset),
            scale: mix(self.scale, to.scale),
            rotation: mix(self.rotation, to.rotation),
        }
    }

    pub fn is_finite(&self) -> bool {
        self.opacity.is_finite()
            && self.offset.is_finite()
            && self.scale.is_finite()
            && self.rotation.is_finite()
    }
}

// ---------------------------------------------------------------------------
// Curves per style
// ---------------------------------------------------------------------------

/// Which curve drives each style.
#[derive(Debug, Clone, Copy)]
pub struct CurveSet {
    /// Dissolve, Scale and both slides.
    pub spring: TransitionCurve,
    /// CubeRotation.
    pub cube: TransitionCurve,
}

impl Default for CurveSet {
    fn default() -> Self {
        Self {
            spring: TransitionCurve::critically_damped(Duration::from_millis(400)),
            cube: TransitionCurve::ease_out(Duration::from_millis(520)),
        }
    }
}

impl CurveSet {
    pub fn for_style(&self, style: AnimationStyle) -> TransitionCurve {
        match style {
            AnimationStyle::None => TransitionCurve::Instant,
            AnimationStyle::CubeRotation => self.cube,
            AnimationStyle::Dissolve
            | AnimationStyle::Scale
            | AnimationStyle::HorizontalSlide
            | AnimationStyle::VerticalSlide => self.spring,
        }
    }
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Engine lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EnginePhase {
    #[default]
    Idle,
    /// Vector placed at its start, waiting for a curve.
    Resetting,
    Animating,
    /// Converged; waiting for [`AnimationProgressEngine::finish`].
    Completing,
}

/// Result of one [`AnimationProgressEngine::tick`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EngineTick {
    /// Nothing is animating.
    Idle,
    /// Still moving.
    Running,
    /// Converged on this tick.
    Completed,
}

/// Drives a [`ProgressVector`] from start to target.
#[derive(Debug, Clone)]
pub struct AnimationProgressEngine {
    phase: EnginePhase,
    kind: TransitionKind,
    style: AnimationStyle,
    vector: ProgressVector,
    from: ProgressVector,
    to: ProgressVector,
    driver: Option<ProgressDriver>,
    scale_factor: f64,
    epsilon: f64,
}

impl Default for AnimationProgressEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl AnimationProgressEngine {
    /// Idle engine resting at the forward settled vector.
    pub fn new() -> Self {
        let settled = ProgressVector::settled(TransitionKind::Push, DEFAULT_SCALE_FACTOR);
        Self {
            phase: EnginePhase::Idle,
            kind: TransitionKind::Push,
            style: AnimationStyle::None,
            vector: settled,
            from: settled,
            to: settled,
            driver: None,
            scale_factor: DEFAULT_SCALE_FACTOR,
            epsilon: DEFAULT_COMPLETION_EPSILON,
        }
    }

    /// Set the settled scale component (builder pattern).
    #[must_use]
    pub fn with_scale_factor(mut self, scale_factor: f64) -> Self {
        if scale_factor.is_finite() {
            self.scale_factor = scale_factor;
        }
        self
    }

    /// Set the opacity completion tolerance (builder pattern).
    #[must_use]
    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        if epsilon.is_finite() && epsilon > 0.0 {
            self.epsilon = epsilon;
        }
        self
    }

    #[inline]
    pub fn phase(&self) -> EnginePhase {
        self.phase
    }

    #[inline]
    pub fn vector(&self) -> ProgressVector {
        self.vector
    }

    #[inline]
    pub fn target(&self) -> ProgressVector {
        self.to
    }

    #[inline]
    pub fn kind(&self) -> TransitionKind {
        self.kind
    }

    #[inline]
    pub fn style(&self) -> AnimationStyle {
        self.style
    }

    #[inline]
    pub fn scale_factor(&self) -> f64 {
        self.scale_factor
    }

    #[inline]
    pub fn is_idle(&self) -> bool {
        self.phase == EnginePhase::Idle
    }

    /// Place the vector at the start of a transition.
    ///
    /// `carry` overrides the pre-transition extreme, for a drag handing its
    /// current vector over. Returns `false` (and changes nothing) unless idle.
    pub fn begin(
        &mut self,
        kind: TransitionKind,
        style: AnimationStyle,
        extent: f64,
        carry: Option<ProgressVector>,
    ) -> bool {
        if self.phase != EnginePhase::Idle {
            tracing::debug!(
                target: "navkit.transition",
                phase = ?self.phase,
                "begin ignored: engine busy"
            );
            return false;
        }
        let extent = if extent.is_finite() { extent } else { 0.0 };
        self.kind = kind;
        self.style = style;
        self.vector = carry
            .filter(ProgressVector::is_finite)
            .unwrap_or_else(|| ProgressVector::pre(kind, extent));
        self.from = self.vector;
        self.to = ProgressVector::settled(kind, self.scale_factor);
        self.driver = None;
        self.phase = EnginePhase::Resetting;
        tracing::debug!(
            target: "navkit.transition",
            kind = kind.as_str(),
            style = style.as_str(),
            carried = carry.is_some(),
            "transition begin"
        );
        true
    }

    /// Start animating toward the settled vector.
    pub fn drive(&mut self, curve: TransitionCurve) -> bool {
        let target = ProgressVector::settled(self.kind, self.scale_factor);
        self.start(target, curve)
    }

    /// Start animating toward `target` instead of the settled vector.
    pub fn reverse_to(&mut self, target: ProgressVector, curve: TransitionCurve) -> bool {
        self.start(target, curve)
    }

    fn start(&mut self, target: ProgressVector, curve: TransitionCurve) -> bool {
        if self.phase != EnginePhase::Resetting {
            tracing::debug!(
                target: "navkit.transition",
                phase = ?self.phase,
                "drive ignored: engine not reset"
            );
            return false;
        }
        self.from = self.vector;
        self.to = target;
        self.driver = Some(curve.driver());
        self.phase = EnginePhase::Animating;
        true
    }

    /// Advance by `dt`.
    pub fn tick(&mut self, dt: Duration) -> EngineTick {
        if self.phase != EnginePhase::Animating {
            return EngineTick::Idle;
        }
        let Some(driver) = self.driver.as_mut() else {
            return EngineTick::Idle;
        };
        driver.tick(dt);
        let fraction = driver.value();
        let at_rest = driver.is_complete();
        self.vector = self.from.lerp(self.to, fraction);

        if at_rest && (self.vector.opacity - self.to.opacity).abs() < self.epsilon {
            self.vector = self.to;
            self.driver = None;
            self.phase = EnginePhase::Completing;
            tracing::debug!(
                target: "navkit.transition",
                kind = self.kind.as_str(),
                style = self.style.as_str(),
                "transition converged"
            );
            EngineTick::Completed
        } else {
            EngineTick::Running
        }
    }

    /// Acknowledge completion and return to idle.
    pub fn finish(&mut self) -> bool {
        if self.phase != EnginePhase::Completing {
            return false;
        }
        self.phase = EnginePhase::Idle;
        true
    }

    /// Drop whatever is in flight and rest at the forward settled vector.
    pub fn abort(&mut self) {
        self.phase = EnginePhase::Idle;
        self.driver = None;
        self.vector = ProgressVector::settled(TransitionKind::Push, self.scale_factor);
        self.from = self.vector;
        self.to = self.vector;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MS_16: Duration = Duration::from_millis(16);

    fn run_to_completion(engine: &mut AnimationProgressEngine, max_frames: usize) -> usize {
        for frame in 1..=max_frames {
            if engine.tick(MS_16) == EngineTick::Completed {
                return frame;
            }
        }
        panic!("engine did not converge in {max_frames} frames");
    }

    #[test]
    fn extremes() {
        assert_eq!(
            ProgressVector::pre(TransitionKind::Push, 300.0),
            ProgressVector::new(0.0, 300.0, 0.0, 0.0)
        );
        assert_eq!(
            ProgressVector::pre(TransitionKind::Replace, 300.0),
            ProgressVector::new(0.0, 300.0, 0.0, 0.0)
        );
        assert_eq!(
            ProgressVector::pre(TransitionKind::Pop, 300.0),
            ProgressVector::new(0.0, -300.0, 0.0, 1.0)
        );
        assert_eq!(
            ProgressVector::settled(TransitionKind::Push, 0.46),
            ProgressVector::new(1.0, 0.0, 0.46, 1.0)
        );
        assert_eq!(
            ProgressVector::settled(TransitionKind::Pop, 0.46),
            ProgressVector::new(1.0, 0.0, 0.46, 0.0)
        );
    }

    #[test]
    fn lerp_midpoint() {
        let a = ProgressVector::new(0.0, 100.0, 0.0, 1.0);
        let b = ProgressVector::new(1.0, 0.0, 0.5, 0.0);
        assert_eq!(a.lerp(b, 0.5), ProgressVector::new(0.5, 50.0, 0.25, 0.5));
    }

    #[test]
    fn phases_follow_lifecycle() {
        let mut engine = AnimationProgressEngine::new();
        assert_eq!(engine.phase(), EnginePhase::Idle);
        assert_eq!(engine.tick(MS_16), EngineTick::Idle);

        assert!(engine.begin(
            TransitionKind::Push,
            AnimationStyle::HorizontalSlide,
            390.0,
            None
        ));
        assert_eq!(engine.phase(), EnginePhase::Resetting);
        assert_eq!(engine.vector().offset, 390.0);
        assert!(!engine.begin(TransitionKind::Pop, AnimationStyle::None, 0.0, None));

        assert!(engine.drive(CurveSet::default().for_style(AnimationStyle::HorizontalSlide)));
        assert_eq!(engine.phase(), EnginePhase::Animating);

        run_to_completion(&mut engine, 200);
        assert_eq!(engine.phase(), EnginePhase::Completing);
        assert_eq!(engine.vector(), ProgressVector::settled(TransitionKind::Push, 0.46));
        // Completion is reported once.
        assert_eq!(engine.tick(MS_16), EngineTick::Idle);

        assert!(engine.finish());
        assert!(engine.is_idle());
        assert!(!engine.finish());
    }

    #[test]
    fn offset_moves_monotonically_for_critically_damped_push() {
        let mut engine = AnimationProgressEngine::new();
        engine.begin(TransitionKind::Push, AnimationStyle::HorizontalSlide, 390.0, None);
        engine.drive(CurveSet::default().spring);
        let mut last = engine.vector().offset;
        while engine.tick(MS_16) == EngineTick::Running {
            let offset = engine.vector().offset;
            assert!(offset <= last + 0.5, "offset went back: {last} -> {offset}");
            last = offset;
        }
        assert_eq!(engine.vector().offset, 0.0);
    }

    #[test]
    fn instant_curve_completes_on_next_tick() {
        let mut engine = AnimationProgressEngine::new();
        engine.begin(TransitionKind::Pop, AnimationStyle::None, 0.0, None);
        engine.drive(CurveSet::default().for_style(AnimationStyle::None));
        assert_eq!(engine.tick(Duration::ZERO), EngineTick::Completed);
        assert_eq!(engine.vector().opacity, 1.0);
    }

    #[test]
    fn cube_uses_timed_curve() {
        let mut engine = AnimationProgressEngine::new();
        engine.begin(TransitionKind::Push, AnimationStyle::CubeRotation, 0.0, None);
        engine.drive(CurveSet::default().for_style(AnimationStyle::CubeRotation));
        // 520ms at 16ms per frame.
        assert_eq!(run_to_completion(&mut engine, 100), 33);
        assert_eq!(engine.vector().rotation, 1.0);
    }

    #[test]
    fn carried_vector_reverses_to_rest() {
        let extent = 400.0;
        let pre = ProgressVector::pre(TransitionKind::Pop, extent);
        let settled = ProgressVector::settled(TransitionKind::Pop, 0.46);
        let carried = pre.lerp(settled, 0.05);

        let mut engine = AnimationProgressEngine::new();
        engine.begin(
            TransitionKind::Pop,
            AnimationStyle::HorizontalSlide,
            extent,
            Some(carried),
        );
        assert_eq!(engine.vector(), carried);
        engine.reverse_to(pre, CurveSet::default().spring);
        run_to_completion(&mut engine, 200);
        assert_eq!(engine.vector(), pre);
    }

    #[test]
    fn non_finite_carry_falls_back_to_pre() {
        let mut engine = AnimationProgressEngine::new();
        let bad = ProgressVector::new(f64::NAN, 0.0, 0.0, 0.0);
        engine.begin(
            TransitionKind::Push,
            AnimationStyle::HorizontalSlide,
            100.0,
            Some(bad),
        );
        assert_eq!(engine.vector(), ProgressVector::pre(TransitionKind::Push, 100.0));
    }

    #[test]
    fn drive_requires_reset() {
        let mut engine = AnimationProgressEngine::new();
        assert!(!engine.drive(TransitionCurve::Instant));
        assert!(engine.is_idle());
    }

    #[test]
    fn abort_returns_to_idle() {
        let mut engine = AnimationProgressEngine::new();
        engine.begin(TransitionKind::Push, AnimationStyle::Dissolve, 0.0, None);
        engine.drive(CurveSet::default().spring);
        engine.tick(MS_16);
        engine.abort();
        assert!(engine.is_idle());
        assert_eq!(engine.tick(MS_16), EngineTick::Idle);
    }
}
