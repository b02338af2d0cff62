#![forbid(unsafe_code)]

//! Pure projection of the progress vector onto per-screen render frames.
//!
//! During a transition at most two screens are drawn: the [`ScreenRole::Front`]
//! (last of the render list, the incoming screen on a push and the outgoing
//! one on a pop) and the [`ScreenRole::Back`] right below it. Everything
//! else is [`ScreenRole::Hidden`].
//!
//! | Style | Front | Back |
//! |-------|-------|------|
//! | None, Dissolve | opacity `a` (push) or `1 - a` (pop) | the other one |
//! | Slides | push `o`, pop `o + extent` | push `(o - extent) × parallax`, pop `o × parallax` |
//! | Scale | push `1 - sf + s`, pop `1 - s` | push `1 + s`, pop `1 + sf - s` |
//! | CubeRotation | `90 - 90r`° about leading edge, shifted `(1 - r) × width` | `-90r`° about trailing edge, shifted `-r × width` |
//!
//! # Failure Modes
//!
//! A frame that cannot be computed (degenerate viewport for a geometric
//! style, non-finite progress) is a [`Violation`]. [`RenderProjector::project`]
//! substitutes the identity frame and logs it at trace level, so projection
//! never fails; [`RenderProjector::try_project`] hands the violation back.

use crate::engine::{DEFAULT_SCALE_FACTOR, ProgressVector};
use crate::geometry::Viewport;
use crate::transition::{AnimationStyle, TransitionState};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Tunable projection constants.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ProjectionConfig {
    /// Settled scale component for the Scale style.
    pub scale_factor: f64,
    /// How far the back screen slides, relative to the front.
    pub parallax: f64,
    /// Cube perspective when wider than tall.
    pub landscape_perspective: f64,
    /// Cube perspective otherwise.
    pub portrait_perspective: f64,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            scale_factor: DEFAULT_SCALE_FACTOR,
            parallax: 1.0 / 3.0,
            landscape_perspective: 0.52,
            portrait_perspective: 1.0,
        }
    }
}

impl ProjectionConfig {
    /// Human-readable problems, empty if valid.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if !self.scale_factor.is_finite() || self.scale_factor < 0.0 {
            errors.push(format!(
                "projection.scale_factor must be finite and >= 0, got {}",
                self.scale_factor
            ));
        }
        if !self.parallax.is_finite() || !(0.0..=1.0).contains(&self.parallax) {
            errors.push(format!(
                "projection.parallax must be in [0, 1], got {}",
                self.parallax
            ));
        }
        for (name, value) in [
            ("landscape_perspective", self.landscape_perspective),
            ("portrait_perspective", self.portrait_perspective),
        ] {
            if !value.is_finite() || value <= 0.0 {
                errors.push(format!("projection.{name} must be > 0, got {value}"));
            }
        }
        errors
    }

    pub fn perspective(&self, viewport: &Viewport) -> f64 {
        if viewport.is_landscape() {
            self.landscape_perspective
        } else {
            self.portrait_perspective
        }
    }
}

// ---------------------------------------------------------------------------
// Frames
// ---------------------------------------------------------------------------

/// Position of a screen in the render list during a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScreenRole {
    /// Last entry.
    Front,
    /// Second to last.
    Back,
    Hidden,
}

impl ScreenRole {
    /// Role of entry `index` in a render list of `len`.
    pub fn for_index(index: usize, len: usize) -> Self {
        if index + 1 == len {
            Self::Front
        } else if index + 2 == len {
            Self::Back
        } else {
            Self::Hidden
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Front => "front",
            Self::Back => "back",
            Self::Hidden => "hidden",
        }
    }
}

/// Edge a rotation pivots around.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RotationAnchor {
    Leading,
    Trailing,
    #[default]
    Center,
}

/// Visual parameters for one screen on one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderFrame {
    pub opacity: f64,
    pub offset_x: f64,
    pub offset_y: f64,
    pub scale: f64,
    /// Rotation about the vertical axis, in degrees.
    pub rotation_degrees: f64,
    pub rotation_anchor: RotationAnchor,
    /// Horizontal shift applied together with the rotation.
    pub rotation_translation: f64,
    pub perspective: f64,
}

impl RenderFrame {
    /// Fully visible, untransformed.
    pub const IDENTITY: Self = Self {
        opacity: 1.0,
        offset_x: 0.0,
        offset_y: 0.0,
        scale: 1.0,
        rotation_degrees: 0.0,
        rotation_anchor: RotationAnchor::Center,
        rotation_translation: 0.0,
        perspective: 1.0,
    };

    /// Untransformed and transparent.
    pub const HIDDEN: Self = Self {
        opacity: 0.0,
        ..Self::IDENTITY
    };

    #[inline]
    pub fn is_visible(&self) -> bool {
        self.opacity > 0.0
    }
}

impl Default for RenderFrame {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Everything a single projection depends on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectionInput {
    pub role: ScreenRole,
    pub state: TransitionState,
    pub vector: ProgressVector,
    pub viewport: Viewport,
    /// No transition and no drag in flight.
    pub settled: bool,
}

/// A visual parameter requested where it does not apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Violation {
    pub property: &'static str,
    pub role: ScreenRole,
    pub style: AnimationStyle,
}

impl Violation {
    /// Log and degrade to the identity frame.
    pub fn fallback(&self) -> RenderFrame {
        tracing::trace!(
            target: "navkit.projector",
            property = self.property,
            role = self.role.as_str(),
            style = self.style.as_str(),
            "projection prerequisite not met, using identity"
        );
        RenderFrame::IDENTITY
    }
}

// ---------------------------------------------------------------------------
// Projector
// ---------------------------------------------------------------------------

/// Maps `(role, transition, vector, viewport)` to a [`RenderFrame`].
#[derive(Debug, Clone, Copy, Default)]
pub struct RenderProjector {
    config: ProjectionConfig,
}

impl RenderProjector {
    pub fn new(config: ProjectionConfig) -> Self {
        Self { config }
    }

    #[inline]
    pub fn config(&self) -> &ProjectionConfig {
        &self.config
    }

    /// Frame for `input`, the identity frame if it violates a prerequisite.
    pub fn project(&self, input: &ProjectionInput) -> RenderFrame {
        self.try_project(input).unwrap_or_else(|violation| violation.fallback())
    }

    pub fn try_project(&self, input: &ProjectionInput) -> Result<RenderFrame, Violation> {
        let role = input.role;
        if input.settled || role == ScreenRole::Hidden {
            return Ok(settled_frame(role));
        }
        let style = input.state.style;
        if !input.vector.is_finite() {
            return Err(violation("vector", role, style));
        }
        match style {
            AnimationStyle::None | AnimationStyle::Dissolve => Ok(self.dissolve(input)),
            AnimationStyle::HorizontalSlide | AnimationStyle::VerticalSlide => self.slide(input),
            AnimationStyle::Scale => Ok(self.scale(input)),
            AnimationStyle::CubeRotation => self.cube(input),
        }
    }

    fn dissolve(&self, input: &ProjectionInput) -> RenderFrame {
        let destination = if input.state.kind.is_forward() {
            ScreenRole::Front
        } else {
            ScreenRole::Back
        };
        let a = input.vector.opacity.clamp(0.0, 1.0);
        RenderFrame {
            opacity: if input.role == destination { a } else { 1.0 - a },
            ..RenderFrame::IDENTITY
        }
    }

    fn slide(&self, input: &ProjectionInput) -> Result<RenderFrame, Violation> {
        let style = input.state.style;
        let extent = style.offset_extent(&input.viewport);
        if extent <= 0.0 {
            return Err(violation("offset", input.role, style));
        }
        let o = input.vector.offset;
        let parallax = self.config.parallax;
        let offset = match (input.state.kind.is_forward(), input.role) {
            (true, ScreenRole::Front) => o,
            (true, _) => (o - extent) * parallax,
            (false, ScreenRole::Front) => o + extent,
            (false, _) => o * parallax,
        };
        let offset = offset.clamp(-extent * parallax, extent);
        Ok(match style {
            AnimationStyle::VerticalSlide => RenderFrame {
                offset_y: offset,
                ..RenderFrame::IDENTITY
            },
            _ => RenderFrame {
                offset_x: offset,
                ..RenderFrame::IDENTITY
            },
        })
    }

    fn scale(&self, input: &ProjectionInput) -> RenderFrame {
        let sf = self.config.scale_factor;
        let s = input.vector.scale;
        let scale = match (input.state.kind.is_forward(), input.role) {
            (true, ScreenRole::Front) => 1.0 - sf + s,
            (true, _) => 1.0 + s,
            (false, ScreenRole::Front) => 1.0 - s,
            (false, _) => 1.0 + sf - s,
        };
        RenderFrame {
            scale: scale.max(0.0),
            ..RenderFrame::IDENTITY
        }
    }

    fn cube(&self, input: &ProjectionInput) -> Result<RenderFrame, Violation> {
        let viewport = &input.viewport;
        if viewport.is_degenerate() {
            return Err(violation("rotation", input.role, input.state.style));
        }
        let r = input.vector.rotation;
        let width = viewport.width;
        let perspective = self.config.perspective(viewport);
        Ok(match input.role {
            ScreenRole::Front => RenderFrame {
                rotation_degrees: 90.0 - 90.0 * r,
                rotation_anchor: RotationAnchor::Leading,
                rotation_translation: (1.0 - r) * width,
                perspective,
                ..RenderFrame::IDENTITY
            },
            _ => RenderFrame {
                rotation_degrees: -90.0 * r,
                rotation_anchor: RotationAnchor::Trailing,
                rotation_translation: -r * width,
                perspective,
                ..RenderFrame::IDENTITY
            },
        })
    }
}

fn settled_frame(role: ScreenRole) -> RenderFrame {
    match role {
        ScreenRole::Front => RenderFrame::IDENTITY,
        ScreenRole::Back | ScreenRole::Hidden => RenderFrame::HIDDEN,
    }
}

fn violation(property: &'static str, role: ScreenRole, style: AnimationStyle) -> Violation {
    Violation {
        property,
        role,
        style,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transition::TransitionKind;

    const VP: Viewport = Viewport::new(300.0, 600.0);

    fn input(
        role: ScreenRole,
        kind: TransitionKind,
        style: AnimationStyle,
        vector: ProgressVector,
    ) -> ProjectionInput {
        ProjectionInput {
            role,
            state: TransitionState::new(kind, style).locked(true),
            vector,
            viewport: VP,
            settled: false,
        }
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn roles_by_index() {
        assert_eq!(ScreenRole::for_index(2, 3), ScreenRole::Front);
        assert_eq!(ScreenRole::for_index(1, 3), ScreenRole::Back);
        assert_eq!(ScreenRole::for_index(0, 3), ScreenRole::Hidden);
        assert_eq!(ScreenRole::for_index(0, 1), ScreenRole::Front);
    }

    #[test]
    fn settled_shows_only_front() {
        let projector = RenderProjector::default();
        let mut i = input(
            ScreenRole::Front,
            TransitionKind::Push,
            AnimationStyle::HorizontalSlide,
            ProgressVector::pre(TransitionKind::Push, 300.0),
        );
        i.settled = true;
        assert_eq!(projector.project(&i), RenderFrame::IDENTITY);
        i.role = ScreenRole::Back;
        assert_eq!(projector.project(&i), RenderFrame::HIDDEN);
    }

    #[test]
    fn hidden_is_transparent_identity() {
        let projector = RenderProjector::default();
        let i = input(
            ScreenRole::Hidden,
            TransitionKind::Push,
            AnimationStyle::Dissolve,
            ProgressVector::new(0.5, 0.0, 0.0, 0.0),
        );
        assert_eq!(projector.project(&i), RenderFrame::HIDDEN);
    }

    #[test]
    fn dissolve_destination_depends_on_kind() {
        let projector = RenderProjector::default();
        let style = AnimationStyle::Dissolve;
        let v = ProgressVector::new(0.25, 0.0, 0.0, 0.0);
        let push_front =
            projector.project(&input(ScreenRole::Front, TransitionKind::Push, style, v));
        let push_back = projector.project(&input(ScreenRole::Back, TransitionKind::Push, style, v));
        assert!(close(push_front.opacity, 0.25));
        assert!(close(push_back.opacity, 0.75));

        let pop_front = projector.project(&input(ScreenRole::Front, TransitionKind::Pop, style, v));
        let pop_back = projector.project(&input(ScreenRole::Back, TransitionKind::Pop, style, v));
        assert!(close(pop_front.opacity, 0.75));
        assert!(close(pop_back.opacity, 0.25));
    }

    #[test]
    fn horizontal_push_endpoints() {
        let projector = RenderProjector::default();
        let style = AnimationStyle::HorizontalSlide;
        let pre = ProgressVector::pre(TransitionKind::Push, 300.0);
        let settled = ProgressVector::settled(TransitionKind::Push, 0.46);

        let front = projector.project(&input(ScreenRole::Front, TransitionKind::Push, style, pre));
        let back = projector.project(&input(ScreenRole::Back, TransitionKind::Push, style, pre));
        assert!(close(front.offset_x, 300.0));
        assert!(close(back.offset_x, 0.0));
        assert_eq!(front.opacity, 1.0);

        let front =
            projector.project(&input(ScreenRole::Front, TransitionKind::Push, style, settled));
        let back =
            projector.project(&input(ScreenRole::Back, TransitionKind::Push, style, settled));
        assert!(close(front.offset_x, 0.0));
        assert!(close(back.offset_x, -100.0));
    }

    #[test]
    fn horizontal_pop_endpoints() {
        let projector = RenderProjector::default();
        let style = AnimationStyle::HorizontalSlide;
        let pre = ProgressVector::pre(TransitionKind::Pop, 300.0);
        let settled = ProgressVector::settled(TransitionKind::Pop, 0.46);

        let front = projector.project(&input(ScreenRole::Front, TransitionKind::Pop, style, pre));
        let back = projector.project(&input(ScreenRole::Back, TransitionKind::Pop, style, pre));
        assert!(close(front.offset_x, 0.0));
        assert!(close(back.offset_x, -100.0));

        let front =
            projector.project(&input(ScreenRole::Front, TransitionKind::Pop, style, settled));
        let back = projector.project(&input(ScreenRole::Back, TransitionKind::Pop, style, settled));
        assert!(close(front.offset_x, 300.0));
        assert!(close(back.offset_x, 0.0));
    }

    #[test]
    fn vertical_slide_uses_height_and_y() {
        let projector = RenderProjector::default();
        let style = AnimationStyle::VerticalSlide;
        let pre = ProgressVector::pre(TransitionKind::Push, 600.0);
        let front = projector.project(&input(ScreenRole::Front, TransitionKind::Push, style, pre));
        assert!(close(front.offset_y, 600.0));
        assert_eq!(front.offset_x, 0.0);
    }

    #[test]
    fn slide_offsets_are_clamped() {
        let projector = RenderProjector::default();
        let style = AnimationStyle::HorizontalSlide;
        let overshoot = ProgressVector::new(1.0, 900.0, 0.0, 0.0);
        let front =
            projector.project(&input(ScreenRole::Front, TransitionKind::Push, style, overshoot));
        assert!(close(front.offset_x, 300.0));
    }

    #[test]
    fn scale_push_and_pop_are_time_reversed() {
        let projector = RenderProjector::default();
        let style = AnimationStyle::Scale;
        let sf = 0.46;
        for t in [0.0, 0.3, 1.0] {
            let push = ProgressVector::pre(TransitionKind::Push, 0.0)
                .lerp(ProgressVector::settled(TransitionKind::Push, sf), t);
            let pop = ProgressVector::pre(TransitionKind::Pop, 0.0)
                .lerp(ProgressVector::settled(TransitionKind::Pop, sf), 1.0 - t);
            let push_front =
                projector.project(&input(ScreenRole::Front, TransitionKind::Push, style, push));
            let pop_front =
                projector.project(&input(ScreenRole::Front, TransitionKind::Pop, style, pop));
            assert!(close(push_front.scale, pop_front.scale), "t={t}");
            let push_back =
                projector.project(&input(ScreenRole::Back, TransitionKind::Push, style, push));
            let pop_back =
                projector.project(&input(ScreenRole::Back, TransitionKind::Pop, style, pop));
            assert!(close(push_back.scale, pop_back.scale), "t={t}");
        }
    }

    #[test]
    fn cube_endpoints() {
        let projector = RenderProjector::default();
        let style = AnimationStyle::CubeRotation;
        let pre = ProgressVector::pre(TransitionKind::Push, 0.0);
        let front = projector.project(&input(ScreenRole::Front, TransitionKind::Push, style, pre));
        assert!(close(front.rotation_degrees, 90.0));
        assert_eq!(front.rotation_anchor, RotationAnchor::Leading);
        assert!(close(front.rotation_translation, 300.0));
        assert_eq!(front.perspective, 1.0);

        let settled = ProgressVector::settled(TransitionKind::Push, 0.46);
        let back =
            projector.project(&input(ScreenRole::Back, TransitionKind::Push, style, settled));
        assert!(close(back.rotation_degrees, -90.0));
        assert_eq!(back.rotation_anchor, RotationAnchor::Trailing);
        assert!(close(back.rotation_translation, -300.0));
    }

    #[test]
    fn cube_perspective_in_landscape() {
        let projector = RenderProjector::default();
        let mut i = input(
            ScreenRole::Front,
            TransitionKind::Push,
            AnimationStyle::CubeRotation,
            ProgressVector::default(),
        );
        i.viewport = Viewport::new(800.0, 400.0);
        assert_eq!(projector.project(&i).perspective, 0.52);
    }

    #[test]
    fn degenerate_inputs_fall_back_to_identity() {
        let projector = RenderProjector::default();
        let mut i = input(
            ScreenRole::Front,
            TransitionKind::Push,
            AnimationStyle::HorizontalSlide,
            ProgressVector::default(),
        );
        i.viewport = Viewport::new(0.0, 0.0);
        assert_eq!(projector.project(&i), RenderFrame::IDENTITY);

        i.state.style = AnimationStyle::CubeRotation;
        assert_eq!(projector.project(&i), RenderFrame::IDENTITY);

        i.viewport = VP;
        i.vector.opacity = f64::NAN;
        assert_eq!(projector.project(&i), RenderFrame::IDENTITY);
    }

    #[test]
    fn try_project_reports_the_violated_property() {
        let projector = RenderProjector::default();
        let mut i = input(
            ScreenRole::Back,
            TransitionKind::Pop,
            AnimationStyle::VerticalSlide,
            ProgressVector::default(),
        );
        i.viewport = Viewport::new(0.0, 0.0);
        assert_eq!(
            projector.try_project(&i),
            Err(Violation {
                property: "offset",
                role: ScreenRole::Back,
                style: AnimationStyle::VerticalSlide,
            })
        );

        i.state.style = AnimationStyle::CubeRotation;
        assert_eq!(projector.try_project(&i).unwrap_err().property, "rotation");

        i.viewport = VP;
        i.vector.offset = f64::INFINITY;
        assert_eq!(projector.try_project(&i).unwrap_err().property, "vector");

        i.settled = true;
        assert!(projector.try_project(&i).is_ok(), "settled frames never violate");
    }

    #[test]
    fn config_validation() {
        assert!(ProjectionConfig::default().validate().is_empty());
        let bad = ProjectionConfig {
            scale_factor: -1.0,
            parallax: 2.0,
            landscape_perspective: 0.0,
            portrait_perspective: f64::NAN,
        };
        assert_eq!(bad.validate().len(), 4);
    }
}
