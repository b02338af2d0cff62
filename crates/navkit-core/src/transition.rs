#![forbid(unsafe_code)]

//! Transition classification and the transition lock.
//!
//! [`classify`] compares the live stack with the sequence a mutation would
//! produce and decides what kind of transition that is and which
//! [`AnimationStyle`] plays it. [`TransitionLock`] keeps a second transition
//! (or a drag) from starting while one is already in flight.
//!
//! # Invariants
//!
//! 1. A pop animates with the style the outgoing screen was pushed with.
//! 2. The lock has exactly one owner at a time: a programmatic transition
//!    or a drag session (the "soft" lock), never both.
//! 3. A soft lock can be upgraded to a transition lock (the drag settles
//!    through the engine), never the other way round.

use crate::geometry::{Axis, Viewport};
use crate::screen::ScreenEntry;

// ---------------------------------------------------------------------------
// Kind and style
// ---------------------------------------------------------------------------

/// What a stack mutation does to the visible screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TransitionKind {
    /// A screen was appended.
    #[default]
    Push,
    /// One or more screens were removed from the top.
    Pop,
    /// The root was swapped out.
    Replace,
}

impl TransitionKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Push => "push",
            Self::Pop => "pop",
            Self::Replace => "replace",
        }
    }

    /// Push and Replace both bring a screen in from the pre-transition extreme.
    #[inline]
    pub const fn is_forward(self) -> bool {
        !matches!(self, Self::Pop)
    }
}

/// How a transition looks. Chosen at push time and remembered for the pop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum AnimationStyle {
    /// Swap with no motion.
    #[default]
    None,
    /// Cross-fade.
    Dissolve,
    /// Incoming screen grows into place while the outgoing one grows past the viewport.
    Scale,
    /// Slide in from the trailing edge with a parallaxed background.
    HorizontalSlide,
    /// Slide up from the bottom edge.
    VerticalSlide,
    /// Fold around the shared edge like the faces of a cube.
    CubeRotation,
}

impl AnimationStyle {
    pub const ALL: [Self; 6] = [
        Self::None,
        Self::Dissolve,
        Self::Scale,
        Self::HorizontalSlide,
        Self::VerticalSlide,
        Self::CubeRotation,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Dissolve => "dissolve",
            Self::Scale => "scale",
            Self::HorizontalSlide => "horizontal_slide",
            Self::VerticalSlide => "vertical_slide",
            Self::CubeRotation => "cube_rotation",
        }
    }

    /// Axis a back drag follows for this style, `None` if it cannot be dragged.
    pub const fn drag_axis(self) -> Option<Axis> {
        match self {
            Self::HorizontalSlide | Self::Scale | Self::CubeRotation => Some(Axis::Horizontal),
            Self::VerticalSlide => Some(Axis::Vertical),
            Self::None | Self::Dissolve => None,
        }
    }

    /// Axis the offset component moves along, `None` if the style has no offset.
    pub const fn offset_axis(self) -> Option<Axis> {
        match self {
            Self::HorizontalSlide => Some(Axis::Horizontal),
            Self::VerticalSlide => Some(Axis::Vertical),
            _ => None,
        }
    }

    /// Distance the offset travels: viewport width or height for slides, 0 otherwise.
    pub fn offset_extent(self, viewport: &Viewport) -> f64 {
        match self.offset_axis() {
            Some(axis) => {
                let extent = viewport.extent(axis);
                if extent.is_finite() { extent.max(0.0) } else { 0.0 }
            }
            None => 0.0,
        }
    }
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// The transition currently described to the projector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TransitionState {
    pub kind: TransitionKind,
    pub style: AnimationStyle,
    /// Whether a transition or drag holds the lock.
    pub locked: bool,
}

impl TransitionState {
    /// Nothing in flight.
    pub const IDLE: Self = Self {
        kind: TransitionKind::Push,
        style: AnimationStyle::None,
        locked: false,
    };

    pub const fn new(kind: TransitionKind, style: AnimationStyle) -> Self {
        Self {
            kind,
            style,
            locked: false,
        }
    }

    #[must_use]
    pub const fn locked(mut self, locked: bool) -> Self {
        self.locked = locked;
        self
    }
}

/// Classify the change from `current` to `prospective`.
///
/// `replace` marks a root replacement and is checked first. Otherwise a
/// longer sequence is a push and anything else a pop. The returned state is
/// unlocked; the caller engages the lock when it starts the transition.
pub fn classify(
    current: &[ScreenEntry],
    prospective: &[ScreenEntry],
    replace: bool,
) -> TransitionState {
    if replace {
        let style = prospective
            .first()
            .map_or(AnimationStyle::None, ScreenEntry::style);
        return TransitionState::new(TransitionKind::Replace, style);
    }
    if prospective.len() > current.len() {
        let style = prospective
            .last()
            .map_or(AnimationStyle::None, ScreenEntry::style);
        TransitionState::new(TransitionKind::Push, style)
    } else {
        let style = current
            .last()
            .map_or(AnimationStyle::None, ScreenEntry::style);
        TransitionState::new(TransitionKind::Pop, style)
    }
}

// ---------------------------------------------------------------------------
// Lock
// ---------------------------------------------------------------------------

/// Who holds the [`TransitionLock`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LockState {
    #[default]
    Free,
    /// A programmatic (or settling) transition is animating.
    Transition,
    /// A drag session is in progress.
    Gesture,
}

/// Mutual exclusion between transitions and drag sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TransitionLock {
    state: LockState,
}

impl TransitionLock {
    pub const fn new() -> Self {
        Self {
            state: LockState::Free,
        }
    }

    #[inline]
    pub const fn state(&self) -> LockState {
        self.state
    }

    #[inline]
    pub const fn is_free(&self) -> bool {
        matches!(self.state, LockState::Free)
    }

    #[inline]
    pub const fn is_engaged(&self) -> bool {
        !self.is_free()
    }

    /// Whether a drag holds the lock.
    #[inline]
    pub const fn is_soft(&self) -> bool {
        matches!(self.state, LockState::Gesture)
    }

    /// Take the lock for a transition. Succeeds from `Free` or by upgrading
    /// a soft lock; fails if a transition already holds it.
    pub fn engage_transition(&mut self) -> bool {
        match self.state {
            LockState::Transition => false,
            previous => {
                self.state = LockState::Transition;
                tracing::debug!(
                    target: "navkit.transition",
                    from = ?previous,
                    "lock engaged for transition"
                );
                true
            }
        }
    }

    /// Take the soft lock for a drag. Only succeeds from `Free`.
    pub fn engage_gesture(&mut self) -> bool {
        if self.is_free() {
            self.state = LockState::Gesture;
            tracing::debug!(target: "navkit.transition", "lock engaged for gesture");
            true
        } else {
            false
        }
    }

    pub fn release(&mut self) {
        if self.is_engaged() {
            tracing::debug!(target: "navkit.transition", from = ?self.state, "lock released");
        }
        self.state = LockState::Free;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::screen::{Screen, ScreenId};

    struct S(&'static str);
    impl Screen for S {
        fn identity(&self) -> ScreenId {
            ScreenId::new(self.0)
        }
    }

    fn entry(id: &'static str, style: AnimationStyle) -> ScreenEntry {
        ScreenEntry::new(S(id), style)
    }

    #[test]
    fn longer_is_push_with_new_top_style() {
        let current = vec![entry("root", AnimationStyle::None)];
        let mut next = current.clone();
        next.push(entry("detail", AnimationStyle::HorizontalSlide));
        let state = classify(&current, &next, false);
        assert_eq!(state.kind, TransitionKind::Push);
        assert_eq!(state.style, AnimationStyle::HorizontalSlide);
        assert!(!state.locked);
    }

    #[test]
    fn shorter_is_pop_with_outgoing_style() {
        let current = vec![
            entry("root", AnimationStyle::None),
            entry("a", AnimationStyle::Dissolve),
            entry("b", AnimationStyle::CubeRotation),
        ];
        let state = classify(&current, &current[..1], false);
        assert_eq!(state.kind, TransitionKind::Pop);
        assert_eq!(state.style, AnimationStyle::CubeRotation);
    }

    #[test]
    fn equal_length_is_pop() {
        let current = vec![entry("root", AnimationStyle::Scale)];
        let state = classify(&current, &current, false);
        assert_eq!(state.kind, TransitionKind::Pop);
    }

    #[test]
    fn replace_checked_first() {
        let current = vec![entry("root", AnimationStyle::None)];
        let next = vec![entry("new", AnimationStyle::Dissolve)];
        let state = classify(&current, &next, true);
        assert_eq!(state.kind, TransitionKind::Replace);
        assert_eq!(state.style, AnimationStyle::Dissolve);
    }

    #[test]
    fn empty_diff_falls_back_to_none() {
        let state = classify(&[], &[], false);
        assert_eq!(state.style, AnimationStyle::None);
    }

    #[test]
    fn drag_axes() {
        assert_eq!(AnimationStyle::HorizontalSlide.drag_axis(), Some(Axis::Horizontal));
        assert_eq!(AnimationStyle::Scale.drag_axis(), Some(Axis::Horizontal));
        assert_eq!(AnimationStyle::CubeRotation.drag_axis(), Some(Axis::Horizontal));
        assert_eq!(AnimationStyle::VerticalSlide.drag_axis(), Some(Axis::Vertical));
        assert_eq!(AnimationStyle::None.drag_axis(), None);
        assert_eq!(AnimationStyle::Dissolve.drag_axis(), None);
    }

    #[test]
    fn offset_extent_per_style() {
        let vp = Viewport::new(400.0, 800.0);
        assert_eq!(AnimationStyle::HorizontalSlide.offset_extent(&vp), 400.0);
        assert_eq!(AnimationStyle::VerticalSlide.offset_extent(&vp), 800.0);
        assert_eq!(AnimationStyle::CubeRotation.offset_extent(&vp), 0.0);
        assert_eq!(
            AnimationStyle::HorizontalSlide.offset_extent(&Viewport::new(f64::NAN, 1.0)),
            0.0
        );
    }

    #[test]
    fn lock_transitions() {
        let mut lock = TransitionLock::new();
        assert!(lock.is_free());

        assert!(lock.engage_gesture());
        assert!(lock.is_soft());
        assert!(!lock.engage_gesture());

        // Soft lock upgrades when the drag settles.
        assert!(lock.engage_transition());
        assert_eq!(lock.state(), LockState::Transition);
        assert!(!lock.engage_transition());
        assert!(!lock.engage_gesture());

        lock.release();
        assert!(lock.is_free());
    }
}
