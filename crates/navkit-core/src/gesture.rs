#![forbid(unsafe_code)]

//! Drag-to-dismiss coordination.
//!
//! [`GestureCoordinator`] turns a drag on the top screen into a provisional
//! pop. While the finger moves, the pop's [`ProgressVector`] follows the
//! drag directly; on release the coordinator decides whether the pop commits
//! or the screen springs back.
//!
//! # State Machine
//!
//! ```text
//!   Inactive ──begin──▶ Dragging ──end / cancel──▶ Releasing ──settle──▶ Inactive
//! ```
//!
//! `Releasing` covers the settle animation the caller runs after the
//! decision; a new drag cannot start until [`GestureCoordinator::settle`].
//!
//! # Invariants
//!
//! 1. A drag holds the soft lock from `begin` until `end`/`cancel`.
//! 2. Translation is projected onto the drag axis and never negative.
//! 3. A drag commits only when the translation ratio is strictly greater
//!    than the screen's threshold.
//!
//! # Failure Modes
//!
//! - A drag whose viewport extent is zero has ratio 0 and always cancels.
//! - The host losing the pointer mid-drag should call
//!   [`GestureCoordinator::cancel`], which resolves as a cancel.

use crate::engine::ProgressVector;
use crate::geometry::{Axis, Point, Vector, Viewport};
use crate::screen::{BackGesture, BackGestureRegion};
use crate::transition::{AnimationStyle, TransitionKind, TransitionLock};

/// Default activation band for [`BackGestureRegion::Edge`], as a fraction of the extent.
pub const DEFAULT_EDGE_FRACTION: f64 = 0.1;

/// Coordinator lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GesturePhase {
    #[default]
    Inactive,
    Dragging,
    /// Decision made; the settle animation is running.
    Releasing,
}

/// Live state of one drag session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureState {
    pub is_active: bool,
    /// Distance along `axis`, clamped to be non-negative.
    pub translation: f64,
    pub axis: Axis,
    /// Viewport length along `axis`.
    pub extent: f64,
}

impl GestureState {
    /// Translation as a fraction of the extent, in [0, 1].
    pub fn ratio(&self) -> f64 {
        if self.extent > 0.0 && self.extent.is_finite() {
            (self.translation / self.extent).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}

/// Everything needed to decide whether a drag may start.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragContext {
    /// Current stack length.
    pub depth: usize,
    /// Back-gesture settings of the top screen.
    pub back_gesture: BackGesture,
    /// Style the top screen was pushed with.
    pub style: AnimationStyle,
    pub viewport: Viewport,
}

/// How a drag resolved. Both carry the vector at release; a cancel also
/// carries the vector it settles back to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragOutcome {
    /// Finish the pop from here.
    Commit { vector: ProgressVector },
    /// Return the top screen to rest at `rest`.
    Cancel {
        vector: ProgressVector,
        rest: ProgressVector,
    },
}

impl DragOutcome {
    pub fn vector(&self) -> ProgressVector {
        match self {
            Self::Commit { vector } | Self::Cancel { vector, .. } => *vector,
        }
    }

    /// Where a cancelled drag settles. `None` for a commit.
    pub fn rest(&self) -> Option<ProgressVector> {
        match self {
            Self::Commit { .. } => None,
            Self::Cancel { rest, .. } => Some(*rest),
        }
    }

    #[inline]
    pub fn is_commit(&self) -> bool {
        matches!(self, Self::Commit { .. })
    }
}

#[derive(Debug, Clone, Copy)]
struct Session {
    state: GestureState,
    threshold: f64,
    offset_extent: f64,
}

/// Drives one drag session at a time.
#[derive(Debug, Clone)]
pub struct GestureCoordinator {
    phase: GesturePhase,
    session: Option<Session>,
    edge_fraction: f64,
    scale_factor: f64,
}

impl Default for GestureCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl GestureCoordinator {
    pub fn new() -> Self {
        Self {
            phase: GesturePhase::Inactive,
            session: None,
            edge_fraction: DEFAULT_EDGE_FRACTION,
            scale_factor: crate::engine::DEFAULT_SCALE_FACTOR,
        }
    }

    /// Set the edge activation band (builder pattern).
    #[must_use]
    pub fn with_edge_fraction(mut self, fraction: f64) -> Self {
        if fraction.is_finite() {
            self.edge_fraction = fraction.clamp(0.0, 1.0);
        }
        self
    }

    /// Set the settled scale component used for provisional vectors (builder pattern).
    #[must_use]
    pub fn with_scale_factor(mut self, scale_factor: f64) -> Self {
        if scale_factor.is_finite() {
            self.scale_factor = scale_factor;
        }
        self
    }

    #[inline]
    pub fn phase(&self) -> GesturePhase {
        self.phase
    }

    #[inline]
    pub fn is_dragging(&self) -> bool {
        self.phase == GesturePhase::Dragging
    }

    /// Live drag state, if dragging.
    pub fn state(&self) -> Option<GestureState> {
        self.session.map(|s| s.state)
    }

    /// Whether a drag may start in `ctx` under `lock`.
    pub fn can_begin(&self, ctx: &DragContext, lock: &TransitionLock) -> bool {
        self.phase == GesturePhase::Inactive
            && ctx.depth > 1
            && lock.is_free()
            && ctx.back_gesture.permits_drag()
            && ctx.style.drag_axis().is_some()
    }

    /// Start a drag at `start`. Engages the soft lock on success.
    pub fn begin(&mut self, start: Point, ctx: &DragContext, lock: &mut TransitionLock) -> bool {
        if !self.can_begin(ctx, lock) {
            tracing::debug!(
                target: "navkit.gesture",
                depth = ctx.depth,
                lock = ?lock.state(),
                style = ctx.style.as_str(),
                "drag not permitted"
            );
            return false;
        }
        let Some(axis) = ctx.style.drag_axis() else {
            return false;
        };
        let extent = ctx.viewport.extent(axis);
        if ctx.back_gesture.region == BackGestureRegion::Edge {
            let along = match axis {
                Axis::Horizontal => start.x,
                Axis::Vertical => start.y,
            };
            let inside = along <= extent * self.edge_fraction;
            if !inside {
                tracing::debug!(target: "navkit.gesture", along, extent, "drag outside edge band");
                return false;
            }
        }
        if !lock.engage_gesture() {
            return false;
        }
        self.session = Some(Session {
            state: GestureState {
                is_active: true,
                translation: 0.0,
                axis,
                extent: if extent.is_finite() { extent.max(0.0) } else { 0.0 },
            },
            threshold: ctx.back_gesture.threshold,
            offset_extent: ctx.style.offset_extent(&ctx.viewport),
        });
        self.phase = GesturePhase::Dragging;
        tracing::debug!(target: "navkit.gesture", ?axis, extent, "drag began");
        true
    }

    /// Follow the drag. Returns the provisional pop vector.
    pub fn update(&mut self, translation: Vector) -> Option<ProgressVector> {
        if self.phase != GesturePhase::Dragging {
            return None;
        }
        let session = self.session.as_mut()?;
        let along = translation.along(session.state.axis);
        session.state.translation = if along.is_finite() { along.max(0.0) } else { 0.0 };
        tracing::trace!(
            target: "navkit.gesture",
            translation = session.state.translation,
            ratio = session.state.ratio(),
            "drag moved"
        );
        self.vector()
    }

    /// Provisional pop vector for the current drag.
    pub fn vector(&self) -> Option<ProgressVector> {
        let session = self.session?;
        Some(self.vector_at(session.offset_extent, session.state.ratio()))
    }

    fn vector_at(&self, offset_extent: f64, ratio: f64) -> ProgressVector {
        let pre = ProgressVector::pre(TransitionKind::Pop, offset_extent);
        let settled = ProgressVector::settled(TransitionKind::Pop, self.scale_factor);
        pre.lerp(settled, ratio)
    }

    /// Release the drag and decide. Releases the soft lock.
    pub fn end(&mut self, lock: &mut TransitionLock) -> Option<DragOutcome> {
        if self.phase != GesturePhase::Dragging {
            return None;
        }
        let session = self.session.take()?;
        let ratio = session.state.ratio();
        let vector = self.vector_at(session.offset_extent, ratio);
        let outcome = if ratio > session.threshold {
            DragOutcome::Commit { vector }
        } else {
            DragOutcome::Cancel {
                vector,
                rest: self.vector_at(session.offset_extent, 0.0),
            }
        };
        self.release(lock);
        tracing::debug!(
            target: "navkit.gesture",
            ratio,
            threshold = session.threshold,
            commit = outcome.is_commit(),
            "drag ended"
        );
        Some(outcome)
    }

    /// Abort the drag without a decision. Resolves as a cancel.
    pub fn cancel(&mut self, lock: &mut TransitionLock) -> Option<DragOutcome> {
        if self.phase != GesturePhase::Dragging {
            return None;
        }
        let session = self.session.take()?;
        let outcome = DragOutcome::Cancel {
            vector: self.vector_at(session.offset_extent, session.state.ratio()),
            rest: self.vector_at(session.offset_extent, 0.0),
        };
        self.release(lock);
        tracing::debug!(target: "navkit.gesture", "drag cancelled");
        Some(outcome)
    }

    fn release(&mut self, lock: &mut TransitionLock) {
        if lock.is_soft() {
            lock.release();
        }
        self.phase = GesturePhase::Releasing;
    }

    /// The settle animation finished; allow the next drag.
    pub fn settle(&mut self) {
        self.session = None;
        self.phase = GesturePhase::Inactive;
    }
}
