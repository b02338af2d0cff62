#![forbid(unsafe_code)]

//! The navigation controller.
//!
//! [`Navigator`] owns one instance of every core component and wires them
//! together on the UI thread:
//!
//! ```text
//!  request ──▶ UiQueue (deferred) ──▶ apply ──▶ classify ──▶ lock + engine
//!                                        │
//!                                        └──▶ BatchScope { stack_changes, top_identity }
//!  tick(dt) ──▶ engine ──Completed──▶ prune render list, release lock, pending root
//!  drag_* ──▶ GestureCoordinator ──Commit/Cancel──▶ engine settles from the drag vector
//!  frames() ──▶ RenderProjector per render-list entry ──▶ RenderSink
//! ```
//!
//! # Invariants
//!
//! 1. At most one transition or drag is in flight; requests arriving while
//!    one is are dropped, except `set_as_root`, which waits for the lock to
//!    clear (latest request wins).
//! 2. The render list equals the stack whenever nothing is in flight. During
//!    a pop it additionally holds the outgoing screen on top.
//! 3. Subscribers observe each applied mutation once, with the stack change
//!    and the top identity already consistent.
//!
//! # Failure Modes
//!
//! Every rejected request is logged at debug under `navkit.stack` and
//! recorded in [`Navigator::last_rejection`]; the caller just sees `false`.
//! A frame the projector cannot compute is drawn as the identity frame and
//! recorded in [`Navigator::last_violation`].
//! A host that stops calling [`Navigator::tick`] stalls navigation with the
//! lock held; there is no timeout.

use std::cell::Cell;
use std::fmt;
use std::time::Duration;

use navkit_core::{
    AnimationProgressEngine, AnimationStyle, CurveSet, DragContext, DragOutcome, EnginePhase,
    EngineTick, GestureCoordinator, GesturePhase, Insets, KeyboardState, LockState, Point,
    ProgressVector, ProjectionInput, RenderFrame, RenderProjector, Rgba, SafeAreaEdges, Screen,
    ScreenEntry, ScreenId, ScreenRole, ScreenStack, StackOp, StackRejection, TransitionKind,
    TransitionLock, TransitionState, Vector, Viewport, Violation, classify,
};
use tracing::{debug, debug_span, trace};

use crate::config::{DispatchMode, NavigatorConfig};
use crate::queue::UiQueue;
use crate::reactive::{BatchScope, Observable, ReadOnly, Subscription};

// ---------------------------------------------------------------------------
// Outputs
// ---------------------------------------------------------------------------

/// Per-screen layout chrome derived from the screen's configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenChrome {
    /// Safe-area (and keyboard) padding the screen should apply.
    pub padding: Insets,
    pub background: Rgba,
    /// Whether the screen should accept input this frame.
    pub interactive: bool,
}

/// One screen to draw this frame, in back-to-front order.
#[derive(Debug, Clone)]
pub struct RenderedScreen {
    pub entry: ScreenEntry,
    pub role: ScreenRole,
    pub frame: RenderFrame,
    pub chrome: ScreenChrome,
}

/// Host rendering of individual screens.
pub trait RenderSink {
    fn draw(&mut self, screen: &dyn Screen, frame: &RenderFrame, chrome: &ScreenChrome);
}

/// Published once per applied stack mutation.
#[derive(Debug, Clone, PartialEq)]
pub struct StackChange {
    /// Increments per published change, starting at 0 for the initial root.
    pub sequence: u64,
    pub old: Vec<ScreenId>,
    pub new: Vec<ScreenId>,
    /// `None` for mutations that bypass transitions.
    pub transition: Option<TransitionState>,
    /// The keyboard was visible; the host should hide it.
    pub dismiss_keyboard: bool,
}

/// A request that did not apply.
#[derive(Debug, Clone, PartialEq)]
pub struct Rejection {
    pub op: &'static str,
    pub reason: StackRejection,
}

// ---------------------------------------------------------------------------
// Navigator
// ---------------------------------------------------------------------------

/// Single-threaded navigation stack controller.
pub struct Navigator {
    config: NavigatorConfig,
    stack: ScreenStack,
    render_list: Vec<ScreenEntry>,
    state: TransitionState,
    lock: TransitionLock,
    engine: AnimationProgressEngine,
    gesture: GestureCoordinator,
    projector: RenderProjector,
    curves: CurveSet,
    queue: UiQueue<StackOp>,
    pending_root: Option<ScreenEntry>,
    last_rejection: Option<Rejection>,
    /// Written by `frames`, which only borrows.
    last_violation: Cell<Option<Violation>>,
    viewport: Viewport,
    keyboard: KeyboardState,
    sequence: u64,
    top: Observable<ScreenId>,
    changes: Observable<StackChange>,
}

impl fmt::Debug for Navigator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Navigator")
            .field("stack", &self.stack.ids())
            .field("state", &self.state)
            .field("lock", &self.lock.state())
            .field("engine", &self.engine.phase())
            .field("gesture", &self.gesture.phase())
            .field("queued", &self.queue.len())
            .finish_non_exhaustive()
    }
}

impl Navigator {
    /// Navigator showing `root`.
    pub fn new(config: NavigatorConfig, root: impl Screen) -> Self {
        Self::with_root_entry(config, ScreenEntry::new(root, AnimationStyle::None))
    }

    /// Navigator showing an already wrapped root.
    pub fn with_root_entry(config: NavigatorConfig, root: ScreenEntry) -> Self {
        let stack = ScreenStack::new(root);
        let ids = stack.ids();
        let top = Observable::new(stack.top().id().clone());
        let changes = Observable::new(StackChange {
            sequence: 0,
            old: ids.clone(),
            new: ids,
            transition: None,
            dismiss_keyboard: false,
        });
        Self {
            engine: AnimationProgressEngine::new()
                .with_scale_factor(config.projection.scale_factor)
                .with_epsilon(config.curves.completion_epsilon),
            gesture: GestureCoordinator::new()
                .with_edge_fraction(config.gesture.edge_fraction)
                .with_scale_factor(config.projection.scale_factor),
            projector: RenderProjector::new(config.projection),
            curves: config.curves.curve_set(),
            render_list: stack.entries().to_vec(),
            stack,
            state: TransitionState::IDLE,
            lock: TransitionLock::new(),
            queue: UiQueue::new(),
            pending_root: None,
            last_rejection: None,
            last_violation: Cell::new(None),
            viewport: Viewport::default(),
            keyboard: KeyboardState::HIDDEN,
            sequence: 0,
            top,
            changes,
            config,
        }
    }

    #[inline]
    pub fn config(&self) -> &NavigatorConfig {
        &self.config
    }

    // -----------------------------------------------------------------------
    // Requests
    // -----------------------------------------------------------------------

    /// Push `screen`, animated with `style` now and again when it is popped.
    pub fn push(&mut self, screen: impl Screen, style: AnimationStyle) -> bool {
        self.push_entry(ScreenEntry::new(screen, style))
    }

    pub fn push_entry(&mut self, entry: ScreenEntry) -> bool {
        self.request(StackOp::Push(entry))
    }

    pub fn pop(&mut self) -> bool {
        self.request(StackOp::Pop)
    }

    /// Pop until `id` is on top. Does nothing if `id` is not on the stack.
    pub fn pop_to(&mut self, id: impl Into<ScreenId>) -> bool {
        self.request(StackOp::PopTo(id.into()))
    }

    pub fn pop_to_root(&mut self) -> bool {
        self.request(StackOp::PopToRoot)
    }

    /// Replace the whole stack with `screen`, without a transition.
    pub fn set_root(&mut self, screen: impl Screen) -> bool {
        self.request(StackOp::SetRoot(ScreenEntry::new(screen, AnimationStyle::None)))
    }

    /// Install `screen` as the root, keeping the screens above it. Waits for
    /// an in-flight transition.
    pub fn set_as_root(&mut self, screen: impl Screen) -> bool {
        self.request(StackOp::ReplaceRoot(ScreenEntry::new(
            screen,
            AnimationStyle::None,
        )))
    }

    fn request(&mut self, op: StackOp) -> bool {
        if self.lock.is_engaged() {
            return self.hold_or_reject(op);
        }
        match self.config.dispatch {
            DispatchMode::Immediate => self.apply(op),
            DispatchMode::Deferred => {
                trace!(target: "navkit.stack", op = op.name(), "request queued");
                self.queue.enqueue_after(self.config.deferred_delay_ticks, op);
                true
            }
        }
    }

    fn hold_or_reject(&mut self, op: StackOp) -> bool {
        match op {
            StackOp::ReplaceRoot(entry) => {
                debug!(
                    target: "navkit.stack",
                    id = %entry.id(),
                    "root replacement held until unlocked"
                );
                self.pending_root = Some(entry);
                true
            }
            other => {
                self.reject(other.name(), StackRejection::Locked);
                false
            }
        }
    }

    fn reject(&mut self, op: &'static str, reason: StackRejection) {
        debug!(target: "navkit.stack", op, %reason, "navigation request dropped");
        self.last_rejection = Some(Rejection { op, reason });
    }

    /// Apply `op` now. The lock is checked again here for queued requests.
    fn apply(&mut self, op: StackOp) -> bool {
        if self.lock.is_engaged() {
            return self.hold_or_reject(op);
        }
        let next = match self.stack.preview(&op) {
            Ok(next) => next,
            Err(reason) => {
                self.reject(op.name(), reason);
                return false;
            }
        };
        let old = match self.stack.apply(&op) {
            Ok(old) => old,
            Err(reason) => {
                self.reject(op.name(), reason);
                return false;
            }
        };
        let old_ids: Vec<ScreenId> = old.iter().map(|e| e.id().clone()).collect();

        // A root swap under an unchanged top has nothing visible to animate.
        let top_kept =
            op.is_replace() && old.last().map(ScreenEntry::id) == Some(self.stack.top().id());
        if op.bypasses_transition() || top_kept {
            self.render_list = self.stack.entries().to_vec();
            self.state = TransitionState::IDLE;
            debug!(
                target: "navkit.stack",
                op = op.name(),
                depth = self.stack.len(),
                "stack reset"
            );
            self.publish(old_ids, None);
            return true;
        }

        let state = classify(&old, &next, op.is_replace());
        self.render_list = render_list_for(state.kind, &old, self.stack.entries());
        self.start_transition(state, None, None);
        self.publish(old_ids, Some(self.state));
        true
    }

    fn start_transition(
        &mut self,
        state: TransitionState,
        carry: Option<ProgressVector>,
        target: Option<ProgressVector>,
    ) {
        let _span = debug_span!(
            target: "navkit.transition",
            "navkit.transition",
            kind = state.kind.as_str(),
            style = state.style.as_str()
        )
        .entered();
        self.lock.engage_transition();
        self.state = state.locked(true);
        if !self.engine.is_idle() {
            self.engine.abort();
        }
        let extent = state.style.offset_extent(&self.viewport);
        self.engine.begin(state.kind, state.style, extent, carry);
        let curve = self.curves.for_style(state.style);
        match target {
            Some(target) => self.engine.reverse_to(target, curve),
            None => self.engine.drive(curve),
        };
    }

    fn publish(&mut self, old: Vec<ScreenId>, transition: Option<TransitionState>) {
        self.sequence += 1;
        let change = StackChange {
            sequence: self.sequence,
            old,
            new: self.stack.ids(),
            transition,
            dismiss_keyboard: self.keyboard.visible,
        };
        if change.dismiss_keyboard {
            debug!(target: "navkit.stack", "keyboard dismissal requested");
        }
        let _batch = BatchScope::new();
        self.changes.set(change);
        self.top.set(self.stack.top().id().clone());
    }

    // -----------------------------------------------------------------------
    // Frame loop
    // -----------------------------------------------------------------------

    /// Apply queued requests, then advance the animation by `dt`.
    pub fn tick(&mut self, dt: Duration) -> EngineTick {
        self.queue.advance();
        self.flush();
        let result = self.engine.tick(dt);
        if result == EngineTick::Completed {
            self.complete();
        }
        result
    }

    /// Apply every ready queued request without advancing time.
    pub fn flush(&mut self) {
        for op in self.queue.drain_ready() {
            self.apply(op);
        }
    }

    fn complete(&mut self) {
        self.engine.finish();
        self.render_list = self.stack.entries().to_vec();
        if self.gesture.phase() == GesturePhase::Releasing {
            self.gesture.settle();
        }
        self.state.locked = false;
        self.lock.release();
        debug!(
            target: "navkit.transition",
            kind = self.state.kind.as_str(),
            style = self.state.style.as_str(),
            depth = self.stack.len(),
            "transition complete"
        );
        if let Some(entry) = self.pending_root.take() {
            self.apply(StackOp::ReplaceRoot(entry));
        }
    }

    // -----------------------------------------------------------------------
    // Gestures
    // -----------------------------------------------------------------------

    /// A drag started at `start`. Returns whether a drag session began.
    pub fn drag_began(&mut self, start: Point) -> bool {
        let top = self.stack.top();
        let ctx = DragContext {
            depth: self.stack.len(),
            back_gesture: top
                .config()
                .back_gesture
                .unwrap_or(self.config.gesture.back_gesture),
            style: top.style(),
            viewport: self.viewport,
        };
        if !self.gesture.begin(start, &ctx, &mut self.lock) {
            return false;
        }
        self.state = TransitionState::new(TransitionKind::Pop, ctx.style).locked(true);
        self.render_list = self.stack.entries().to_vec();
        true
    }

    /// Cumulative drag translation since `drag_began`.
    pub fn drag_moved(&mut self, translation: Vector) -> Option<ProgressVector> {
        self.gesture.update(translation)
    }

    /// The finger lifted: commit the pop or settle back.
    pub fn drag_ended(&mut self) -> Option<DragOutcome> {
        let outcome = self.gesture.end(&mut self.lock)?;
        self.settle_drag(outcome);
        Some(outcome)
    }

    /// The host lost the drag. Settles back like a cancel.
    pub fn drag_cancelled(&mut self) -> Option<DragOutcome> {
        let outcome = self.gesture.cancel(&mut self.lock)?;
        self.settle_drag(outcome);
        Some(outcome)
    }

    fn settle_drag(&mut self, outcome: DragOutcome) {
        let style = self.state.style;
        let vector = outcome.vector();
        if outcome.is_commit() {
            match self.stack.apply(&StackOp::Pop) {
                Ok(old) => {
                    self.render_list =
                        render_list_for(TransitionKind::Pop, &old, self.stack.entries());
                    let state = TransitionState::new(TransitionKind::Pop, style);
                    self.start_transition(state, Some(vector), None);
                    let old_ids = old.iter().map(|e| e.id().clone()).collect();
                    self.publish(old_ids, Some(self.state));
                    return;
                }
                Err(reason) => self.reject("pop", reason),
            }
        }
        // A failed commit has no rest of its own; it settles where a cancel would.
        let rest = outcome.rest().unwrap_or_else(|| {
            ProgressVector::pre(TransitionKind::Pop, style.offset_extent(&self.viewport))
        });
        let state = TransitionState::new(TransitionKind::Pop, style);
        self.start_transition(state, Some(vector), Some(rest));
    }

    // -----------------------------------------------------------------------
    // Host inputs
    // -----------------------------------------------------------------------

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    pub fn set_keyboard(&mut self, keyboard: KeyboardState) {
        self.keyboard = keyboard;
    }

    #[inline]
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    #[inline]
    pub fn keyboard(&self) -> KeyboardState {
        self.keyboard
    }

    // -----------------------------------------------------------------------
    // Rendering
    // -----------------------------------------------------------------------

    /// Visible screens for this frame, back to front.
    pub fn frames(&self) -> Vec<RenderedScreen> {
        let dragging = self.gesture.is_dragging();
        let settled = !dragging && self.engine.is_idle();
        let vector = if dragging {
            self.gesture.vector().unwrap_or_else(|| self.engine.vector())
        } else {
            self.engine.vector()
        };
        let len = self.render_list.len();
        self.render_list
            .iter()
            .enumerate()
            .filter_map(|(index, entry)| {
                let role = ScreenRole::for_index(index, len);
                let input = ProjectionInput {
                    role,
                    state: self.state,
                    vector,
                    viewport: self.viewport,
                    settled,
                };
                let frame = self.projector.try_project(&input).unwrap_or_else(|violation| {
                    self.last_violation.set(Some(violation));
                    violation.fallback()
                });
                frame.is_visible().then(|| RenderedScreen {
                    entry: entry.clone(),
                    role,
                    frame,
                    chrome: self.chrome_for(entry, role == ScreenRole::Front && settled),
                })
            })
            .collect()
    }

    /// Draw this frame's visible screens into `sink`, back to front.
    pub fn render<S: RenderSink + ?Sized>(&self, sink: &mut S) {
        for rendered in self.frames() {
            sink.draw(rendered.entry.screen(), &rendered.frame, &rendered.chrome);
        }
    }

    fn chrome_for(&self, entry: &ScreenEntry, interactive: bool) -> ScreenChrome {
        let config = entry.config();
        let ignored = config.ignored_safe_area;
        let safe = self.viewport.safe_area;
        let inset = |edge: SafeAreaEdges, value: f64| {
            if ignored.contains(edge) { 0.0 } else { value }
        };
        ScreenChrome {
            padding: Insets {
                top: inset(SafeAreaEdges::TOP, safe.top),
                right: inset(SafeAreaEdges::TRAILING, safe.right),
                bottom: inset(
                    SafeAreaEdges::BOTTOM,
                    safe.bottom.max(self.keyboard.occluded_height()),
                ),
                left: inset(SafeAreaEdges::LEADING, safe.left),
            },
            background: config.background.unwrap_or(self.config.background),
            interactive,
        }
    }

    // -----------------------------------------------------------------------
    // Observation
    // -----------------------------------------------------------------------

    /// Identity of the top screen, updated once per applied mutation.
    pub fn top_identity(&self) -> ReadOnly<ScreenId> {
        self.top.read_only()
    }

    /// Every applied mutation.
    pub fn stack_changes(&self) -> ReadOnly<StackChange> {
        self.changes.read_only()
    }

    /// Call `f` whenever `id` becomes the top screen.
    pub fn on_focus(
        &self,
        id: impl Into<ScreenId>,
        f: impl Fn(&ScreenId) + 'static,
    ) -> Subscription {
        let id = id.into();
        self.top.subscribe(move |top| {
            if *top == id {
                f(top);
            }
        })
    }

    pub fn stack_ids(&self) -> Vec<ScreenId> {
        self.stack.ids()
    }

    pub fn top(&self) -> &ScreenEntry {
        self.stack.top()
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Screens currently being rendered, including a screen being popped.
    pub fn render_list(&self) -> &[ScreenEntry] {
        &self.render_list
    }

    pub fn transition_state(&self) -> TransitionState {
        self.state
    }

    pub fn is_locked(&self) -> bool {
        self.lock.is_engaged()
    }

    pub fn lock_state(&self) -> LockState {
        self.lock.state()
    }

    pub fn engine_phase(&self) -> EnginePhase {
        self.engine.phase()
    }

    pub fn gesture_phase(&self) -> GesturePhase {
        self.gesture.phase()
    }

    /// Current progress vector (the drag's while dragging).
    pub fn progress(&self) -> ProgressVector {
        self.gesture
            .vector()
            .filter(|_| self.gesture.is_dragging())
            .unwrap_or_else(|| self.engine.vector())
    }

    /// Root replacement waiting for the lock to clear.
    pub fn pending_root(&self) -> Option<&ScreenId> {
        self.pending_root.as_ref().map(ScreenEntry::id)
    }

    /// Requests waiting on the UI queue.
    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    pub fn last_rejection(&self) -> Option<&Rejection> {
        self.last_rejection.as_ref()
    }

    /// The most recent frame [`frames`](Self::frames) had to degrade.
    pub fn last_violation(&self) -> Option<Violation> {
        self.last_violation.get()
    }
}

/// Push and Replace render the new stack; a pop keeps the outgoing top above it.
/// A replace keeps the outgoing top below the new root.
fn render_list_for(
    kind: TransitionKind,
    old: &[ScreenEntry],
    new: &[ScreenEntry],
) -> Vec<ScreenEntry> {
    let outgoing = old.last().filter(|top| !new.contains(top));
    match (kind, outgoing) {
        (TransitionKind::Pop, Some(top)) => {
            let mut list = new.to_vec();
            list.push(top.clone());
            list
        }
        (TransitionKind::Replace, Some(top)) => {
            let mut list = Vec::with_capacity(new.len() + 1);
            list.push(top.clone());
            list.extend_from_slice(new);
            list
        }
        _ => new.to_vec(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Named(&'static str);
    impl Screen for Named {
        fn identity(&self) -> ScreenId {
            ScreenId::new(self.0)
        }
    }

    fn entry(id: &'static str) -> ScreenEntry {
        ScreenEntry::new(Named(id), AnimationStyle::None)
    }

    fn ids(list: &[ScreenEntry]) -> Vec<&str> {
        list.iter().map(|e| e.id().as_str()).collect()
    }

    #[test]
    fn render_list_shapes() {
        let old = [entry("root"), entry("a"), entry("b")];
        let popped = [entry("root")];
        assert_eq!(
            ids(&render_list_for(TransitionKind::Pop, &old, &popped)),
            ["root", "b"]
        );
        let pushed = [entry("root"), entry("a"), entry("b"), entry("c")];
        assert_eq!(
            ids(&render_list_for(TransitionKind::Push, &old, &pushed)),
            ["root", "a", "b", "c"]
        );
        let replaced = [entry("new")];
        assert_eq!(
            ids(&render_list_for(TransitionKind::Replace, &old, &replaced)),
            ["b", "new"]
        );
        let kept = [entry("b")];
        assert_eq!(
            ids(&render_list_for(TransitionKind::Replace, &old, &kept)),
            ["b"]
        );
    }

    #[test]
    fn chrome_pads_safe_area_and_keyboard() {
        struct Edge;
        impl Screen for Edge {
            fn configure(
                &self,
                config: navkit_core::NavigationConfig,
            ) -> navkit_core::NavigationConfig {
                config
                    .ignores_safe_area(SafeAreaEdges::TOP)
                    .background(Rgba::BLACK)
            }
        }

        let config = NavigatorConfig::default().with_background(Rgba::WHITE);
        let mut nav = Navigator::new(config, Named("root"));
        nav.set_viewport(Viewport::new(390.0, 844.0).with_safe_area(Insets::vertical(40.0)));
        nav.set_keyboard(KeyboardState::shown(300.0));

        let root = nav.chrome_for(nav.top(), true);
        assert_eq!(root.padding.top, 40.0);
        assert_eq!(root.padding.bottom, 300.0);
        assert_eq!(root.background, Rgba::WHITE);

        let edge = ScreenEntry::new(Edge, AnimationStyle::None);
        let chrome = nav.chrome_for(&edge, false);
        assert_eq!(chrome.padding.top, 0.0);
        assert_eq!(chrome.background, Rgba::BLACK);
        assert!(!chrome.interactive);
    }
}
