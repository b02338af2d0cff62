//! Integration tests wiring classifier, engine, gesture and projector together.

use std::time::Duration;

use navkit_core::*;

const MS_16: Duration = Duration::from_millis(16);
const VP: Viewport = Viewport::new(390.0, 844.0);

struct Named(&'static str);

impl Screen for Named {
    fn identity(&self) -> ScreenId {
        ScreenId::new(self.0)
    }
}

fn entry(id: &'static str, style: AnimationStyle) -> ScreenEntry {
    ScreenEntry::new(Named(id), style)
}

fn frames(
    projector: &RenderProjector,
    state: TransitionState,
    vector: ProgressVector,
) -> (RenderFrame, RenderFrame) {
    let project = |role| {
        projector.project(&ProjectionInput {
            role,
            state,
            vector,
            viewport: VP,
            settled: false,
        })
    };
    (project(ScreenRole::Front), project(ScreenRole::Back))
}

#[test]
fn horizontal_push_moves_incoming_in_and_outgoing_by_parallax() {
    let mut stack = ScreenStack::new(entry("root", AnimationStyle::None));
    let op = StackOp::Push(entry("detail", AnimationStyle::HorizontalSlide));
    let next = stack.preview(&op).unwrap();
    let state = classify(stack.entries(), &next, op.is_replace()).locked(true);
    assert_eq!(state.kind, TransitionKind::Push);
    assert_eq!(state.style, AnimationStyle::HorizontalSlide);

    let mut lock = TransitionLock::new();
    assert!(lock.engage_transition());
    stack.apply(&op).unwrap();

    let projector = RenderProjector::default();
    let mut engine = AnimationProgressEngine::new();
    let extent = state.style.offset_extent(&VP);
    engine.begin(state.kind, state.style, extent, None);

    let (front, back) = frames(&projector, state, engine.vector());
    assert!((front.offset_x - 390.0).abs() < 1e-9);
    assert!(back.offset_x.abs() < 1e-9);

    engine.drive(CurveSet::default().for_style(state.style));
    let mut ticks = 0;
    while engine.tick(MS_16) != EngineTick::Completed {
        ticks += 1;
        assert!(ticks < 500, "push never converged");
        assert!(lock.is_engaged());
    }
    let (front, back) = frames(&projector, state, engine.vector());
    assert!(front.offset_x.abs() < 1e-9);
    assert!((back.offset_x - -130.0).abs() < 1e-9);

    engine.finish();
    lock.release();
    assert!(lock.is_free());
    assert_eq!(stack.len(), 2);
}

#[test]
fn committed_drag_continues_without_a_jump() {
    let stack_top_style = AnimationStyle::HorizontalSlide;
    let mut lock = TransitionLock::new();
    let mut gesture = GestureCoordinator::new();
    let ctx = DragContext {
        depth: 2,
        back_gesture: BackGesture::drag(),
        style: stack_top_style,
        viewport: VP,
    };
    assert!(gesture.begin(Point::new(10.0, 400.0), &ctx, &mut lock));
    let vector = gesture.update(Vector::new(0.3 * 390.0, 12.0)).unwrap();

    let projector = RenderProjector::default();
    let state = TransitionState::new(TransitionKind::Pop, stack_top_style).locked(true);
    let (front_during, _) = frames(&projector, state, vector);
    assert!((front_during.offset_x - 117.0).abs() < 1e-6);

    let outcome = gesture.end(&mut lock).unwrap();
    assert!(outcome.is_commit());
    assert!(lock.engage_transition());

    let mut engine = AnimationProgressEngine::new();
    engine.begin(
        TransitionKind::Pop,
        stack_top_style,
        stack_top_style.offset_extent(&VP),
        Some(outcome.vector()),
    );
    let (front_handoff, _) = frames(&projector, state, engine.vector());
    assert_eq!(front_during, front_handoff);

    engine.drive(CurveSet::default().for_style(stack_top_style));
    while engine.tick(MS_16) != EngineTick::Completed {}
    let (front, back) = frames(&projector, state, engine.vector());
    assert!((front.offset_x - 390.0).abs() < 1e-9);
    assert!(back.offset_x.abs() < 1e-9);
}

#[test]
fn cancelled_drag_returns_to_rest() {
    let style = AnimationStyle::HorizontalSlide;
    let mut lock = TransitionLock::new();
    let mut gesture = GestureCoordinator::new();
    let ctx = DragContext {
        depth: 2,
        back_gesture: BackGesture::drag(),
        style,
        viewport: VP,
    };
    gesture.begin(Point::default(), &ctx, &mut lock);
    gesture.update(Vector::new(0.05 * 390.0, 0.0));
    let outcome = gesture.end(&mut lock).unwrap();
    assert!(!outcome.is_commit());
    let rest = outcome.rest().expect("cancel carries its rest vector");
    assert_eq!(rest, ProgressVector::pre(TransitionKind::Pop, style.offset_extent(&VP)));

    let mut engine = AnimationProgressEngine::new();
    engine.begin(TransitionKind::Pop, style, style.offset_extent(&VP), Some(outcome.vector()));
    engine.reverse_to(rest, CurveSet::default().for_style(style));
    while engine.tick(MS_16) != EngineTick::Completed {}
    gesture.settle();

    let projector = RenderProjector::default();
    let state = TransitionState::new(TransitionKind::Pop, style).locked(true);
    let (front, _) = frames(&projector, state, engine.vector());
    assert_eq!(front.offset_x, 0.0);
    assert_eq!(front.opacity, 1.0);
}

#[test]
fn every_style_converges() {
    for style in AnimationStyle::ALL {
        for kind in [TransitionKind::Push, TransitionKind::Pop, TransitionKind::Replace] {
            let mut engine = AnimationProgressEngine::new();
            engine.begin(kind, style, style.offset_extent(&VP), None);
            engine.drive(CurveSet::default().for_style(style));
            let mut frames = 0;
            while engine.tick(MS_16) != EngineTick::Completed {
                frames += 1;
                assert!(frames < 500, "{style:?} {kind:?} never converged");
            }
            assert_eq!(engine.vector(), ProgressVector::settled(kind, engine.scale_factor()));
        }
    }
}
