#![no_main]

use std::time::Duration;

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use navkit_core::{
    AnimationStyle, BackGesture, Point, Screen, ScreenId, Vector, Viewport,
};
use navkit_runtime::{DispatchMode, Navigator, NavigatorConfig};

struct Named(u8);

impl Screen for Named {
    fn identity(&self) -> ScreenId {
        ScreenId::new(format!("s{}", self.0 % 8))
    }
}

#[derive(Debug, Arbitrary)]
enum Input {
    Push(u8, u8),
    Pop,
    PopTo(u8),
    PopToRoot,
    SetAsRoot(u8),
    Tick(u8),
    DragBegan(i16, i16),
    DragMoved(i16, i16),
    DragEnded,
    DragCancelled,
    Resize(u16, u16),
}

#[derive(Debug, Arbitrary)]
struct Session {
    deferred: bool,
    inputs: Vec<Input>,
}

fuzz_target!(|session: Session| {
    let dispatch = if session.deferred {
        DispatchMode::Deferred
    } else {
        DispatchMode::Immediate
    };
    let config = NavigatorConfig::default()
        .with_dispatch(dispatch)
        .with_back_gesture(BackGesture::drag());
    let mut nav = Navigator::new(config, Named(0));
    nav.set_viewport(Viewport::new(390.0, 844.0));

    for input in session.inputs.into_iter().take(512) {
        match input {
            Input::Push(n, style) => {
                let style = AnimationStyle::ALL[usize::from(style) % AnimationStyle::ALL.len()];
                nav.push(Named(n), style);
            }
            Input::Pop => {
                nav.pop();
            }
            Input::PopTo(n) => {
                nav.pop_to(format!("s{}", n % 8));
            }
            Input::PopToRoot => {
                nav.pop_to_root();
            }
            Input::SetAsRoot(n) => {
                nav.set_as_root(Named(n));
            }
            Input::Tick(ms) => {
                nav.tick(Duration::from_millis(u64::from(ms)));
            }
            Input::DragBegan(x, y) => {
                nav.drag_began(Point::new(f64::from(x), f64::from(y)));
            }
            Input::DragMoved(dx, dy) => {
                nav.drag_moved(Vector::new(f64::from(dx), f64::from(dy)));
            }
            Input::DragEnded => {
                nav.drag_ended();
            }
            Input::DragCancelled => {
                nav.drag_cancelled();
            }
            Input::Resize(w, h) => nav.set_viewport(Viewport::new(f64::from(w), f64::from(h))),
        }

        // Post-conditions that must always hold:
        let ids = nav.stack_ids();
        assert!(!ids.is_empty(), "stack emptied");
        for (i, id) in ids.iter().enumerate() {
            assert!(!ids[i + 1..].contains(id), "duplicate identity {id}");
        }
        assert!(nav.render_list().len() <= ids.len() + 1);
        assert_eq!(nav.transition_state().locked, nav.is_locked());
        for rendered in nav.frames() {
            let frame = rendered.frame;
            assert!(frame.opacity.is_finite() && (0.0..=1.0).contains(&frame.opacity));
            assert!(frame.offset_x.is_finite() && frame.offset_y.is_finite());
            assert!(frame.scale.is_finite() && frame.scale >= 0.0);
        }
    }
});
