#![forbid(unsafe_code)]

//! navkit public facade crate.
//!
//! Re-exports the stable surface of `navkit-core` and `navkit-runtime`, the
//! unified [`Error`] taxonomy, and a prelude for host integrations.
//!
//! ```ignore
//! use navkit::prelude::*;
//!
//! struct Home;
//! impl Screen for Home {}
//! struct Detail;
//! impl Screen for Detail {}
//!
//! let mut nav = Navigator::new(NavigatorConfig::default(), Home);
//! nav.push(Detail, AnimationStyle::HorizontalSlide);
//! while nav.is_locked() {
//!     nav.tick(frame_time);
//!     nav.render(&mut sink);
//! }
//! ```

pub mod error;

pub use error::{DegradationAction, Error, Result};

// --- Core re-exports -------------------------------------------------------

pub use navkit_core::color::Rgba;
pub use navkit_core::geometry::{Axis, Insets, KeyboardState, Point, Vector, Viewport};
pub use navkit_core::projector::{
    ProjectionConfig, RenderFrame, RotationAnchor, ScreenRole, Violation,
};
pub use navkit_core::screen::{
    BackGesture, BackGestureKind, BackGestureRegion, NavigationConfig, SafeAreaEdges, Screen,
    ScreenEntry, ScreenId,
};
pub use navkit_core::stack::StackRejection;
pub use navkit_core::transition::{AnimationStyle, LockState, TransitionKind, TransitionState};
pub use navkit_core::{DragOutcome, EngineTick, GesturePhase, ProgressVector};

// --- Runtime re-exports ----------------------------------------------------

pub use navkit_runtime::{
    ConfigError, DispatchMode, Navigator, NavigatorConfig, ReadOnly, Rejection, RenderSink,
    RenderedScreen, ScreenChrome, StackChange, Subscription,
};

// --- Navigator extensions --------------------------------------------------

/// Error-typed views of navigator state.
pub trait NavigatorExt {
    /// The most recent dropped request as an [`Error`].
    fn last_error(&self) -> Option<Error>;

    /// The most recent frame drawn as identity, as an [`Error`].
    fn last_violation_error(&self) -> Option<Error>;

    /// `Ok` if the request was applied, otherwise the reason it was dropped.
    fn check(&self, accepted: bool) -> Result<()>;
}

impl NavigatorExt for Navigator {
    fn last_error(&self) -> Option<Error> {
        self.last_rejection().cloned().map(Error::from)
    }

    fn last_violation_error(&self) -> Option<Error> {
        self.last_violation().map(Error::from)
    }

    fn check(&self, accepted: bool) -> Result<()> {
        match (accepted, self.last_error()) {
            (false, Some(err)) => Err(err),
            _ => Ok(()),
        }
    }
}

/// Load and validate a navigator configuration file, TOML or JSON by extension.
#[cfg(feature = "nav-config")]
pub fn load_config(path: impl AsRef<std::path::Path>) -> Result<NavigatorConfig> {
    let path = path.as_ref();
    let config = match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => NavigatorConfig::from_json_file(path)?,
        _ => NavigatorConfig::from_toml_file(path)?,
    };
    Ok(config.validated()?)
}

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        AnimationStyle, BackGesture, BackGestureRegion, Error, KeyboardState, NavigationConfig,
        Navigator, NavigatorConfig, NavigatorExt, Point, RenderFrame, RenderSink, Result, Rgba,
        SafeAreaEdges, Screen, ScreenChrome, ScreenId, Vector, Viewport,
    };

    pub use crate::{core, runtime};
}

pub use navkit_core as core;
pub use navkit_runtime as runtime;
