#![forbid(unsafe_code)]

//! navkit runtime
//!
//! This crate ties the pure models of `navkit-core` into a single-threaded
//! navigation controller a host UI can drive.
//!
//! # Key Components
//!
//! - [`Navigator`] - owns the stack, lock, engine and gesture coordinator
//! - [`NavigatorConfig`] - tuning, optionally loaded from TOML/JSON (`nav-config`)
//! - [`UiQueue`] - explicit UI queue for deferred requests
//! - [`Observable`] / [`BatchScope`] - reactive outputs observed atomically
//! - [`RenderSink`] - where per-screen frames go
//!
//! # How it fits in the system
//! The host forwards frame ticks, drag events, viewport and keyboard changes
//! into the [`Navigator`] and draws whatever [`Navigator::frames`] returns.
//! Everything runs on the thread that created the navigator; the reactive
//! types are `Rc`-based and not `Send`.

pub mod config;
pub mod navigator;
pub mod queue;
pub mod reactive;

pub use config::{ConfigError, CurveConfig, DispatchMode, GestureConfig, NavigatorConfig};
pub use navigator::{Navigator, Rejection, RenderSink, RenderedScreen, ScreenChrome, StackChange};
pub use queue::UiQueue;
pub use reactive::{BatchScope, Observable, ReadOnly, Subscription};
