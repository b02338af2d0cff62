#![forbid(unsafe_code)]

//! Core: screen stack, transition classification, and the animation-progress model.
//!
//! # Role in navkit
//! `navkit-core` holds all navigation state that can be reasoned about without
//! a host: the ordered [`ScreenStack`](stack::ScreenStack), the
//! [`classify`](transition::classify) step that turns a prospective mutation
//! into a [`TransitionState`](transition::TransitionState), the
//! [`TransitionLock`](transition::TransitionLock), the
//! [`AnimationProgressEngine`](engine::AnimationProgressEngine) that drives the
//! [`ProgressVector`](engine::ProgressVector), the drag-to-dismiss
//! [`GestureCoordinator`](gesture::GestureCoordinator), and the pure
//! [`RenderProjector`](projector::RenderProjector).
//!
//! # How it fits in the system
//! The runtime (`navkit-runtime`) owns one instance of each of these, wires
//! them to a UI execution queue and reactive observables, and feeds viewport
//! and keyboard data in from the host. Nothing in this crate keeps global
//! state; every value is constructed and passed explicitly.

pub mod animation;
pub mod color;
pub mod engine;
pub mod geometry;
pub mod gesture;
pub mod projector;
pub mod screen;
pub mod stack;
pub mod transition;

pub use animation::{Animation, ProgressDriver, Spring, TransitionCurve};
pub use color::Rgba;
pub use engine::{AnimationProgressEngine, CurveSet, EnginePhase, EngineTick, ProgressVector};
pub use geometry::{Axis, Insets, KeyboardState, Point, Vector, Viewport};
pub use gesture::{DragContext, DragOutcome, GestureCoordinator, GesturePhase, GestureState};
pub use projector::{
    ProjectionConfig, ProjectionInput, RenderFrame, RenderProjector, RotationAnchor, ScreenRole,
    Violation,
};
pub use screen::{
    BackGesture, BackGestureKind, BackGestureRegion, NavigationConfig, SafeAreaEdges, Screen,
    ScreenEntry, ScreenId,
};
pub use stack::{ScreenStack, StackOp, StackRejection};
pub use transition::{
    AnimationStyle, LockState, TransitionKind, TransitionLock, TransitionState, classify,
};
