#![forbid(unsafe_code)]

//! Type-erased screens and their per-screen configuration.
//!
//! Hosts implement [`Screen`] for each kind of navigable content. The stack
//! stores them as `Rc<dyn Screen>` inside a [`ScreenEntry`], next to the
//! [`AnimationStyle`] that brought the screen in. Identity is the only thing
//! the core ever compares.

use std::any::Any;
use std::fmt;
use std::rc::Rc;

use bitflags::bitflags;

use crate::color::Rgba;
use crate::transition::AnimationStyle;

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// Stable identity of a screen. Two entries with the same id are the same screen.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScreenId(Rc<str>);

impl ScreenId {
    /// Create an id from any string.
    pub fn new(id: impl AsRef<str>) -> Self {
        Self(Rc::from(id.as_ref()))
    }

    /// Id derived from a type: the last path segment of its type name.
    ///
    /// `my_app::screens::Detail` becomes `"Detail"`; generic arguments are kept.
    #[must_use]
    pub fn of<T: ?Sized>() -> Self {
        Self::new(short_type_name(std::any::type_name::<T>()))
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn short_type_name(full: &str) -> &str {
    let head = full.split('<').next().unwrap_or(full);
    let start = head.rfind("::").map_or(0, |i| i + 2);
    &full[start..]
}

impl fmt::Debug for ScreenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ScreenId({:?})", &*self.0)
    }
}

impl fmt::Display for ScreenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ScreenId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ScreenId {
    fn from(value: String) -> Self {
        Self(Rc::from(value))
    }
}

impl PartialEq<str> for ScreenId {
    fn eq(&self, other: &str) -> bool {
        &*self.0 == other
    }
}

impl PartialEq<&str> for ScreenId {
    fn eq(&self, other: &&str) -> bool {
        &*self.0 == *other
    }
}

// ---------------------------------------------------------------------------
// Per-screen configuration
// ---------------------------------------------------------------------------

bitflags! {
    /// Safe-area edges a screen extends into instead of padding away.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct SafeAreaEdges: u8 {
        const TOP      = 0b0001;
        const BOTTOM   = 0b0010;
        const LEADING  = 0b0100;
        const TRAILING = 0b1000;
        const VERTICAL = Self::TOP.bits() | Self::BOTTOM.bits();
        const ALL      = 0b1111;
    }
}

/// Whether the top screen can be dragged away.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum BackGestureKind {
    /// Only programmatic pops.
    #[default]
    None,
    /// Drag-to-dismiss.
    Drag,
}

/// Where a back drag may start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum BackGestureRegion {
    /// Within a band along the leading edge of the drag axis.
    Edge,
    /// Anywhere on the screen.
    #[default]
    Anywhere,
}

/// Back-gesture settings for a screen.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BackGesture {
    pub kind: BackGestureKind,
    /// Fraction of the viewport extent a drag must exceed to commit the pop.
    pub threshold: f64,
    pub region: BackGestureRegion,
}

impl Default for BackGesture {
    fn default() -> Self {
        Self {
            kind: BackGestureKind::None,
            threshold: 0.1,
            region: BackGestureRegion::Anywhere,
        }
    }
}

impl BackGesture {
    /// Drag-to-dismiss with the default threshold.
    #[must_use]
    pub fn drag() -> Self {
        Self {
            kind: BackGestureKind::Drag,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn threshold(mut self, threshold: f64) -> Self {
        self.threshold = if threshold.is_finite() {
            threshold.clamp(0.0, 1.0)
        } else {
            Self::default().threshold
        };
        self
    }

    #[must_use]
    pub fn region(mut self, region: BackGestureRegion) -> Self {
        self.region = region;
        self
    }

    #[inline]
    pub fn permits_drag(&self) -> bool {
        matches!(self.kind, BackGestureKind::Drag)
    }
}

/// Per-screen overrides, built by [`Screen::configure`].
///
/// Every field left unset falls back to the navigator-wide configuration.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct NavigationConfig {
    pub background: Option<Rgba>,
    pub ignored_safe_area: SafeAreaEdges,
    pub back_gesture: Option<BackGesture>,
}

impl NavigationConfig {
    /// Change the background color of this screen.
    #[must_use]
    pub fn background(mut self, color: Rgba) -> Self {
        self.background = Some(color);
        self
    }

    /// Lay out into the given safe-area edges.
    #[must_use]
    pub fn ignores_safe_area(mut self, edges: SafeAreaEdges) -> Self {
        self.ignored_safe_area |= edges;
        self
    }

    /// Change how this screen can be dismissed by dragging.
    #[must_use]
    pub fn back_gesture(mut self, gesture: BackGesture) -> Self {
        self.back_gesture = Some(gesture);
        self
    }
}

// ---------------------------------------------------------------------------
// Screen trait
// ---------------------------------------------------------------------------

/// Navigable content.
///
/// Only [`identity`](Screen::identity) matters to the core. The host recovers
/// its concrete type for rendering through [`downcast_ref`](dyn Screen::downcast_ref).
pub trait Screen: Any {
    /// Stable identity. Defaults to the short name of the implementing type.
    fn identity(&self) -> ScreenId {
        ScreenId::of::<Self>()
    }

    /// Adjust the per-screen configuration.
    fn configure(&self, config: NavigationConfig) -> NavigationConfig {
        config
    }
}

impl dyn Screen {
    /// Recover the concrete screen type.
    pub fn downcast_ref<T: Screen>(&self) -> Option<&T> {
        (self as &dyn Any).downcast_ref::<T>()
    }

    /// Whether the concrete type is `T`.
    pub fn is<T: Screen>(&self) -> bool {
        (self as &dyn Any).is::<T>()
    }
}

// ---------------------------------------------------------------------------
// Entry
// ---------------------------------------------------------------------------

/// A screen in the stack plus the style that brought it in.
#[derive(Clone)]
pub struct ScreenEntry {
    id: ScreenId,
    screen: Rc<dyn Screen>,
    style: AnimationStyle,
}

impl ScreenEntry {
    /// Wrap a screen. The identity is read once and cached.
    pub fn new(screen: impl Screen, style: AnimationStyle) -> Self {
        Self::from_rc(Rc::new(screen), style)
    }

    /// Wrap an already shared screen.
    pub fn from_rc(screen: Rc<dyn Screen>, style: AnimationStyle) -> Self {
        Self {
            id: screen.identity(),
            screen,
            style,
        }
    }

    #[inline]
    pub fn id(&self) -> &ScreenId {
        &self.id
    }

    /// The style requested when this entry was pushed; reused when it is popped.
    #[inline]
    pub fn style(&self) -> AnimationStyle {
        self.style
    }

    #[inline]
    pub fn screen(&self) -> &dyn Screen {
        &*self.screen
    }

    /// Resolved per-screen configuration.
    pub fn config(&self) -> NavigationConfig {
        self.screen.configure(NavigationConfig::default())
    }
}

impl PartialEq for ScreenEntry {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ScreenEntry {}

impl fmt::Debug for ScreenEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScreenEntry")
            .field("id", &self.id)
            .field("style", &self.style)
            .finish_non_exhaustive()
    }
}
