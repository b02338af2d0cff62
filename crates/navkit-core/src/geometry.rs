#![forbid(unsafe_code)]

//! Geometric primitives in host layout units.
//!
//! All offsets produced by the projector are expressed in the same units as
//! [`Viewport`] dimensions, so interpolation is resolution independent.

/// A point in viewport coordinates (origin top-left).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[inline]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A translation, e.g. the cumulative movement of a drag.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vector {
    pub dx: f64,
    pub dy: f64,
}

impl Vector {
    #[inline]
    pub const fn new(dx: f64, dy: f64) -> Self {
        Self { dx, dy }
    }

    /// Component along `axis`.
    #[inline]
    pub fn along(self, axis: Axis) -> f64 {
        match axis {
            Axis::Horizontal => self.dx,
            Axis::Vertical => self.dy,
        }
    }
}

/// The axis a transition or drag moves along.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    Horizontal,
    Vertical,
}

/// Insets for safe areas and padding.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Insets {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Insets {
    /// No insets.
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0, 0.0);

    /// Create insets with specific values.
    #[inline]
    pub const fn new(top: f64, right: f64, bottom: f64, left: f64) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }

    /// Equal insets on every side.
    #[inline]
    pub const fn all(val: f64) -> Self {
        Self::new(val, val, val, val)
    }

    /// Top and bottom only.
    #[inline]
    pub const fn vertical(val: f64) -> Self {
        Self::new(val, 0.0, val, 0.0)
    }
}

/// Current viewport as measured by the host.
///
/// `width` and `height` include the safe-area insets: screens are laid out
/// edge to edge and pad themselves unless they opt out.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
    pub safe_area: Insets,
}

impl Viewport {
    /// Viewport without safe-area insets.
    #[inline]
    pub const fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            safe_area: Insets::ZERO,
        }
    }

    /// Set safe-area insets (builder pattern).
    #[must_use]
    pub const fn with_safe_area(mut self, safe_area: Insets) -> Self {
        self.safe_area = safe_area;
        self
    }

    /// Length of the viewport along `axis`.
    #[inline]
    pub fn extent(&self, axis: Axis) -> f64 {
        match axis {
            Axis::Horizontal => self.width,
            Axis::Vertical => self.height,
        }
    }

    #[inline]
    pub fn is_landscape(&self) -> bool {
        self.width > self.height
    }

    /// Whether either dimension is zero or not finite.
    #[inline]
    pub fn is_degenerate(&self) -> bool {
        !(self.width.is_finite() && self.height.is_finite())
            || self.width <= 0.0
            || self.height <= 0.0
    }
}

/// Software keyboard visibility as reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct KeyboardState {
    pub visible: bool,
    pub height: f64,
}

impl KeyboardState {
    /// Keyboard hidden.
    pub const HIDDEN: Self = Self {
        visible: false,
        height: 0.0,
    };

    /// Keyboard shown with the given height.
    #[inline]
    pub const fn shown(height: f64) -> Self {
        Self {
            visible: true,
            height,
        }
    }

    /// Height that content must avoid, zero when hidden.
    #[inline]
    pub fn occluded_height(&self) -> f64 {
        if self.visible {
            self.height.max(0.0)
        } else {
            0.0
        }
    }
}
