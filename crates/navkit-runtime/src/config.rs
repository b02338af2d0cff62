#![forbid(unsafe_code)]

//! Navigator configuration as data.
//!
//! Every tunable the navigator uses lives in [`NavigatorConfig`]: dispatch
//! mode, projection constants, animation curves, back-gesture defaults and
//! the global background. With the `nav-config` feature it loads from TOML
//! or JSON:
//!
//! ```toml
//! dispatch = "deferred"
//! background = "#ffffff"  # or { r = 255, g = 255, b = 255, a = 255 }
//!
//! [projection]
//! parallax = 0.25
//!
//! [curves]
//! cube_duration_ms = 400
//!
//! [gesture.back_gesture]
//! kind = "drag"
//! threshold = 0.2
//! ```
//!
//! ```rust,ignore
//! let config = NavigatorConfig::from_toml_file("navkit.toml")?.validated()?;
//! ```
//!
//! # Defaults
//!
//! `NavigatorConfig::default()` reproduces the stock feel: scale factor
//! 0.46, parallax 1/3, cube perspective 0.52 in landscape and 1.0 in
//! portrait, a critically damped spring with a 0.4s response, a 0.52s
//! ease-out cube, and no back gesture.

use std::fmt;
use std::time::Duration;
#[cfg(feature = "nav-config")]
use std::path::Path;

#[cfg(feature = "nav-config")]
use serde::{Deserialize, Serialize};

use navkit_core::animation::TransitionCurve;
use navkit_core::gesture::DEFAULT_EDGE_FRACTION;
use navkit_core::{BackGesture, CurveSet, ProjectionConfig, Rgba};

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

/// When navigation requests are applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "nav-config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "nav-config", serde(rename_all = "snake_case"))]
pub enum DispatchMode {
    /// Applied during the call.
    #[default]
    Immediate,
    /// Queued and applied on the next `tick` or `flush`.
    Deferred,
}

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

/// Animation curve parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "nav-config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "nav-config", serde(default))]
pub struct CurveConfig {
    /// Spring stiffness for Dissolve, Scale and slides.
    pub spring_stiffness: f64,
    /// Spring damping for Dissolve, Scale and slides.
    pub spring_damping: f64,
    /// CubeRotation ease-out duration.
    pub cube_duration_ms: u64,
    /// Opacity tolerance for detecting completion.
    pub completion_epsilon: f64,
}

impl Default for CurveConfig {
    fn default() -> Self {
        let (spring_stiffness, spring_damping) =
            match TransitionCurve::critically_damped(Duration::from_millis(400)) {
                TransitionCurve::Spring { stiffness, damping } => (stiffness, damping),
                _ => (246.74, 31.42),
            };
        Self {
            spring_stiffness,
            spring_damping,
            cube_duration_ms: 520,
            completion_epsilon: 1e-3,
        }
    }
}

impl CurveConfig {
    /// Curves for the engine.
    pub fn curve_set(&self) -> CurveSet {
        CurveSet {
            spring: TransitionCurve::Spring {
                stiffness: self.spring_stiffness,
                damping: self.spring_damping,
            },
            cube: TransitionCurve::ease_out(Duration::from_millis(self.cube_duration_ms)),
        }
    }
}

/// Back-gesture defaults.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "nav-config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "nav-config", serde(default))]
pub struct GestureConfig {
    /// Used for screens that do not configure their own.
    pub back_gesture: BackGesture,
    /// Width of the activation band for edge-only drags, as a fraction of the extent.
    pub edge_fraction: f64,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            back_gesture: BackGesture::default(),
            edge_fraction: DEFAULT_EDGE_FRACTION,
        }
    }
}

// ---------------------------------------------------------------------------
// NavigatorConfig
// ---------------------------------------------------------------------------

/// Everything a [`Navigator`](crate::Navigator) can be tuned with.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "nav-config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "nav-config", serde(default))]
pub struct NavigatorConfig {
    pub dispatch: DispatchMode,
    /// Extra ticks a deferred request waits on the queue.
    pub deferred_delay_ticks: u32,
    pub projection: ProjectionConfig,
    pub curves: CurveConfig,
    pub gesture: GestureConfig,
    /// Background for screens that do not set their own.
    pub background: Rgba,
}

impl Default for NavigatorConfig {
    fn default() -> Self {
        Self {
            dispatch: DispatchMode::Immediate,
            deferred_delay_ticks: 0,
            projection: ProjectionConfig::default(),
            curves: CurveConfig::default(),
            gesture: GestureConfig::default(),
            background: Rgba::TRANSPARENT,
        }
    }
}

impl NavigatorConfig {
    /// Set the dispatch mode (builder pattern).
    #[must_use]
    pub fn with_dispatch(mut self, dispatch: DispatchMode) -> Self {
        self.dispatch = dispatch;
        self
    }

    /// Set the global background (builder pattern).
    #[must_use]
    pub fn with_background(mut self, background: Rgba) -> Self {
        self.background = background;
        self
    }

    /// Set the default back gesture (builder pattern).
    #[must_use]
    pub fn with_back_gesture(mut self, back_gesture: BackGesture) -> Self {
        self.gesture.back_gesture = back_gesture;
        self
    }

    /// Load from a TOML string.
    #[cfg(feature = "nav-config")]
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(ConfigError::Toml)
    }

    /// Load from a TOML file on disk.
    #[cfg(feature = "nav-config")]
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_toml_str(&content)
    }

    /// Load from a JSON string.
    #[cfg(feature = "nav-config")]
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(s).map_err(ConfigError::Json)
    }

    /// Load from a JSON file on disk.
    #[cfg(feature = "nav-config")]
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_json_str(&content)
    }

    /// Serialize to a TOML string.
    #[cfg(feature = "nav-config")]
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string(self).map_err(ConfigError::TomlSerialize)
    }

    /// Check every parameter. An empty list means the config is valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = self.projection.validate();

        let curves = &self.curves;
        if !curves.spring_stiffness.is_finite() || curves.spring_stiffness <= 0.0 {
            errors.push(format!(
                "curves.spring_stiffness must be > 0, got {}",
                curves.spring_stiffness
            ));
        }
        if !curves.spring_damping.is_finite() || curves.spring_damping <= 0.0 {
            errors.push(format!(
                "curves.spring_damping must be > 0, got {}",
                curves.spring_damping
            ));
        }
        if !curves.completion_epsilon.is_finite() || curves.completion_epsilon <= 0.0 {
            errors.push(format!(
                "curves.completion_epsilon must be > 0, got {}",
                curves.completion_epsilon
            ));
        }

        let gesture = &self.gesture;
        if !(0.0..=1.0).contains(&gesture.back_gesture.threshold) {
            errors.push(format!(
                "gesture.back_gesture.threshold must be in [0, 1], got {}",
                gesture.back_gesture.threshold
            ));
        }
        if !(0.0..=1.0).contains(&gesture.edge_fraction) {
            errors.push(format!(
                "gesture.edge_fraction must be in [0, 1], got {}",
                gesture.edge_fraction
            ));
        }

        errors
    }

    /// `self` if valid, otherwise [`ConfigError::Validation`].
    pub fn validated(self) -> Result<Self, ConfigError> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(self)
        } else {
            Err(ConfigError::Validation(errors))
        }
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors loading or validating a [`NavigatorConfig`].
#[derive(Debug)]
pub enum ConfigError {
    /// I/O error reading a file.
    Io(std::io::Error),
    /// TOML parse error.
    #[cfg(feature = "nav-config")]
    Toml(toml::de::Error),
    /// TOML serialization error.
    #[cfg(feature = "nav-config")]
    TomlSerialize(toml::ser::Error),
    /// JSON parse error.
    #[cfg(feature = "nav-config")]
    Json(serde_json::Error),
    /// Parameters out of range.
    Validation(Vec<String>),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            #[cfg(feature = "nav-config")]
            Self::Toml(e) => write!(f, "TOML parse error: {e}"),
            #[cfg(feature = "nav-config")]
            Self::TomlSerialize(e) => write!(f, "TOML serialize error: {e}"),
            #[cfg(feature = "nav-config")]
            Self::Json(e) => write!(f, "JSON parse error: {e}"),
            Self::Validation(errors) => write!(f, "validation errors: {}", errors.join("; ")),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            #[cfg(feature = "nav-config")]
            Self::Toml(e) => Some(e),
            #[cfg(feature = "nav-config")]
            Self::TomlSerialize(e) => Some(e),
            #[cfg(feature = "nav-config")]
            Self::Json(e) => Some(e),
            Self::Validation(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = NavigatorConfig::default();
        assert!(config.validate().is_empty(), "{:?}", config.validate());
        assert_eq!(config.dispatch, DispatchMode::Immediate);
        assert_eq!(config.background, Rgba::TRANSPARENT);
        assert!(!config.gesture.back_gesture.permits_drag());
    }

    #[test]
    fn default_spring_matches_response() {
        let curves = CurveConfig::default();
        assert!((curves.spring_stiffness - 246.74).abs() < 0.01);
        assert!((curves.spring_damping - 31.42).abs() < 0.01);
    }

    #[test]
    fn validate_collects_every_problem() {
        let mut config = NavigatorConfig::default();
        config.curves.spring_stiffness = 0.0;
        config.curves.completion_epsilon = -1.0;
        config.gesture.edge_fraction = 3.0;
        config.projection.parallax = -0.5;
        let errors = config.validate();
        assert!(errors.iter().any(|e| e.contains("curves.spring_stiffness")));
        assert!(errors.iter().any(|e| e.contains("curves.completion_epsilon")));
        assert!(errors.iter().any(|e| e.contains("gesture.edge_fraction")));
        assert!(errors.iter().any(|e| e.contains("projection.parallax")));
    }

    #[test]
    fn validated_wraps_errors() {
        let mut config = NavigatorConfig::default();
        config.curves.spring_damping = f64::NAN;
        let err = config.validated().unwrap_err();
        assert!(matches!(err, ConfigError::Validation(ref e) if e.len() == 1));
        assert!(err.to_string().contains("spring_damping"));
    }

    #[test]
    fn curve_set_uses_config() {
        let config = CurveConfig {
            cube_duration_ms: 0,
            ..CurveConfig::default()
        };
        let set = config.curve_set();
        assert!(matches!(
            set.cube.driver(),
            navkit_core::ProgressDriver::Instant { .. }
        ));
    }
}
