#![forbid(unsafe_code)]

//! navkit error model and graceful degradation.
//!
//! # Design Principles
//!
//! 1. **Navigation never fails loudly**: a request that cannot apply is
//!    dropped and the screen stays as it was. The error values here exist so
//!    hosts can inspect *why* after the fact.
//! 2. **Only configuration returns `Result`**: loading a
//!    [`NavigatorConfig`](navkit_runtime::NavigatorConfig) is the single
//!    fallible entry point.
//! 3. **Graceful degradation**: every variant maps to a
//!    [`DegradationAction`].

use std::fmt;

use navkit_core::{AnimationStyle, ScreenId, ScreenRole, StackRejection, Violation};
use navkit_runtime::{ConfigError, Rejection};

// ── Unified Error ───────────────────────────────────────────────────────

/// Top-level error type for navkit hosts.
#[derive(Debug)]
pub enum Error {
    /// A visual parameter was requested for a screen or style it does not
    /// apply to. The projector already substituted the identity frame.
    PrerequisiteViolation {
        property: &'static str,
        role: ScreenRole,
        style: AnimationStyle,
    },
    /// A stack mutation did not apply.
    RejectedMutation {
        op: &'static str,
        reason: StackRejection,
    },
    /// A push named a screen already on the stack.
    DuplicateIdentity { id: ScreenId },
    /// Loading or validating navigator configuration failed.
    Config(ConfigError),
}

/// Standard result type for navkit APIs.
pub type Result<T> = std::result::Result<T, Error>;

// ── Graceful Degradation ────────────────────────────────────────────────

/// What the host should do when an error surfaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DegradationAction {
    /// Keep rendering the current stack as is.
    NoVisualChange,
    /// Fall back to `NavigatorConfig::default()`.
    UseDefaults,
}

impl Error {
    pub fn degradation(&self) -> DegradationAction {
        match self {
            Self::PrerequisiteViolation { .. }
            | Self::RejectedMutation { .. }
            | Self::DuplicateIdentity { .. } => DegradationAction::NoVisualChange,
            Self::Config(_) => DegradationAction::UseDefaults,
        }
    }

    /// Error type label for tracing fields.
    pub fn error_type(&self) -> &'static str {
        match self {
            Self::PrerequisiteViolation { .. } => "prerequisite_violation",
            Self::RejectedMutation { .. } => "rejected_mutation",
            Self::DuplicateIdentity { .. } => "duplicate_identity",
            Self::Config(_) => "config",
        }
    }

    /// Every navkit error is recoverable; none requires tearing down the host.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self.degradation(),
            DegradationAction::NoVisualChange | DegradationAction::UseDefaults
        )
    }
}

// ── Display ─────────────────────────────────────────────────────────────

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PrerequisiteViolation {
                property,
                role,
                style,
            } => write!(
                f,
                "{property} does not apply to the {} screen under {}",
                role.as_str(),
                style.as_str()
            ),
            Self::RejectedMutation { op, reason } => write!(f, "{op} rejected: {reason}"),
            Self::DuplicateIdentity { id } => write!(f, "screen {id} is already on the stack"),
            Self::Config(e) => write!(f, "configuration error: {e}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::RejectedMutation { reason, .. } => Some(reason),
            Self::Config(e) => Some(e),
            Self::PrerequisiteViolation { .. } | Self::DuplicateIdentity { .. } => None,
        }
    }
}

// ── Conversions ─────────────────────────────────────────────────────────

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Self::Config(err)
    }
}

impl From<Violation> for Error {
    fn from(violation: Violation) -> Self {
        Self::PrerequisiteViolation {
            property: violation.property,
            role: violation.role,
            style: violation.style,
        }
    }
}

impl From<Rejection> for Error {
    fn from(rejection: Rejection) -> Self {
        match rejection.reason {
            StackRejection::DuplicateIdentity { id } => Self::DuplicateIdentity { id },
            reason => Self::RejectedMutation {
                op: rejection.op,
                reason,
            },
        }
    }
}
