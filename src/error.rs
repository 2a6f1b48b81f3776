//! Error types for Calibrar operations.
//!
//! Only structural faults are errors: a layer path that no longer resolves,
//! a target without calibratable parameters, or a hook that a forward pass
//! never reached. Recoverable calibration conditions (non-convergence,
//! degenerate statistics) are reported as values on
//! [`LayerReport`](crate::lsuv::LayerReport) instead.

use std::fmt;

use crate::lsuv::LayerPath;

/// Main error type for Calibrar operations.
///
/// # Examples
///
/// ```
/// use calibrar::error::CalibrarError;
/// use calibrar::lsuv::LayerPath;
///
/// let err = CalibrarError::NoSuchLayer {
///     path: LayerPath::new(vec![3, 0]),
/// };
/// assert!(err.to_string().contains("root.3.0"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CalibrarError {
    /// A layer path does not resolve to any node in the model tree.
    NoSuchLayer {
        /// The path that failed to resolve
        path: LayerPath,
    },

    /// The addressed layer exposes no calibration site (no mutable weight).
    NotCalibratable {
        /// Path of the offending layer
        path: LayerPath,
    },

    /// A forward pass completed without reaching the statistics hook, so the
    /// recorded statistics would be stale.
    HookNotFired {
        /// Path the hook was attached to
        path: LayerPath,
    },

    /// Generic error with string message.
    Other(String),
}

impl fmt::Display for CalibrarError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CalibrarError::NoSuchLayer { path } => {
                write!(f, "no layer at path {path}")
            }
            CalibrarError::NotCalibratable { path } => {
                write!(f, "layer at {path} exposes no calibratable parameters")
            }
            CalibrarError::HookNotFired { path } => {
                write!(
                    f,
                    "forward pass did not reach the hook at {path}; statistics would be stale"
                )
            }
            CalibrarError::Other(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for CalibrarError {}

impl From<&str> for CalibrarError {
    fn from(msg: &str) -> Self {
        CalibrarError::Other(msg.to_string())
    }
}

impl From<String> for CalibrarError {
    fn from(msg: String) -> Self {
        CalibrarError::Other(msg)
    }
}

/// Convenience type alias for Results.
pub type Result<T> = std::result::Result<T, CalibrarError>;
