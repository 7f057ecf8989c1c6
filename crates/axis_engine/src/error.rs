//! Error types for the axis engine

use thiserror::Error;

/// Errors that can occur when computing axis layouts or mutating a viewport
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AxisError {
    /// A value, range or pixel extent outside the domain the engine accepts
    #[error("Domain error: {0}")]
    Domain(String),

    /// Domain bounds that are half-defined or inverted
    #[error("Invalid bounds: {0}")]
    InvalidBounds(String),

    /// Operation that needs domain bounds on an unbounded viewport
    #[error("Viewport is unbounded: {0} requires domain bounds")]
    Unbounded(&'static str),

    /// Date arithmetic left the representable calendar range
    #[error("Calendar error: {0}")]
    Calendar(String),

    /// Configuration could not be parsed or is inconsistent
    #[error("Configuration error: {0}")]
    Config(String),
}

impl AxisError {
    pub(crate) fn domain(message: impl Into<String>) -> Self {
        AxisError::Domain(message.into())
    }
}

impl From<serde_json::Error> for AxisError {
    fn from(err: serde_json::Error) -> Self {
        AxisError::Config(err.to_string())
    }
}

/// Result type for axis operations
pub type AxisResult<T> = Result<T, AxisError>;

/// Reject NaN and infinities with a message naming the offending input.
pub(crate) fn ensure_finite(name: &str, value: f64) -> AxisResult<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(AxisError::Domain(format!("{name} must be finite, got {value}")))
    }
}
