//! Error taxonomy for display operations
//!
//! Every public session and scheduler operation returns a
//! [`DisplayError`] instead of panicking; the HTTP boundary maps the
//! error kind to a JSON classification.

use thiserror::Error;

/// Errors that can occur while validating input or driving the display
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DisplayError {
    /// Malformed boundary input, rejected before any device I/O
    #[error("invalid order item: {0}")]
    Validation(String),

    /// The port exists but is unavailable to this process
    #[error("permission denied opening port: {0}")]
    PermissionDenied(String),

    /// No display responded on any candidate baud rate
    #[error("could not connect to display on {0}")]
    ConnectionFailed(String),

    /// Operation attempted without an open link
    #[error("not connected to display")]
    NotConnected,

    /// A write failed mid-operation; the link must be re-validated
    #[error("display write failed: {0}")]
    Io(String),

    /// Cancellation wait or dwell ceiling exceeded
    #[error("display operation timed out")]
    Timeout,
}

impl DisplayError {
    /// Stable machine-readable classification used by the boundary
    pub fn kind(&self) -> &'static str {
        match self {
            DisplayError::Validation(_) => "validation",
            DisplayError::PermissionDenied(_) => "permission_denied",
            DisplayError::ConnectionFailed(_) => "connection_failed",
            DisplayError::NotConnected => "not_connected",
            DisplayError::Io(_) => "io",
            DisplayError::Timeout => "timeout",
        }
    }
}
