//! Error types for the GT06 simulator.
//!
//! Two classes of failure exist in this tool:
//!
//! - **Configuration/codec errors** (`Config`, `InvalidIdentity`,
//!   `FrameTooLarge`): fatal at startup or encode time, never retried.
//! - **Transport errors** (`Connection`, `Io`, `Timeout`): caught at the
//!   session-loop level and answered with a reconnect after a fixed delay.
//!
//! The driver does not distinguish between timeout, reset and refused
//! connection; `is_retryable()` classifies all of them the same way.

use std::time::Duration;
use thiserror::Error;

/// Result type alias for simulator operations.
pub type Result<T, E = SimulatorError> = std::result::Result<T, E>;

/// Main error type for the GT06 simulator.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum SimulatorError {
    #[error("invalid device identity {identity:?}: {reason}")]
    InvalidIdentity { identity: String, reason: &'static str },

    #[error("frame body of {body_len} bytes exceeds the 16-bit length field")]
    FrameTooLarge { body_len: usize },

    #[error("invalid configuration: {reason}")]
    Config { reason: String },

    #[error("failed to connect to {endpoint}: {reason}")]
    Connection {
        endpoint: String,
        reason: String,
        #[source]
        source: Option<std::io::Error>,
    },

    #[error("transport error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("operation timed out after {duration:?}")]
    Timeout { duration: Duration },
}

impl SimulatorError {
    /// Returns whether the session loop should answer this error with a
    /// reconnect attempt.
    pub fn is_retryable(&self) -> bool {
        match self {
            SimulatorError::Connection { .. } => true,
            SimulatorError::Io { .. } => true,
            SimulatorError::Timeout { .. } => true,
            SimulatorError::InvalidIdentity { .. } => false,
            SimulatorError::FrameTooLarge { .. } => false,
            SimulatorError::Config { .. } => false,
        }
    }

    /// Helper constructor for configuration errors.
    pub fn config(reason: impl Into<String>) -> Self {
        SimulatorError::Config { reason: reason.into() }
    }

    /// Helper constructor for connection failures without an I/O source.
    pub fn connection_failed(endpoint: impl Into<String>, reason: impl Into<String>) -> Self {
        SimulatorError::Connection { endpoint: endpoint.into(), reason: reason.into(), source: None }
    }

    /// Helper constructor for connection failures carrying the I/O source.
    pub fn connection_failed_with_source(
        endpoint: impl Into<String>,
        source: std::io::Error,
    ) -> Self {
        SimulatorError::Connection {
            endpoint: endpoint.into(),
            reason: source.to_string(),
            source: Some(source),
        }
    }

    /// Helper constructor for transport errors during send.
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        SimulatorError::Io { context: context.into(), source }
    }
}

impl From<std::io::Error> for SimulatorError {
    fn from(err: std::io::Error) -> Self {
        SimulatorError::Io { context: "socket write".to_string(), source: err }
    }
}
