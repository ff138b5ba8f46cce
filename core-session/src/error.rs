//! # Session Error Types
//!
//! Errors reported synchronously to callers of the session core. Engine
//! failures that arrive asynchronously are not represented here; those are
//! coerced into `Failed` activity events so that one view's fault cannot
//! crash sibling views sharing the session.

use crate::adapter::ViewId;
use crate::session::SessionId;
use bridge_engine::BridgeError;
use thiserror::Error;

/// Errors surfaced by session operations.
#[derive(Error, Debug)]
pub enum SessionError {
    /// A command was dispatched to a session whose engine was never created
    /// or was already torn down.
    ///
    /// Guards the invariant that an attached view implies a materialized
    /// engine; through the registry API a caller hits `AdapterDetached` or
    /// `UnknownSession` first, so seeing this means the invariant broke.
    #[error("No engine available for session {0}")]
    NoEngineAvailable(SessionId),

    /// The referenced session was torn down and removed.
    #[error("Unknown session: {0}")]
    UnknownSession(SessionId),

    /// The view adapter is no longer attached to its session.
    #[error("View adapter {0} is not attached")]
    AdapterDetached(ViewId),

    /// Volume outside `[0.0, 1.0]`.
    #[error("Invalid volume: {0} (must be between 0.0 and 1.0)")]
    InvalidVolume(f32),

    /// Playback rate outside `[0.25, 4.0]`.
    #[error("Invalid speed: {0} (must be between 0.25 and 4.0)")]
    InvalidSpeed(f32),

    /// A bridge operation failed synchronously.
    #[error("Engine error: {0}")]
    Engine(#[from] BridgeError),

    /// Internal error (should not occur in normal operation).
    #[error("Internal error: {0}")]
    Internal(String),
}

impl SessionError {
    /// Returns `true` when the error is a misuse of the API by the caller
    /// rather than a runtime fault.
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            SessionError::UnknownSession(_)
                | SessionError::AdapterDetached(_)
                | SessionError::InvalidVolume(_)
                | SessionError::InvalidSpeed(_)
        )
    }
}

/// Result type for session operations.
pub type Result<T> = std::result::Result<T, SessionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn caller_error_classification() {
        assert!(SessionError::InvalidVolume(2.0).is_caller_error());
        assert!(SessionError::UnknownSession(SessionId::new("gone")).is_caller_error());
        assert!(!SessionError::NoEngineAvailable(SessionId::new("42")).is_caller_error());
        assert!(!SessionError::Internal("oops".into()).is_caller_error());
    }
}
