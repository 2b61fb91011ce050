//! Error types for the rendezvous runtime
//!
//! Collaborator failures (row store, number prompt), protocol failures
//! surfaced by the coordinator, and runtime errors.

use thiserror::Error;

use crate::protocol::Role;

/// Primary error type for all rendezvous operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RendezvousError {
    // ========== Collaborator Errors ==========

    /// Rows could not be loaded from the source
    #[error("Row source {path} unavailable: {reason}")]
    SourceUnavailable { path: String, reason: String },

    /// Rows could not be persisted to the sink
    #[error("Row sink {path} unavailable: {reason}")]
    SinkUnavailable { path: String, reason: String },

    /// Prompt answer is not an integer
    #[error("Invalid input {input:?}: expected an integer")]
    InvalidInput { input: String },

    /// Source line is not `first,last,age`
    #[error("Malformed row at line {line}: {reason}")]
    MalformedRow { line: usize, reason: String },

    // ========== Protocol Errors ==========

    /// A worker answered a request with a failure
    #[error("{role} failed: {reason}")]
    WorkerFailed { role: Role, reason: String },

    /// Coordinator task ended without producing a report
    #[error("Coordinator stopped before terminating")]
    CoordinatorStopped,

    // ========== Runtime Errors ==========

    /// Internal error
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl RendezvousError {
    /// Returns true if this error originated in a row store or prompt
    pub fn is_collaborator(&self) -> bool {
        matches!(
            self,
            RendezvousError::SourceUnavailable { .. }
                | RendezvousError::SinkUnavailable { .. }
                | RendezvousError::InvalidInput { .. }
                | RendezvousError::MalformedRow { .. }
        )
    }
}

/// Result type alias for rendezvous operations
pub type Result<T> = std::result::Result<T, RendezvousError>;
