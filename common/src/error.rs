//! Error taxonomy for the engine.
//!
//! Every failure crossing the crate boundary is one of these kinds. Storage
//! collaborator errors are mapped (and logged) before surfacing so the
//! external contract stays stable under storage-engine changes.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// Client-caused, non-retryable input problem. The message is specific
    /// enough to fix the request and exposes no internal state.
    #[error("{0}")]
    Validation(String),

    /// The email already has a submission. Reported distinctly so the client
    /// can render a specific message.
    #[error("this email has already submitted predictions")]
    DuplicateEmail,

    /// Missing, invalid, or expired admin credentials. Reported uniformly
    /// regardless of which check failed.
    #[error("invalid or expired admin credentials")]
    Unauthorized,

    /// The storage collaborator could not be reached or a query failed.
    /// Retryable by the caller; the detail is for server-side logs only.
    #[error("storage unavailable: {0}")]
    Storage(String),
}

impl EngineError {
    pub fn validation(message: impl Into<String>) -> Self {
        EngineError::Validation(message.into())
    }

    pub fn storage(detail: impl Into<String>) -> Self {
        EngineError::Storage(detail.into())
    }
}
