//! Error kinds shared across the PoCW pipeline.
//!
//! Individual crates may wrap these in their own richer error enums, but
//! cross-crate boundaries (ports) speak `PocwError` so a validator or the
//! lifecycle engine can map upstream failures uniformly.

use thiserror::Error;

/// Error kinds common to verification, lifecycle, and validator processing.
#[derive(Debug, Clone, Error)]
pub enum PocwError {
    /// Payload failed a structural/schema check.
    #[error("validation failed: {0}")]
    Validation(String),

    /// A retryable network failure talking to an upstream (429, timeout, connection reset).
    #[error("transient upstream error: {0}")]
    TransientUpstream(String),

    /// A non-retryable 4xx (other than 429) from an upstream.
    #[error("permanent upstream error: {0}")]
    PermanentUpstream(String),

    /// A validator observed a VLC that does not strictly extend its mirror.
    #[error("causality violation: {0}")]
    CausalityViolation(String),

    /// An `event_id` has already been processed by this validator.
    #[error("replay rejected: event {0} already processed")]
    ReplayRejected(String),

    /// A deadline (poll budget, request timeout) elapsed.
    #[error("timeout: {0}")]
    Timeout(String),

    /// A signature failed to verify.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Anything else — should be rare and always logged.
    #[error("internal error: {0}")]
    Internal(String),
}

impl PocwError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}
