//! Errors a validator can return for a single `/api/v1/validate` request.
//!
//! These are request-level rejections — the request never reaches role
//! dispatch. A role dispatch itself never errors; it always produces a
//! vote, accept or reject, with a reason string explaining the score.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("event {0} already processed")]
    Replay(String),

    #[error("timestamp outside the accepted window: {0}")]
    TimeWindow(String),

    #[error("no public key configured for miner {0}")]
    UnknownMinerKey(u32),

    #[error("miner signature verification failed")]
    SignatureInvalid,

    #[error("internal error: {0}")]
    Internal(String),
}
