//! Signing and verification error kinds.

use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum SigningError {
    #[error("invalid private key encoding: {0}")]
    InvalidPrivateKey(String),

    #[error("invalid public key encoding: {0}")]
    InvalidPublicKey(String),

    #[error("signature has invalid length: expected 128 hex chars, got {0}")]
    InvalidSignatureLength(usize),

    #[error("signature is not valid hex: {0}")]
    InvalidSignatureEncoding(String),

    #[error("signature scalar out of range")]
    ScalarOutOfRange,

    #[error("signature fails low-S malleability check")]
    HighS,

    #[error("failed to encode canonical signing input: {0}")]
    CanonicalEncoding(String),
}
