//! Error types for access-token cryptography.

use thiserror::Error;

/// Errors raised while hashing, signing or recovering access tokens.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CryptoError {
    #[error("Invalid signing key: {reason}")]
    InvalidKey { reason: String },

    #[error("Invalid signature: {reason}")]
    InvalidSignature { reason: String },

    #[error("Signer recovery failed: {reason}")]
    Recovery { reason: String },

    #[error("Calldata too short: {len} bytes (need at least {min})")]
    MalformedCalldata { len: usize, min: usize },

    #[error("Invalid field '{field}': {reason}")]
    InvalidField { field: String, reason: String },

    #[error("Signing error: {reason}")]
    Signing { reason: String },
}

/// Result type for crypto operations.
pub type CryptoResult<T> = Result<T, CryptoError>;
