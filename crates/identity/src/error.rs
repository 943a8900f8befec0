//! Error types for identity operations.

use alloy_primitives::Address;
use thiserror::Error;

/// Errors that can occur in identity operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentityError {
    /// Caller is not permitted to perform the administrative action
    #[error("Unauthorized: {caller} may not {action}")]
    Unauthorized { caller: Address, action: String },

    /// Address rejected as an authority or issuer
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    /// A registry lock was poisoned by a panicking writer
    #[error("Registry lock poisoned: {0}")]
    LockPoisoned(String),
}

/// Result type for identity operations.
pub type IdentityResult<T> = Result<T, IdentityError>;
