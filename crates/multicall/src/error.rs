//! Gate errors and revert payloads.
//!
//! Authorization failures carry fixed reason strings that off-chain callers
//! match on. Failures raised by an operation itself travel as raw
//! [`RevertData`] and are never rewritten on their way out of a batch.

#![warn(missing_docs)]

use std::fmt;

use alloy_primitives::Bytes;
use alloy_sol_types::{Revert, SolError};
use eatgate_core::{selector_of, Selector};
use thiserror::Error;

/// Raw revert payload of a failed operation.
///
/// Usually the standard `Error(string)` encoding; custom ABI errors are
/// carried the same way.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RevertData(Bytes);

impl RevertData {
    /// Wrap raw payload bytes.
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self(data.into())
    }

    /// Encode `reason` as `Error(string)`.
    pub fn from_reason(reason: &str) -> Self {
        Self(
            Revert {
                reason: reason.to_string(),
            }
            .abi_encode()
            .into(),
        )
    }

    /// Encode a custom ABI error.
    pub fn from_error<E: SolError>(error: &E) -> Self {
        Self(error.abi_encode().into())
    }

    /// Decoded `Error(string)` reason, if the payload is one.
    pub fn reason(&self) -> Option<String> {
        Revert::abi_decode(&self.0, true).ok().map(|r| r.reason)
    }

    /// Decode the payload as a specific custom error.
    pub fn decode<E: SolError>(&self) -> Option<E> {
        E::abi_decode(&self.0, true).ok()
    }

    /// Leading four bytes of the payload.
    pub fn selector(&self) -> Option<Selector> {
        selector_of(&self.0)
    }

    /// Raw payload.
    pub fn as_bytes(&self) -> &Bytes {
        &self.0
    }
}

impl fmt::Display for RevertData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.reason() {
            Some(reason) => f.write_str(&reason),
            None if self.0.is_empty() => f.write_str("reverted without data"),
            None => write!(f, "reverted with 0x{}", hex::encode(&self.0)),
        }
    }
}

/// Errors surfaced by the gated executor and the dual-path policy.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GateError {
    /// Token expiry is at or before the current time
    #[error("AccessToken: has expired")]
    Expired,

    /// Signature unrecoverable, issuer inactive, or token bound to another call
    #[error("AccessToken: verification failure")]
    VerificationFailure,

    /// Ungated batch entry point invoked
    #[error("non-EAT multicall disallowed")]
    LegacyMulticallDisallowed,

    /// Internal-only operation invoked outside an authorized batch
    #[error("only callable by self multicall")]
    SelfMulticallOnly,

    /// Batch entry point re-entered from inside a batch
    #[error("call-flow locked")]
    CallFlowLocked,

    /// No operation registered under the calldata's selector
    #[error("function selector not recognized")]
    UnknownSelector,

    /// Caller is not the owner of an owner-gated control
    #[error("Ownable: caller is not the owner")]
    NotOwner,

    /// Batched access attempted for an exit operation while emergency mode is on
    #[error("emergency mode: token route disabled")]
    TokenRouteDisabled,

    /// Direct exit in emergency mode by a caller without an allow-listed credential
    #[error("emergency mode: caller lacks verified status")]
    CallerUnverified,

    /// Credential-route transfer where a party holds no allow-listed credential
    #[error("transfer parties lack verified status")]
    TransferPartiesUnverified,

    /// Position-growing operation attempted in emergency mode
    #[error("emergency mode engaged")]
    EmergencyModeEngaged,

    /// Arguments could not be ABI-decoded
    #[error("malformed calldata: {0}")]
    MalformedCalldata(String),

    /// Failure raised by an operation
    #[error("{0}")]
    Reverted(RevertData),

    /// Deployment could not be assembled
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A shared lock was poisoned by a panicking writer
    #[error("lock poisoned: {0}")]
    LockPoisoned(String),
}

impl GateError {
    /// Revert with an `Error(string)` reason.
    pub fn revert(reason: &str) -> Self {
        Self::Reverted(RevertData::from_reason(reason))
    }

    /// Revert with a custom ABI error.
    pub fn custom<E: SolError>(error: &E) -> Self {
        Self::Reverted(RevertData::from_error(error))
    }

    /// Human-readable reason callers can match on.
    pub fn reason(&self) -> String {
        self.to_string()
    }

    /// Revert payload as it would be returned to an external caller.
    pub fn revert_data(&self) -> RevertData {
        match self {
            Self::Reverted(data) => data.clone(),
            other => RevertData::from_reason(&other.to_string()),
        }
    }
}

/// Result type for gate operations.
pub type GateResult<T> = Result<T, GateError>;
