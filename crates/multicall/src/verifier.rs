//! Capability verification for access tokens.
//!
//! A token is accepted when, in order:
//! 1. its signer can be recovered from the typed-data digest under this
//!    verifier's domain,
//! 2. its expiry lies strictly after the current time,
//! 3. the recovered signer is an active issuer in the registry snapshot read
//!    for this call.
//!
//! The call binding (target, caller, selector, parameters) is part of the
//! digest, so a token presented for any other call recovers an unrelated
//! address and fails step 3.

#![warn(missing_docs)]

use std::sync::Arc;

use alloy_primitives::{Address, B256, U256};
use eatgate_core::Clock;
use eatgate_crypto::{AccessToken, Domain, FunctionCall, SignedAccessToken, SplitSignature};
use eatgate_identity::SharedIssuerRegistry;
use thiserror::Error;
use tracing::{debug, warn};

use crate::abi::decode_auth_prefix;
use crate::error::GateError;

/// Why a token was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VerificationError {
    /// Expiry at or before the current time
    #[error("token expired at {expiry} (now {now})")]
    Expired {
        /// Token expiry, unix seconds
        expiry: U256,
        /// Processing time, unix seconds
        now: u64,
    },

    /// No address could be recovered from the signature
    #[error("signature rejected: {0}")]
    BadSignature(String),

    /// Recovered signer is not an active issuer
    #[error("signer {0} is not an active issuer")]
    InactiveIssuer(Address),

    /// Token names a different call than the one attempted
    #[error("token bound to a different {0}")]
    BindingMismatch(&'static str),

    /// Calldata does not carry an authorization prefix
    #[error("calldata lacks an authorization prefix")]
    MissingAuthorization,

    /// Issuer registry could not be read
    #[error("issuer registry unavailable: {0}")]
    RegistryUnavailable(String),
}

impl From<VerificationError> for GateError {
    fn from(err: VerificationError) -> Self {
        match err {
            VerificationError::Expired { .. } => GateError::Expired,
            VerificationError::RegistryUnavailable(reason) => GateError::LockPoisoned(reason),
            _ => GateError::VerificationFailure,
        }
    }
}

/// Verifier for one domain, reading one shared issuer registry.
#[derive(Debug, Clone)]
pub struct AccessTokenVerifier {
    domain: Domain,
    separator: B256,
    registry: SharedIssuerRegistry,
    clock: Arc<dyn Clock>,
}

impl AccessTokenVerifier {
    /// Create a verifier for `domain`.
    pub fn new(domain: Domain, registry: SharedIssuerRegistry, clock: Arc<dyn Clock>) -> Self {
        let separator = domain.separator();
        Self {
            domain,
            separator,
            registry,
            clock,
        }
    }

    /// Signing domain.
    pub fn domain(&self) -> &Domain {
        &self.domain
    }

    /// Cached domain separator.
    pub fn domain_separator(&self) -> B256 {
        self.separator
    }

    /// Issuer registry handle.
    pub fn registry(&self) -> &SharedIssuerRegistry {
        &self.registry
    }

    /// Current processing time.
    pub fn now(&self) -> u64 {
        self.clock.now()
    }

    /// Verify a token and return its issuer.
    pub fn verify(
        &self,
        token: &AccessToken,
        signature: &SplitSignature,
    ) -> Result<Address, VerificationError> {
        let result = self.verify_inner(token, signature);
        match &result {
            Ok(issuer) => debug!(
                %issuer,
                target = %token.function_call.target,
                caller = %token.function_call.caller,
                selector = %token.function_call.function_signature,
                "access token accepted"
            ),
            Err(e) => warn!(
                error = %e,
                target = %token.function_call.target,
                caller = %token.function_call.caller,
                selector = %token.function_call.function_signature,
                "access token rejected"
            ),
        }
        result
    }

    /// Verify a presented token against the call it is meant to authorize.
    pub fn verify_bound(
        &self,
        signed: &SignedAccessToken,
        expected: &FunctionCall,
    ) -> Result<Address, VerificationError> {
        let bound = &signed.token.function_call;
        if bound.target != expected.target {
            return Err(VerificationError::BindingMismatch("target"));
        }
        if bound.caller != expected.caller {
            return Err(VerificationError::BindingMismatch("caller"));
        }
        if bound.function_signature != expected.function_signature {
            return Err(VerificationError::BindingMismatch("function selector"));
        }
        if bound.parameters != expected.parameters {
            return Err(VerificationError::BindingMismatch("parameters"));
        }
        self.verify(&signed.token, &signed.signature)
    }

    /// Verify the authorization carried in gated calldata
    /// `selector ‖ v ‖ r ‖ s ‖ expiry ‖ parameters`, bound to `target`
    /// and the original invoker `caller`.
    pub fn verify_calldata(
        &self,
        target: Address,
        caller: Address,
        calldata: &[u8],
    ) -> Result<Address, VerificationError> {
        let (signature, expiry) =
            decode_auth_prefix(calldata).ok_or(VerificationError::MissingAuthorization)?;
        let function_call = FunctionCall::from_calldata(target, caller, calldata)
            .map_err(|_| VerificationError::MissingAuthorization)?;
        self.verify(&AccessToken::new(expiry, function_call), &signature)
    }

    fn verify_inner(
        &self,
        token: &AccessToken,
        signature: &SplitSignature,
    ) -> Result<Address, VerificationError> {
        let digest = token.signing_digest(&self.domain);
        let signer = signature
            .recover(&digest)
            .map_err(|e| VerificationError::BadSignature(e.to_string()))?;

        let now = self.clock.now();
        if token.expiry <= U256::from(now) {
            return Err(VerificationError::Expired {
                expiry: token.expiry,
                now,
            });
        }

        let registry = self
            .registry
            .read()
            .map_err(|e| VerificationError::RegistryUnavailable(e.to_string()))?;
        if !registry.is_active_issuer(&signer) {
            return Err(VerificationError::InactiveIssuer(signer));
        }
        Ok(signer)
    }
}
