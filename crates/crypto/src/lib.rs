//! Cryptographic primitives for EATGate access tokens.
//!
//! An access token is an EIP-712 style structured message: a call binding
//! (function selector, target contract, caller, packed parameters) plus an
//! expiry, hashed together with a [`Domain`] so a signature is only valid for
//! one verifier deployment on one chain. Issuers sign the resulting digest
//! with secp256k1 recoverable ECDSA; verifiers recover the signer address
//! from the split `(v, r, s)` signature.
//!
//! # Supported Algorithms
//!
//! - **Hashing**: Keccak-256
//! - **Signatures**: ECDSA over secp256k1, recoverable, low-s normalized
//!
//! # Encoding stability
//!
//! The type strings and word layout in [`typed_data`] are the interoperability
//! contract with existing off-chain issuers. They are pinned by the fixed
//! vectors in the test suite and must not change.

pub mod domain;
pub mod error;
pub mod signing;
pub mod typed_data;


pub use domain::{Domain, DOMAIN_TYPE, DOMAIN_TYPEHASH};
pub use error::{CryptoError, CryptoResult};
pub use signing::{address_of, IssuerKey, SignedAccessToken, SplitSignature};
pub use typed_data::{
    pack_parameters, AccessToken, FunctionCall, ACCESS_TOKEN_TYPE, ACCESS_TOKEN_TYPEHASH,
    AUTH_PREFIX_LEN, FUNCTION_CALL_TYPE, FUNCTION_CALL_TYPEHASH,
};
