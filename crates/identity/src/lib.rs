//! Issuer trust and identity credentials for EATGate.
//!
//! Two registries live here:
//!
//! - The [`IssuerRegistry`] holds the root authority, the rotatable
//!   intermediate authority and the set of addresses trusted to sign access
//!   tokens. Verification reads it on every call, so deactivating an issuer
//!   immediately invalidates every token it signed.
//! - The [`CredentialRegistry`] answers whether an address holds an
//!   externally issued verified status. It is consulted only by the
//!   emergency-mode bypass.
//!
//! # Security Model
//!
//! - Registry mutation is gated to the root authority (rotation) or the root
//!   and intermediate authorities (activation)
//! - Rejected mutations leave the registry untouched
//! - Credential lookups fail closed

pub mod credentials;
pub mod error;
pub mod issuer_registry;

pub use credentials::{
    CredentialRegistry, IdentityCredential, InMemoryCredentialRegistry, StatusClass,
};
pub use error::{IdentityError, IdentityResult};
pub use issuer_registry::{IssuerRegistry, SharedIssuerRegistry};
