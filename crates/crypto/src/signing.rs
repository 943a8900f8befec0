//! Access-token signing and signer recovery.
//!
//! Issuers sign the typed-data digest of an [`AccessToken`] with secp256k1.
//! Signatures travel as split `(v, r, s)` words inside calldata, with
//! `v ∈ {27, 28}`. Recovery rejects high-s signatures so each authorization
//! has exactly one valid encoding.
//!
//! # Security Model
//!
//! - Private key material is zeroized on drop and never printed
//! - Signing is deterministic (RFC 6979) for the same token and domain

use alloy_primitives::{keccak256, Address, Bytes, B256};
use k256::ecdsa::{RecoveryId, Signature, SigningKey, VerifyingKey};
use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

use crate::domain::Domain;
use crate::error::{CryptoError, CryptoResult};
use crate::typed_data::{pack_parameters, AccessToken};

/// Recoverable ECDSA signature in split form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitSignature {
    pub v: u8,
    pub r: B256,
    pub s: B256,
}

impl SplitSignature {
    pub fn new(v: u8, r: B256, s: B256) -> Self {
        Self { v, r, s }
    }

    /// Recover the address that produced this signature over `digest`.
    pub fn recover(&self, digest: &B256) -> CryptoResult<Address> {
        let recovery_id = match self.v {
            27 | 28 => RecoveryId::from_byte(self.v - 27),
            _ => None,
        }
        .ok_or_else(|| CryptoError::InvalidSignature {
            reason: format!("unsupported recovery byte {}", self.v),
        })?;

        let mut rs = [0u8; 64];
        rs[..32].copy_from_slice(self.r.as_slice());
        rs[32..].copy_from_slice(self.s.as_slice());
        let signature = Signature::from_slice(&rs).map_err(|e| CryptoError::InvalidSignature {
            reason: e.to_string(),
        })?;
        if signature.normalize_s().is_some() {
            return Err(CryptoError::InvalidSignature {
                reason: "s value in upper half of curve order".to_string(),
            });
        }

        let key = VerifyingKey::recover_from_prehash(digest.as_slice(), &signature, recovery_id)
            .map_err(|e| CryptoError::Recovery {
                reason: e.to_string(),
            })?;
        Ok(address_of(&key))
    }
}

/// Ethereum-style address of a public key: last 20 bytes of the Keccak-256
/// hash of the uncompressed point without its prefix byte.
pub fn address_of(key: &VerifyingKey) -> Address {
    let point = key.to_encoded_point(false);
    let hash = keccak256(&point.as_bytes()[1..]);
    Address::from_slice(&hash[12..])
}

/// Issuer signing key.
pub struct IssuerKey {
    key: SigningKey,
    address: Address,
}

impl IssuerKey {
    /// Generate a fresh key from the OS RNG.
    pub fn random() -> Self {
        let key = SigningKey::random(&mut rand::rngs::OsRng);
        let address = address_of(key.verifying_key());
        Self { key, address }
    }

    /// Load a key from 32 raw secret bytes.
    pub fn from_bytes(bytes: &[u8]) -> CryptoResult<Self> {
        if bytes.len() != 32 {
            return Err(CryptoError::InvalidKey {
                reason: format!("expected 32 bytes, got {}", bytes.len()),
            });
        }
        let mut secret = [0u8; 32];
        secret.copy_from_slice(bytes);
        let key = SigningKey::from_slice(&secret).map_err(|e| CryptoError::InvalidKey {
            reason: e.to_string(),
        });
        secret.zeroize();
        let key = key?;
        let address = address_of(key.verifying_key());
        Ok(Self { key, address })
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn sign_digest(&self, digest: &B256) -> CryptoResult<SplitSignature> {
        let (signature, recovery_id) = self
            .key
            .sign_prehash_recoverable(digest.as_slice())
            .map_err(|e| CryptoError::Signing {
                reason: e.to_string(),
            })?;
        let bytes = signature.to_bytes();
        Ok(SplitSignature {
            v: 27 + recovery_id.to_byte(),
            r: B256::from_slice(&bytes[..32]),
            s: B256::from_slice(&bytes[32..]),
        })
    }

    pub fn sign_token(&self, token: &AccessToken, domain: &Domain) -> CryptoResult<SignedAccessToken> {
        let signature = self.sign_digest(&token.signing_digest(domain))?;
        Ok(SignedAccessToken {
            token: token.clone(),
            signature,
        })
    }
}

impl std::fmt::Debug for IssuerKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IssuerKey")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

/// A token together with the issuer's signature over it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedAccessToken {
    pub token: AccessToken,
    pub signature: SplitSignature,
}

impl SignedAccessToken {
    /// Gated calldata carrying this authorization.
    pub fn calldata(&self) -> Bytes {
        let call = &self.token.function_call;
        pack_parameters(
            call.function_signature,
            self.signature.v,
            self.signature.r,
            self.signature.s,
            self.token.expiry,
            &call.parameters,
        )
    }

    pub fn signer(&self, domain: &Domain) -> CryptoResult<Address> {
        self.signature.recover(&self.token.signing_digest(domain))
    }
}
