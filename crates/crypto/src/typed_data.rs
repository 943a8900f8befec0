//! Typed-data hashing of access tokens.
//!
//! ```text
//! FunctionCall(bytes4 functionSignature,address target,address caller,bytes parameters)
//! AccessToken(uint256 expiry,FunctionCall functionCall)
//! ```
//!
//! Calldata of a gated entry point starts with the selector followed by four
//! authorization words `(v, r, s, expiry)`. The token binds everything after
//! that prefix, so the signature never has to sign over itself.

use alloy_primitives::{b256, keccak256, Address, Bytes, B256, U256};
use eatgate_core::{selector_of, Selector};
use serde::{Deserialize, Serialize};

use crate::domain::Domain;
use crate::error::{CryptoError, CryptoResult};

pub const FUNCTION_CALL_TYPE: &str =
    "FunctionCall(bytes4 functionSignature,address target,address caller,bytes parameters)";

pub const ACCESS_TOKEN_TYPE: &str = "AccessToken(uint256 expiry,FunctionCall functionCall)FunctionCall(bytes4 functionSignature,address target,address caller,bytes parameters)";

/// `keccak256(FUNCTION_CALL_TYPE)`
pub const FUNCTION_CALL_TYPEHASH: B256 =
    b256!("9c249342fc81b483ddd6fb1b9ccc5724c6b9765f033110e551ab27d9c2aa73d1");

/// `keccak256(ACCESS_TOKEN_TYPE)`
pub const ACCESS_TOKEN_TYPEHASH: B256 =
    b256!("1d1c13fbccd05c96d18d0ef4a0d37b49bb69f34f6c76f30b03401a1ad79df095");

/// Selector plus the `(v, r, s, expiry)` words.
pub const AUTH_PREFIX_LEN: usize = 4 + 4 * 32;

/// The call an access token authorizes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionCall {
    pub function_signature: Selector,
    pub target: Address,
    pub caller: Address,
    pub parameters: Bytes,
}

impl FunctionCall {
    /// Rebuild the bound call from raw calldata of a gated entry point.
    ///
    /// Fails when the calldata is shorter than the authorization prefix.
    pub fn from_calldata(target: Address, caller: Address, calldata: &[u8]) -> CryptoResult<Self> {
        if calldata.len() < AUTH_PREFIX_LEN {
            return Err(CryptoError::MalformedCalldata {
                len: calldata.len(),
                min: AUTH_PREFIX_LEN,
            });
        }
        let function_signature = selector_of(calldata).ok_or(CryptoError::MalformedCalldata {
            len: calldata.len(),
            min: AUTH_PREFIX_LEN,
        })?;
        Ok(Self {
            function_signature,
            target,
            caller,
            parameters: Bytes::copy_from_slice(&calldata[AUTH_PREFIX_LEN..]),
        })
    }

    pub fn struct_hash(&self) -> B256 {
        let mut encoded = Vec::with_capacity(5 * 32);
        encoded.extend_from_slice(FUNCTION_CALL_TYPEHASH.as_slice());
        let mut selector_word = [0u8; 32];
        selector_word[..4].copy_from_slice(self.function_signature.as_slice());
        encoded.extend_from_slice(&selector_word);
        encoded.extend_from_slice(self.target.into_word().as_slice());
        encoded.extend_from_slice(self.caller.into_word().as_slice());
        encoded.extend_from_slice(keccak256(&self.parameters).as_slice());
        keccak256(&encoded)
    }
}

/// A signed-over authorization: one call, valid until `expiry` (unix seconds).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessToken {
    pub expiry: U256,
    pub function_call: FunctionCall,
}

impl AccessToken {
    pub fn new(expiry: U256, function_call: FunctionCall) -> Self {
        Self {
            expiry,
            function_call,
        }
    }

    pub fn struct_hash(&self) -> B256 {
        let mut encoded = Vec::with_capacity(3 * 32);
        encoded.extend_from_slice(ACCESS_TOKEN_TYPEHASH.as_slice());
        encoded.extend_from_slice(&self.expiry.to_be_bytes::<32>());
        encoded.extend_from_slice(self.function_call.struct_hash().as_slice());
        keccak256(&encoded)
    }

    /// Digest the issuer signs: `keccak256(0x1901 ‖ separator ‖ structHash)`.
    pub fn signing_digest(&self, domain: &Domain) -> B256 {
        let mut encoded = Vec::with_capacity(2 + 2 * 32);
        encoded.extend_from_slice(&[0x19, 0x01]);
        encoded.extend_from_slice(domain.separator().as_slice());
        encoded.extend_from_slice(self.struct_hash().as_slice());
        keccak256(&encoded)
    }
}

/// Assemble gated calldata: `selector ‖ v ‖ r ‖ s ‖ expiry ‖ parameters`.
pub fn pack_parameters(
    selector: Selector,
    v: u8,
    r: B256,
    s: B256,
    expiry: U256,
    parameters: &[u8],
) -> Bytes {
    let mut out = Vec::with_capacity(AUTH_PREFIX_LEN + parameters.len());
    out.extend_from_slice(selector.as_slice());
    out.extend_from_slice(&U256::from(v).to_be_bytes::<32>());
    out.extend_from_slice(r.as_slice());
    out.extend_from_slice(s.as_slice());
    out.extend_from_slice(&expiry.to_be_bytes::<32>());
    out.extend_from_slice(parameters);
    out.into()
}
