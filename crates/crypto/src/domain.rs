//! Signing domain.
//!
//! Every token digest commits to the domain separator, so a token issued for
//! one verifier deployment (or one chain) never verifies on another.

use alloy_primitives::{b256, keccak256, Address, B256, U256};
use eatgate_core::DomainConfig;
use serde::{Deserialize, Serialize};

/// EIP-712 domain type string.
pub const DOMAIN_TYPE: &str =
    "EIP712Domain(string name,string version,uint256 chainId,address verifyingContract)";

/// `keccak256(DOMAIN_TYPE)`
pub const DOMAIN_TYPEHASH: B256 =
    b256!("8b73c3c69bb8fe3d512ecc4cf759cc79239f7b179b0ffacaa9a75d522b39400f");

/// Immutable domain descriptor of one verifier deployment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Domain {
    pub name: String,
    pub version: String,
    pub chain_id: u64,
    pub verifying_contract: Address,
}

impl Domain {
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        chain_id: u64,
        verifying_contract: Address,
    ) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            chain_id,
            verifying_contract,
        }
    }

    pub fn from_config(config: &DomainConfig) -> Self {
        Self::new(
            config.name.clone(),
            config.version.clone(),
            config.chain_id,
            config.verifying_contract,
        )
    }

    /// Domain separator: hash of the ABI-encoded domain struct.
    pub fn separator(&self) -> B256 {
        let mut encoded = Vec::with_capacity(5 * 32);
        encoded.extend_from_slice(DOMAIN_TYPEHASH.as_slice());
        encoded.extend_from_slice(keccak256(self.name.as_bytes()).as_slice());
        encoded.extend_from_slice(keccak256(self.version.as_bytes()).as_slice());
        encoded.extend_from_slice(&U256::from(self.chain_id).to_be_bytes::<32>());
        encoded.extend_from_slice(self.verifying_contract.into_word().as_slice());
        keccak256(&encoded)
    }
}
