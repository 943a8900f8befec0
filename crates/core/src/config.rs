//! Configuration management for EATGate deployments.
//!
//! A deployment is described by three sections: the signing domain every
//! access token is scoped to, the issuer hierarchy the verifier trusts at
//! start-up, and the emergency controls of the dual-path policy.
//!
//! ```toml
//! [domain]
//! name = "Ethereum Access Token"
//! version = "1"
//! chain_id = 31337
//! verifying_contract = "0x5FbDB2315678afecb367f032d93F642f64180aa3"
//!
//! [issuers]
//! root_authority = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266"
//! active = ["0x89be9a6320f374a254bff5d28a3a58cbd94fcbc2"]
//!
//! [emergency]
//! engaged = false
//! allowed_status_classes = [0, 1]
//!
//! [logging]
//! format = "json"
//! ```

use std::path::Path;

use alloy_primitives::{address, Address};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};
use crate::logging::LoggingConfig;

/// Domain name the off-chain issuer signs under.
pub const DEFAULT_DOMAIN_NAME: &str = "Ethereum Access Token";

/// Domain version the off-chain issuer signs under.
pub const DEFAULT_DOMAIN_VERSION: &str = "1";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateConfig {
    pub domain: DomainConfig,
    pub issuers: IssuerConfig,
    #[serde(default)]
    pub emergency: EmergencyConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainConfig {
    pub name: String,
    pub version: String,
    pub chain_id: u64,
    pub verifying_contract: Address,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuerConfig {
    pub root_authority: Address,
    /// Defaults to the root authority when absent.
    #[serde(default)]
    pub intermediate_authority: Option<Address>,
    #[serde(default)]
    pub active: Vec<Address>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmergencyConfig {
    /// Owner allowed to toggle emergency mode. Defaults to the root authority.
    #[serde(default)]
    pub owner: Option<Address>,
    #[serde(default)]
    pub engaged: bool,
    #[serde(default = "default_status_classes")]
    pub allowed_status_classes: Vec<u64>,
}

fn default_status_classes() -> Vec<u64> {
    vec![0, 1]
}

impl Default for EmergencyConfig {
    fn default() -> Self {
        Self {
            owner: None,
            engaged: false,
            allowed_status_classes: default_status_classes(),
        }
    }
}

impl GateConfig {
    /// Load and validate a TOML configuration file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)?;
        Ok(config)
    }

    /// Parse and validate a TOML configuration document.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Local development deployment: the first contract and account of a
    /// freshly started Hardhat/Anvil node.
    pub fn default_config() -> Self {
        Self {
            domain: DomainConfig {
                name: DEFAULT_DOMAIN_NAME.to_string(),
                version: DEFAULT_DOMAIN_VERSION.to_string(),
                chain_id: 31337,
                verifying_contract: address!("5FbDB2315678afecb367f032d93F642f64180aa3"),
            },
            issuers: IssuerConfig {
                root_authority: address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266"),
                intermediate_authority: None,
                active: Vec::new(),
            },
            emergency: EmergencyConfig::default(),
            logging: LoggingConfig::default(),
        }
    }

    /// Reject configurations that could never verify a token.
    pub fn validate(&self) -> Result<()> {
        if self.domain.name.is_empty() {
            return Err(CoreError::Config("domain.name must not be empty".to_string()));
        }
        if self.domain.version.is_empty() {
            return Err(CoreError::Config(
                "domain.version must not be empty".to_string(),
            ));
        }
        if self.domain.verifying_contract.is_zero() {
            return Err(CoreError::Config(
                "domain.verifying_contract must not be the zero address".to_string(),
            ));
        }
        if self.issuers.root_authority.is_zero() {
            return Err(CoreError::Config(
                "issuers.root_authority must not be the zero address".to_string(),
            ));
        }
        if let Some(zero) = self.issuers.active.iter().find(|a| a.is_zero()) {
            return Err(CoreError::Config(format!(
                "issuers.active contains the zero address ({zero})"
            )));
        }
        if self.emergency.allowed_status_classes.is_empty() {
            return Err(CoreError::Config(
                "emergency.allowed_status_classes must name at least one class".to_string(),
            ));
        }
        Ok(())
    }

    /// Intermediate authority, falling back to the root authority.
    pub fn intermediate_authority(&self) -> Address {
        self.issuers
            .intermediate_authority
            .unwrap_or(self.issuers.root_authority)
    }

    /// Emergency-mode owner, falling back to the root authority.
    pub fn emergency_owner(&self) -> Address {
        self.emergency.owner.unwrap_or(self.issuers.root_authority)
    }
}
