//! Issuer registry.
//!
//! A two-tier trust hierarchy: the root authority rotates the intermediate
//! authority; either of them activates and deactivates the issuers whose
//! signatures the verifier accepts. Every effective mutation bumps
//! [`IssuerRegistry::version`].

use std::collections::HashSet;
use std::sync::{Arc, RwLock};

use alloy_primitives::Address;
use eatgate_core::IssuerConfig;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{IdentityError, IdentityResult};

/// One registry deployment shared by every gated contract that trusts it.
pub type SharedIssuerRegistry = Arc<RwLock<IssuerRegistry>>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuerRegistry {
    root_authority: Address,
    intermediate_authority: Address,
    active_issuers: HashSet<Address>,
    version: u64,
}

impl IssuerRegistry {
    /// Create a registry whose intermediate authority starts as the root.
    pub fn new(root_authority: Address) -> IdentityResult<Self> {
        if root_authority.is_zero() {
            return Err(IdentityError::InvalidAddress(
                "root authority must not be the zero address".to_string(),
            ));
        }
        Ok(Self {
            root_authority,
            intermediate_authority: root_authority,
            active_issuers: HashSet::new(),
            version: 0,
        })
    }

    /// Bootstrap from the `[issuers]` configuration section.
    pub fn from_config(config: &IssuerConfig) -> IdentityResult<Self> {
        let mut registry = Self::new(config.root_authority)?;
        if let Some(intermediate) = config.intermediate_authority {
            registry.rotate_intermediate(config.root_authority, intermediate)?;
        }
        registry.activate_issuers(config.root_authority, &config.active)?;
        Ok(registry)
    }

    pub fn into_shared(self) -> SharedIssuerRegistry {
        Arc::new(RwLock::new(self))
    }

    pub fn root_authority(&self) -> Address {
        self.root_authority
    }

    pub fn intermediate_authority(&self) -> Address {
        self.intermediate_authority
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn is_active_issuer(&self, issuer: &Address) -> bool {
        self.active_issuers.contains(issuer)
    }

    /// Active issuers in ascending address order.
    pub fn active_issuers(&self) -> Vec<Address> {
        let mut issuers: Vec<Address> = self.active_issuers.iter().copied().collect();
        issuers.sort();
        issuers
    }

    /// Replace the intermediate authority. Root only.
    pub fn rotate_intermediate(
        &mut self,
        caller: Address,
        new_intermediate: Address,
    ) -> IdentityResult<()> {
        if caller != self.root_authority {
            return Err(unauthorized(caller, "rotate the intermediate authority"));
        }
        if new_intermediate.is_zero() {
            return Err(IdentityError::InvalidAddress(
                "intermediate authority must not be the zero address".to_string(),
            ));
        }
        if new_intermediate != self.intermediate_authority {
            let previous = self.intermediate_authority;
            self.intermediate_authority = new_intermediate;
            self.version += 1;
            info!(
                %previous,
                current = %new_intermediate,
                version = self.version,
                "intermediate authority rotated"
            );
        }
        Ok(())
    }

    /// Trust the given issuers. Already-active addresses are skipped.
    ///
    /// Returns how many addresses were newly activated.
    pub fn activate_issuers(&mut self, caller: Address, issuers: &[Address]) -> IdentityResult<usize> {
        self.ensure_administrator(caller, "activate issuers")?;
        if issuers.iter().any(|issuer| issuer.is_zero()) {
            return Err(IdentityError::InvalidAddress(
                "the zero address cannot be an issuer".to_string(),
            ));
        }

        let added = issuers
            .iter()
            .filter(|issuer| self.active_issuers.insert(**issuer))
            .count();
        if added > 0 {
            self.version += 1;
            info!(%caller, added, version = self.version, "issuers activated");
        }
        Ok(added)
    }

    /// Stop trusting the given issuers. Inactive addresses are skipped.
    ///
    /// Returns how many addresses were removed.
    pub fn deactivate_issuers(
        &mut self,
        caller: Address,
        issuers: &[Address],
    ) -> IdentityResult<usize> {
        self.ensure_administrator(caller, "deactivate issuers")?;

        let removed = issuers
            .iter()
            .filter(|issuer| self.active_issuers.remove(*issuer))
            .count();
        if removed > 0 {
            self.version += 1;
            info!(%caller, removed, version = self.version, "issuers deactivated");
        }
        Ok(removed)
    }

    fn ensure_administrator(&self, caller: Address, action: &str) -> IdentityResult<()> {
        if caller == self.root_authority || caller == self.intermediate_authority {
            Ok(())
        } else {
            Err(unauthorized(caller, action))
        }
    }
}

fn unauthorized(caller: Address, action: &str) -> IdentityError {
    tracing::warn!(%caller, action, "rejected issuer registry mutation");
    IdentityError::Unauthorized {
        caller,
        action: action.to_string(),
    }
}
