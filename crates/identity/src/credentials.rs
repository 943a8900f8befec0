//! Identity credentials.
//!
//! A credential is an externally issued status record `(holder, class)`.
//! This layer only ever asks whether a holder has one of an allow-listed set
//! of classes.

use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::sync::RwLock;

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{IdentityError, IdentityResult};

/// Identifier of a verified-status class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StatusClass(pub u64);

impl StatusClass {
    /// Verified end-user account
    pub const VERIFIED_ACCOUNT: Self = Self(0);
    /// Verified partner application
    pub const VERIFIED_PARTNER_APP: Self = Self(1);
}

impl From<u64> for StatusClass {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl fmt::Display for StatusClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::VERIFIED_ACCOUNT => write!(f, "verified-account"),
            Self::VERIFIED_PARTNER_APP => write!(f, "verified-partner-app"),
            Self(other) => write!(f, "status-class-{other}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IdentityCredential {
    pub holder: Address,
    pub status_class: StatusClass,
}

/// Read-only view of an external credential registry.
pub trait CredentialRegistry: Send + Sync + fmt::Debug {
    fn has_status(&self, holder: Address, class: StatusClass) -> bool;

    fn has_any_status(&self, holder: Address, classes: &[StatusClass]) -> bool {
        classes.iter().any(|class| self.has_status(holder, *class))
    }
}

/// In-process credential registry administered by its deployer.
#[derive(Debug)]
pub struct InMemoryCredentialRegistry {
    admin: Address,
    credentials: RwLock<HashSet<IdentityCredential>>,
}

impl InMemoryCredentialRegistry {
    pub fn new(admin: Address) -> Self {
        Self {
            admin,
            credentials: RwLock::new(HashSet::new()),
        }
    }

    pub fn admin(&self) -> Address {
        self.admin
    }

    pub fn grant_status(
        &self,
        caller: Address,
        holder: Address,
        class: StatusClass,
    ) -> IdentityResult<()> {
        self.ensure_admin(caller, "grant status")?;
        let mut credentials = self
            .credentials
            .write()
            .map_err(|e| IdentityError::LockPoisoned(e.to_string()))?;
        if credentials.insert(IdentityCredential {
            holder,
            status_class: class,
        }) {
            info!(%holder, %class, "credential granted");
        }
        Ok(())
    }

    pub fn revoke_status(
        &self,
        caller: Address,
        holder: Address,
        class: StatusClass,
    ) -> IdentityResult<()> {
        self.ensure_admin(caller, "revoke status")?;
        let mut credentials = self
            .credentials
            .write()
            .map_err(|e| IdentityError::LockPoisoned(e.to_string()))?;
        if credentials.remove(&IdentityCredential {
            holder,
            status_class: class,
        }) {
            info!(%holder, %class, "credential revoked");
        }
        Ok(())
    }

    /// Classes currently held by `holder`, ascending.
    pub fn credentials_of(&self, holder: Address) -> IdentityResult<Vec<StatusClass>> {
        let credentials = self
            .credentials
            .read()
            .map_err(|e| IdentityError::LockPoisoned(e.to_string()))?;
        let classes: BTreeSet<StatusClass> = credentials
            .iter()
            .filter(|c| c.holder == holder)
            .map(|c| c.status_class)
            .collect();
        Ok(classes.into_iter().collect())
    }

    fn ensure_admin(&self, caller: Address, action: &str) -> IdentityResult<()> {
        if caller == self.admin {
            Ok(())
        } else {
            Err(IdentityError::Unauthorized {
                caller,
                action: action.to_string(),
            })
        }
    }
}

impl CredentialRegistry for InMemoryCredentialRegistry {
    fn has_status(&self, holder: Address, class: StatusClass) -> bool {
        match self.credentials.read() {
            Ok(credentials) => credentials.contains(&IdentityCredential {
                holder,
                status_class: class,
            }),
            Err(_) => {
                warn!(%holder, "credential registry lock poisoned, denying");
                false
            }
        }
    }
}
