//! Dual-path authorization policy.
//!
//! Exit operations (decrease, collect, burn) and ownership transfers have two
//! routes:
//!
//! - **Token route**, emergency flag clear: the operation is reached only from
//!   inside an authorized batch.
//! - **Credential route**: with the flag set, exits are callable directly by
//!   holders of an allow-listed status class. Plain transfers take this route
//!   whenever both parties are credentialed, and unconditionally while the
//!   flag is set.
//!
//! The two routes never both admit the same exit call.

use std::fmt;
use std::sync::Arc;

use alloy_primitives::Address;
use eatgate_core::EmergencyConfig;
use eatgate_identity::{CredentialRegistry, StatusClass};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::context::Invocation;
use crate::error::{GateError, GateResult};

/// Owner-gated emergency switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmergencyFlag {
    owner: Address,
    engaged: bool,
}

impl EmergencyFlag {
    pub fn new(owner: Address, engaged: bool) -> Self {
        Self { owner, engaged }
    }

    pub fn owner(&self) -> Address {
        self.owner
    }

    pub fn is_engaged(&self) -> bool {
        self.engaged
    }

    pub fn set(&mut self, caller: Address, engaged: bool) -> GateResult<()> {
        if caller != self.owner {
            return Err(GateError::NotOwner);
        }
        if self.engaged != engaged {
            info!(%caller, engaged, "emergency mode toggled");
        }
        self.engaged = engaged;
        Ok(())
    }
}

#[derive(Clone)]
pub struct DualPathPolicy {
    flag: EmergencyFlag,
    allowed_classes: Vec<StatusClass>,
    credentials: Arc<dyn CredentialRegistry>,
}

impl DualPathPolicy {
    pub fn new(
        flag: EmergencyFlag,
        allowed_classes: Vec<StatusClass>,
        credentials: Arc<dyn CredentialRegistry>,
    ) -> Self {
        Self {
            flag,
            allowed_classes,
            credentials,
        }
    }

    /// Build from the `[emergency]` section; `owner` is the resolved owner.
    pub fn from_config(
        config: &EmergencyConfig,
        owner: Address,
        credentials: Arc<dyn CredentialRegistry>,
    ) -> Self {
        Self::new(
            EmergencyFlag::new(owner, config.engaged),
            config
                .allowed_status_classes
                .iter()
                .copied()
                .map(StatusClass::from)
                .collect(),
            credentials,
        )
    }

    pub fn flag(&self) -> &EmergencyFlag {
        &self.flag
    }

    pub fn is_emergency(&self) -> bool {
        self.flag.is_engaged()
    }

    pub fn set_emergency_mode(&mut self, caller: Address, engaged: bool) -> GateResult<()> {
        self.flag.set(caller, engaged)
    }

    pub fn allowed_classes(&self) -> &[StatusClass] {
        &self.allowed_classes
    }

    pub fn is_verified(&self, holder: Address) -> bool {
        self.credentials
            .has_any_status(holder, &self.allowed_classes)
    }

    /// Gate for decrease, collect and burn.
    pub fn authorize_exit(&self, invocation: &Invocation) -> GateResult<()> {
        if !self.is_emergency() {
            return if invocation.in_batch {
                Ok(())
            } else {
                Err(GateError::SelfMulticallOnly)
            };
        }
        if invocation.in_batch {
            return Err(GateError::TokenRouteDisabled);
        }
        if !self.is_verified(invocation.sender()) {
            return Err(GateError::CallerUnverified);
        }
        Ok(())
    }

    /// Gate for the token-authorized transfer overloads.
    pub fn authorize_token_transfer(&self) -> GateResult<()> {
        if self.is_emergency() {
            Err(GateError::TokenRouteDisabled)
        } else {
            Ok(())
        }
    }

    /// Gate for the plain transfer overloads.
    pub fn authorize_credential_transfer(&self, from: Address, to: Address) -> GateResult<()> {
        if self.is_emergency() || (self.is_verified(from) && self.is_verified(to)) {
            Ok(())
        } else {
            Err(GateError::TransferPartiesUnverified)
        }
    }

    /// Gate for operations that grow positions.
    pub fn require_normal_mode(&self) -> GateResult<()> {
        if self.is_emergency() {
            Err(GateError::EmergencyModeEngaged)
        } else {
            Ok(())
        }
    }
}

impl fmt::Debug for DualPathPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DualPathPolicy")
            .field("flag", &self.flag)
            .field("allowed_classes", &self.allowed_classes)
            .finish_non_exhaustive()
    }
}
