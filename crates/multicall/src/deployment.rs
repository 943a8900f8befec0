//! Deployment wiring from configuration.

use std::path::Path;
use std::sync::Arc;

use alloy_primitives::Address;
use eatgate_core::{Clock, GateConfig};
use eatgate_crypto::Domain;
use eatgate_identity::{CredentialRegistry, IssuerRegistry, SharedIssuerRegistry};
use tracing::info;

use crate::error::{GateError, GateResult};
use crate::executor::GatedExecutor;
use crate::operations::GatedContract;
use crate::policy::DualPathPolicy;
use crate::verifier::AccessTokenVerifier;

/// One verifier deployment: a domain, the issuer registry it trusts and a
/// clock. Any number of gated contracts can share it.
#[derive(Debug, Clone)]
pub struct Deployment {
    config: GateConfig,
    domain: Domain,
    registry: SharedIssuerRegistry,
    clock: Arc<dyn Clock>,
}

impl Deployment {
    pub fn from_config(config: GateConfig, clock: Arc<dyn Clock>) -> GateResult<Self> {
        config
            .validate()
            .map_err(|e| GateError::Configuration(e.to_string()))?;
        let registry = IssuerRegistry::from_config(&config.issuers)
            .map_err(|e| GateError::Configuration(e.to_string()))?;
        let domain = Domain::from_config(&config.domain);
        info!(
            name = %domain.name,
            chain_id = domain.chain_id,
            verifying_contract = %domain.verifying_contract,
            issuers = registry.active_issuers().len(),
            "deployment configured"
        );
        Ok(Self {
            config,
            domain,
            registry: registry.into_shared(),
            clock,
        })
    }

    pub fn from_file<P: AsRef<Path>>(path: P, clock: Arc<dyn Clock>) -> anyhow::Result<Self> {
        let config = GateConfig::from_file(path)?;
        Ok(Self::from_config(config, clock)?)
    }

    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    pub fn domain(&self) -> &Domain {
        &self.domain
    }

    pub fn registry(&self) -> &SharedIssuerRegistry {
        &self.registry
    }

    pub fn verifier(&self) -> AccessTokenVerifier {
        AccessTokenVerifier::new(
            self.domain.clone(),
            Arc::clone(&self.registry),
            Arc::clone(&self.clock),
        )
    }

    /// Dual-path policy from the `[emergency]` section.
    pub fn policy(&self, credentials: Arc<dyn CredentialRegistry>) -> DualPathPolicy {
        DualPathPolicy::from_config(
            &self.config.emergency,
            self.config.emergency_owner(),
            credentials,
        )
    }

    /// Put a gated contract at `address` behind this deployment's verifier.
    pub fn deploy<S: GatedContract>(&self, address: Address, state: S) -> GateResult<GatedExecutor<S>> {
        GatedExecutor::new(address, state, self.verifier())
    }
}
