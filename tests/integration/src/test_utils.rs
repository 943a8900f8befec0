//! Shared fixtures for the integration suite.
//!
//! The fixture reproduces the local-development deployment: domain
//! `Ethereum Access Token` v1 on chain 31337, verifier at the first Hardhat
//! contract address and the first Hardhat account as root authority.

use std::sync::Arc;

use alloy_primitives::aliases::U24;
use alloy_primitives::{address, Address, Bytes, U256};
use alloy_sol_types::SolCall;
use eatgate_core::{logging, GateConfig, ManualClock};
use eatgate_crypto::IssuerKey;
use eatgate_identity::InMemoryCredentialRegistry;
use eatgate_multicall::abi::IEATMulticall;
use eatgate_multicall::testing::{authorize_call, IProbe, Probe};
use eatgate_multicall::{Deployment, GatedExecutor};
use eatgate_positions::{LinearPool, PoolKey, PositionManager};

/// Secret of the issuer the deployment trusts.
pub const ISSUER_SECRET: &str = "18eaafaa63636879094c86a953e6fcba4abaefae3baec1d4e5b952c10828d4c2";

/// Address of the gated contract under test.
pub const GATED_CONTRACT: Address = address!("e7f1725E7734CE288F8367e1Bb143E90bb3F0512");

/// Default caller; also the root authority of the default configuration.
pub const DEPLOYER: Address = address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266");

pub const EXPIRY: u64 = 4_833_857_428;

pub const GENESIS_TIME: u64 = 1_700_000_000;

pub const POOL: PoolKey = PoolKey {
    token0: Address::repeat_byte(0x10),
    token1: Address::repeat_byte(0x20),
    fee: U24::from_limbs([3000]),
};

/// Deterministic wallet address.
pub fn wallet(n: u8) -> Address {
    Address::repeat_byte(n)
}

pub fn pays() -> Bytes {
    IProbe::paysCall {}.abi_encode().into()
}

pub fn record(entry: &str) -> Bytes {
    IProbe::recordCall {
        entry: entry.to_string(),
    }
    .abi_encode()
    .into()
}

pub struct GateFixture {
    pub deployment: Deployment,
    pub clock: ManualClock,
    pub issuer: IssuerKey,
}

impl GateFixture {
    pub fn new() -> Self {
        logging::init_for_tests();

        let secret = hex::decode(ISSUER_SECRET).expect("valid issuer secret");
        let issuer = IssuerKey::from_bytes(&secret).expect("valid issuer key");

        let mut config = GateConfig::default_config();
        config.issuers.active = vec![issuer.address()];

        let clock = ManualClock::new(GENESIS_TIME);
        let deployment =
            Deployment::from_config(config, Arc::new(clock.clone())).expect("valid deployment");
        tracing::debug!(issuer = %issuer.address(), "gate fixture ready");

        Self {
            deployment,
            clock,
            issuer,
        }
    }

    pub fn root(&self) -> Address {
        self.deployment.config().issuers.root_authority
    }

    pub fn probe(&self) -> GatedExecutor<Probe> {
        self.deployment
            .deploy(GATED_CONTRACT, Probe::default())
            .expect("probe deploys")
    }

    pub fn position_manager(
        &self,
        credentials: Arc<InMemoryCredentialRegistry>,
    ) -> GatedExecutor<PositionManager<LinearPool>> {
        let policy = self.deployment.policy(credentials);
        let manager = PositionManager::new(LinearPool::new().with_pool(POOL), policy);
        self.deployment
            .deploy(GATED_CONTRACT, manager)
            .expect("position manager deploys")
    }

    /// Gated `multicall` calldata for `calls`, signed by the fixture issuer.
    pub fn sign_batch(&self, caller: Address, calls: Vec<Bytes>) -> Bytes {
        self.sign_batch_with(&self.issuer, caller, U256::from(EXPIRY), calls)
    }

    pub fn sign_batch_with(
        &self,
        issuer: &IssuerKey,
        caller: Address,
        expiry: U256,
        calls: Vec<Bytes>,
    ) -> Bytes {
        authorize_call(
            issuer,
            self.deployment.domain(),
            GATED_CONTRACT,
            caller,
            expiry,
            &IEATMulticall::multicallCall {
                v: 0,
                r: Default::default(),
                s: Default::default(),
                expiry: U256::ZERO,
                data: calls,
            },
        )
        .expect("batch signs")
    }
}

impl Default for GateFixture {
    fn default() -> Self {
        Self::new()
    }
}
