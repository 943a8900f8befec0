//! Dual-path authorization on a deployed position manager.

use std::sync::Arc;

use alloy_primitives::aliases::I24;
use alloy_primitives::{Address, Bytes, U256};
use alloy_sol_types::SolCall;
use eatgate_core::{GateConfig, ManualClock};
use eatgate_identity::{InMemoryCredentialRegistry, StatusClass};
use eatgate_multicall::abi::decode_multicall_results;
use eatgate_multicall::{CallContext, Deployment, GateError, GatedExecutor};
use eatgate_positions::interface::{
    CollectParams, DecreaseLiquidityParams, IPositionManager, IVerifiedTransfers, MintParams,
};
use eatgate_positions::{LinearPool, PositionManager};

use crate::test_utils::{wallet, GateFixture, DEPLOYER, EXPIRY, GATED_CONTRACT, POOL};

type Manager = GatedExecutor<PositionManager<LinearPool>>;

fn alice() -> Address {
    wallet(0xa1)
}

fn credentials() -> Arc<InMemoryCredentialRegistry> {
    let registry = InMemoryCredentialRegistry::new(DEPLOYER);
    registry
        .grant_status(DEPLOYER, alice(), StatusClass::VERIFIED_ACCOUNT)
        .unwrap();
    Arc::new(registry)
}

fn mint(recipient: Address, amount: u64) -> Bytes {
    IPositionManager::mintCall {
        params: MintParams {
            token0: POOL.token0,
            token1: POOL.token1,
            fee: POOL.fee,
            tickLower: I24::try_from(-60i32).unwrap(),
            tickUpper: I24::try_from(60i32).unwrap(),
            amount0Desired: U256::from(amount),
            amount1Desired: U256::from(amount),
            amount0Min: U256::ZERO,
            amount1Min: U256::ZERO,
            recipient,
            deadline: U256::from(EXPIRY),
        },
    }
    .abi_encode()
    .into()
}

fn decrease(token_id: U256, liquidity: u128) -> Bytes {
    IPositionManager::decreaseLiquidityCall {
        params: DecreaseLiquidityParams {
            tokenId: token_id,
            liquidity,
            amount0Min: U256::ZERO,
            amount1Min: U256::ZERO,
            deadline: U256::from(EXPIRY),
        },
    }
    .abi_encode()
    .into()
}

fn collect(token_id: U256, recipient: Address) -> Bytes {
    IPositionManager::collectCall {
        params: CollectParams {
            tokenId: token_id,
            recipient,
            amount0Max: u128::MAX,
            amount1Max: u128::MAX,
        },
    }
    .abi_encode()
    .into()
}

fn burn(token_id: U256) -> Bytes {
    IPositionManager::burnCall { tokenId: token_id }
        .abi_encode()
        .into()
}

fn set_emergency(engaged: bool) -> Bytes {
    IPositionManager::setEmergencyModeCall { engaged }
        .abi_encode()
        .into()
}

fn emergency_mode(manager: &mut Manager) -> bool {
    let query: Bytes = IPositionManager::emergencyModeCall {}.abi_encode().into();
    let output = manager
        .call(&CallContext::from_sender(alice()), &query)
        .unwrap();
    IPositionManager::emergencyModeCall::abi_decode_returns(&output, true)
        .unwrap()
        .engaged
}

fn mint_for(fixture: &GateFixture, manager: &mut Manager, owner: Address) -> U256 {
    let calldata = fixture.sign_batch(owner, vec![mint(owner, 100)]);
    let output = manager
        .call(&CallContext::from_sender(owner), &calldata)
        .unwrap();
    let results = decode_multicall_results(&output).unwrap();
    IPositionManager::mintCall::abi_decode_returns(&results[0], true)
        .unwrap()
        .tokenId
}

#[test]
fn test_exit_routes_are_mutually_exclusive() {
    let fixture = GateFixture::new();
    let mut manager = fixture.position_manager(credentials());
    let token_id = mint_for(&fixture, &mut manager, alice());
    let ctx = CallContext::from_sender(alice());

    assert!(!emergency_mode(&mut manager));
    assert_eq!(
        manager.call(&ctx, &decrease(token_id, 10)),
        Err(GateError::SelfMulticallOnly)
    );
    let batch = fixture.sign_batch(alice(), vec![decrease(token_id, 10)]);
    manager.call(&ctx, &batch).unwrap();

    manager
        .call(&CallContext::from_sender(DEPLOYER), &set_emergency(true))
        .unwrap();
    assert!(emergency_mode(&mut manager));
    assert_eq!(manager.call(&ctx, &batch), Err(GateError::TokenRouteDisabled));
    manager.call(&ctx, &decrease(token_id, 10)).unwrap();

    assert_eq!(manager.state().position(token_id).unwrap().liquidity, 80);
}

#[test]
fn test_full_emergency_exit_without_tokens() {
    let fixture = GateFixture::new();
    let mut manager = fixture.position_manager(credentials());
    let token_id = mint_for(&fixture, &mut manager, alice());
    manager
        .call(&CallContext::from_sender(DEPLOYER), &set_emergency(true))
        .unwrap();

    let ctx = CallContext::from_sender(alice());
    for call in [decrease(token_id, 100), collect(token_id, alice()), burn(token_id)] {
        manager.call(&ctx, &call).unwrap();
    }
    let state = manager.state();
    assert!(state.owner_of(token_id).is_none());
    assert_eq!(state.pool().paid_out(POOL.token0, alice()), U256::from(100u64));
    assert_eq!(state.pool().paid_out(POOL.token1, alice()), U256::from(100u64));
}

#[test]
fn test_revoked_credential_takes_effect_immediately() {
    let fixture = GateFixture::new();
    let creds = credentials();
    let mut manager = fixture.position_manager(creds.clone());
    let token_id = mint_for(&fixture, &mut manager, alice());
    manager
        .call(&CallContext::from_sender(DEPLOYER), &set_emergency(true))
        .unwrap();

    creds
        .revoke_status(DEPLOYER, alice(), StatusClass::VERIFIED_ACCOUNT)
        .unwrap();
    assert_eq!(
        manager.call(&CallContext::from_sender(alice()), &decrease(token_id, 1)),
        Err(GateError::CallerUnverified)
    );

    creds
        .grant_status(DEPLOYER, alice(), StatusClass::VERIFIED_PARTNER_APP)
        .unwrap();
    manager
        .call(&CallContext::from_sender(alice()), &decrease(token_id, 1))
        .unwrap();
}

#[test]
fn test_emergency_toggle_rolls_back_with_failed_batch() {
    let fixture = GateFixture::new();
    let mut manager = fixture.position_manager(credentials());
    let token_id = mint_for(&fixture, &mut manager, alice());

    // Toggling succeeds inside the batch, the following exit then fails.
    let batch = fixture.sign_batch(
        DEPLOYER,
        vec![set_emergency(true), decrease(token_id, 1)],
    );
    assert!(manager
        .call(&CallContext::from_sender(DEPLOYER), &batch)
        .is_err());
    assert!(!emergency_mode(&mut manager));
    assert!(!manager.state().policy().is_emergency());
}

#[test]
fn test_only_owner_toggles_emergency_mode() {
    let fixture = GateFixture::new();
    let mut manager = fixture.position_manager(credentials());
    let err = manager
        .call(&CallContext::from_sender(alice()), &set_emergency(true))
        .unwrap_err();
    assert_eq!(err.reason(), "Ownable: caller is not the owner");
    assert!(!emergency_mode(&mut manager));
}

#[test]
fn test_credential_transfer_between_verified_parties() {
    let fixture = GateFixture::new();
    let creds = credentials();
    creds
        .grant_status(DEPLOYER, wallet(0xb0), StatusClass::VERIFIED_PARTNER_APP)
        .unwrap();
    let mut manager = fixture.position_manager(creds);
    let token_id = mint_for(&fixture, &mut manager, alice());

    let transfer: Bytes = IVerifiedTransfers::transferFromCall {
        from: alice(),
        to: wallet(0xb0),
        tokenId: token_id,
    }
    .abi_encode()
    .into();
    manager
        .call(&CallContext::from_sender(alice()), &transfer)
        .unwrap();
    assert_eq!(manager.state().owner_of(token_id), Some(wallet(0xb0)));
}

#[test]
fn test_policy_follows_deployment_config() {
    let mut config = GateConfig::default_config();
    config.emergency.engaged = true;
    config.emergency.owner = Some(wallet(0x0f));
    config.emergency.allowed_status_classes = vec![7];
    let deployment = Deployment::from_config(config, Arc::new(ManualClock::new(0))).unwrap();

    let creds = credentials();
    creds
        .grant_status(DEPLOYER, wallet(0xb0), StatusClass::from(7))
        .unwrap();
    let policy = deployment.policy(creds);

    assert!(policy.is_emergency());
    assert_eq!(policy.flag().owner(), wallet(0x0f));
    assert!(!policy.is_verified(alice()));
    assert!(policy.is_verified(wallet(0xb0)));

    let manager = PositionManager::new(LinearPool::new().with_pool(POOL), policy);
    let mut executor = deployment.deploy(GATED_CONTRACT, manager).unwrap();
    assert_eq!(
        executor.call(&CallContext::from_sender(alice()), &mint(alice(), 1)),
        Err(GateError::SelfMulticallOnly)
    );
}
