//! End-to-end gated multicall scenarios.
//!
//! # Test Scenarios
//!
//! 1. A signed batch of one `pays()` with value 3 records 3
//! 2. Two `pays()` in one batch each see the full value and record 6
//! 3. Sub-call revert reasons propagate verbatim and roll back the batch
//! 4. The legacy entry point, batch-only operations and nested batches
//! 5. Issuer deactivation, rotation and token expiry

use alloy_primitives::{b256, Address, Bytes, U256};
use alloy_sol_types::SolCall;
use eatgate_crypto::{AccessToken, FunctionCall, IssuerKey};
use eatgate_multicall::abi::{decode_auth_prefix, decode_multicall_results, IEATMulticall};
use eatgate_multicall::testing::IProbe;
use eatgate_multicall::{CallContext, GateError};

use crate::test_utils::{pays, record, wallet, GateFixture, DEPLOYER, EXPIRY, GATED_CONTRACT};

fn paying(value: u64) -> CallContext {
    CallContext::new(DEPLOYER, U256::from(value))
}

#[test]
fn test_single_payment_batch() {
    let fixture = GateFixture::new();
    let mut probe = fixture.probe();
    let calldata = fixture.sign_batch(DEPLOYER, vec![pays()]);

    probe.call(&paying(3), &calldata).unwrap();
    assert_eq!(probe.state().paid, U256::from(3u64));
}

#[test]
fn test_batch_digest_matches_published_vector() {
    let fixture = GateFixture::new();
    let calldata = fixture.sign_batch(DEPLOYER, vec![pays()]);
    let (_, expiry) = decode_auth_prefix(&calldata).unwrap();
    let token = AccessToken::new(
        expiry,
        FunctionCall::from_calldata(GATED_CONTRACT, DEPLOYER, &calldata).unwrap(),
    );
    assert_eq!(
        token.signing_digest(fixture.deployment.domain()),
        b256!("634b843d4ece0e753818df65c0a3b3e0e4292a1d298512d8f90ed63d851491d5")
    );
}

#[test]
fn test_value_forwarded_to_every_sub_call() {
    let fixture = GateFixture::new();
    let mut probe = fixture.probe();
    let calldata = fixture.sign_batch(DEPLOYER, vec![pays(), pays()]);

    probe.call(&paying(3), &calldata).unwrap();
    assert_eq!(probe.state().paid, U256::from(6u64));
}

#[test]
fn test_direct_call_without_batch() {
    let fixture = GateFixture::new();
    let mut probe = fixture.probe();
    probe.call(&paying(3), &pays()).unwrap();

    let paid: Bytes = IProbe::paidCall {}.abi_encode().into();
    let output = probe.call(&paying(0), &paid).unwrap();
    let amount = IProbe::paidCall::abi_decode_returns(&output, true)
        .unwrap()
        .amount;
    assert_eq!(amount, U256::from(3u64));
}

#[test]
fn test_revert_reason_propagates_and_rolls_back() {
    let fixture = GateFixture::new();
    let mut probe = fixture.probe();
    let fail: Bytes = IProbe::revertWithCall {
        reason: "Price slippage check".to_string(),
    }
    .abi_encode()
    .into();
    let calldata = fixture.sign_batch(DEPLOYER, vec![pays(), record("a"), fail]);

    let err = probe.call(&paying(3), &calldata).unwrap_err();
    assert_eq!(err.reason(), "Price slippage check");
    assert_eq!(
        err.revert_data().reason().as_deref(),
        Some("Price slippage check")
    );
    assert_eq!(probe.state().paid, U256::ZERO);
    assert!(probe.state().entries.is_empty());
    assert!(!probe.is_locked());
}

#[test]
fn test_legacy_multicall_always_disallowed() {
    let fixture = GateFixture::new();
    let mut probe = fixture.probe();
    for calls in [vec![], vec![pays()], vec![record("x"), pays()]] {
        assert_eq!(
            probe.legacy_multicall(&paying(1), calls),
            Err(GateError::LegacyMulticallDisallowed)
        );
    }
    assert_eq!(probe.state().paid, U256::ZERO);
}

#[test]
fn test_batch_only_operation() {
    let fixture = GateFixture::new();
    let mut probe = fixture.probe();
    let only: Bytes = IProbe::onlyBatchedCall {}.abi_encode().into();

    let err = probe.call(&paying(0), &only).unwrap_err();
    assert_eq!(err.reason(), "only callable by self multicall");

    let calldata = fixture.sign_batch(DEPLOYER, vec![only]);
    let output = probe.call(&paying(0), &calldata).unwrap();
    let results = decode_multicall_results(&output).unwrap();
    let answer = IProbe::onlyBatchedCall::abi_decode_returns(&results[0], true)
        .unwrap()
        .answer;
    assert_eq!(answer, U256::from(42u64));
}

#[test]
fn test_nested_batch_never_runs() {
    let fixture = GateFixture::new();
    let mut probe = fixture.probe();
    let inner = fixture.sign_batch(DEPLOYER, vec![record("inner"), pays()]);
    let outer = fixture.sign_batch(DEPLOYER, vec![record("outer"), inner]);

    let err = probe.call(&paying(5), &outer).unwrap_err();
    assert_eq!(err.reason(), "call-flow locked");
    assert!(probe.state().entries.is_empty());
    assert_eq!(probe.state().paid, U256::ZERO);
}

#[test]
fn test_token_bound_to_caller_target_and_batch() {
    let fixture = GateFixture::new();
    let mut probe = fixture.probe();
    let calldata = fixture.sign_batch(DEPLOYER, vec![pays()]);

    // Different caller.
    assert_eq!(
        probe.call(&CallContext::new(wallet(0x99), U256::from(3u64)), &calldata),
        Err(GateError::VerificationFailure)
    );

    // Different target.
    let mut elsewhere = fixture
        .deployment
        .deploy(wallet(0x55), eatgate_multicall::testing::Probe::default())
        .unwrap();
    assert_eq!(
        elsewhere.call(&paying(3), &calldata),
        Err(GateError::VerificationFailure)
    );

    // Same signature over a different batch.
    let (signature, expiry) = decode_auth_prefix(&calldata).unwrap();
    assert_eq!(
        probe.multicall(&paying(3), &signature, expiry, vec![pays(), pays()]),
        Err(GateError::VerificationFailure)
    );
    assert_eq!(probe.state().paid, U256::ZERO);
}

#[test]
fn test_unknown_issuer_rejected() {
    let fixture = GateFixture::new();
    let mut probe = fixture.probe();
    let rogue = IssuerKey::random();
    let calldata = fixture.sign_batch_with(&rogue, DEPLOYER, U256::from(EXPIRY), vec![pays()]);
    let err = probe.call(&paying(3), &calldata).unwrap_err();
    assert_eq!(err.reason(), "AccessToken: verification failure");
}

#[test]
fn test_deactivated_issuer_tokens_stop_verifying() {
    let fixture = GateFixture::new();
    let mut probe = fixture.probe();
    let calldata = fixture.sign_batch(DEPLOYER, vec![pays()]);
    probe.call(&paying(1), &calldata).unwrap();

    fixture
        .deployment
        .registry()
        .write()
        .unwrap()
        .deactivate_issuers(fixture.root(), &[fixture.issuer.address()])
        .unwrap();
    assert_eq!(
        probe.call(&paying(1), &calldata),
        Err(GateError::VerificationFailure)
    );

    fixture
        .deployment
        .registry()
        .write()
        .unwrap()
        .activate_issuers(fixture.root(), &[fixture.issuer.address()])
        .unwrap();
    probe.call(&paying(1), &calldata).unwrap();
    assert_eq!(probe.state().paid, U256::from(2u64));
}

#[test]
fn test_rotated_intermediate_manages_issuers() {
    let fixture = GateFixture::new();
    let mut probe = fixture.probe();
    let intermediate = wallet(0x11);
    let next_issuer = IssuerKey::random();
    {
        let mut registry = fixture.deployment.registry().write().unwrap();
        registry
            .rotate_intermediate(fixture.root(), intermediate)
            .unwrap();
        registry
            .activate_issuers(intermediate, &[next_issuer.address()])
            .unwrap();
        assert!(registry
            .rotate_intermediate(intermediate, wallet(0x12))
            .is_err());
    }

    let calldata = fixture.sign_batch_with(&next_issuer, DEPLOYER, U256::from(EXPIRY), vec![pays()]);
    probe.call(&paying(4), &calldata).unwrap();
    assert_eq!(probe.state().paid, U256::from(4u64));
}

#[test]
fn test_expired_token() {
    let fixture = GateFixture::new();
    let mut probe = fixture.probe();
    let deadline = crate::test_utils::GENESIS_TIME + 60;
    let calldata =
        fixture.sign_batch_with(&fixture.issuer, DEPLOYER, U256::from(deadline), vec![pays()]);

    probe.call(&paying(1), &calldata).unwrap();
    fixture.clock.set(deadline);
    let err = probe.call(&paying(1), &calldata).unwrap_err();
    assert_eq!(err.reason(), "AccessToken: has expired");
    assert_eq!(probe.state().paid, U256::from(1u64));
}

#[test]
fn test_duplicate_submission_is_accepted() {
    let fixture = GateFixture::new();
    let mut probe = fixture.probe();
    let calldata = fixture.sign_batch(DEPLOYER, vec![pays()]);
    for _ in 0..3 {
        probe.call(&paying(2), &calldata).unwrap();
    }
    assert_eq!(probe.state().paid, U256::from(6u64));
}

#[test]
fn test_malformed_batch_calldata() {
    let fixture = GateFixture::new();
    let mut probe = fixture.probe();
    let calldata = fixture.sign_batch(DEPLOYER, vec![pays()]);

    let truncated = &calldata[..calldata.len() - 10];
    assert!(matches!(
        probe.call(&paying(1), truncated),
        Err(GateError::MalformedCalldata(_))
    ));
    assert!(matches!(
        probe.call(&paying(1), &IEATMulticall::multicallCall::SELECTOR),
        Err(GateError::MalformedCalldata(_))
    ));
    assert!(!probe.is_locked());
}

#[test]
fn test_unknown_selector() {
    let fixture = GateFixture::new();
    let mut probe = fixture.probe();
    let err = probe.call(&paying(0), &[0xde, 0xad, 0xbe, 0xef]).unwrap_err();
    assert_eq!(err.reason(), "function selector not recognized");
    assert_eq!(
        probe.call(&paying(0), &[0x01]),
        Err(GateError::UnknownSelector)
    );
}

#[test]
fn test_sub_calls_see_original_sender() {
    let fixture = GateFixture::new();
    let mut probe = fixture.probe();
    let caller = wallet(0x77);
    let whoami: Bytes = IProbe::whoamiCall {}.abi_encode().into();
    let calldata = fixture.sign_batch(caller, vec![whoami]);

    let output = probe
        .call(&CallContext::from_sender(caller), &calldata)
        .unwrap();
    let results = decode_multicall_results(&output).unwrap();
    let sender: Address = IProbe::whoamiCall::abi_decode_returns(&results[0], true)
        .unwrap()
        .sender;
    assert_eq!(sender, caller);
}
