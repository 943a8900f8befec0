//! Probe contract and token-authoring helpers for tests and benches.

use alloy_primitives::{Address, Bytes, U256};
use alloy_sol_types::{sol, SolCall};
use eatgate_crypto::{AccessToken, CryptoResult, Domain, FunctionCall, IssuerKey};

use crate::context::Invocation;
use crate::error::{GateError, GateResult};
use crate::operations::{GatedContract, Guard, OperationTable};

sol! {
    interface IProbe {
        function pays() external payable;
        function paid() external view returns (uint256 amount);
        function record(string entry) external;
        function revertWith(string reason) external;
        function onlyBatched() external returns (uint256 answer);
        function whoami() external view returns (address sender);
    }
}

/// Minimal gated contract: accepts payments and records entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Probe {
    pub paid: U256,
    pub entries: Vec<String>,
}

impl GatedContract for Probe {
    fn operations() -> GateResult<OperationTable<Self>> {
        let mut table = OperationTable::new();
        table.register(IProbe::paysCall::SELECTOR, "pays", Guard::Open, Probe::pays)?;
        table.register(IProbe::paidCall::SELECTOR, "paid", Guard::Open, Probe::paid)?;
        table.register(IProbe::recordCall::SELECTOR, "record", Guard::Open, Probe::record)?;
        table.register(
            IProbe::revertWithCall::SELECTOR,
            "revertWith",
            Guard::Open,
            Probe::revert_with,
        )?;
        table.register(
            IProbe::onlyBatchedCall::SELECTOR,
            "onlyBatched",
            Guard::SelfMulticallOnly,
            Probe::only_batched,
        )?;
        table.register(IProbe::whoamiCall::SELECTOR, "whoami", Guard::Open, Probe::whoami)?;
        Ok(table)
    }
}

impl Probe {
    fn pays(&mut self, invocation: &Invocation, _: &[u8]) -> GateResult<Bytes> {
        self.paid += invocation.value();
        Ok(Bytes::new())
    }

    fn paid(&mut self, _: &Invocation, _: &[u8]) -> GateResult<Bytes> {
        Ok(IProbe::paidCall::abi_encode_returns(&(self.paid,)).into())
    }

    fn record(&mut self, _: &Invocation, data: &[u8]) -> GateResult<Bytes> {
        let call = IProbe::recordCall::abi_decode(data, true)
            .map_err(|e| GateError::MalformedCalldata(e.to_string()))?;
        self.entries.push(call.entry);
        Ok(Bytes::new())
    }

    fn revert_with(&mut self, _: &Invocation, data: &[u8]) -> GateResult<Bytes> {
        let call = IProbe::revertWithCall::abi_decode(data, true)
            .map_err(|e| GateError::MalformedCalldata(e.to_string()))?;
        Err(GateError::revert(&call.reason))
    }

    fn only_batched(&mut self, _: &Invocation, _: &[u8]) -> GateResult<Bytes> {
        Ok(IProbe::onlyBatchedCall::abi_encode_returns(&(U256::from(42u64),)).into())
    }

    fn whoami(&mut self, invocation: &Invocation, _: &[u8]) -> GateResult<Bytes> {
        Ok(IProbe::whoamiCall::abi_encode_returns(&(invocation.sender(),)).into())
    }
}

/// Sign a token for `call` and return calldata carrying it.
///
/// `call` must be a gated call whose first four arguments are
/// `(v, r, s, expiry)`; their values in `call` are ignored.
pub fn authorize_call<C: SolCall>(
    issuer: &IssuerKey,
    domain: &Domain,
    target: Address,
    caller: Address,
    expiry: U256,
    call: &C,
) -> CryptoResult<Bytes> {
    let unsigned = call.abi_encode();
    let function_call = FunctionCall::from_calldata(target, caller, &unsigned)?;
    let signed = issuer.sign_token(&AccessToken::new(expiry, function_call), domain)?;
    Ok(signed.calldata())
}
