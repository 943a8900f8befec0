//! ABI surface of the batch entry points and calldata helpers.

use alloy_primitives::{Bytes, B256, U256};
use alloy_sol_types::{sol, SolCall};
use eatgate_core::Selector;
use eatgate_crypto::{SplitSignature, AUTH_PREFIX_LEN};

use crate::error::{GateError, GateResult};

sol! {
    /// Gated batch entry point.
    interface IEATMulticall {
        function multicall(uint8 v, bytes32 r, bytes32 s, uint256 expiry, bytes[] data)
            external
            payable
            returns (bytes[] memory results);
    }

    /// Ungated batch entry point kept for interface compatibility.
    interface IMulticall {
        function multicall(bytes[] data) external payable returns (bytes[] memory results);
    }
}

/// `multicall(uint8,bytes32,bytes32,uint256,bytes[])`
pub const EAT_MULTICALL_SELECTOR: Selector =
    Selector::new(IEATMulticall::multicallCall::SELECTOR);

/// `multicall(bytes[])`
pub const LEGACY_MULTICALL_SELECTOR: Selector = Selector::new(IMulticall::multicallCall::SELECTOR);

pub fn is_reserved(selector: &Selector) -> bool {
    *selector == EAT_MULTICALL_SELECTOR || *selector == LEGACY_MULTICALL_SELECTOR
}

/// Gated batch calldata carrying `signature` and `expiry`.
pub fn encode_eat_multicall(signature: &SplitSignature, expiry: U256, calls: Vec<Bytes>) -> Bytes {
    IEATMulticall::multicallCall {
        v: signature.v,
        r: signature.r,
        s: signature.s,
        expiry,
        data: calls,
    }
    .abi_encode()
    .into()
}

pub fn encode_legacy_multicall(calls: Vec<Bytes>) -> Bytes {
    IMulticall::multicallCall { data: calls }.abi_encode().into()
}

pub fn decode_multicall_results(output: &[u8]) -> GateResult<Vec<Bytes>> {
    IEATMulticall::multicallCall::abi_decode_returns(output, true)
        .map(|ret| ret.results)
        .map_err(|e| GateError::MalformedCalldata(e.to_string()))
}

pub fn encode_multicall_results(results: Vec<Bytes>) -> Bytes {
    IEATMulticall::multicallCall::abi_encode_returns(&(results,)).into()
}

/// Split the `(v, r, s, expiry)` words that follow the selector.
///
/// `None` when the calldata is too short or `v` does not fit in a byte.
pub fn decode_auth_prefix(calldata: &[u8]) -> Option<(SplitSignature, U256)> {
    if calldata.len() < AUTH_PREFIX_LEN {
        return None;
    }
    let word = |i: usize| &calldata[4 + i * 32..4 + (i + 1) * 32];

    let v_word = word(0);
    if v_word[..31].iter().any(|b| *b != 0) {
        return None;
    }
    let signature = SplitSignature::new(
        v_word[31],
        B256::from_slice(word(1)),
        B256::from_slice(word(2)),
    );
    let expiry = U256::from_be_slice(word(3));
    Some((signature, expiry))
}
