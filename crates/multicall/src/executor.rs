//! Gated batch executor.
//!
//! Every external call enters through [`GatedExecutor::call`]. The executor
//! handles the two batch entry points itself and dispatches everything else
//! through the contract's [`OperationTable`]:
//!
//! - `multicall(v, r, s, expiry, bytes[])` verifies a token bound to the
//!   whole batch, takes the call-flow lock, then runs each sub-call against
//!   the same state with the same [`CallContext`]. Every sub-call sees the
//!   full attached value.
//! - `multicall(bytes[])` always fails.
//!
//! Calls are transactional: the contract state is snapshotted on entry and
//! restored if anything fails, so a failed batch leaves no trace of the
//! sub-calls that ran before the failure.

use alloy_primitives::{Address, Bytes, U256};
use alloy_sol_types::SolCall;
use eatgate_core::selector_of;
use eatgate_crypto::SplitSignature;
use tracing::{debug, warn};

use crate::abi::{
    decode_multicall_results, encode_eat_multicall, encode_legacy_multicall,
    encode_multicall_results, IEATMulticall, EAT_MULTICALL_SELECTOR, LEGACY_MULTICALL_SELECTOR,
};
use crate::context::{CallContext, Invocation};
use crate::error::{GateError, GateResult};
use crate::lock::CallFlowLock;
use crate::operations::{GatedContract, Guard, OperationTable};
use crate::verifier::AccessTokenVerifier;

#[derive(Debug)]
pub struct GatedExecutor<S: GatedContract> {
    address: Address,
    state: S,
    operations: OperationTable<S>,
    verifier: AccessTokenVerifier,
    lock: CallFlowLock,
}

impl<S: GatedContract> GatedExecutor<S> {
    pub fn new(address: Address, state: S, verifier: AccessTokenVerifier) -> GateResult<Self> {
        Ok(Self {
            address,
            state,
            operations: S::operations()?,
            verifier,
            lock: CallFlowLock::new(),
        })
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn state(&self) -> &S {
        &self.state
    }

    pub fn verifier(&self) -> &AccessTokenVerifier {
        &self.verifier
    }

    pub fn is_locked(&self) -> bool {
        self.lock.is_locked()
    }

    /// Execute raw calldata on behalf of `ctx.sender`.
    pub fn call(&mut self, ctx: &CallContext, calldata: &[u8]) -> GateResult<Bytes> {
        let snapshot = self.state.clone();
        let result = self.dispatch(ctx, calldata);
        if let Err(e) = &result {
            debug!(sender = %ctx.sender, error = %e, "call reverted, state restored");
            self.state = snapshot;
        }
        result
    }

    /// Authorized batch. Returns each sub-call's return data in order.
    pub fn multicall(
        &mut self,
        ctx: &CallContext,
        signature: &SplitSignature,
        expiry: U256,
        calls: Vec<Bytes>,
    ) -> GateResult<Vec<Bytes>> {
        let calldata = encode_eat_multicall(signature, expiry, calls);
        let output = self.call(ctx, &calldata)?;
        decode_multicall_results(&output)
    }

    /// Ungated batch entry point. Always fails.
    pub fn legacy_multicall(&mut self, ctx: &CallContext, calls: Vec<Bytes>) -> GateResult<Vec<Bytes>> {
        let calldata = encode_legacy_multicall(calls);
        let output = self.call(ctx, &calldata)?;
        decode_multicall_results(&output)
    }

    fn dispatch(&mut self, ctx: &CallContext, calldata: &[u8]) -> GateResult<Bytes> {
        let selector = selector_of(calldata).ok_or(GateError::UnknownSelector)?;
        if selector == EAT_MULTICALL_SELECTOR {
            return self.gated_multicall(ctx, calldata);
        }
        if selector == LEGACY_MULTICALL_SELECTOR {
            warn!(sender = %ctx.sender, "legacy multicall refused");
            return Err(GateError::LegacyMulticallDisallowed);
        }

        let operation = *self
            .operations
            .get(&selector)
            .ok_or(GateError::UnknownSelector)?;
        let in_batch = self.lock.is_locked();
        match operation.guard {
            Guard::Open => {}
            Guard::SelfMulticallOnly => {
                if !in_batch {
                    warn!(sender = %ctx.sender, operation = operation.name, "direct call to batch-only operation");
                    return Err(GateError::SelfMulticallOnly);
                }
            }
            Guard::AccessToken => {
                self.verifier
                    .verify_calldata(self.address, ctx.sender, calldata)?;
            }
        }

        let invocation = Invocation {
            context: *ctx,
            this: self.address,
            in_batch,
            now: self.verifier.now(),
        };
        debug!(sender = %ctx.sender, operation = operation.name, in_batch, "dispatching");
        (operation.handler)(&mut self.state, &invocation, calldata)
    }

    fn gated_multicall(&mut self, ctx: &CallContext, calldata: &[u8]) -> GateResult<Bytes> {
        if self.lock.is_locked() {
            warn!(sender = %ctx.sender, "nested multicall refused");
            return Err(GateError::CallFlowLocked);
        }
        let batch = IEATMulticall::multicallCall::abi_decode(calldata, true)
            .map_err(|e| GateError::MalformedCalldata(e.to_string()))?;
        self.verifier
            .verify_calldata(self.address, ctx.sender, calldata)?;

        let _guard = self.lock.try_acquire()?;
        let mut results = Vec::with_capacity(batch.data.len());
        for (index, sub_call) in batch.data.iter().enumerate() {
            match self.dispatch(ctx, sub_call) {
                Ok(output) => results.push(output),
                Err(e) => {
                    warn!(sender = %ctx.sender, index, error = %e, "batch aborted");
                    return Err(e);
                }
            }
        }
        debug!(sender = %ctx.sender, calls = results.len(), "batch executed");
        Ok(encode_multicall_results(results))
    }
}
