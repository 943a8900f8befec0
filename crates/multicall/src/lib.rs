//! Gated batch execution for EATGate.
//!
//! This crate puts a capability-token gate in front of a contract's batch
//! entry point:
//! - Access-token verification against a shared issuer registry
//! - A call-flow lock guarding batch-only operations and nested batches
//! - Selector-keyed operation dispatch with transactional rollback
//! - The dual-path (token or credential) policy for exit operations
//!
//! # Architecture
//!
//! Calls flow through the following pipeline:
//! 1. Calldata enters [`GatedExecutor::call`] with a [`CallContext`]
//! 2. `multicall(v, r, s, expiry, calls)` is verified by [`AccessTokenVerifier`]
//! 3. The [`CallFlowLock`] is taken for the sub-call loop
//! 4. Each sub-call is dispatched through the contract's [`OperationTable`]
//! 5. Exit operations consult the [`DualPathPolicy`]
//!
//! # Examples
//!
//! ```no_run
//! use std::sync::Arc;
//! use eatgate_core::{GateConfig, SystemClock};
//! use eatgate_multicall::{CallContext, Deployment};
//! # use eatgate_multicall::{GatedContract, GateResult, OperationTable};
//! # #[derive(Clone)]
//! # struct Vault;
//! # impl GatedContract for Vault {
//! #     fn operations() -> GateResult<OperationTable<Self>> { Ok(OperationTable::new()) }
//! # }
//!
//! let deployment = Deployment::from_config(GateConfig::default_config(), Arc::new(SystemClock))?;
//! let mut vault = deployment.deploy("0xe7f1725E7734CE288F8367e1Bb143E90bb3F0512".parse()?, Vault)?;
//! let calldata: Vec<u8> = Vec::new(); // signed multicall calldata from an issuer
//! vault.call(&CallContext::from_sender("0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266".parse()?), &calldata)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod abi;
pub mod context;
pub mod deployment;
pub mod error;
pub mod executor;
pub mod lock;
pub mod operations;
pub mod policy;
pub mod verifier;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

pub use context::{CallContext, Invocation};
pub use deployment::Deployment;
pub use error::{GateError, GateResult, RevertData};
pub use executor::GatedExecutor;
pub use lock::{CallFlowGuard, CallFlowLock};
pub use operations::{GatedContract, Guard, Handler, Operation, OperationTable};
pub use policy::{DualPathPolicy, EmergencyFlag};
pub use verifier::{AccessTokenVerifier, VerificationError};
