//! Call context passed to every operation.

use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};

/// The outer call as the original invoker made it.
///
/// Every sub-call of a batch sees the same context: the same sender and the
/// full attached value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallContext {
    pub sender: Address,
    pub value: U256,
}

impl CallContext {
    pub fn new(sender: Address, value: U256) -> Self {
        Self { sender, value }
    }

    /// A call without attached value.
    pub fn from_sender(sender: Address) -> Self {
        Self::new(sender, U256::ZERO)
    }
}

/// What a handler learns about the invocation it is serving.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Invocation {
    pub context: CallContext,
    /// Address of the contract executing the operation.
    pub this: Address,
    /// Whether the call-flow lock is held, i.e. the call runs inside an
    /// authorized batch.
    pub in_batch: bool,
    /// Processing time in unix seconds.
    pub now: u64,
}

impl Invocation {
    pub fn sender(&self) -> Address {
        self.context.sender
    }

    pub fn value(&self) -> U256 {
        self.context.value
    }
}
