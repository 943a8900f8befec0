//! Registered-operation table.
//!
//! A gated contract exposes its callable surface as selector-keyed entries;
//! the executor dispatches batched and direct calls through the table.

use std::collections::HashMap;
use std::fmt;

use alloy_primitives::Bytes;
use eatgate_core::Selector;

use crate::abi::is_reserved;
use crate::context::Invocation;
use crate::error::{GateError, GateResult};

/// Access rule the executor enforces before running a handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Guard {
    /// Directly callable.
    Open,
    /// Only callable from inside an authorized batch.
    SelfMulticallOnly,
    /// Leading arguments are `(v, r, s, expiry)`; a token bound to this exact
    /// call must verify before the handler runs.
    AccessToken,
}

/// Operation handler. Receives the full calldata, selector included.
pub type Handler<S> = fn(&mut S, &Invocation, &[u8]) -> GateResult<Bytes>;

pub struct Operation<S> {
    pub name: &'static str,
    pub guard: Guard,
    pub handler: Handler<S>,
}

impl<S> Clone for Operation<S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S> Copy for Operation<S> {}

impl<S> fmt::Debug for Operation<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Operation")
            .field("name", &self.name)
            .field("guard", &self.guard)
            .finish()
    }
}

pub struct OperationTable<S> {
    operations: HashMap<Selector, Operation<S>>,
}

impl<S> OperationTable<S> {
    pub fn new() -> Self {
        Self {
            operations: HashMap::new(),
        }
    }

    /// Register an operation. The batch entry points are reserved and each
    /// selector may be registered once.
    pub fn register(
        &mut self,
        selector: impl Into<Selector>,
        name: &'static str,
        guard: Guard,
        handler: Handler<S>,
    ) -> GateResult<()> {
        let selector = selector.into();
        if is_reserved(&selector) {
            return Err(GateError::Configuration(format!(
                "{name}: selector {selector} is reserved for the batch entry points"
            )));
        }
        if let Some(existing) = self.operations.get(&selector) {
            return Err(GateError::Configuration(format!(
                "{name}: selector {selector} already registered by {}",
                existing.name
            )));
        }
        self.operations.insert(
            selector,
            Operation {
                name,
                guard,
                handler,
            },
        );
        Ok(())
    }

    pub fn get(&self, selector: &Selector) -> Option<&Operation<S>> {
        self.operations.get(selector)
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.operations.values().map(|op| op.name).collect();
        names.sort_unstable();
        names
    }
}

impl<S> Default for OperationTable<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> fmt::Debug for OperationTable<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OperationTable")
            .field("operations", &self.names())
            .finish()
    }
}

/// Host state behind a [`crate::GatedExecutor`].
///
/// `Clone` is the snapshot used to roll back a failed call.
pub trait GatedContract: Clone + Send + Sized {
    fn operations() -> GateResult<OperationTable<Self>>;
}
