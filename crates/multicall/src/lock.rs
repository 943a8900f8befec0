//! Call-flow lock.
//!
//! Held for exactly the duration of an authorized batch's sub-call loop. The
//! guard releases it on drop, so an early return or a panic inside the loop
//! cannot leave it set.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::{GateError, GateResult};

#[derive(Debug, Clone, Default)]
pub struct CallFlowLock {
    locked: Arc<AtomicBool>,
}

impl CallFlowLock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_locked(&self) -> bool {
        self.locked.load(Ordering::Acquire)
    }

    /// Take the lock, failing with [`GateError::CallFlowLocked`] if held.
    pub fn try_acquire(&self) -> GateResult<CallFlowGuard> {
        self.locked
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| GateError::CallFlowLocked)?;
        Ok(CallFlowGuard {
            locked: Arc::clone(&self.locked),
        })
    }
}

/// Scoped ownership of the [`CallFlowLock`].
#[derive(Debug)]
#[must_use = "the lock is released as soon as the guard is dropped"]
pub struct CallFlowGuard {
    locked: Arc<AtomicBool>,
}

impl Drop for CallFlowGuard {
    fn drop(&mut self) {
        self.locked.store(false, Ordering::Release);
    }
}
