//! Time sources.
//!
//! Token expiry is the only wall-clock comparison in the authorization layer,
//! and position deadlines are evaluated against the same source. Both read the
//! time through [`Clock`] so tests and simulations can pin it.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

/// Source of the current processing time in Unix seconds.
pub trait Clock: Send + Sync + fmt::Debug {
    /// Current time (Unix seconds).
    fn now(&self) -> u64;
}

/// Clock backed by the system wall time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> u64 {
        // Pre-epoch system time reads as zero.
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0)
    }
}

/// Settable clock shared between a test and the components it drives.
///
/// Clones observe the same time.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    seconds: Arc<AtomicU64>,
}

impl ManualClock {
    /// Create a clock reading `start`.
    pub fn new(start: u64) -> Self {
        Self {
            seconds: Arc::new(AtomicU64::new(start)),
        }
    }

    /// Set the current time.
    pub fn set(&self, seconds: u64) {
        self.seconds.store(seconds, Ordering::SeqCst);
    }

    /// Move the clock forward.
    pub fn advance(&self, by: u64) {
        self.seconds.fetch_add(by, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> u64 {
        self.seconds.load(Ordering::SeqCst)
    }
}
