//! Liquidity-position manager served through the EATGate executor.
//!
//! The manager exposes the subset of a concentrated-liquidity position
//! manager that the gate protects. Pool math is an external collaborator
//! reached through [`PoolBackend`]; [`LinearPool`] is the deterministic
//! implementation used in tests.

pub mod error;
pub mod interface;
pub mod manager;
pub mod pool;

pub use error::{PositionError, PositionResult};
pub use manager::{Position, PositionManager};
pub use pool::{LinearPool, PoolAmounts, PoolBackend, PoolKey};
