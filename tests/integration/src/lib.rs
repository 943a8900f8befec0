//! Integration tests for the EATGate authorization layer
//!
//! This test suite validates:
//! - End-to-end token issuance, batch verification and execution
//! - Call-flow lock behaviour (batch-only operations, nested batches)
//! - Atomic rollback of failed batches
//! - Issuer lifecycle (activation, deactivation, rotation) against live contracts
//! - The dual-path policy on the position manager
//! - Registry sharing across concurrently executing contracts

pub mod test_utils;

#[cfg(test)]
mod eat_multicall_tests;

#[cfg(test)]
mod dual_path_tests;
