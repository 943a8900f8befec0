//! Primitive types shared across the workspace.
//!
//! Addresses, words and byte strings follow the EVM conventions of the
//! contracts this layer guards, so they are re-exported from `alloy-primitives`.

pub use alloy_primitives::{Address, Bytes, B256, U256};

use alloy_primitives::FixedBytes;

/// 4-byte function selector heading every encoded call.
pub type Selector = FixedBytes<4>;

/// Extract the selector from encoded calldata.
///
/// Returns `None` when the calldata is shorter than a selector.
pub fn selector_of(calldata: &[u8]) -> Option<Selector> {
    calldata.get(..4).map(Selector::from_slice)
}
