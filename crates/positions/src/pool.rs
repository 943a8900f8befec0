//! Pool collaborator.
//!
//! Pricing and tick math live behind [`PoolBackend`]. [`LinearPool`] is a
//! deterministic stand-in: liquidity equals the smaller desired amount and
//! one unit of liquidity is worth one unit of each token.

use std::collections::HashMap;
use std::fmt;

use alloy_primitives::aliases::U24;
use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};

use crate::error::{PositionError, PositionResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PoolKey {
    pub token0: Address,
    pub token1: Address,
    pub fee: U24,
}

/// Amounts moved by a pool operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PoolAmounts {
    pub amount0: U256,
    pub amount1: U256,
}

pub trait PoolBackend: Clone + Send + fmt::Debug {
    /// Deposit up to the desired amounts from `payer`; returns the liquidity
    /// minted and the amounts actually taken.
    fn add_liquidity(
        &mut self,
        key: &PoolKey,
        payer: Address,
        amount0_desired: U256,
        amount1_desired: U256,
    ) -> PositionResult<(u128, PoolAmounts)>;

    /// Burn `liquidity`; returns the token amounts it is worth.
    fn remove_liquidity(&mut self, key: &PoolKey, liquidity: u128) -> PositionResult<PoolAmounts>;

    /// Pay owed tokens out to `recipient`.
    fn collect(
        &mut self,
        key: &PoolKey,
        recipient: Address,
        amount0: u128,
        amount1: u128,
    ) -> PositionResult<()>;
}

#[derive(Debug, Clone, Default)]
pub struct LinearPool {
    reserves: HashMap<PoolKey, PoolAmounts>,
    deposits: HashMap<(Address, Address), U256>,
    payouts: HashMap<(Address, Address), U256>,
}

impl LinearPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an (empty) pool.
    pub fn with_pool(mut self, key: PoolKey) -> Self {
        self.reserves.insert(key, PoolAmounts::default());
        self
    }

    pub fn reserves(&self, key: &PoolKey) -> Option<PoolAmounts> {
        self.reserves.get(key).copied()
    }

    /// Total of `token` deposited by `payer`.
    pub fn deposited(&self, token: Address, payer: Address) -> U256 {
        self.deposits.get(&(token, payer)).copied().unwrap_or_default()
    }

    /// Total of `token` paid out to `recipient`.
    pub fn paid_out(&self, token: Address, recipient: Address) -> U256 {
        self.payouts.get(&(token, recipient)).copied().unwrap_or_default()
    }

    fn reserves_mut(&mut self, key: &PoolKey) -> PositionResult<&mut PoolAmounts> {
        self.reserves
            .get_mut(key)
            .ok_or_else(|| PositionError::Pool("pool not initialized".to_string()))
    }
}

impl PoolBackend for LinearPool {
    fn add_liquidity(
        &mut self,
        key: &PoolKey,
        payer: Address,
        amount0_desired: U256,
        amount1_desired: U256,
    ) -> PositionResult<(u128, PoolAmounts)> {
        let amount = amount0_desired.min(amount1_desired);
        let liquidity = u128::try_from(amount)
            .map_err(|_| PositionError::Pool("liquidity overflow".to_string()))?;

        let reserves = self.reserves_mut(key)?;
        reserves.amount0 += amount;
        reserves.amount1 += amount;
        *self.deposits.entry((key.token0, payer)).or_default() += amount;
        *self.deposits.entry((key.token1, payer)).or_default() += amount;

        Ok((
            liquidity,
            PoolAmounts {
                amount0: amount,
                amount1: amount,
            },
        ))
    }

    fn remove_liquidity(&mut self, key: &PoolKey, liquidity: u128) -> PositionResult<PoolAmounts> {
        // Owed amounts stay in reserves until collected.
        self.reserves_mut(key)?;
        let amount = U256::from(liquidity);
        Ok(PoolAmounts {
            amount0: amount,
            amount1: amount,
        })
    }

    fn collect(
        &mut self,
        key: &PoolKey,
        recipient: Address,
        amount0: u128,
        amount1: u128,
    ) -> PositionResult<()> {
        let (amount0, amount1) = (U256::from(amount0), U256::from(amount1));
        let reserves = self.reserves_mut(key)?;
        if reserves.amount0 < amount0 || reserves.amount1 < amount1 {
            return Err(PositionError::Pool("insufficient reserves".to_string()));
        }
        reserves.amount0 -= amount0;
        reserves.amount1 -= amount1;
        *self.payouts.entry((key.token0, recipient)).or_default() += amount0;
        *self.payouts.entry((key.token1, recipient)).or_default() += amount1;
        Ok(())
    }
}
