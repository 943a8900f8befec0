//! Liquidity-position manager behind the gate.
//!
//! Positions are non-fungible tokens over pool liquidity. Growing a position
//! requires an authorized batch in normal mode; exits (decrease, collect,
//! burn) follow the dual-path policy; ownership transfers come in a
//! token-authorized and a credential-authorized flavour.

use std::collections::{BTreeMap, HashMap, HashSet};

use alloy_primitives::aliases::I24;
use alloy_primitives::{Address, Bytes, U256};
use alloy_sol_types::SolCall;
use eatgate_multicall::{
    DualPathPolicy, GateError, GateResult, GatedContract, Guard, Invocation, OperationTable,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{PositionError, PositionResult};
use crate::interface::{
    CollectAmounts, CollectParams, IGatedTransfers, IPositionManager, IVerifiedTransfers,
};
use crate::pool::{PoolBackend, PoolKey};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    /// Address approved to manage this position.
    pub operator: Address,
    pub pool: PoolKey,
    pub tick_lower: I24,
    pub tick_upper: I24,
    pub liquidity: u128,
    pub tokens_owed0: u128,
    pub tokens_owed1: u128,
}

#[derive(Debug, Clone)]
pub struct PositionManager<P: PoolBackend> {
    pool: P,
    policy: DualPathPolicy,
    positions: BTreeMap<U256, Position>,
    owners: BTreeMap<U256, Address>,
    balances: HashMap<Address, U256>,
    operator_approvals: HashSet<(Address, Address)>,
    next_id: U256,
}

fn decode<C: SolCall>(data: &[u8]) -> GateResult<C> {
    C::abi_decode(data, true).map_err(|e| GateError::MalformedCalldata(e.to_string()))
}

fn check_deadline(invocation: &Invocation, deadline: U256) -> PositionResult<()> {
    if U256::from(invocation.now) > deadline {
        Err(PositionError::TransactionTooOld)
    } else {
        Ok(())
    }
}

fn to_u128(amount: U256) -> PositionResult<u128> {
    u128::try_from(amount).map_err(|_| PositionError::Pool("amount overflow".to_string()))
}

impl<P: PoolBackend> PositionManager<P> {
    pub fn new(pool: P, policy: DualPathPolicy) -> Self {
        Self {
            pool,
            policy,
            positions: BTreeMap::new(),
            owners: BTreeMap::new(),
            balances: HashMap::new(),
            operator_approvals: HashSet::new(),
            next_id: U256::from(1u64),
        }
    }

    pub fn pool(&self) -> &P {
        &self.pool
    }

    pub fn policy(&self) -> &DualPathPolicy {
        &self.policy
    }

    pub fn position(&self, token_id: U256) -> Option<&Position> {
        self.positions.get(&token_id)
    }

    pub fn owner_of(&self, token_id: U256) -> Option<Address> {
        self.owners.get(&token_id).copied()
    }

    pub fn balance_of(&self, owner: Address) -> U256 {
        self.balances.get(&owner).copied().unwrap_or_default()
    }

    fn existing_owner(&self, token_id: U256) -> PositionResult<Address> {
        self.owner_of(token_id).ok_or(PositionError::InvalidTokenId)
    }

    fn is_approved_or_owner(&self, spender: Address, token_id: U256) -> PositionResult<bool> {
        let owner = self.existing_owner(token_id)?;
        let operator = self
            .positions
            .get(&token_id)
            .map(|p| p.operator)
            .unwrap_or_default();
        Ok(spender == owner
            || (!operator.is_zero() && spender == operator)
            || self.operator_approvals.contains(&(owner, spender)))
    }

    fn require_authorized(&self, spender: Address, token_id: U256) -> PositionResult<()> {
        if self.is_approved_or_owner(spender, token_id)? {
            Ok(())
        } else {
            Err(PositionError::NotApproved)
        }
    }

    fn position_mut(&mut self, token_id: U256) -> PositionResult<&mut Position> {
        self.positions
            .get_mut(&token_id)
            .ok_or(PositionError::InvalidTokenId)
    }

    fn transfer(&mut self, spender: Address, from: Address, to: Address, token_id: U256) -> PositionResult<()> {
        let owner = self.existing_owner(token_id)?;
        if !self.is_approved_or_owner(spender, token_id)? {
            return Err(PositionError::TransferNotApproved);
        }
        if owner != from {
            return Err(PositionError::TransferFromIncorrectOwner);
        }
        if to.is_zero() {
            return Err(PositionError::TransferToZeroAddress);
        }

        self.position_mut(token_id)?.operator = Address::ZERO;
        *self.balances.entry(from).or_default() -= U256::from(1u64);
        *self.balances.entry(to).or_default() += U256::from(1u64);
        self.owners.insert(token_id, to);
        info!(%from, %to, %token_id, "position transferred");
        Ok(())
    }

    fn collectable(&self, params: &CollectParams) -> PositionResult<(u128, u128)> {
        let position = self
            .positions
            .get(&params.tokenId)
            .ok_or(PositionError::InvalidTokenId)?;
        Ok((
            params.amount0Max.min(position.tokens_owed0),
            params.amount1Max.min(position.tokens_owed1),
        ))
    }

    fn mint(&mut self, invocation: &Invocation, data: &[u8]) -> GateResult<Bytes> {
        let params = decode::<IPositionManager::mintCall>(data)?.params;
        self.policy.require_normal_mode()?;
        check_deadline(invocation, params.deadline)?;

        let key = PoolKey {
            token0: params.token0,
            token1: params.token1,
            fee: params.fee,
        };
        let (liquidity, used) = self.pool.add_liquidity(
            &key,
            invocation.sender(),
            params.amount0Desired,
            params.amount1Desired,
        )?;
        if used.amount0 < params.amount0Min || used.amount1 < params.amount1Min {
            return Err(PositionError::PriceSlippage.into());
        }
        if params.recipient.is_zero() {
            return Err(PositionError::TransferToZeroAddress.into());
        }

        let token_id = self.next_id;
        self.next_id += U256::from(1u64);
        self.positions.insert(
            token_id,
            Position {
                operator: Address::ZERO,
                pool: key,
                tick_lower: params.tickLower,
                tick_upper: params.tickUpper,
                liquidity,
                tokens_owed0: 0,
                tokens_owed1: 0,
            },
        );
        self.owners.insert(token_id, params.recipient);
        *self.balances.entry(params.recipient).or_default() += U256::from(1u64);
        info!(%token_id, recipient = %params.recipient, liquidity, "position minted");

        Ok(IPositionManager::mintCall::abi_encode_returns(&(
            token_id,
            liquidity,
            used.amount0,
            used.amount1,
        ))
        .into())
    }

    fn increase_liquidity(&mut self, invocation: &Invocation, data: &[u8]) -> GateResult<Bytes> {
        let params = decode::<IPositionManager::increaseLiquidityCall>(data)?.params;
        self.policy.require_normal_mode()?;
        check_deadline(invocation, params.deadline)?;
        self.require_authorized(invocation.sender(), params.tokenId)?;

        let key = self.position_mut(params.tokenId)?.pool;
        let (liquidity, used) = self.pool.add_liquidity(
            &key,
            invocation.sender(),
            params.amount0Desired,
            params.amount1Desired,
        )?;
        if used.amount0 < params.amount0Min || used.amount1 < params.amount1Min {
            return Err(PositionError::PriceSlippage.into());
        }
        let position = self.position_mut(params.tokenId)?;
        position.liquidity = position
            .liquidity
            .checked_add(liquidity)
            .ok_or_else(|| PositionError::Pool("liquidity overflow".to_string()))?;

        Ok(IPositionManager::increaseLiquidityCall::abi_encode_returns(&(
            liquidity,
            used.amount0,
            used.amount1,
        ))
        .into())
    }

    fn decrease_liquidity(&mut self, invocation: &Invocation, data: &[u8]) -> GateResult<Bytes> {
        let params = decode::<IPositionManager::decreaseLiquidityCall>(data)?.params;
        self.policy.authorize_exit(invocation)?;
        check_deadline(invocation, params.deadline)?;
        self.require_authorized(invocation.sender(), params.tokenId)?;
        if params.liquidity == 0 {
            return Err(PositionError::ZeroLiquidity.into());
        }

        let position = self.position_mut(params.tokenId)?;
        if position.liquidity < params.liquidity {
            return Err(PositionError::InsufficientLiquidity.into());
        }
        let key = position.pool;
        let amounts = self.pool.remove_liquidity(&key, params.liquidity)?;
        if amounts.amount0 < params.amount0Min || amounts.amount1 < params.amount1Min {
            return Err(PositionError::PriceSlippage.into());
        }

        let (owed0, owed1) = (to_u128(amounts.amount0)?, to_u128(amounts.amount1)?);
        let position = self.position_mut(params.tokenId)?;
        position.liquidity -= params.liquidity;
        position.tokens_owed0 = position.tokens_owed0.saturating_add(owed0);
        position.tokens_owed1 = position.tokens_owed1.saturating_add(owed1);
        debug!(token_id = %params.tokenId, liquidity = params.liquidity, "liquidity decreased");

        Ok(IPositionManager::decreaseLiquidityCall::abi_encode_returns(&(
            amounts.amount0,
            amounts.amount1,
        ))
        .into())
    }

    fn collect(&mut self, invocation: &Invocation, data: &[u8]) -> GateResult<Bytes> {
        let params = decode::<IPositionManager::collectCall>(data)?.params;
        self.policy.authorize_exit(invocation)?;
        self.require_authorized(invocation.sender(), params.tokenId)?;
        if params.amount0Max == 0 && params.amount1Max == 0 {
            return Err(PositionError::NothingToCollect.into());
        }
        let recipient = if params.recipient.is_zero() {
            invocation.this
        } else {
            params.recipient
        };

        let (amount0, amount1) = self.collectable(&params)?;
        let position = self.position_mut(params.tokenId)?;
        position.tokens_owed0 -= amount0;
        position.tokens_owed1 -= amount1;
        let key = position.pool;
        self.pool.collect(&key, recipient, amount0, amount1)?;
        debug!(token_id = %params.tokenId, %recipient, amount0, amount1, "owed tokens collected");

        Ok(IPositionManager::collectCall::abi_encode_returns(&(
            U256::from(amount0),
            U256::from(amount1),
        ))
        .into())
    }

    fn collect_amounts(&mut self, _: &Invocation, data: &[u8]) -> GateResult<Bytes> {
        let params = decode::<IPositionManager::collectAmountsCall>(data)?.params;
        let (amount0, amount1) = self.collectable(&params)?;
        Err(GateError::custom(&CollectAmounts {
            amount0: U256::from(amount0),
            amount1: U256::from(amount1),
        }))
    }

    fn burn(&mut self, invocation: &Invocation, data: &[u8]) -> GateResult<Bytes> {
        let token_id = decode::<IPositionManager::burnCall>(data)?.tokenId;
        self.policy.authorize_exit(invocation)?;
        self.require_authorized(invocation.sender(), token_id)?;

        let position = self.position_mut(token_id)?;
        if position.liquidity != 0 || position.tokens_owed0 != 0 || position.tokens_owed1 != 0 {
            return Err(PositionError::NotCleared.into());
        }
        let owner = self.existing_owner(token_id)?;
        self.positions.remove(&token_id);
        self.owners.remove(&token_id);
        *self.balances.entry(owner).or_default() -= U256::from(1u64);
        info!(%token_id, %owner, "position burned");
        Ok(Bytes::new())
    }

    fn gated_transfer_from(&mut self, invocation: &Invocation, data: &[u8]) -> GateResult<Bytes> {
        let call = decode::<IGatedTransfers::transferFromCall>(data)?;
        self.policy.authorize_token_transfer()?;
        self.transfer(invocation.sender(), call.from, call.to, call.tokenId)?;
        Ok(Bytes::new())
    }

    fn gated_safe_transfer_from(&mut self, invocation: &Invocation, data: &[u8]) -> GateResult<Bytes> {
        let call = decode::<IGatedTransfers::safeTransferFromCall>(data)?;
        self.policy.authorize_token_transfer()?;
        self.transfer(invocation.sender(), call.from, call.to, call.tokenId)?;
        Ok(Bytes::new())
    }

    fn verified_transfer_from(&mut self, invocation: &Invocation, data: &[u8]) -> GateResult<Bytes> {
        let call = decode::<IVerifiedTransfers::transferFromCall>(data)?;
        self.policy.authorize_credential_transfer(call.from, call.to)?;
        self.transfer(invocation.sender(), call.from, call.to, call.tokenId)?;
        Ok(Bytes::new())
    }

    fn verified_safe_transfer_from(&mut self, invocation: &Invocation, data: &[u8]) -> GateResult<Bytes> {
        let call = decode::<IVerifiedTransfers::safeTransferFromCall>(data)?;
        self.policy.authorize_credential_transfer(call.from, call.to)?;
        self.transfer(invocation.sender(), call.from, call.to, call.tokenId)?;
        Ok(Bytes::new())
    }

    fn approve(&mut self, invocation: &Invocation, data: &[u8]) -> GateResult<Bytes> {
        let call = decode::<IPositionManager::approveCall>(data)?;
        let owner = self.existing_owner(call.tokenId)?;
        if call.to == owner {
            return Err(PositionError::ApprovalToCurrentOwner.into());
        }
        let sender = invocation.sender();
        if sender != owner && !self.operator_approvals.contains(&(owner, sender)) {
            return Err(PositionError::ApproveNotAuthorized.into());
        }
        self.position_mut(call.tokenId)?.operator = call.to;
        Ok(Bytes::new())
    }

    fn set_approval_for_all(&mut self, invocation: &Invocation, data: &[u8]) -> GateResult<Bytes> {
        let call = decode::<IPositionManager::setApprovalForAllCall>(data)?;
        let owner = invocation.sender();
        if call.operator == owner {
            return Err(PositionError::ApproveToCaller.into());
        }
        if call.approved {
            self.operator_approvals.insert((owner, call.operator));
        } else {
            self.operator_approvals.remove(&(owner, call.operator));
        }
        Ok(Bytes::new())
    }

    fn get_approved(&mut self, _: &Invocation, data: &[u8]) -> GateResult<Bytes> {
        let token_id = decode::<IPositionManager::getApprovedCall>(data)?.tokenId;
        let operator = self
            .positions
            .get(&token_id)
            .ok_or(PositionError::InvalidTokenId)?
            .operator;
        Ok(IPositionManager::getApprovedCall::abi_encode_returns(&(operator,)).into())
    }

    fn owner_of_op(&mut self, _: &Invocation, data: &[u8]) -> GateResult<Bytes> {
        let token_id = decode::<IPositionManager::ownerOfCall>(data)?.tokenId;
        let owner = self.existing_owner(token_id)?;
        Ok(IPositionManager::ownerOfCall::abi_encode_returns(&(owner,)).into())
    }

    fn balance_of_op(&mut self, _: &Invocation, data: &[u8]) -> GateResult<Bytes> {
        let owner = decode::<IPositionManager::balanceOfCall>(data)?.owner;
        if owner.is_zero() {
            return Err(PositionError::BalanceOfZeroAddress.into());
        }
        Ok(IPositionManager::balanceOfCall::abi_encode_returns(&(self.balance_of(owner),)).into())
    }

    fn positions_op(&mut self, _: &Invocation, data: &[u8]) -> GateResult<Bytes> {
        let token_id = decode::<IPositionManager::positionsCall>(data)?.tokenId;
        let p = self
            .positions
            .get(&token_id)
            .ok_or(PositionError::InvalidTokenId)?;
        Ok(IPositionManager::positionsCall::abi_encode_returns(&(
            p.operator,
            p.pool.token0,
            p.pool.token1,
            p.pool.fee,
            p.tick_lower,
            p.tick_upper,
            p.liquidity,
            p.tokens_owed0,
            p.tokens_owed1,
        ))
        .into())
    }

    fn set_emergency_mode(&mut self, invocation: &Invocation, data: &[u8]) -> GateResult<Bytes> {
        let engaged = decode::<IPositionManager::setEmergencyModeCall>(data)?.engaged;
        self.policy.set_emergency_mode(invocation.sender(), engaged)?;
        Ok(Bytes::new())
    }

    fn emergency_mode(&mut self, _: &Invocation, _: &[u8]) -> GateResult<Bytes> {
        Ok(IPositionManager::emergencyModeCall::abi_encode_returns(&(self.policy.is_emergency(),)).into())
    }
}

impl<P: PoolBackend> GatedContract for PositionManager<P> {
    fn operations() -> GateResult<OperationTable<Self>> {
        use IPositionManager as M;

        let mut table = OperationTable::new();
        table.register(M::mintCall::SELECTOR, "mint", Guard::SelfMulticallOnly, Self::mint)?;
        table.register(
            M::increaseLiquidityCall::SELECTOR,
            "increaseLiquidity",
            Guard::SelfMulticallOnly,
            Self::increase_liquidity,
        )?;
        table.register(
            M::decreaseLiquidityCall::SELECTOR,
            "decreaseLiquidity",
            Guard::Open,
            Self::decrease_liquidity,
        )?;
        table.register(M::collectCall::SELECTOR, "collect", Guard::Open, Self::collect)?;
        table.register(
            M::collectAmountsCall::SELECTOR,
            "collectAmounts",
            Guard::Open,
            Self::collect_amounts,
        )?;
        table.register(M::burnCall::SELECTOR, "burn", Guard::Open, Self::burn)?;

        table.register(
            IGatedTransfers::transferFromCall::SELECTOR,
            "transferFrom(gated)",
            Guard::AccessToken,
            Self::gated_transfer_from,
        )?;
        table.register(
            IGatedTransfers::safeTransferFromCall::SELECTOR,
            "safeTransferFrom(gated)",
            Guard::AccessToken,
            Self::gated_safe_transfer_from,
        )?;
        table.register(
            IVerifiedTransfers::transferFromCall::SELECTOR,
            "transferFrom",
            Guard::Open,
            Self::verified_transfer_from,
        )?;
        table.register(
            IVerifiedTransfers::safeTransferFromCall::SELECTOR,
            "safeTransferFrom",
            Guard::Open,
            Self::verified_safe_transfer_from,
        )?;

        table.register(M::approveCall::SELECTOR, "approve", Guard::Open, Self::approve)?;
        table.register(
            M::setApprovalForAllCall::SELECTOR,
            "setApprovalForAll",
            Guard::Open,
            Self::set_approval_for_all,
        )?;
        table.register(M::getApprovedCall::SELECTOR, "getApproved", Guard::Open, Self::get_approved)?;
        table.register(M::ownerOfCall::SELECTOR, "ownerOf", Guard::Open, Self::owner_of_op)?;
        table.register(M::balanceOfCall::SELECTOR, "balanceOf", Guard::Open, Self::balance_of_op)?;
        table.register(M::positionsCall::SELECTOR, "positions", Guard::Open, Self::positions_op)?;
        table.register(
            M::setEmergencyModeCall::SELECTOR,
            "setEmergencyMode",
            Guard::Open,
            Self::set_emergency_mode,
        )?;
        table.register(
            M::emergencyModeCall::SELECTOR,
            "emergencyMode",
            Guard::Open,
            Self::emergency_mode,
        )?;
        Ok(table)
    }
}
