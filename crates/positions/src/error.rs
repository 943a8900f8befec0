//! Position manager failure reasons.

use eatgate_multicall::{GateError, RevertData};
use thiserror::Error;

/// Failures raised by position operations. Each becomes an `Error(string)`
/// revert with the displayed reason; the unnamed ones revert without data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PositionError {
    /// Caller is neither owner nor approved for the position
    #[error("NA")]
    NotApproved,

    /// Position still holds liquidity or owed tokens
    #[error("NC")]
    NotCleared,

    /// Unknown token id
    #[error("ITI")]
    InvalidTokenId,

    #[error("Transaction too old")]
    TransactionTooOld,

    #[error("Price slippage check")]
    PriceSlippage,

    #[error("ERC721: transfer caller is not owner nor approved")]
    TransferNotApproved,

    #[error("ERC721: transfer of token that is not own")]
    TransferFromIncorrectOwner,

    #[error("ERC721: transfer to the zero address")]
    TransferToZeroAddress,

    #[error("ERC721: approval to current owner")]
    ApprovalToCurrentOwner,

    #[error("ERC721: approve caller is not owner nor approved for all")]
    ApproveNotAuthorized,

    #[error("ERC721: approve to caller")]
    ApproveToCaller,

    #[error("ERC721: balance query for the zero address")]
    BalanceOfZeroAddress,

    /// Requested more liquidity than the position holds
    #[error("")]
    InsufficientLiquidity,

    /// Zero liquidity requested
    #[error("")]
    ZeroLiquidity,

    /// Both collect maxima are zero
    #[error("")]
    NothingToCollect,

    /// Pool collaborator failure
    #[error("{0}")]
    Pool(String),
}

impl From<PositionError> for GateError {
    fn from(err: PositionError) -> Self {
        match err {
            PositionError::InsufficientLiquidity
            | PositionError::ZeroLiquidity
            | PositionError::NothingToCollect => GateError::Reverted(RevertData::default()),
            other => GateError::revert(&other.to_string()),
        }
    }
}

pub type PositionResult<T> = Result<T, PositionError>;
