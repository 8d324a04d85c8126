//! Events recorded by a Well after each committed call.

use super::{Address, Amount, Liquidity, Reserves, Token};

/// Record of a committed state-changing call.
///
/// One event is recorded per successful call, after custody movement and
/// pump commit.  Failed calls record nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum WellEvent {
    /// A swap between two tokens.
    Swap {
        /// Token paid in.
        from_token: Token,
        /// Token paid out.
        to_token: Token,
        /// Amount received by the pool.
        amount_in: Amount,
        /// Amount sent to the recipient.
        amount_out: Amount,
        /// Receiver of `amount_out`.
        recipient: Address,
    },
    /// Tokens deposited for LP shares.
    AddLiquidity {
        /// Per-token deposits.
        amounts_in: Vec<Amount>,
        /// Shares minted.
        lp_amount_out: Liquidity,
        /// Receiver of the shares.
        recipient: Address,
    },
    /// LP shares burned for a (balanced or imbalanced) token withdrawal.
    RemoveLiquidity {
        /// Shares burned.
        lp_amount_in: Liquidity,
        /// Per-token withdrawals.
        amounts_out: Vec<Amount>,
        /// Receiver of the tokens.
        recipient: Address,
    },
    /// LP shares burned for a single token.
    RemoveLiquidityOneToken {
        /// Shares burned.
        lp_amount_in: Liquidity,
        /// Token withdrawn.
        token_out: Token,
        /// Amount withdrawn.
        amount_out: Amount,
        /// Receiver of the tokens.
        recipient: Address,
    },
    /// Reserves were overwritten with the custody balances.
    Sync {
        /// Reserves after the sync.
        reserves: Reserves,
    },
    /// Excess custody balance was swapped out to a recipient.
    Shift {
        /// Reserves after the shift.
        reserves: Reserves,
        /// Token paid out.
        token_out: Token,
        /// Amount paid out.
        amount_out: Amount,
        /// Receiver of `amount_out`.
        recipient: Address,
    },
}

impl WellEvent {
    /// Short event name for logs.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Swap { .. } => "swap",
            Self::AddLiquidity { .. } => "add_liquidity",
            Self::RemoveLiquidity { .. } => "remove_liquidity",
            Self::RemoveLiquidityOneToken { .. } => "remove_liquidity_one_token",
            Self::Sync { .. } => "sync",
            Self::Shift { .. } => "shift",
        }
    }
}
