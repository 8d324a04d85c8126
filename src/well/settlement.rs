//! Custody movements of a single call, with reverse-order compensation.

use tracing::error;

use crate::domain::{Address, Amount, Liquidity, Token};
use crate::error::{CustodyError, Result};
use crate::traits::Custody;

/// One custody action performed while settling a call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Movement {
    /// Pull tokens from an account into the pool.
    In {
        token: Token,
        amount: Amount,
        from: Address,
    },
    /// Pay tokens from the pool to an account.
    Out {
        token: Token,
        amount: Amount,
        to: Address,
    },
    /// Mint LP shares.
    Mint { to: Address, amount: Liquidity },
    /// Burn LP shares.
    Burn { from: Address, amount: Liquidity },
}

impl Movement {
    const fn is_noop(&self) -> bool {
        match self {
            Self::In { amount, .. } | Self::Out { amount, .. } => amount.is_zero(),
            Self::Mint { amount, .. } | Self::Burn { amount, .. } => amount.is_zero(),
        }
    }

    fn perform(&self, custody: &mut dyn Custody) -> core::result::Result<(), CustodyError> {
        match *self {
            Self::In {
                token,
                amount,
                from,
            } => custody.transfer_in(&token, amount, &from),
            Self::Out { token, amount, to } => custody.transfer_out(&token, amount, &to),
            Self::Mint { to, amount } => custody.mint_lp(&to, amount),
            Self::Burn { from, amount } => custody.burn_lp(&from, amount),
        }
    }

    const fn inverse(&self) -> Self {
        match *self {
            Self::In {
                token,
                amount,
                from,
            } => Self::Out {
                token,
                amount,
                to: from,
            },
            Self::Out { token, amount, to } => Self::In {
                token,
                amount,
                from: to,
            },
            Self::Mint { to, amount } => Self::Burn { from: to, amount },
            Self::Burn { from, amount } => Self::Mint { to: from, amount },
        }
    }
}

/// Performs `movements` in order.  On the first failure every movement
/// already performed is undone in reverse order and the failure returned.
pub(crate) fn settle(custody: &mut dyn Custody, movements: &[Movement]) -> Result<()> {
    let mut done: Vec<Movement> = Vec::with_capacity(movements.len());
    for movement in movements.iter().filter(|m| !m.is_noop()) {
        if let Err(failure) = movement.perform(custody) {
            for performed in done.iter().rev() {
                if let Err(undo) = performed.inverse().perform(custody) {
                    error!(movement = ?performed, error = %undo, "custody compensation failed");
                }
            }
            return Err(failure.into());
        }
        done.push(*movement);
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::custody::Ledger;
    use crate::error::WellError;

    const ALICE: Address = Address::from_low_u64(0xA);

    fn token(n: u64) -> Token {
        Token::new(Address::from_low_u64(n))
    }

    #[test]
    fn all_movements_apply() {
        let mut ledger = Ledger::new();
        ledger.credit(&ALICE, &token(1), Amount::new(100));
        let moves = [
            Movement::In {
                token: token(1),
                amount: Amount::new(60),
                from: ALICE,
            },
            Movement::Mint {
                to: ALICE,
                amount: Liquidity::new(5),
            },
        ];
        assert!(settle(&mut ledger, &moves).is_ok());
        assert_eq!(ledger.balance(&ALICE, &token(1)), Amount::new(40));
        assert_eq!(ledger.shares(&ALICE), Liquidity::new(5));
    }

    #[test]
    fn failure_compensates_earlier_movements() {
        let mut ledger = Ledger::new();
        ledger.credit(&ALICE, &token(1), Amount::new(100));
        let moves = [
            Movement::In {
                token: token(1),
                amount: Amount::new(60),
                from: ALICE,
            },
            Movement::In {
                token: token(2),
                amount: Amount::new(1),
                from: ALICE,
            },
        ];
        let Err(WellError::Custody(CustodyError::InsufficientBalance { .. })) =
            settle(&mut ledger, &moves)
        else {
            panic!("expected InsufficientBalance");
        };
        assert_eq!(ledger.balance(&ALICE, &token(1)), Amount::new(100));
        assert_eq!(ledger.balance_of(&token(1)), Ok(Amount::ZERO));
    }

    #[test]
    fn zero_movements_are_skipped() {
        let mut ledger = Ledger::new();
        let moves = [Movement::Out {
            token: token(1),
            amount: Amount::ZERO,
            to: ALICE,
        }];
        assert!(settle(&mut ledger, &moves).is_ok());
    }
}
