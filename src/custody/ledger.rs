//! In-memory token and LP ledger.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::domain::{Address, Amount, Liquidity, Token};
use crate::error::CustodyError;
use crate::traits::Custody;

#[derive(Debug, Default)]
struct LedgerState {
    accounts: HashMap<(Address, Token), Amount>,
    pool: HashMap<Token, Amount>,
    shares: HashMap<Address, Liquidity>,
    lp_supply: Liquidity,
}

impl LedgerState {
    fn account(&self, owner: &Address, token: &Token) -> Amount {
        self.accounts
            .get(&(*owner, *token))
            .copied()
            .unwrap_or_default()
    }

    fn pool(&self, token: &Token) -> Amount {
        self.pool.get(token).copied().unwrap_or_default()
    }

    fn move_to_pool(&mut self, token: &Token, amount: Amount, from: &Address) -> Result<(), CustodyError> {
        let available = self.account(from, token);
        let remaining = available
            .checked_sub(&amount)
            .ok_or(CustodyError::InsufficientBalance {
                needed: amount.get(),
                available: available.get(),
            })?;
        let pooled = self
            .pool(token)
            .checked_add(&amount)
            .ok_or(CustodyError::Overflow)?;
        self.accounts.insert((*from, *token), remaining);
        self.pool.insert(*token, pooled);
        Ok(())
    }

    fn move_from_pool(&mut self, token: &Token, amount: Amount, to: &Address) -> Result<(), CustodyError> {
        let available = self.pool(token);
        let remaining = available
            .checked_sub(&amount)
            .ok_or(CustodyError::InsufficientBalance {
                needed: amount.get(),
                available: available.get(),
            })?;
        let credited = self
            .account(to, token)
            .checked_add(&amount)
            .ok_or(CustodyError::Overflow)?;
        self.pool.insert(*token, remaining);
        self.accounts.insert((*to, *token), credited);
        Ok(())
    }
}

/// Shared in-memory custody.
///
/// Cloning yields another handle to the same balances, so a test can keep
/// one handle for inspection while the Well owns another.
///
/// # Examples
///
/// ```
/// use well_engine::custody::Ledger;
/// use well_engine::domain::{Address, Amount, Token};
/// use well_engine::traits::Custody;
///
/// let token = Token::new(Address::from_low_u64(1));
/// let alice = Address::from_low_u64(0xA);
/// let mut ledger = Ledger::new();
/// ledger.credit(&alice, &token, Amount::new(500));
/// assert!(ledger.transfer_in(&token, Amount::new(200), &alice).is_ok());
/// assert_eq!(ledger.balance(&alice, &token), Amount::new(300));
/// assert_eq!(ledger.balance_of(&token), Ok(Amount::new(200)));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Ledger {
    state: Arc<Mutex<LedgerState>>,
}

impl Ledger {
    /// An empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mints `amount` of `token` to `owner`'s account.
    ///
    /// Saturates at `u128::MAX`.
    pub fn credit(&self, owner: &Address, token: &Token, amount: Amount) {
        let mut state = self.state.lock();
        let next = state
            .account(owner, token)
            .checked_add(&amount)
            .unwrap_or(Amount::MAX);
        state.accounts.insert((*owner, *token), next);
    }

    /// `owner`'s balance of `token`.
    #[must_use]
    pub fn balance(&self, owner: &Address, token: &Token) -> Amount {
        self.state.lock().account(owner, token)
    }

    /// `owner`'s LP shares.
    #[must_use]
    pub fn shares(&self, owner: &Address) -> Liquidity {
        self.state
            .lock()
            .shares
            .get(owner)
            .copied()
            .unwrap_or_default()
    }

    /// Sends tokens straight to the pool without going through a Well
    /// operation, leaving an excess over the tracked reserves.
    ///
    /// # Errors
    ///
    /// Returns [`CustodyError::InsufficientBalance`] if `from` lacks funds.
    pub fn donate(&self, from: &Address, token: &Token, amount: Amount) -> Result<(), CustodyError> {
        self.state.lock().move_to_pool(token, amount, from)
    }
}

impl Custody for Ledger {
    fn transfer_in(
        &mut self,
        token: &Token,
        amount: Amount,
        from: &Address,
    ) -> Result<(), CustodyError> {
        self.state.lock().move_to_pool(token, amount, from)
    }

    fn transfer_out(
        &mut self,
        token: &Token,
        amount: Amount,
        to: &Address,
    ) -> Result<(), CustodyError> {
        self.state.lock().move_from_pool(token, amount, to)
    }

    fn balance_of(&self, token: &Token) -> Result<Amount, CustodyError> {
        Ok(self.state.lock().pool(token))
    }

    fn lp_supply(&self) -> Liquidity {
        self.state.lock().lp_supply
    }

    fn mint_lp(&mut self, to: &Address, amount: Liquidity) -> Result<(), CustodyError> {
        let mut state = self.state.lock();
        let supply = state
            .lp_supply
            .checked_add(&amount)
            .ok_or(CustodyError::Overflow)?;
        let held = state.shares.get(to).copied().unwrap_or_default();
        let held = held.checked_add(&amount).ok_or(CustodyError::Overflow)?;
        state.lp_supply = supply;
        state.shares.insert(*to, held);
        Ok(())
    }

    fn burn_lp(&mut self, from: &Address, amount: Liquidity) -> Result<(), CustodyError> {
        let mut state = self.state.lock();
        let held = state.shares.get(from).copied().unwrap_or_default();
        let remaining = held
            .checked_sub(&amount)
            .ok_or(CustodyError::InsufficientShares {
                needed: amount.get(),
                available: held.get(),
            })?;
        let supply = state
            .lp_supply
            .checked_sub(&amount)
            .ok_or(CustodyError::InsufficientShares {
                needed: amount.get(),
                available: state.lp_supply.get(),
            })?;
        state.shares.insert(*from, remaining);
        state.lp_supply = supply;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn token(n: u64) -> Token {
        Token::new(Address::from_low_u64(n))
    }

    const ALICE: Address = Address::from_low_u64(0xA);
    const BOB: Address = Address::from_low_u64(0xB);

    #[test]
    fn transfer_in_requires_balance() {
        let mut ledger = Ledger::new();
        ledger.credit(&ALICE, &token(1), Amount::new(10));
        assert_eq!(
            ledger.transfer_in(&token(1), Amount::new(11), &ALICE),
            Err(CustodyError::InsufficientBalance {
                needed: 11,
                available: 10
            })
        );
        assert_eq!(ledger.balance(&ALICE, &token(1)), Amount::new(10));
    }

    #[test]
    fn transfer_out_requires_pool_balance() {
        let mut ledger = Ledger::new();
        ledger.credit(&ALICE, &token(1), Amount::new(10));
        assert!(ledger.transfer_in(&token(1), Amount::new(10), &ALICE).is_ok());
        assert!(ledger.transfer_out(&token(1), Amount::new(4), &BOB).is_ok());
        assert_eq!(ledger.balance(&BOB, &token(1)), Amount::new(4));
        assert!(ledger.transfer_out(&token(1), Amount::new(7), &BOB).is_err());
    }

    #[test]
    fn clones_share_state() {
        let a = Ledger::new();
        let b = a.clone();
        a.credit(&ALICE, &token(1), Amount::new(3));
        assert_eq!(b.balance(&ALICE, &token(1)), Amount::new(3));
    }

    #[test]
    fn mint_and_burn_track_supply() {
        let mut ledger = Ledger::new();
        assert!(ledger.mint_lp(&ALICE, Liquidity::new(100)).is_ok());
        assert_eq!(ledger.lp_supply(), Liquidity::new(100));
        let Err(CustodyError::InsufficientShares { .. }) = ledger.burn_lp(&BOB, Liquidity::new(1))
        else {
            panic!("expected InsufficientShares");
        };
        assert!(ledger.burn_lp(&ALICE, Liquidity::new(40)).is_ok());
        assert_eq!(ledger.shares(&ALICE), Liquidity::new(60));
        assert_eq!(ledger.lp_supply(), Liquidity::new(60));
    }

    #[test]
    fn donate_grows_pool_only() {
        let ledger = Ledger::new();
        ledger.credit(&ALICE, &token(2), Amount::new(50));
        assert!(ledger.donate(&ALICE, &token(2), Amount::new(20)).is_ok());
        assert_eq!(ledger.balance_of(&token(2)), Ok(Amount::new(20)));
        assert_eq!(ledger.lp_supply(), Liquidity::ZERO);
    }
}
