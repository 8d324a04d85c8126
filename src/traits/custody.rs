//! Token custody and LP share accounting.
//!
//! The Well never holds balances itself.  It asks a [`Custody`]
//! collaborator to pull tokens from callers, pay tokens out, and mint or
//! burn LP shares.  LP total supply is always read from custody.

use core::fmt;

use crate::domain::{Address, Amount, Liquidity, Token};
use crate::error::CustodyError;

/// Token movement and LP share ledger used by a Well.
pub trait Custody: Send + fmt::Debug {
    /// Moves `amount` of `token` from `from` into the pool.
    ///
    /// # Errors
    ///
    /// Returns [`CustodyError`] if the transfer cannot be performed.
    fn transfer_in(&mut self, token: &Token, amount: Amount, from: &Address)
    -> Result<(), CustodyError>;

    /// Moves `amount` of `token` from the pool to `to`.
    ///
    /// # Errors
    ///
    /// Returns [`CustodyError`] if the transfer cannot be performed.
    fn transfer_out(&mut self, token: &Token, amount: Amount, to: &Address)
    -> Result<(), CustodyError>;

    /// Pool holdings of `token`.
    ///
    /// # Errors
    ///
    /// Returns [`CustodyError`] if the balance cannot be read.
    fn balance_of(&self, token: &Token) -> Result<Amount, CustodyError>;

    /// Total LP supply.
    fn lp_supply(&self) -> Liquidity;

    /// Mints `amount` LP shares to `to`.
    ///
    /// # Errors
    ///
    /// Returns [`CustodyError::Overflow`] if the supply would overflow.
    fn mint_lp(&mut self, to: &Address, amount: Liquidity) -> Result<(), CustodyError>;

    /// Burns `amount` LP shares held by `from`.
    ///
    /// # Errors
    ///
    /// Returns [`CustodyError::InsufficientShares`] if `from` holds fewer.
    fn burn_lp(&mut self, from: &Address, amount: Liquidity) -> Result<(), CustodyError>;
}
