//! Pluggable bonding curve.
//!
//! A [`PricingFunction`] maps a reserves vector to a scalar
//! [`Invariant`] and, conversely, solves for the single reserve that
//! reaches a target invariant when all other reserves are fixed.  The
//! engines derive every swap and liquidity quote from these two
//! primitives:
//!
//! ```text
//! exact-in swap:   r'[from] = r[from] + in
//!                  r'[to]   = reserve_at_invariant(r', invariant(r), to)
//!                  out      = r[to] - r'[to]
//! ```
//!
//! # Contract
//!
//! - **Pure.** Results depend only on the arguments.
//! - **Monotone.** Increasing any reserve never decreases the invariant.
//! - **Conservative solve.** [`reserve_at_invariant`](PricingFunction::reserve_at_invariant)
//!   returns the *smallest* reserve whose invariant is at or above the
//!   target, so amounts paid out round down and amounts owed round up.
//! - The `reserves[index]` entry passed to the solver is ignored.

use core::fmt;

use crate::domain::{Address, Amount, AuxData, Invariant, Liquidity};
use crate::error::Result;

/// Stateless curve oracle consumed by the swap and liquidity engines.
pub trait PricingFunction: Send + Sync + fmt::Debug {
    /// Invariant of `reserves`.
    ///
    /// # Errors
    ///
    /// - [`WellError::Overflow`](crate::error::WellError::Overflow) if the
    ///   value cannot be represented.
    /// - [`WellError::InvalidFunctionData`](crate::error::WellError::InvalidFunctionData)
    ///   if `data` cannot be decoded.
    fn invariant(&self, reserves: &[Amount], data: &AuxData) -> Result<Invariant>;

    /// Smallest value of `reserves[index]` for which the invariant is at
    /// least `invariant`, all other reserves held fixed.
    ///
    /// # Errors
    ///
    /// - [`WellError::InsufficientReserves`](crate::error::WellError::InsufficientReserves)
    ///   if no such value exists (e.g. another reserve is zero).
    /// - [`WellError::Overflow`](crate::error::WellError::Overflow) if the
    ///   solution exceeds `u128`.
    /// - [`WellError::NonConvergence`](crate::error::WellError::NonConvergence)
    ///   for iterative solvers that fail to converge.
    fn reserve_at_invariant(
        &self,
        reserves: &[Amount],
        invariant: Invariant,
        index: usize,
        data: &AuxData,
    ) -> Result<Amount>;

    /// LP supply minted by the first deposit into an empty Well.
    ///
    /// # Errors
    ///
    /// Same as [`invariant`](Self::invariant).
    fn initial_lp_supply(&self, reserves: &[Amount], data: &AuxData) -> Result<Liquidity>;

    /// Short human-readable name.
    fn name(&self) -> &'static str;

    /// Identity this implementation answers to.  A Well refuses to
    /// initialize unless it equals the configured
    /// [`PricingFunctionRef::target`](crate::config::PricingFunctionRef::target).
    fn target(&self) -> Address;
}
