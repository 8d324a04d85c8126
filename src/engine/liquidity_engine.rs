//! Liquidity add and remove quotes.
//!
//! # Share accounting
//!
//! LP shares are priced by *balanced equivalence*: a supply of `S` shares
//! over reserves `r` is worth the same as the balanced position
//! `⌈r · S' / S⌉` for any other supply `S'`.  Every non-balanced operation
//! asks which balanced supply has the same invariant as the reserves it
//! produces:
//!
//! | Operation | Shares |
//! |-----------|--------|
//! | add `a` | largest `L` with `invariant(⌈r·(S+L)/S⌉) ≤ invariant(r + a)` |
//! | remove imbalanced `o` | smallest `L` with `invariant(⌈r·(S−L)/S⌉) ≤ invariant(r − o)` |
//! | remove one token for `L` | solve `rⱼ` for `invariant(⌈r·(S−L)/S⌉)` |
//! | remove balanced for `L` | `⌊r·L/S⌋`, no curve call |
//!
//! Rounding the balanced reserves up makes minted shares round down and
//! burned shares round up.  For a curve homogeneous of degree `d` this is
//! exactly `L = S · ((k'/k)^(1/d) − 1)`, so it needs no knowledge of `d`.
//! Both searches are bisections over `u128`, at most 128 invariant
//! evaluations each.

use tracing::{debug, error};

use crate::domain::{Amount, AuxData, Invariant, Liquidity, ReserveDelta, Reserves, Rounding};
use crate::error::{Result, WellError};
use crate::math::{CheckedArithmetic, mul_div};
use crate::traits::PricingFunction;

/// Result of a liquidity quote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiquidityQuote {
    /// Shares minted (add) or burned (remove).
    pub lp_amount: Liquidity,
    /// Per-token amounts deposited (add) or withdrawn (remove).
    pub amounts: Vec<Amount>,
    /// Reserves after the operation.
    pub reserves_after: Reserves,
}

/// Prices liquidity operations against a pricing function.
#[derive(Debug, Clone, Copy)]
pub struct LiquidityEngine<'a> {
    function: &'a dyn PricingFunction,
    data: &'a AuxData,
}

impl<'a> LiquidityEngine<'a> {
    /// Binds the engine to a pricing function and its auxiliary data.
    #[must_use]
    pub const fn new(function: &'a dyn PricingFunction, data: &'a AuxData) -> Self {
        Self { function, data }
    }

    fn invariant(&self, reserves: &[Amount]) -> Result<Invariant> {
        self.function.invariant(reserves, self.data)
    }

    /// Invariant of the balanced position of `supply` shares, or `None` if
    /// it is too large to represent.
    fn balanced_invariant(
        &self,
        reserves: &Reserves,
        supply: u128,
        lp_supply: u128,
    ) -> Result<Option<Invariant>> {
        let mut scaled = Vec::with_capacity(reserves.len());
        for r in reserves.iter() {
            match r.mul_div(supply, lp_supply, Rounding::Up) {
                Some(v) => scaled.push(v),
                None => return Ok(None),
            }
        }
        match self.invariant(&scaled) {
            Ok(inv) => Ok(Some(inv)),
            Err(WellError::Overflow(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Shares minted for depositing `amounts_in`.
    ///
    /// # Errors
    ///
    /// - [`WellError::LengthMismatch`] if `amounts_in` has the wrong length.
    /// - [`WellError::Overflow`] if a reserve would overflow.
    /// - Any error of the pricing function.
    pub fn quote_add_liquidity(
        &self,
        reserves: &Reserves,
        lp_supply: Liquidity,
        amounts_in: &[Amount],
    ) -> Result<LiquidityQuote> {
        check_len(reserves, amounts_in.len())?;
        let delta = amounts_in
            .iter()
            .enumerate()
            .fold(ReserveDelta::zero(reserves.len()), |d, (i, a)| d.credit(i, *a));
        let reserves_after = reserves.checked_apply(&delta)?;

        let lp_amount = if lp_supply.is_zero() {
            self.function
                .initial_lp_supply(reserves_after.as_slice(), self.data)?
        } else {
            let target = self.invariant(reserves_after.as_slice())?;
            let s = lp_supply.get();
            // Past this many shares every balanced reserve covers its new reserve.
            let mut hi = 0u128;
            for (r, a) in reserves.iter().zip(amounts_in) {
                if r.is_zero() {
                    continue;
                }
                let bound = a
                    .mul_div(s, r.get(), Rounding::Up)
                    .map_or(u128::MAX, |v| v.get());
                hi = hi.max(bound);
            }
            hi = hi.min(u128::MAX - s);
            let mut lo = 0u128;
            while lo < hi {
                let mid = lo + (hi - lo).div_ceil(2);
                let fits = self
                    .balanced_invariant(reserves, s + mid, s)?
                    .is_some_and(|inv| inv <= target);
                if fits {
                    lo = mid;
                } else {
                    hi = mid - 1;
                }
            }
            Liquidity::new(lo)
        };
        debug!(function = self.function.name(), %lp_amount, "quoted add liquidity");
        Ok(LiquidityQuote {
            lp_amount,
            amounts: amounts_in.to_vec(),
            reserves_after,
        })
    }

    /// Balanced withdrawal for burning `lp_in`.
    ///
    /// # Errors
    ///
    /// - [`WellError::DivideByZero`] if `lp_supply` is zero.
    /// - [`WellError::InsufficientReserves`] if `lp_in > lp_supply`.
    pub fn quote_remove_liquidity(
        &self,
        reserves: &Reserves,
        lp_supply: Liquidity,
        lp_in: Liquidity,
    ) -> Result<LiquidityQuote> {
        check_burn(lp_supply, lp_in)?;
        let mut amounts = Vec::with_capacity(reserves.len());
        for r in reserves.iter() {
            let out = mul_div(r.to_u256(), lp_in.to_u256(), lp_supply.to_u256(), Rounding::Down)
                .and_then(Amount::try_from_u256)
                .ok_or(WellError::Overflow("balanced withdrawal"))?;
            amounts.push(out);
        }
        let reserves_after = debit_all(reserves, &amounts)?;
        debug!(%lp_in, "quoted balanced remove liquidity");
        Ok(LiquidityQuote {
            lp_amount: lp_in,
            amounts,
            reserves_after,
        })
    }

    /// Withdrawal of a single token for burning `lp_in`.
    ///
    /// # Errors
    ///
    /// - [`WellError::DivideByZero`] if `lp_supply` is zero.
    /// - [`WellError::InsufficientReserves`] if `lp_in > lp_supply`.
    /// - [`WellError::IndexOutOfRange`] for an invalid `index`.
    /// - [`WellError::NegativeReserve`] if the curve solves above the
    ///   current reserve.
    pub fn quote_remove_liquidity_one_token(
        &self,
        reserves: &Reserves,
        lp_supply: Liquidity,
        lp_in: Liquidity,
        index: usize,
    ) -> Result<LiquidityQuote> {
        check_burn(lp_supply, lp_in)?;
        let current = reserves.at(index)?;
        let remaining = lp_supply.safe_sub(&lp_in)?;
        let target = self
            .balanced_invariant(reserves, remaining.get(), lp_supply.get())?
            .ok_or(WellError::Overflow("balanced invariant"))?;
        let solved =
            self.function
                .reserve_at_invariant(reserves.as_slice(), target, index, self.data)?;
        let amount_out = current
            .checked_sub(&solved)
            .ok_or_else(|| {
                error!(function = self.function.name(), index, "curve solved above the current reserve");
                WellError::NegativeReserve { index }
            })?;
        let mut amounts = vec![Amount::ZERO; reserves.len()];
        amounts[index] = amount_out;
        let reserves_after = reserves.with(index, solved)?;
        debug!(function = self.function.name(), %lp_in, index, %amount_out, "quoted one-token remove");
        Ok(LiquidityQuote {
            lp_amount: lp_in,
            amounts,
            reserves_after,
        })
    }

    /// Shares burned to withdraw exactly `amounts_out`.
    ///
    /// # Errors
    ///
    /// - [`WellError::LengthMismatch`] if `amounts_out` has the wrong length.
    /// - [`WellError::DivideByZero`] if `lp_supply` is zero.
    /// - [`WellError::InsufficientReserves`] if any amount exceeds its
    ///   reserve.
    pub fn quote_remove_liquidity_imbalanced(
        &self,
        reserves: &Reserves,
        lp_supply: Liquidity,
        amounts_out: &[Amount],
    ) -> Result<LiquidityQuote> {
        check_len(reserves, amounts_out.len())?;
        if lp_supply.is_zero() {
            return Err(WellError::DivideByZero);
        }
        if reserves.iter().zip(amounts_out).any(|(r, o)| o > r) {
            return Err(WellError::InsufficientReserves(
                "withdrawal exceeds reserve",
            ));
        }
        let reserves_after = debit_all(reserves, amounts_out)?;
        let target = self.invariant(reserves_after.as_slice())?;
        let s = lp_supply.get();
        let (mut lo, mut hi) = (0u128, s);
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            let fits = self
                .balanced_invariant(reserves, s - mid, s)?
                .is_some_and(|inv| inv <= target);
            if fits {
                hi = mid;
            } else {
                lo = mid + 1;
            }
        }
        let lp_amount = Liquidity::new(lo);
        debug!(function = self.function.name(), %lp_amount, "quoted imbalanced remove");
        Ok(LiquidityQuote {
            lp_amount,
            amounts: amounts_out.to_vec(),
            reserves_after,
        })
    }
}

fn check_len(reserves: &Reserves, actual: usize) -> Result<()> {
    if actual != reserves.len() {
        return Err(WellError::LengthMismatch {
            expected: reserves.len(),
            actual,
        });
    }
    Ok(())
}

fn check_burn(lp_supply: Liquidity, lp_in: Liquidity) -> Result<()> {
    if lp_supply.is_zero() {
        return Err(WellError::DivideByZero);
    }
    if lp_in > lp_supply {
        return Err(WellError::InsufficientReserves("LP amount exceeds supply"));
    }
    Ok(())
}

fn debit_all(reserves: &Reserves, amounts: &[Amount]) -> Result<Reserves> {
    let delta = amounts
        .iter()
        .enumerate()
        .fold(ReserveDelta::zero(reserves.len()), |d, (i, a)| d.debit(i, *a));
    reserves.checked_apply(&delta)
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::functions::{ConstantProduct, StableSwap};

    fn amounts(raw: &[u128]) -> Vec<Amount> {
        raw.iter().copied().map(Amount::new).collect()
    }

    fn cp() -> (ConstantProduct, AuxData) {
        (ConstantProduct, AuxData::empty())
    }

    // -- Add ----------------------------------------------------------------

    #[test]
    fn first_deposit_uses_initial_supply() {
        let (f, d) = cp();
        let engine = LiquidityEngine::new(&f, &d);
        let Ok(q) = engine.quote_add_liquidity(&Reserves::zeroed(2), Liquidity::ZERO, &amounts(&[1_000, 1_000]))
        else {
            panic!("expected Ok");
        };
        assert_eq!(q.lp_amount, Liquidity::new(1_000));
        assert_eq!(q.reserves_after.to_raw(), vec![1_000, 1_000]);
    }

    #[test]
    fn balanced_add_is_proportional() {
        let (f, d) = cp();
        let engine = LiquidityEngine::new(&f, &d);
        let r = Reserves::from_raw(&[1_000, 4_000]);
        let Ok(q) = engine.quote_add_liquidity(&r, Liquidity::new(2_000), &amounts(&[100, 400])) else {
            panic!("expected Ok");
        };
        assert_eq!(q.lp_amount, Liquidity::new(200));
    }

    #[test]
    fn single_sided_add_rounds_down() {
        // (1000 + L)^2 <= 1_100_000 → L = 48
        let (f, d) = cp();
        let engine = LiquidityEngine::new(&f, &d);
        let r = Reserves::from_raw(&[1_000, 1_000]);
        let Ok(q) = engine.quote_add_liquidity(&r, Liquidity::new(1_000), &amounts(&[100, 0])) else {
            panic!("expected Ok");
        };
        assert_eq!(q.lp_amount, Liquidity::new(48));
    }

    #[test]
    fn zero_add_mints_nothing() {
        let (f, d) = cp();
        let engine = LiquidityEngine::new(&f, &d);
        let r = Reserves::from_raw(&[1_000, 1_000]);
        let Ok(q) = engine.quote_add_liquidity(&r, Liquidity::new(1_000), &amounts(&[0, 0])) else {
            panic!("expected Ok");
        };
        assert_eq!(q.lp_amount, Liquidity::ZERO);
    }

    #[test]
    fn add_length_mismatch() {
        let (f, d) = cp();
        let engine = LiquidityEngine::new(&f, &d);
        let r = Reserves::from_raw(&[1_000, 1_000]);
        assert_eq!(
            engine.quote_add_liquidity(&r, Liquidity::new(1), &amounts(&[1])),
            Err(WellError::LengthMismatch {
                expected: 2,
                actual: 1
            })
        );
    }

    // -- Balanced remove ----------------------------------------------------

    #[test]
    fn remove_half_supply() {
        let (f, d) = cp();
        let engine = LiquidityEngine::new(&f, &d);
        let r = Reserves::from_raw(&[1_000, 1_000]);
        let Ok(q) = engine.quote_remove_liquidity(&r, Liquidity::new(1_000), Liquidity::new(500)) else {
            panic!("expected Ok");
        };
        assert_eq!(q.amounts, amounts(&[500, 500]));
        assert_eq!(q.reserves_after.to_raw(), vec![500, 500]);
    }

    #[test]
    fn remove_full_supply_returns_reserves() {
        let (f, d) = cp();
        let engine = LiquidityEngine::new(&f, &d);
        let r = Reserves::from_raw(&[1_234, 5_678, 91]);
        let Ok(q) = engine.quote_remove_liquidity(&r, Liquidity::new(777), Liquidity::new(777)) else {
            panic!("expected Ok");
        };
        assert_eq!(q.amounts, r.as_slice().to_vec());
    }

    #[test]
    fn remove_rounds_down() {
        let (f, d) = cp();
        let engine = LiquidityEngine::new(&f, &d);
        let r = Reserves::from_raw(&[10, 10]);
        let Ok(q) = engine.quote_remove_liquidity(&r, Liquidity::new(3), Liquidity::new(1)) else {
            panic!("expected Ok");
        };
        assert_eq!(q.amounts, amounts(&[3, 3]));
    }

    #[test]
    fn remove_with_zero_supply() {
        let (f, d) = cp();
        let engine = LiquidityEngine::new(&f, &d);
        assert_eq!(
            engine.quote_remove_liquidity(&Reserves::zeroed(2), Liquidity::ZERO, Liquidity::ZERO),
            Err(WellError::DivideByZero)
        );
    }

    #[test]
    fn remove_more_than_supply() {
        let (f, d) = cp();
        let engine = LiquidityEngine::new(&f, &d);
        let r = Reserves::from_raw(&[10, 10]);
        let Err(WellError::InsufficientReserves(_)) =
            engine.quote_remove_liquidity(&r, Liquidity::new(5), Liquidity::new(6))
        else {
            panic!("expected InsufficientReserves");
        };
    }

    // -- One token ----------------------------------------------------------

    #[test]
    fn one_token_remove() {
        // target = 948^2 = 898_704 → r0 = ceil(898_704 / 1000) = 899
        let (f, d) = cp();
        let engine = LiquidityEngine::new(&f, &d);
        let r = Reserves::from_raw(&[1_000, 1_000]);
        let Ok(q) = engine.quote_remove_liquidity_one_token(&r, Liquidity::new(1_000), Liquidity::new(52), 0)
        else {
            panic!("expected Ok");
        };
        assert_eq!(q.amounts, amounts(&[101, 0]));
        assert_eq!(q.reserves_after.to_raw(), vec![899, 1_000]);
    }

    #[test]
    fn one_token_bad_index() {
        let (f, d) = cp();
        let engine = LiquidityEngine::new(&f, &d);
        let r = Reserves::from_raw(&[1_000, 1_000]);
        assert_eq!(
            engine.quote_remove_liquidity_one_token(&r, Liquidity::new(1_000), Liquidity::new(1), 3),
            Err(WellError::IndexOutOfRange {
                index: 3,
                token_count: 2
            })
        );
    }

    // -- Imbalanced ---------------------------------------------------------

    #[test]
    fn imbalanced_remove_rounds_up() {
        // (1000 - L)^2 <= 900_000 → L = 52
        let (f, d) = cp();
        let engine = LiquidityEngine::new(&f, &d);
        let r = Reserves::from_raw(&[1_000, 1_000]);
        let Ok(q) = engine.quote_remove_liquidity_imbalanced(&r, Liquidity::new(1_000), &amounts(&[100, 0]))
        else {
            panic!("expected Ok");
        };
        assert_eq!(q.lp_amount, Liquidity::new(52));
        assert_eq!(q.reserves_after.to_raw(), vec![900, 1_000]);
    }

    #[test]
    fn imbalanced_balanced_matches_proportional() {
        let (f, d) = cp();
        let engine = LiquidityEngine::new(&f, &d);
        let r = Reserves::from_raw(&[1_000, 1_000]);
        let Ok(q) = engine.quote_remove_liquidity_imbalanced(&r, Liquidity::new(1_000), &amounts(&[500, 500]))
        else {
            panic!("expected Ok");
        };
        assert_eq!(q.lp_amount, Liquidity::new(500));
    }

    #[test]
    fn imbalanced_exceeding_reserve() {
        let (f, d) = cp();
        let engine = LiquidityEngine::new(&f, &d);
        let r = Reserves::from_raw(&[1_000, 1_000]);
        let Err(WellError::InsufficientReserves(_)) =
            engine.quote_remove_liquidity_imbalanced(&r, Liquidity::new(1_000), &amounts(&[1_001, 0]))
        else {
            panic!("expected InsufficientReserves");
        };
    }

    // -- StableSwap ---------------------------------------------------------

    #[test]
    fn stable_swap_balanced_add_is_proportional() {
        let f = StableSwap;
        let d = StableSwap::encode_data(100);
        let engine = LiquidityEngine::new(&f, &d);
        let r = Reserves::from_raw(&[1_000_000, 1_000_000]);
        let Ok(q) = engine.quote_add_liquidity(&r, Liquidity::new(2_000_000), &amounts(&[10_000, 10_000]))
        else {
            panic!("expected Ok");
        };
        assert_eq!(q.lp_amount, Liquidity::new(20_000));
    }
}
