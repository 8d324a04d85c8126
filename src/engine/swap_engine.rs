//! Exact-in and exact-out swap quotes.

use tracing::{debug, error};

use crate::domain::{Amount, AuxData, ReserveDelta, Reserves};
use crate::error::{Result, WellError};
use crate::math::CheckedArithmetic;
use crate::traits::PricingFunction;

/// Result of a swap quote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapQuote {
    /// Index of the token paid in.
    pub from: usize,
    /// Index of the token paid out.
    pub to: usize,
    /// Amount the caller pays.
    pub amount_in: Amount,
    /// Amount the caller receives.
    pub amount_out: Amount,
    /// Reserves after the swap.
    pub reserves_after: Reserves,
}

impl SwapQuote {
    /// Signed reserve change: credit at `from`, debit at `to`.
    #[must_use]
    pub fn delta(&self) -> ReserveDelta {
        ReserveDelta::zero(self.reserves_after.len())
            .credit(self.from, self.amount_in)
            .debit(self.to, self.amount_out)
    }
}

/// Prices swaps against a pricing function.
///
/// Rounding always favours the pool: the solved reserve is the smallest
/// that keeps the invariant, so `amount_out` is rounded down and
/// `amount_in` rounded up.
#[derive(Debug, Clone, Copy)]
pub struct SwapEngine<'a> {
    function: &'a dyn PricingFunction,
    data: &'a AuxData,
}

impl<'a> SwapEngine<'a> {
    /// Binds the engine to a pricing function and its auxiliary data.
    #[must_use]
    pub const fn new(function: &'a dyn PricingFunction, data: &'a AuxData) -> Self {
        Self { function, data }
    }

    /// Amount out for paying exactly `amount_in` of token `from`.
    ///
    /// # Errors
    ///
    /// - [`WellError::InvalidTokenPair`] if `from == to`.
    /// - [`WellError::IndexOutOfRange`] for an invalid index.
    /// - [`WellError::NegativeReserve`] if the curve solves above the
    ///   current reserve of `to`.
    /// - Any error of the pricing function.
    pub fn quote_exact_in(
        &self,
        reserves: &Reserves,
        from: usize,
        to: usize,
        amount_in: Amount,
    ) -> Result<SwapQuote> {
        validate_pair(reserves, from, to)?;
        let invariant = self.function.invariant(reserves.as_slice(), self.data)?;
        let with_input = reserves.with(from, reserves.at(from)?.safe_add(&amount_in)?)?;
        let new_to =
            self.function
                .reserve_at_invariant(with_input.as_slice(), invariant, to, self.data)?;
        let amount_out = reserves
            .at(to)?
            .checked_sub(&new_to)
            .ok_or_else(|| {
                error!(function = self.function.name(), index = to, "curve solved above the current reserve");
                WellError::NegativeReserve { index: to }
            })?;
        let reserves_after = with_input.with(to, new_to)?;
        debug!(
            function = self.function.name(),
            from, to, %amount_in, %amount_out, "quoted exact-in swap"
        );
        Ok(SwapQuote {
            from,
            to,
            amount_in,
            amount_out,
            reserves_after,
        })
    }

    /// Amount in required to receive exactly `amount_out` of token `to`.
    ///
    /// # Errors
    ///
    /// - [`WellError::InsufficientReserves`] if `amount_out` is not below
    ///   the reserve of `to`.
    /// - [`WellError::NegativeReserve`] if the curve solves below the
    ///   current reserve of `from`.
    /// - Otherwise as [`quote_exact_in`](Self::quote_exact_in).
    pub fn quote_exact_out(
        &self,
        reserves: &Reserves,
        from: usize,
        to: usize,
        amount_out: Amount,
    ) -> Result<SwapQuote> {
        validate_pair(reserves, from, to)?;
        let reserve_to = reserves.at(to)?;
        if amount_out >= reserve_to {
            return Err(WellError::InsufficientReserves(
                "amount out must be below the output reserve",
            ));
        }
        let invariant = self.function.invariant(reserves.as_slice(), self.data)?;
        let without_output = reserves.with(to, reserve_to.safe_sub(&amount_out)?)?;
        let new_from =
            self.function
                .reserve_at_invariant(without_output.as_slice(), invariant, from, self.data)?;
        let amount_in = new_from
            .checked_sub(&reserves.at(from)?)
            .ok_or_else(|| {
                error!(function = self.function.name(), index = from, "curve solved below the current reserve");
                WellError::NegativeReserve { index: from }
            })?;
        let reserves_after = without_output.with(from, new_from)?;
        debug!(
            function = self.function.name(),
            from, to, %amount_in, %amount_out, "quoted exact-out swap"
        );
        Ok(SwapQuote {
            from,
            to,
            amount_in,
            amount_out,
            reserves_after,
        })
    }
}

fn validate_pair(reserves: &Reserves, from: usize, to: usize) -> Result<()> {
    let token_count = reserves.len();
    for index in [from, to] {
        if index >= token_count {
            return Err(WellError::IndexOutOfRange { index, token_count });
        }
    }
    if from == to {
        return Err(WellError::InvalidTokenPair(from));
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::{Address, Invariant, Liquidity};
    use crate::functions::{ConstantProduct, StableSwap};

    fn cp_quote_in(raw: &[u128], from: usize, to: usize, amount: u128) -> Result<SwapQuote> {
        let data = AuxData::empty();
        SwapEngine::new(&ConstantProduct, &data).quote_exact_in(
            &Reserves::from_raw(raw),
            from,
            to,
            Amount::new(amount),
        )
    }

    fn cp_quote_out(raw: &[u128], from: usize, to: usize, amount: u128) -> Result<SwapQuote> {
        let data = AuxData::empty();
        SwapEngine::new(&ConstantProduct, &data).quote_exact_out(
            &Reserves::from_raw(raw),
            from,
            to,
            Amount::new(amount),
        )
    }

    // -- Exact in -----------------------------------------------------------

    #[test]
    fn exact_in_reference_scenario() {
        let Ok(q) = cp_quote_in(&[1_000, 1_000], 0, 1, 100) else {
            panic!("expected Ok");
        };
        assert_eq!(q.amount_out, Amount::new(90));
        assert_eq!(q.reserves_after.to_raw(), vec![1_100, 910]);
        let Ok(k) = ConstantProduct.invariant(q.reserves_after.as_slice(), &AuxData::empty())
        else {
            panic!("expected Ok");
        };
        assert_eq!(k, Invariant::from(1_001_000u128));
    }

    #[test]
    fn exact_in_delta_matches_post_reserves() {
        let Ok(q) = cp_quote_in(&[1_000, 1_000], 0, 1, 100) else {
            panic!("expected Ok");
        };
        let pre = Reserves::from_raw(&[1_000, 1_000]);
        assert_eq!(pre.checked_apply(&q.delta()), Ok(q.reserves_after));
    }

    #[test]
    fn exact_in_zero_amount_pays_nothing() {
        let Ok(q) = cp_quote_in(&[1_000, 1_000], 1, 0, 0) else {
            panic!("expected Ok");
        };
        assert_eq!(q.amount_out, Amount::ZERO);
    }

    #[test]
    fn exact_in_three_tokens() {
        // k = 1000^3; r0 = 2000 → r1 = ceil(1e9 / (2000·1000)) = 500
        let Ok(q) = cp_quote_in(&[1_000, 1_000, 1_000], 0, 1, 1_000) else {
            panic!("expected Ok");
        };
        assert_eq!(q.amount_out, Amount::new(500));
        assert_eq!(q.reserves_after.to_raw(), vec![2_000, 500, 1_000]);
    }

    #[test]
    fn same_token_rejected() {
        assert_eq!(
            cp_quote_in(&[1_000, 1_000], 1, 1, 10),
            Err(WellError::InvalidTokenPair(1))
        );
    }

    #[test]
    fn out_of_range_rejected() {
        assert_eq!(
            cp_quote_in(&[1_000, 1_000], 0, 2, 10),
            Err(WellError::IndexOutOfRange {
                index: 2,
                token_count: 2
            })
        );
    }

    #[test]
    fn input_overflow_rejected() {
        let Err(WellError::Overflow(_)) = cp_quote_in(&[u128::MAX, 1], 0, 1, 1) else {
            panic!("expected Overflow");
        };
    }

    // -- Exact out ----------------------------------------------------------

    #[test]
    fn exact_out_rounds_input_up() {
        // r1' = 910 → r0' = ceil(1e6 / 910) = 1099 → in = 99
        let Ok(q) = cp_quote_out(&[1_000, 1_000], 0, 1, 90) else {
            panic!("expected Ok");
        };
        assert_eq!(q.amount_in, Amount::new(99));
        assert_eq!(q.reserves_after.to_raw(), vec![1_099, 910]);
    }

    #[test]
    fn exact_out_entire_reserve_rejected() {
        let Err(WellError::InsufficientReserves(_)) = cp_quote_out(&[1_000, 1_000], 0, 1, 1_000)
        else {
            panic!("expected InsufficientReserves");
        };
    }

    #[test]
    fn exact_out_more_than_reserve_rejected() {
        assert!(cp_quote_out(&[1_000, 1_000], 0, 1, 5_000).is_err());
    }

    #[test]
    fn round_trip_never_profits_caller() {
        let Ok(fwd) = cp_quote_in(&[1_000_000, 3_000_000], 0, 1, 12_345) else {
            panic!("expected Ok");
        };
        let Ok(back) = cp_quote_out(&[1_000_000, 3_000_000], 0, 1, fwd.amount_out.get()) else {
            panic!("expected Ok");
        };
        assert!(back.amount_in <= Amount::new(12_345));
    }

    // -- StableSwap ---------------------------------------------------------

    #[test]
    fn stable_swap_exact_in_preserves_invariant() {
        let data = StableSwap::encode_data(100);
        let engine = SwapEngine::new(&StableSwap, &data);
        let pre = Reserves::from_raw(&[5_000_000, 5_000_000, 5_000_000]);
        let Ok(q) = engine.quote_exact_in(&pre, 2, 0, Amount::new(250_000)) else {
            panic!("expected Ok");
        };
        let Ok(before) = StableSwap.invariant(pre.as_slice(), &data) else {
            panic!("expected Ok");
        };
        let Ok(after) = StableSwap.invariant(q.reserves_after.as_slice(), &data) else {
            panic!("expected Ok");
        };
        assert!(after >= before);
        assert!(q.amount_out < Amount::new(250_000));
        assert!(q.amount_out > Amount::new(240_000));
    }

    // -- Misbehaving curve --------------------------------------------------

    /// Solves every reserve to the same fixed value.
    #[derive(Debug)]
    struct Fixed(u128);

    impl PricingFunction for Fixed {
        fn invariant(&self, _reserves: &[Amount], _data: &AuxData) -> Result<Invariant> {
            Ok(Invariant::from(1u128))
        }

        fn reserve_at_invariant(
            &self,
            _reserves: &[Amount],
            _invariant: Invariant,
            _index: usize,
            _data: &AuxData,
        ) -> Result<Amount> {
            Ok(Amount::new(self.0))
        }

        fn initial_lp_supply(&self, _reserves: &[Amount], _data: &AuxData) -> Result<Liquidity> {
            Ok(Liquidity::new(1))
        }

        fn name(&self) -> &'static str {
            "fixed"
        }

        fn target(&self) -> Address {
            Address::from_low_u64(0xF1)
        }
    }

    #[test]
    fn curve_solving_past_the_reserve_is_rejected() {
        let data = AuxData::empty();
        let pre = Reserves::from_raw(&[1_000, 1_000]);
        assert_eq!(
            SwapEngine::new(&Fixed(2_000), &data).quote_exact_in(&pre, 0, 1, Amount::new(10)),
            Err(WellError::NegativeReserve { index: 1 })
        );
        assert_eq!(
            SwapEngine::new(&Fixed(500), &data).quote_exact_out(&pre, 0, 1, Amount::new(10)),
            Err(WellError::NegativeReserve { index: 0 })
        );
    }
}
