//! Property-based checks of the swap and liquidity engines.
//!
//! 1. **Invariant preservation**: exact-in swaps never lower the invariant.
//! 2. **Round trips**: exact-out of an exact-in output costs at most the
//!    original input; exact-in of an exact-out input yields at least the
//!    original output.  Checked for both built-in curves.
//! 3. **Balanced remove**: burning the full supply returns the reserves;
//!    withdrawals scale linearly when divisions are exact.
//! 4. **Add then remove**: a balanced deposit cannot be withdrawn for more.
//! 5. **Imbalanced vs one-token**: burning the shares quoted for an
//!    imbalanced withdrawal of one token yields at least that amount.

use proptest::prelude::*;

use crate::domain::{Amount, AuxData, Liquidity, Reserves};
use crate::engine::{LiquidityEngine, SwapEngine};
use crate::functions::{ConstantProduct, StableSwap};
use crate::traits::PricingFunction;

// ---------------------------------------------------------------------------
// Strategies
// ---------------------------------------------------------------------------

/// Reserves in [10_000, 10_000_000].
fn reserve_strategy() -> impl Strategy<Value = u128> {
    10_000u128..=10_000_000u128
}

fn reserves_strategy(n: usize) -> impl Strategy<Value = Vec<u128>> {
    prop::collection::vec(reserve_strategy(), n)
}

fn amplification_strategy() -> impl Strategy<Value = u32> {
    1u32..=1_000u32
}

fn invariant_of(f: &dyn PricingFunction, data: &AuxData, r: &Reserves) -> Option<primitive_types::U256> {
    f.invariant(r.as_slice(), data).ok().map(|k| k.get())
}

// ---------------------------------------------------------------------------
// Property 1: invariant preservation
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_exact_in_preserves_invariant_constant_product(
        raw in reserves_strategy(3),
        frac in 1u128..=500u128,
        from in 0usize..3,
        step in 1usize..3,
    ) {
        let to = (from + step) % 3;
        let data = AuxData::empty();
        let reserves = Reserves::from_raw(&raw);
        let amount_in = Amount::new(raw[from] * frac / 1_000);
        let engine = SwapEngine::new(&ConstantProduct, &data);
        let Ok(q) = engine.quote_exact_in(&reserves, from, to, amount_in) else {
            return Ok(());
        };
        let before = invariant_of(&ConstantProduct, &data, &reserves);
        let after = invariant_of(&ConstantProduct, &data, &q.reserves_after);
        prop_assert!(after >= before);
        prop_assert!(q.amount_out < reserves.as_slice()[to]);
    }

    #[test]
    fn prop_exact_in_preserves_invariant_stable_swap(
        raw in reserves_strategy(2),
        amp in amplification_strategy(),
        frac in 1u128..=300u128,
    ) {
        let data = StableSwap::encode_data(amp);
        let reserves = Reserves::from_raw(&raw);
        let amount_in = Amount::new(raw[0] * frac / 1_000);
        let engine = SwapEngine::new(&StableSwap, &data);
        let Ok(q) = engine.quote_exact_in(&reserves, 0, 1, amount_in) else {
            return Ok(());
        };
        let before = invariant_of(&StableSwap, &data, &reserves);
        let after = invariant_of(&StableSwap, &data, &q.reserves_after);
        prop_assert!(after >= before);
    }
}

// ---------------------------------------------------------------------------
// Property 2: round trips
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_exact_out_of_exact_in_costs_no_more(
        raw in reserves_strategy(2),
        frac in 1u128..=900u128,
    ) {
        let data = AuxData::empty();
        let reserves = Reserves::from_raw(&raw);
        let engine = SwapEngine::new(&ConstantProduct, &data);
        let amount_in = Amount::new(raw[0] * frac / 1_000);
        let Ok(fwd) = engine.quote_exact_in(&reserves, 0, 1, amount_in) else {
            return Ok(());
        };
        if fwd.amount_out.is_zero() {
            return Ok(());
        }
        let Ok(back) = engine.quote_exact_out(&reserves, 0, 1, fwd.amount_out) else {
            return Ok(());
        };
        prop_assert!(back.amount_in <= amount_in);
    }

    #[test]
    fn prop_exact_in_of_exact_out_yields_no_less(
        raw in reserves_strategy(2),
        frac in 1u128..=900u128,
    ) {
        let data = AuxData::empty();
        let reserves = Reserves::from_raw(&raw);
        let engine = SwapEngine::new(&ConstantProduct, &data);
        let amount_out = Amount::new(raw[1] * frac / 1_000);
        let Ok(fwd) = engine.quote_exact_out(&reserves, 0, 1, amount_out) else {
            return Ok(());
        };
        let Ok(back) = engine.quote_exact_in(&reserves, 0, 1, fwd.amount_in) else {
            return Ok(());
        };
        prop_assert!(back.amount_out >= amount_out);
    }

    #[test]
    fn prop_stable_swap_exact_out_of_exact_in_costs_no_more(
        raw in reserves_strategy(2),
        amp in amplification_strategy(),
        frac in 1u128..=900u128,
    ) {
        let data = StableSwap::encode_data(amp);
        let reserves = Reserves::from_raw(&raw);
        let engine = SwapEngine::new(&StableSwap, &data);
        let amount_in = Amount::new(raw[0] * frac / 1_000);
        let Ok(fwd) = engine.quote_exact_in(&reserves, 0, 1, amount_in) else {
            return Ok(());
        };
        if fwd.amount_out.is_zero() {
            return Ok(());
        }
        let Ok(back) = engine.quote_exact_out(&reserves, 0, 1, fwd.amount_out) else {
            return Ok(());
        };
        prop_assert!(back.amount_in <= amount_in);
    }

    #[test]
    fn prop_stable_swap_exact_in_of_exact_out_yields_no_less(
        raw in reserves_strategy(2),
        amp in amplification_strategy(),
        frac in 1u128..=900u128,
    ) {
        let data = StableSwap::encode_data(amp);
        let reserves = Reserves::from_raw(&raw);
        let engine = SwapEngine::new(&StableSwap, &data);
        let amount_out = Amount::new(raw[1] * frac / 1_000);
        let Ok(fwd) = engine.quote_exact_out(&reserves, 0, 1, amount_out) else {
            return Ok(());
        };
        let Ok(back) = engine.quote_exact_in(&reserves, 0, 1, fwd.amount_in) else {
            return Ok(());
        };
        prop_assert!(back.amount_out >= amount_out);
    }
}

// ---------------------------------------------------------------------------
// Property 3: balanced remove
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_full_burn_returns_reserves(
        raw in reserves_strategy(3),
        supply in 1u128..=1_000_000_000u128,
    ) {
        let data = AuxData::empty();
        let reserves = Reserves::from_raw(&raw);
        let engine = LiquidityEngine::new(&ConstantProduct, &data);
        let supply = Liquidity::new(supply);
        let Ok(q) = engine.quote_remove_liquidity(&reserves, supply, supply) else {
            return Err(TestCaseError::fail("full burn must succeed"));
        };
        prop_assert_eq!(q.amounts, reserves.as_slice().to_vec());
        prop_assert!(q.reserves_after.iter().all(Amount::is_zero));
    }

    #[test]
    fn prop_balanced_remove_is_linear(
        multiples in prop::collection::vec(1u128..=1_000u128, 2),
        supply in 1u128..=10_000u128,
        share in 1u128..=5_000u128,
    ) {
        prop_assume!(share * 2 <= supply);
        let data = AuxData::empty();
        // reserves are multiples of the supply so every division is exact
        let raw: Vec<u128> = multiples.iter().map(|m| m * supply).collect();
        let reserves = Reserves::from_raw(&raw);
        let engine = LiquidityEngine::new(&ConstantProduct, &data);
        let s = Liquidity::new(supply);
        let (Ok(one), Ok(two)) = (
            engine.quote_remove_liquidity(&reserves, s, Liquidity::new(share)),
            engine.quote_remove_liquidity(&reserves, s, Liquidity::new(share * 2)),
        ) else {
            return Err(TestCaseError::fail("balanced remove must succeed"));
        };
        for (a, b) in one.amounts.iter().zip(&two.amounts) {
            prop_assert_eq!(a.get() * 2, b.get());
        }
    }
}

// ---------------------------------------------------------------------------
// Property 4: add then remove
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn prop_balanced_add_then_remove_never_profits(
        multiples in prop::collection::vec(1u128..=100u128, 2),
        base in 1_000u128..=100_000u128,
        k in 1u128..=100_000u128,
    ) {
        prop_assume!(k <= base);
        let data = AuxData::empty();
        // deposit is exactly proportional to the reserves
        let raw: Vec<u128> = multiples.iter().map(|m| m * base).collect();
        let deposit: Vec<Amount> = multiples.iter().map(|m| Amount::new(m * k)).collect();
        let reserves = Reserves::from_raw(&raw);
        let engine = LiquidityEngine::new(&ConstantProduct, &data);
        let Ok(supply) = ConstantProduct.initial_lp_supply(reserves.as_slice(), &data) else {
            return Ok(());
        };
        let Ok(add) = engine.quote_add_liquidity(&reserves, supply, &deposit) else {
            return Ok(());
        };
        let Some(new_supply) = supply.checked_add(&add.lp_amount) else {
            return Ok(());
        };
        let Ok(remove) = engine.quote_remove_liquidity(&add.reserves_after, new_supply, add.lp_amount) else {
            return Ok(());
        };
        for (out, inp) in remove.amounts.iter().zip(&deposit) {
            prop_assert!(out <= inp);
        }
    }
}

// ---------------------------------------------------------------------------
// Property 5: imbalanced vs one-token
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn prop_one_token_burn_covers_imbalanced_quote(
        raw in reserves_strategy(2),
        frac in 1u128..=500u128,
        index in 0usize..2,
    ) {
        let data = AuxData::empty();
        let reserves = Reserves::from_raw(&raw);
        let engine = LiquidityEngine::new(&ConstantProduct, &data);
        let Ok(supply) = ConstantProduct.initial_lp_supply(reserves.as_slice(), &data) else {
            return Ok(());
        };
        let mut wanted = vec![Amount::ZERO; 2];
        wanted[index] = Amount::new(raw[index] * frac / 1_000);
        let Ok(imbalanced) = engine.quote_remove_liquidity_imbalanced(&reserves, supply, &wanted) else {
            return Ok(());
        };
        let Ok(one) = engine.quote_remove_liquidity_one_token(&reserves, supply, imbalanced.lp_amount, index) else {
            return Ok(());
        };
        prop_assert!(one.amounts[index] >= wanted[index]);
    }
}
