//! 256-bit helpers for products of reserves.
//!
//! Reserves are `u128`, so a product of two fits in a `U256` but a product
//! of three may not.  Every helper here is checked and reports overflow as
//! [`WellError::Overflow`] instead of wrapping.

use primitive_types::U256;

use super::div_round_wide;
use crate::domain::{Amount, Rounding};
use crate::error::{Result, WellError};

/// `a × b / c` with a full-width intermediate and explicit rounding.
///
/// Returns [`None`] if `c` is zero or `a × b` overflows 256 bits.
#[must_use]
pub fn mul_div(a: U256, b: U256, c: U256, rounding: Rounding) -> Option<U256> {
    let product = a.checked_mul(b)?;
    div_round_wide(product, c, rounding)
}

/// Product of all amounts, skipping `skip` if given.
///
/// An empty product is one.
///
/// # Errors
///
/// Returns [`WellError::Overflow`] if the product exceeds 256 bits.
pub fn product(values: &[Amount], skip: Option<usize>) -> Result<U256> {
    values
        .iter()
        .enumerate()
        .filter(|(i, _)| Some(*i) != skip)
        .try_fold(U256::one(), |acc, (_, v)| {
            acc.checked_mul(v.to_u256())
                .ok_or(WellError::Overflow("reserve product exceeds 256 bits"))
        })
}

/// Narrows a `U256` into an [`Amount`].
///
/// # Errors
///
/// Returns [`WellError::Overflow`] with `context` if the value exceeds
/// `u128`.
pub fn to_amount(value: U256, context: &'static str) -> Result<Amount> {
    Amount::try_from_u256(value).ok_or(WellError::Overflow(context))
}

/// `base^exp`, or `None` on overflow.
#[must_use]
pub fn checked_pow(base: U256, exp: u32) -> Option<U256> {
    (0..exp).try_fold(U256::one(), |acc, _| acc.checked_mul(base))
}

/// Largest `r` with `r^n <= value`.
///
/// Binary search over `[0, 2^ceil(bits/n)]`; `n == 0` returns `None`.
#[must_use]
pub fn nth_root_floor(value: U256, n: u32) -> Option<U256> {
    if n == 0 {
        return None;
    }
    if n == 1 || value <= U256::one() {
        return Some(value);
    }
    let bits = u32::try_from(value.bits()).ok()?;
    let hi_bits = bits.div_ceil(n);
    let mut lo = U256::zero();
    let mut hi = U256::one() << hi_bits;
    // Invariant: lo^n <= value < hi^n (hi^n may overflow, which also counts as > value).
    while hi - lo > U256::one() {
        let mid = lo + ((hi - lo) >> 1u32);
        match checked_pow(mid, n) {
            Some(p) if p <= value => lo = mid,
            _ => hi = mid,
        }
    }
    Some(lo)
}
