//! Integer division with an explicit rounding direction.
//!
//! | Quantity | Direction |
//! |----------|-----------|
//! | Amount paid out by the pool | [`Rounding::Down`] |
//! | Amount owed to the pool | [`Rounding::Up`] |
//! | Reserve solved from an invariant | [`Rounding::Up`] |
//! | LP shares minted | [`Rounding::Down`] |
//! | LP shares burned | [`Rounding::Up`] |
//!
//! # Examples
//!
//! ```
//! use well_engine::domain::Rounding;
//! use well_engine::math::div_round;
//!
//! assert_eq!(div_round(10, 3, Rounding::Down), Some(3));
//! assert_eq!(div_round(10, 3, Rounding::Up), Some(4));
//! assert_eq!(div_round(10, 0, Rounding::Down), None);
//! ```

use primitive_types::U256;

use crate::domain::Rounding;

/// `u128` division rounded in the requested direction.
///
/// Returns [`None`] if `denominator` is zero.
#[must_use]
pub const fn div_round(numerator: u128, denominator: u128, rounding: Rounding) -> Option<u128> {
    if denominator == 0 {
        return None;
    }
    let q = numerator / denominator;
    match rounding {
        Rounding::Down => Some(q),
        // q < u128::MAX whenever the remainder is non-zero.
        Rounding::Up if numerator % denominator != 0 => Some(q + 1),
        Rounding::Up => Some(q),
    }
}

/// `U256` division rounded in the requested direction.
///
/// Returns [`None`] if `denominator` is zero.
#[must_use]
pub fn div_round_wide(numerator: U256, denominator: U256, rounding: Rounding) -> Option<U256> {
    if denominator.is_zero() {
        return None;
    }
    let (q, r) = numerator.div_mod(denominator);
    match rounding {
        Rounding::Up if !r.is_zero() => Some(q + U256::one()),
        _ => Some(q),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // -- u128 ---------------------------------------------------------------

    #[test]
    fn zero_denominator() {
        assert_eq!(div_round(1, 0, Rounding::Up), None);
        assert_eq!(div_round(0, 0, Rounding::Down), None);
    }

    #[test]
    fn exact_division_agrees() {
        assert_eq!(div_round(100, 10, Rounding::Down), Some(10));
        assert_eq!(div_round(100, 10, Rounding::Up), Some(10));
    }

    #[test]
    fn inexact_division_differs_by_one() {
        assert_eq!(div_round(7, 2, Rounding::Down), Some(3));
        assert_eq!(div_round(7, 2, Rounding::Up), Some(4));
    }

    #[test]
    fn near_max_does_not_overflow() {
        let d = u128::MAX / 2;
        assert_eq!(div_round(u128::MAX, d, Rounding::Down), Some(2));
        assert_eq!(div_round(u128::MAX, d, Rounding::Up), Some(3));
        assert_eq!(div_round(u128::MAX, 1, Rounding::Up), Some(u128::MAX));
    }

    // -- U256 ---------------------------------------------------------------

    #[test]
    fn wide_rounds_up_on_remainder() {
        let n = U256::from(u128::MAX) * U256::from(3u8) + U256::one();
        let d = U256::from(3u8);
        assert_eq!(
            div_round_wide(n, d, Rounding::Down),
            Some(U256::from(u128::MAX))
        );
        assert_eq!(
            div_round_wide(n, d, Rounding::Up),
            Some(U256::from(u128::MAX) + U256::one())
        );
    }

    #[test]
    fn wide_zero_denominator() {
        assert_eq!(div_round_wide(U256::one(), U256::zero(), Rounding::Up), None);
    }
}
