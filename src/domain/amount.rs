//! Raw token amount with checked arithmetic.

use core::fmt;

use primitive_types::U256;

use super::Rounding;

/// A raw token amount in the token's smallest unit.
///
/// All `u128` values are valid.  Arithmetic is checked and returns `None`
/// on overflow, underflow or division by zero instead of panicking.
///
/// # Examples
///
/// ```
/// use well_engine::domain::{Amount, Rounding};
///
/// let reserve = Amount::new(1_000);
/// // 1_000 * 3 / 7 rounded both ways
/// assert_eq!(reserve.mul_div(3, 7, Rounding::Down), Some(Amount::new(428)));
/// assert_eq!(reserve.mul_div(3, 7, Rounding::Up), Some(Amount::new(429)));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[must_use]
pub struct Amount(u128);

impl Amount {
    /// Zero amount.
    pub const ZERO: Self = Self(0);

    /// Maximum representable amount.
    pub const MAX: Self = Self(u128::MAX);

    /// Creates a new `Amount` from a raw `u128` value.
    pub const fn new(value: u128) -> Self {
        Self(value)
    }

    /// Returns the underlying `u128` value.
    #[must_use]
    pub const fn get(&self) -> u128 {
        self.0
    }

    /// Returns `true` if the amount is zero.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checked addition. Returns `None` on overflow.
    #[must_use]
    pub const fn checked_add(&self, other: &Self) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(v) => Some(Self(v)),
            None => None,
        }
    }

    /// Checked subtraction. Returns `None` on underflow.
    #[must_use]
    pub const fn checked_sub(&self, other: &Self) -> Option<Self> {
        match self.0.checked_sub(other.0) {
            Some(v) => Some(Self(v)),
            None => None,
        }
    }

    /// Checked multiplication. Returns `None` on overflow.
    #[must_use]
    pub const fn checked_mul(&self, other: &Self) -> Option<Self> {
        match self.0.checked_mul(other.0) {
            Some(v) => Some(Self(v)),
            None => None,
        }
    }

    /// Checked division with explicit rounding direction.
    ///
    /// Returns `None` if `divisor` is zero.
    #[must_use]
    pub const fn checked_div(&self, divisor: &Self, rounding: Rounding) -> Option<Self> {
        match crate::math::div_round(self.0, divisor.0, rounding) {
            Some(v) => Some(Self(v)),
            None => None,
        }
    }

    /// Computes `self × numerator / denominator` with a 256-bit
    /// intermediate product and explicit rounding.
    ///
    /// Returns `None` if `denominator` is zero or the result does not fit
    /// in `u128`.
    #[must_use]
    pub fn mul_div(&self, numerator: u128, denominator: u128, rounding: Rounding) -> Option<Self> {
        crate::math::mul_div(
            U256::from(self.0),
            U256::from(numerator),
            U256::from(denominator),
            rounding,
        )
        .and_then(Self::try_from_u256)
    }

    /// Widens the amount into a 256-bit integer.
    #[must_use]
    pub fn to_u256(&self) -> U256 {
        U256::from(self.0)
    }

    /// Narrows a 256-bit integer, returning `None` if it exceeds `u128`.
    #[must_use]
    pub fn try_from_u256(value: U256) -> Option<Self> {
        if value.bits() > 128 {
            return None;
        }
        Some(Self(value.low_u128()))
    }
}

impl From<u128> for Amount {
    fn from(value: u128) -> Self {
        Self(value)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
