//! LP share quantity.

use core::fmt;

use primitive_types::U256;

/// A quantity of LP shares issued by a Well.
///
/// Distinct from [`Amount`](super::Amount) so that token quantities and
/// pool-share quantities cannot be mixed up at call sites.
///
/// # Examples
///
/// ```
/// use well_engine::domain::Liquidity;
///
/// let supply = Liquidity::new(1_000);
/// assert_eq!(supply.checked_sub(&Liquidity::new(400)), Some(Liquidity::new(600)));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[must_use]
pub struct Liquidity(u128);

impl Liquidity {
    /// No shares.
    pub const ZERO: Self = Self(0);

    /// Creates a new `Liquidity` from a raw `u128` value.
    pub const fn new(value: u128) -> Self {
        Self(value)
    }

    /// Returns the underlying `u128` value.
    #[must_use]
    pub const fn get(&self) -> u128 {
        self.0
    }

    /// Returns `true` if the quantity is zero.
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

    /// Widens the quantity into a 256-bit integer.
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

impl From<u128> for Liquidity {
    fn from(value: u128) -> Self {
        Self(value)
    }
}

impl fmt::Display for Liquidity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checked_ops() {
        let a = Liquidity::new(10);
        assert_eq!(a.checked_add(&Liquidity::new(5)), Some(Liquidity::new(15)));
        assert_eq!(a.checked_sub(&Liquidity::new(11)), None);
        assert_eq!(Liquidity::new(u128::MAX).checked_add(&a), None);
    }

    #[test]
    fn zero() {
        assert!(Liquidity::ZERO.is_zero());
        assert!(!Liquidity::new(1).is_zero());
    }

    #[test]
    fn narrowing_rejects_wide_values() {
        assert_eq!(
            Liquidity::try_from_u256(U256::from(42u8)),
            Some(Liquidity::new(42))
        );
        assert_eq!(Liquidity::try_from_u256(U256::MAX), None);
    }
}
