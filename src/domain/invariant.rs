//! Scalar curve value.

use core::fmt;

use primitive_types::U256;

/// The scalar a pricing function assigns to a reserves vector.
///
/// 256 bits wide so that products of several `u128` reserves fit.
///
/// # Examples
///
/// ```
/// use well_engine::domain::Invariant;
///
/// let k = Invariant::from(1_000_000u128);
/// assert!(k < Invariant::from(1_001_000u128));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[must_use]
pub struct Invariant(U256);

impl Invariant {
    /// The zero invariant (an empty pool).
    pub const ZERO: Self = Self(U256::zero());

    /// Wraps a 256-bit value.
    pub const fn new(value: U256) -> Self {
        Self(value)
    }

    /// Returns the underlying value.
    #[must_use]
    pub const fn get(&self) -> U256 {
        self.0
    }

    /// Returns `true` for a zero invariant.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

impl From<U256> for Invariant {
    fn from(value: U256) -> Self {
        Self(value)
    }
}

impl From<u128> for Invariant {
    fn from(value: u128) -> Self {
        Self(U256::from(value))
    }
}

impl fmt::Display for Invariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordering_follows_value() {
        assert!(Invariant::ZERO < Invariant::from(1u128));
        assert!(Invariant::ZERO.is_zero());
    }

    #[test]
    fn display_is_decimal() {
        assert_eq!(Invariant::from(1_001_000u128).to_string(), "1001000");
    }
}
