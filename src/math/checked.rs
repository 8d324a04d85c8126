//! Fallible arithmetic on domain quantities.
//!
//! [`CheckedArithmetic`] lifts the `Option`-returning checked operations of
//! [`Amount`] and [`Liquidity`] into [`WellError`]s so engine code can use
//! `?` throughout.
//!
//! # Examples
//!
//! ```
//! use well_engine::domain::Amount;
//! use well_engine::math::CheckedArithmetic;
//!
//! let sum = Amount::new(100).safe_add(&Amount::new(200));
//! assert_eq!(sum, Ok(Amount::new(300)));
//! ```

use crate::domain::{Amount, Liquidity, Rounding};
use crate::error::WellError;

/// Fallible arithmetic for quantity newtypes.
///
/// Never panics and never saturates.
pub trait CheckedArithmetic: Sized {
    /// Checked addition.
    ///
    /// # Errors
    ///
    /// Returns [`WellError::Overflow`] on overflow.
    fn safe_add(&self, other: &Self) -> Result<Self, WellError>;

    /// Checked subtraction.
    ///
    /// # Errors
    ///
    /// Returns [`WellError::InsufficientReserves`] if the result would be
    /// negative.
    fn safe_sub(&self, other: &Self) -> Result<Self, WellError>;

    /// Checked division.
    ///
    /// # Errors
    ///
    /// Returns [`WellError::DivideByZero`] if `other` is zero.
    fn safe_div(&self, other: &Self, rounding: Rounding) -> Result<Self, WellError>;
}

impl CheckedArithmetic for Amount {
    #[inline]
    fn safe_add(&self, other: &Self) -> Result<Self, WellError> {
        self.checked_add(other)
            .ok_or(WellError::Overflow("amount addition overflow"))
    }

    #[inline]
    fn safe_sub(&self, other: &Self) -> Result<Self, WellError> {
        self.checked_sub(other)
            .ok_or(WellError::InsufficientReserves("amount subtraction underflow"))
    }

    #[inline]
    fn safe_div(&self, other: &Self, rounding: Rounding) -> Result<Self, WellError> {
        self.checked_div(other, rounding)
            .ok_or(WellError::DivideByZero)
    }
}

impl CheckedArithmetic for Liquidity {
    #[inline]
    fn safe_add(&self, other: &Self) -> Result<Self, WellError> {
        self.checked_add(other)
            .ok_or(WellError::Overflow("LP supply overflow"))
    }

    #[inline]
    fn safe_sub(&self, other: &Self) -> Result<Self, WellError> {
        self.checked_sub(other)
            .ok_or(WellError::InsufficientReserves("LP amount exceeds supply"))
    }

    fn safe_div(&self, other: &Self, rounding: Rounding) -> Result<Self, WellError> {
        super::div_round(self.get(), other.get(), rounding)
            .map(Liquidity::new)
            .ok_or(WellError::DivideByZero)
    }
}
