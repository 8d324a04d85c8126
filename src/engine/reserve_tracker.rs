//! Source of truth for a Well's reserves.

use tracing::trace;

use crate::domain::{ReserveDelta, Reserves};
use crate::error::{Result, WellError};

/// Last-known per-token reserves of a Well.
///
/// The tracker only changes through [`apply`](Self::apply) and
/// [`replace`](Self::replace); both are all-or-nothing, so a failed call
/// leaves the previous reserves in place.
///
/// # Examples
///
/// ```
/// use well_engine::domain::{Amount, ReserveDelta, Reserves};
/// use well_engine::engine::ReserveTracker;
///
/// let mut tracker = ReserveTracker::new(2);
/// let delta = ReserveDelta::zero(2).credit(0, Amount::new(5));
/// assert!(tracker.apply(&delta).is_ok());
/// assert_eq!(tracker.current(), &Reserves::from_raw(&[5, 0]));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReserveTracker {
    reserves: Reserves,
}

impl ReserveTracker {
    /// A tracker of `token_count` zero reserves.
    #[must_use]
    pub fn new(token_count: usize) -> Self {
        Self {
            reserves: Reserves::zeroed(token_count),
        }
    }

    /// Current reserves.
    #[must_use]
    pub const fn current(&self) -> &Reserves {
        &self.reserves
    }

    /// Owned copy of the current reserves.
    #[must_use]
    pub fn snapshot(&self) -> Reserves {
        self.reserves.clone()
    }

    /// Number of tracked tokens.
    #[must_use]
    pub fn token_count(&self) -> usize {
        self.reserves.len()
    }

    /// Applies a signed delta.
    ///
    /// # Errors
    ///
    /// - [`WellError::LengthMismatch`] if the delta length differs.
    /// - [`WellError::NegativeReserve`] if a debit exceeds its reserve.
    /// - [`WellError::Overflow`] if a credit overflows.
    ///
    /// The tracker is unchanged on error.
    pub fn apply(&mut self, delta: &ReserveDelta) -> Result<()> {
        let next = self.reserves.checked_apply(delta)?;
        trace!(before = %self.reserves, after = %next, "reserves updated");
        self.reserves = next;
        Ok(())
    }

    /// Overwrites all reserves.
    ///
    /// # Errors
    ///
    /// Returns [`WellError::LengthMismatch`] if `reserves` has the wrong
    /// length; the tracker is unchanged.
    pub fn replace(&mut self, reserves: Reserves) -> Result<()> {
        if reserves.len() != self.reserves.len() {
            return Err(WellError::LengthMismatch {
                expected: self.reserves.len(),
                actual: reserves.len(),
            });
        }
        trace!(before = %self.reserves, after = %reserves, "reserves replaced");
        self.reserves = reserves;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Amount;

    #[test]
    fn failed_apply_leaves_state() {
        let mut tracker = ReserveTracker::new(2);
        let ok = ReserveDelta::zero(2).credit(0, Amount::new(10)).credit(1, Amount::new(10));
        assert!(tracker.apply(&ok).is_ok());

        let bad = ReserveDelta::zero(2).credit(0, Amount::new(1)).debit(1, Amount::new(11));
        assert_eq!(
            tracker.apply(&bad),
            Err(WellError::NegativeReserve { index: 1 })
        );
        assert_eq!(tracker.current().to_raw(), vec![10, 10]);
    }

    #[test]
    fn replace_checks_length() {
        let mut tracker = ReserveTracker::new(3);
        assert!(tracker.replace(Reserves::from_raw(&[1, 2])).is_err());
        assert!(tracker.replace(Reserves::from_raw(&[1, 2, 3])).is_ok());
        assert_eq!(tracker.snapshot().to_raw(), vec![1, 2, 3]);
        assert_eq!(tracker.token_count(), 3);
    }
}
