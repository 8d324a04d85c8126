//! Per-token reserve snapshots and signed reserve deltas.
//!
//! [`Reserves`] is the ordered sequence of pool balances the engine prices
//! against.  [`ReserveDelta`] is the signed change an operation applies to
//! it; the only way to move a reserve is [`Reserves::checked_apply`], which
//! never produces a negative entry.

use core::fmt;

use super::Amount;
use crate::error::{Result, WellError};

/// Ordered per-token reserves of a Well.
///
/// Position `i` always refers to the `i`-th token of the Well's
/// configuration.
///
/// # Examples
///
/// ```
/// use well_engine::domain::{Amount, Reserves};
///
/// let reserves = Reserves::from_raw(&[1_000, 2_000]);
/// assert_eq!(reserves.len(), 2);
/// assert_eq!(reserves.get(1), Some(Amount::new(2_000)));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Reserves(Vec<Amount>);

impl Reserves {
    /// Wraps an existing vector of amounts.
    #[must_use]
    pub const fn new(values: Vec<Amount>) -> Self {
        Self(values)
    }

    /// `count` zero reserves.
    #[must_use]
    pub fn zeroed(count: usize) -> Self {
        Self(vec![Amount::ZERO; count])
    }

    /// Builds reserves from raw integers.
    #[must_use]
    pub fn from_raw(values: &[u128]) -> Self {
        Self(values.iter().copied().map(Amount::new).collect())
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if there are no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Entry at `index`, if any.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<Amount> {
        self.0.get(index).copied()
    }

    /// Entry at `index` or [`WellError::IndexOutOfRange`].
    ///
    /// # Errors
    ///
    /// Returns [`WellError::IndexOutOfRange`] when `index >= len()`.
    pub fn at(&self, index: usize) -> Result<Amount> {
        self.get(index).ok_or(WellError::IndexOutOfRange {
            index,
            token_count: self.len(),
        })
    }

    /// Borrowed view of the entries.
    #[must_use]
    pub fn as_slice(&self) -> &[Amount] {
        &self.0
    }

    /// Iterator over the entries.
    pub fn iter(&self) -> impl Iterator<Item = &Amount> {
        self.0.iter()
    }

    /// Raw integer view, mainly for assertions and encoding.
    #[must_use]
    pub fn to_raw(&self) -> Vec<u128> {
        self.0.iter().map(Amount::get).collect()
    }

    /// Consumes the reserves and returns the inner vector.
    #[must_use]
    pub fn into_vec(self) -> Vec<Amount> {
        self.0
    }

    /// Returns a copy with entry `index` replaced.
    ///
    /// # Errors
    ///
    /// Returns [`WellError::IndexOutOfRange`] when `index >= len()`.
    pub fn with(&self, index: usize, value: Amount) -> Result<Self> {
        let mut next = self.clone();
        let slot = next.0.get_mut(index).ok_or(WellError::IndexOutOfRange {
            index,
            token_count: self.len(),
        })?;
        *slot = value;
        Ok(next)
    }

    /// Applies `delta` and returns the resulting reserves; `self` is not
    /// modified.
    ///
    /// # Errors
    ///
    /// - [`WellError::LengthMismatch`] if the delta has a different length.
    /// - [`WellError::NegativeReserve`] if a debit exceeds its reserve.
    /// - [`WellError::Overflow`] if a credit overflows.
    pub fn checked_apply(&self, delta: &ReserveDelta) -> Result<Self> {
        if delta.len() != self.len() {
            return Err(WellError::LengthMismatch {
                expected: self.len(),
                actual: delta.len(),
            });
        }
        let mut next = Vec::with_capacity(self.len());
        for (index, (reserve, change)) in self.0.iter().zip(delta.iter()).enumerate() {
            let value = match change {
                ReserveChange::Credit(amount) => reserve
                    .checked_add(amount)
                    .ok_or(WellError::Overflow("reserve credit overflow"))?,
                ReserveChange::Debit(amount) => reserve
                    .checked_sub(amount)
                    .ok_or(WellError::NegativeReserve { index })?,
            };
            next.push(value);
        }
        Ok(Self(next))
    }
}

impl From<Vec<Amount>> for Reserves {
    fn from(values: Vec<Amount>) -> Self {
        Self(values)
    }
}

impl fmt::Display for Reserves {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, amount) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{amount}")?;
        }
        write!(f, "]")
    }
}

/// Signed change to a single reserve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ReserveChange {
    /// Reserve increases by the amount.
    Credit(Amount),
    /// Reserve decreases by the amount.
    Debit(Amount),
}

impl Default for ReserveChange {
    fn default() -> Self {
        Self::Credit(Amount::ZERO)
    }
}

/// Signed per-token change, one entry per reserve.
///
/// # Examples
///
/// ```
/// use well_engine::domain::{Amount, ReserveDelta, Reserves};
///
/// let pre = Reserves::from_raw(&[1_000, 1_000]);
/// let delta = ReserveDelta::zero(2)
///     .credit(0, Amount::new(100))
///     .debit(1, Amount::new(90));
/// let post = pre.checked_apply(&delta).ok();
/// assert_eq!(post, Some(Reserves::from_raw(&[1_100, 910])));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ReserveDelta(Vec<ReserveChange>);

impl ReserveDelta {
    /// A delta of `count` zero entries.
    #[must_use]
    pub fn zero(count: usize) -> Self {
        Self(vec![ReserveChange::default(); count])
    }

    /// Builder: sets entry `index` to a credit.  Out-of-range indices are
    /// ignored here and surface as a length or range error on apply.
    #[must_use]
    pub fn credit(mut self, index: usize, amount: Amount) -> Self {
        if let Some(slot) = self.0.get_mut(index) {
            *slot = ReserveChange::Credit(amount);
        }
        self
    }

    /// Builder: sets entry `index` to a debit.
    #[must_use]
    pub fn debit(mut self, index: usize, amount: Amount) -> Self {
        if let Some(slot) = self.0.get_mut(index) {
            *slot = ReserveChange::Debit(amount);
        }
        self
    }

    /// Delta that takes `pre` to `post`.
    ///
    /// # Errors
    ///
    /// Returns [`WellError::LengthMismatch`] if the lengths differ.
    pub fn between(pre: &Reserves, post: &Reserves) -> Result<Self> {
        if pre.len() != post.len() {
            return Err(WellError::LengthMismatch {
                expected: pre.len(),
                actual: post.len(),
            });
        }
        Ok(Self(
            pre.iter()
                .zip(post.iter())
                .map(|(before, after)| match after.checked_sub(before) {
                    Some(up) => ReserveChange::Credit(up),
                    None => ReserveChange::Debit(Amount::new(before.get() - after.get())),
                })
                .collect(),
        ))
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if there are no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterator over the entries.
    pub fn iter(&self) -> impl Iterator<Item = &ReserveChange> {
        self.0.iter()
    }

    /// Sum of credited amounts at `index` (zero for debits).
    #[must_use]
    pub fn credited(&self, index: usize) -> Amount {
        match self.0.get(index) {
            Some(ReserveChange::Credit(amount)) => *amount,
            _ => Amount::ZERO,
        }
    }

    /// Debited amount at `index` (zero for credits).
    #[must_use]
    pub fn debited(&self, index: usize) -> Amount {
        match self.0.get(index) {
            Some(ReserveChange::Debit(amount)) => *amount,
            _ => Amount::ZERO,
        }
    }
}

impl From<Vec<ReserveChange>> for ReserveDelta {
    fn from(changes: Vec<ReserveChange>) -> Self {
        Self(changes)
    }
}
