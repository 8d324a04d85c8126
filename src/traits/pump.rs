//! Oracle components attached to a Well.
//!
//! A [`Pump`] observes the Well's reserves *before* every state-changing
//! call.  The Well never depends on a pump succeeding: the pump registry
//! stages each update on a clone running on a worker thread, meters it with
//! a [`CallBudget`], abandons it once the time limit passes, catches panics,
//! and only commits the staged clone once the whole call has committed.
//!
//! Every implementation reports the [`target`](Pump::target) it answers
//! to; a Well refuses to attach a pump under a reference naming another.

use core::fmt;

use crate::domain::{Address, AuxData, Reserves};
use crate::error::PumpError;

/// Resource allowance for a single pump invocation.
///
/// Pumps call [`charge`](Self::charge) for the work they do; the first
/// charge that exceeds the limit fails and the registry treats the update
/// as failed.
///
/// # Examples
///
/// ```
/// use well_engine::traits::CallBudget;
///
/// let mut budget = CallBudget::new(10);
/// assert!(budget.charge(6).is_ok());
/// assert!(budget.charge(6).is_err());
/// assert_eq!(budget.remaining(), 4);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallBudget {
    limit: u64,
    used: u64,
}

impl CallBudget {
    /// A fresh budget of `limit` units.
    #[must_use]
    pub const fn new(limit: u64) -> Self {
        Self { limit, used: 0 }
    }

    /// Consumes `units`.
    ///
    /// # Errors
    ///
    /// Returns [`PumpError::BudgetExhausted`] if the charge would exceed
    /// the limit; nothing is consumed in that case.
    pub fn charge(&mut self, units: u64) -> Result<(), PumpError> {
        match self.used.checked_add(units) {
            Some(total) if total <= self.limit => {
                self.used = total;
                Ok(())
            }
            _ => Err(PumpError::BudgetExhausted { limit: self.limit }),
        }
    }

    /// Units consumed so far.
    #[must_use]
    pub const fn used(&self) -> u64 {
        self.used
    }

    /// Units still available.
    #[must_use]
    pub const fn remaining(&self) -> u64 {
        self.limit.saturating_sub(self.used)
    }

    /// The configured limit.
    #[must_use]
    pub const fn limit(&self) -> u64 {
        self.limit
    }
}

/// An oracle attached to a Well.
///
/// Implementations must be cheap to clone via [`box_clone`](Self::box_clone):
/// the registry clones a pump before every update and keeps the clone only
/// if both the update and the enclosing call succeed.
pub trait Pump: Send + fmt::Debug {
    /// Called once, in attachment order, when the Well is initialized.
    ///
    /// # Errors
    ///
    /// Any error aborts initialization of the Well.
    fn attach(&mut self, token_count: usize, data: &AuxData) -> Result<(), PumpError>;

    /// Observes the pre-operation reserves of a state-changing call.
    ///
    /// # Errors
    ///
    /// Errors are contained by the registry and never reach the caller of
    /// the Well operation.
    fn update(
        &mut self,
        reserves: &Reserves,
        data: &AuxData,
        budget: &mut CallBudget,
    ) -> Result<(), PumpError>;

    /// Answers an external query about `well`.  Never called by the Well
    /// during an operation.
    ///
    /// # Errors
    ///
    /// Returns [`PumpError::Malformed`] for unknown queries.
    fn read(&self, well: &Address, query: &[u8]) -> Result<Vec<u8>, PumpError>;

    /// Identity this implementation answers to; must equal the
    /// [`PumpRef::target`](crate::config::PumpRef::target) it is attached
    /// under.
    fn target(&self) -> Address;

    /// Clones the pump behind a fresh box.
    fn box_clone(&self) -> Box<dyn Pump>;
}

impl Clone for Box<dyn Pump> {
    fn clone(&self) -> Self {
        self.box_clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn budget_rejects_overcharge_without_consuming() {
        let mut budget = CallBudget::new(5);
        assert!(budget.charge(5).is_ok());
        assert_eq!(
            budget.charge(1),
            Err(PumpError::BudgetExhausted { limit: 5 })
        );
        assert_eq!(budget.used(), 5);
        assert_eq!(budget.remaining(), 0);
    }

    #[test]
    fn budget_handles_huge_charge() {
        let mut budget = CallBudget::new(u64::MAX);
        assert!(budget.charge(1).is_ok());
        assert!(budget.charge(u64::MAX).is_err());
        assert_eq!(budget.limit(), u64::MAX);
    }
}
