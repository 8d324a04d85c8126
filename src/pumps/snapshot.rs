//! Reserve-observing pump.

use primitive_types::U256;

use crate::config::PumpRef;
use crate::domain::{Address, AuxData, Reserves};
use crate::error::PumpError;
use crate::traits::{CallBudget, Pump};

/// Query returning the last observed reserves, one 32-byte word per token.
pub const QUERY_LAST: &[u8] = b"last";

/// Query returning the per-token cumulative reserve sums.
pub const QUERY_CUMULATIVE: &[u8] = b"cumulative";

/// Query returning the number of observed updates as a single word.
pub const QUERY_COUNT: &[u8] = b"count";

/// Pump that records the pre-operation reserves it is shown.
///
/// Keeps the latest snapshot, the number of updates and running sums of
/// each reserve, which a reader can difference to build a simple
/// observation-weighted average.  Each update charges one budget unit per
/// token.
///
/// # Examples
///
/// ```
/// use well_engine::domain::{Address, AuxData, Reserves};
/// use well_engine::pumps::{ReserveSnapshotPump, QUERY_LAST};
/// use well_engine::traits::{CallBudget, Pump};
///
/// let mut pump = ReserveSnapshotPump::default();
/// assert!(pump.attach(2, &AuxData::empty()).is_ok());
/// let mut budget = CallBudget::new(10);
/// let reserves = Reserves::from_raw(&[1_000, 2_000]);
/// assert!(pump.update(&reserves, &AuxData::empty(), &mut budget).is_ok());
/// assert_eq!(pump.last(), Some(&reserves));
///
/// let bytes = pump.read(&Address::ZERO, QUERY_LAST).unwrap_or_default();
/// assert_eq!(bytes.len(), 64);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReserveSnapshotPump {
    token_count: Option<usize>,
    last: Option<Reserves>,
    cumulative: Vec<U256>,
    updates: u64,
}

impl ReserveSnapshotPump {
    /// Identity under which this pump is referenced in a
    /// [`WellConfig`](crate::config::WellConfig).
    pub const TARGET: Address = Address::from_low_u64(0x5A);

    /// Reference with empty auxiliary data.
    #[must_use]
    pub fn pump_ref() -> PumpRef {
        PumpRef::new(Self::TARGET, AuxData::empty())
    }

    /// Last observed reserves.
    #[must_use]
    pub const fn last(&self) -> Option<&Reserves> {
        self.last.as_ref()
    }

    /// Running sum of each observed reserve.
    #[must_use]
    pub fn cumulative(&self) -> &[U256] {
        &self.cumulative
    }

    /// Number of successful updates.
    #[must_use]
    pub const fn update_count(&self) -> u64 {
        self.updates
    }
}

fn encode(words: impl IntoIterator<Item = U256>) -> Vec<u8> {
    words
        .into_iter()
        .flat_map(|w| w.to_big_endian())
        .collect()
}

impl Pump for ReserveSnapshotPump {
    fn attach(&mut self, token_count: usize, _data: &AuxData) -> Result<(), PumpError> {
        if self.token_count.is_some() {
            return Err(PumpError::Rejected("pump is already attached".into()));
        }
        self.token_count = Some(token_count);
        self.cumulative = vec![U256::zero(); token_count];
        Ok(())
    }

    fn update(
        &mut self,
        reserves: &Reserves,
        _data: &AuxData,
        budget: &mut CallBudget,
    ) -> Result<(), PumpError> {
        let Some(expected) = self.token_count else {
            return Err(PumpError::Rejected("pump is not attached".into()));
        };
        if reserves.len() != expected {
            return Err(PumpError::Malformed(format!(
                "expected {expected} reserves, got {}",
                reserves.len()
            )));
        }
        budget.charge(u64::try_from(expected).unwrap_or(u64::MAX))?;
        for (sum, reserve) in self.cumulative.iter_mut().zip(reserves.iter()) {
            *sum = sum
                .checked_add(reserve.to_u256())
                .ok_or_else(|| PumpError::Rejected("cumulative reserve overflow".into()))?;
        }
        self.last = Some(reserves.clone());
        self.updates = self.updates.saturating_add(1);
        Ok(())
    }

    fn read(&self, _well: &Address, query: &[u8]) -> Result<Vec<u8>, PumpError> {
        match query {
            QUERY_LAST => {
                let last = self
                    .last
                    .as_ref()
                    .ok_or_else(|| PumpError::Rejected("no reserves observed yet".into()))?;
                Ok(encode(last.iter().map(|a| a.to_u256())))
            }
            QUERY_CUMULATIVE => Ok(encode(self.cumulative.iter().copied())),
            QUERY_COUNT => Ok(encode([U256::from(self.updates)])),
            _ => Err(PumpError::Malformed(format!(
                "unknown query {:?}",
                String::from_utf8_lossy(query)
            ))),
        }
    }

    fn target(&self) -> Address {
        Self::TARGET
    }

    fn box_clone(&self) -> Box<dyn Pump> {
        Box::new(self.clone())
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn attached(n: usize) -> ReserveSnapshotPump {
        let mut pump = ReserveSnapshotPump::default();
        let Ok(()) = pump.attach(n, &AuxData::empty()) else {
            panic!("expected attach to succeed");
        };
        pump
    }

    #[test]
    fn double_attach_rejected() {
        let mut pump = attached(2);
        assert!(pump.attach(2, &AuxData::empty()).is_err());
    }

    #[test]
    fn update_before_attach_rejected() {
        let mut pump = ReserveSnapshotPump::default();
        let mut budget = CallBudget::new(10);
        let r = Reserves::from_raw(&[1, 2]);
        assert!(pump.update(&r, &AuxData::empty(), &mut budget).is_err());
    }

    #[test]
    fn wrong_length_is_malformed() {
        let mut pump = attached(3);
        let mut budget = CallBudget::new(10);
        let r = Reserves::from_raw(&[1, 2]);
        let Err(PumpError::Malformed(_)) = pump.update(&r, &AuxData::empty(), &mut budget) else {
            panic!("expected Malformed");
        };
        assert_eq!(pump.update_count(), 0);
    }

    #[test]
    fn budget_is_charged_per_token() {
        let mut pump = attached(3);
        let mut budget = CallBudget::new(2);
        let r = Reserves::from_raw(&[1, 2, 3]);
        let Err(PumpError::BudgetExhausted { limit: 2 }) =
            pump.update(&r, &AuxData::empty(), &mut budget)
        else {
            panic!("expected BudgetExhausted");
        };
    }

    #[test]
    fn cumulative_sums_accumulate() {
        let mut pump = attached(2);
        let mut budget = CallBudget::new(100);
        for raw in [[10, 20], [30, 40]] {
            let Ok(()) = pump.update(&Reserves::from_raw(&raw), &AuxData::empty(), &mut budget)
            else {
                panic!("expected Ok");
            };
        }
        assert_eq!(pump.cumulative(), &[U256::from(40u8), U256::from(60u8)]);
        assert_eq!(pump.update_count(), 2);

        let Ok(bytes) = pump.read(&Address::ZERO, QUERY_CUMULATIVE) else {
            panic!("expected Ok");
        };
        let decoded = AuxData::new(bytes);
        assert_eq!(decoded.word(1), Some(U256::from(60u8)));
    }

    #[test]
    fn read_last_before_update_rejected() {
        let pump = attached(2);
        assert!(pump.read(&Address::ZERO, QUERY_LAST).is_err());
    }

    #[test]
    fn read_count() {
        let pump = attached(2);
        let Ok(bytes) = pump.read(&Address::ZERO, QUERY_COUNT) else {
            panic!("expected Ok");
        };
        assert_eq!(AuxData::new(bytes).word(0), Some(U256::zero()));
    }

    #[test]
    fn unknown_query_is_malformed() {
        let pump = attached(2);
        let Err(PumpError::Malformed(_)) = pump.read(&Address::ZERO, b"twap") else {
            panic!("expected Malformed");
        };
    }
}
