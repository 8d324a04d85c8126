//! Runtime settings of a Well that are not part of its identity.

use core::time::Duration;

use crate::error::{Result, WellError};

/// Resource limits applied to every pump invocation, and the size of the
/// Well's event log.
///
/// Unlike [`WellConfig`](super::WellConfig) these values are not compared on
/// each call; they belong to the hosting process.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use well_engine::config::WellSettings;
///
/// let settings = WellSettings::default()
///     .with_pump_budget(5_000)
///     .with_pump_time_limit(Duration::from_millis(5));
/// assert!(settings.validate().is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WellSettings {
    /// Units each pump may charge per `update`.
    pub pump_budget: u64,
    /// Wall-clock limit per `update`.
    pub pump_time_limit: Duration,
    /// Events kept until drained; the oldest is dropped beyond this.
    pub event_capacity: usize,
}

impl WellSettings {
    /// Default per-call pump budget.
    pub const DEFAULT_PUMP_BUDGET: u64 = 100_000;

    /// Default per-call pump time limit.
    pub const DEFAULT_PUMP_TIME_LIMIT: Duration = Duration::from_millis(50);

    /// Default number of undrained events kept.
    pub const DEFAULT_EVENT_CAPACITY: usize = 1_024;

    /// Replaces the pump budget.
    #[must_use]
    pub const fn with_pump_budget(mut self, budget: u64) -> Self {
        self.pump_budget = budget;
        self
    }

    /// Replaces the pump time limit.
    #[must_use]
    pub const fn with_pump_time_limit(mut self, limit: Duration) -> Self {
        self.pump_time_limit = limit;
        self
    }

    /// Replaces the event log capacity.
    #[must_use]
    pub const fn with_event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity;
        self
    }

    /// Checks that every limit is non-zero.
    ///
    /// # Errors
    ///
    /// Returns [`WellError::InvalidConfiguration`] if any limit is zero.
    pub fn validate(&self) -> Result<()> {
        if self.pump_budget == 0 {
            return Err(WellError::InvalidConfiguration(
                "pump budget must be greater than zero",
            ));
        }
        if self.pump_time_limit.is_zero() {
            return Err(WellError::InvalidConfiguration(
                "pump time limit must be greater than zero",
            ));
        }
        if self.event_capacity == 0 {
            return Err(WellError::InvalidConfiguration(
                "event capacity must be greater than zero",
            ));
        }
        Ok(())
    }
}

impl Default for WellSettings {
    fn default() -> Self {
        Self {
            pump_budget: Self::DEFAULT_PUMP_BUDGET,
            pump_time_limit: Self::DEFAULT_PUMP_TIME_LIMIT,
            event_capacity: Self::DEFAULT_EVENT_CAPACITY,
        }
    }
}
