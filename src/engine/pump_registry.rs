//! Ordered, failure-isolated pump fan-out.
//!
//! # Update protocol
//!
//! 1. [`PumpRegistry::fan_out`] hands the *pre-operation* reserves to every
//!    pump in attachment order.  Each pump runs on a staged clone, on its own
//!    worker thread, inside `catch_unwind`, with a fresh [`CallBudget`].
//! 2. The registry waits at most `pump_time_limit` for the worker.  A pump
//!    still running after that is abandoned: its clone is never committed
//!    and the fan-out moves on.
//! 3. Any error, panic, budget exhaustion or overrun becomes a
//!    [`PumpFailure`] in the returned [`FanOutReport`]; the pump's committed
//!    state is untouched and the next pump still runs.
//! 4. The Well calls [`PumpRegistry::commit`] with the [`StagedPumps`] only
//!    once the whole operation has committed.  Dropping the staging instead
//!    discards every staged update.
//!
//! Worker threads are tagged with the origin of the fan-out so that a pump
//! calling back into the Well it observes is rejected instead of waiting
//! for the lock held by its own caller.

use core::cell::Cell;
use core::panic::AssertUnwindSafe;
use std::panic::catch_unwind;
use std::thread;
use std::time::Instant;

use crossbeam_channel::{RecvTimeoutError, bounded};
use tracing::{debug, warn};

use crate::config::{PumpRef, WellSettings};
use crate::domain::{Address, Reserves};
use crate::error::{PumpError, Result, WellError};
use crate::traits::{CallBudget, Pump};

/// A contained pump failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PumpFailure {
    /// Attachment position of the pump.
    pub index: usize,
    /// Identity of the pump.
    pub target: Address,
    /// What went wrong.
    pub error: PumpError,
}

/// Outcome of one fan-out.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FanOutReport {
    attempted: usize,
    failures: Vec<PumpFailure>,
}

impl FanOutReport {
    /// Number of pumps invoked.
    #[must_use]
    pub const fn attempted(&self) -> usize {
        self.attempted
    }

    /// Failures in attachment order.
    #[must_use]
    pub fn failures(&self) -> &[PumpFailure] {
        &self.failures
    }

    /// Number of pumps whose update succeeded.
    #[must_use]
    pub fn succeeded(&self) -> usize {
        self.attempted - self.failures.len()
    }

    /// `true` if no pump failed.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Staged pump states awaiting commit; `None` where the update failed.
#[derive(Debug, Default)]
#[must_use = "staged pump updates are discarded unless committed"]
pub struct StagedPumps(Vec<Option<Box<dyn Pump>>>);

#[derive(Debug)]
struct AttachedPump {
    reference: PumpRef,
    pump: Box<dyn Pump>,
}

/// Pumps attached to a Well, in attachment order.
#[derive(Debug, Default)]
pub struct PumpRegistry {
    pumps: Vec<AttachedPump>,
    settings: WellSettings,
    origin: u64,
}

thread_local! {
    static UPDATING: Cell<Option<u64>> = const { Cell::new(None) };
}

/// `true` on a pump worker spawned by a fan-out for `origin`.
pub(crate) fn is_updating_for(origin: u64) -> bool {
    UPDATING.with(|current| current.get() == Some(origin))
}

fn panic_message(payload: &(dyn core::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_owned()
    }
}

impl PumpRegistry {
    /// Attaches `pumps` to a Well of `token_count` tokens.
    ///
    /// `pumps[i]` is the implementation behind `refs[i]`; each pump's
    /// `attach` runs exactly once, in order.
    ///
    /// # Errors
    ///
    /// - [`WellError::InvalidConfiguration`] if the counts differ or a pump's
    ///   [`target`](Pump::target) differs from its reference.
    /// - [`WellError::PumpAttachFailed`] for the first pump whose `attach`
    ///   errors or panics; no registry is returned.
    pub fn attach(
        refs: &[PumpRef],
        pumps: Vec<Box<dyn Pump>>,
        token_count: usize,
        settings: WellSettings,
    ) -> Result<Self> {
        if refs.len() != pumps.len() {
            return Err(WellError::InvalidConfiguration(
                "pump implementations must match pump references",
            ));
        }
        let mut attached = Vec::with_capacity(pumps.len());
        for (index, (reference, mut pump)) in refs.iter().zip(pumps).enumerate() {
            if pump.target() != reference.target {
                warn!(index, expected = %reference.target, actual = %pump.target(), "pump identity mismatch");
                return Err(WellError::InvalidConfiguration(
                    "pump implementation does not match its reference",
                ));
            }
            let outcome = catch_unwind(AssertUnwindSafe(|| {
                pump.attach(token_count, &reference.data)
            }))
            .unwrap_or_else(|payload| Err(PumpError::Panicked(panic_message(payload.as_ref()))));
            if let Err(source) = outcome {
                warn!(index, target = %reference.target, error = %source, "pump attach failed");
                return Err(WellError::PumpAttachFailed { index, source });
            }
            debug!(index, target = %reference.target, "pump attached");
            attached.push(AttachedPump {
                reference: reference.clone(),
                pump,
            });
        }
        Ok(Self {
            pumps: attached,
            settings,
            origin: 0,
        })
    }

    /// Tags fan-out workers with `origin`; see [`is_updating_for`].
    #[must_use]
    pub(crate) const fn with_origin(mut self, origin: u64) -> Self {
        self.origin = origin;
        self
    }

    /// Number of attached pumps.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pumps.len()
    }

    /// `true` if no pump is attached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pumps.is_empty()
    }

    /// Runs every pump's `update` with `reserves` on a staged clone.
    ///
    /// Returns after at most `pump_time_limit` per pump, whatever the pumps
    /// do.
    pub fn fan_out(&self, reserves: &Reserves) -> (StagedPumps, FanOutReport) {
        let mut staged = Vec::with_capacity(self.pumps.len());
        let mut report = FanOutReport {
            attempted: self.pumps.len(),
            failures: Vec::new(),
        };
        for (index, attached) in self.pumps.iter().enumerate() {
            match self.update_one(index, attached, reserves) {
                Ok(candidate) => staged.push(Some(candidate)),
                Err(error) => {
                    warn!(index, target = %attached.reference.target, %error, "pump update failed");
                    report.failures.push(PumpFailure {
                        index,
                        target: attached.reference.target,
                        error,
                    });
                    staged.push(None);
                }
            }
        }
        (StagedPumps(staged), report)
    }

    /// Updates a clone of one pump on a worker thread, bounded by the time
    /// limit.
    fn update_one(
        &self,
        index: usize,
        attached: &AttachedPump,
        reserves: &Reserves,
    ) -> core::result::Result<Box<dyn Pump>, PumpError> {
        let mut candidate = attached.pump.box_clone();
        let snapshot = reserves.clone();
        let data = attached.reference.data.clone();
        let units = self.settings.pump_budget;
        let origin = self.origin;
        let (tx, rx) = bounded(1);
        let started = Instant::now();
        thread::Builder::new()
            .name(format!("pump-{index}"))
            .spawn(move || {
                UPDATING.with(|current| current.set(Some(origin)));
                let mut budget = CallBudget::new(units);
                let outcome = catch_unwind(AssertUnwindSafe(|| {
                    candidate.update(&snapshot, &data, &mut budget)
                }))
                .unwrap_or_else(|payload| {
                    Err(PumpError::Panicked(panic_message(payload.as_ref())))
                });
                // the receiver is gone once the update has timed out
                let _ = tx.send(outcome.map(|()| candidate));
            })
            .map_err(|err| PumpError::Rejected(format!("cannot start pump worker: {err}")))?;

        let limit = self.settings.pump_time_limit;
        match rx.recv_timeout(limit) {
            Ok(outcome) => outcome,
            Err(RecvTimeoutError::Timeout) => Err(PumpError::TimedOut {
                elapsed_us: started.elapsed().as_micros(),
                limit_us: limit.as_micros(),
            }),
            Err(RecvTimeoutError::Disconnected) => Err(PumpError::Panicked(
                "pump worker exited without a result".to_owned(),
            )),
        }
    }

    /// Replaces each pump whose staged update succeeded.
    pub fn commit(&mut self, staged: StagedPumps) {
        for (attached, candidate) in self.pumps.iter_mut().zip(staged.0) {
            if let Some(pump) = candidate {
                attached.pump = pump;
            }
        }
    }

    /// Forwards an external query to the pump at `index`.
    ///
    /// # Errors
    ///
    /// - [`WellError::UnknownPump`] for an invalid index.
    /// - [`WellError::PumpReadFailed`] if the pump errors or panics.
    pub fn read(&self, index: usize, well: &Address, query: &[u8]) -> Result<Vec<u8>> {
        let attached = self.pumps.get(index).ok_or(WellError::UnknownPump {
            index,
            pump_count: self.pumps.len(),
        })?;
        catch_unwind(AssertUnwindSafe(|| attached.pump.read(well, query)))
            .unwrap_or_else(|payload| Err(PumpError::Panicked(panic_message(payload.as_ref()))))
            .map_err(|source| WellError::PumpReadFailed { index, source })
    }
}
