//! Unified error types for the Well engine.
//!
//! Every fallible public operation returns [`WellError`].  Failures of
//! attached pumps are a separate, *contained* class ([`PumpError`]): the
//! pump registry converts them into [`PumpFailure`](crate::engine::PumpFailure)
//! values and never propagates them to the caller of a pool operation.
//!
//! # Propagation
//!
//! | Class | Variants | Effect |
//! |-------|----------|--------|
//! | Caller input | [`WellError::ConfigMismatch`], [`WellError::IndexOutOfRange`], [`WellError::InvalidTokenPair`], [`WellError::UnknownToken`], [`WellError::LengthMismatch`] | call fails, no state change |
//! | Undefined math | [`WellError::InsufficientReserves`], [`WellError::DivideByZero`], [`WellError::Overflow`] | call fails, no state change |
//! | Slippage | [`WellError::SlippageExceeded`] | checked after quoting, before applying |
//! | Internal | [`WellError::NegativeReserve`] | curve or engine bug; alarm-worthy |
//! | Re-entrancy | [`WellError::ReentrancyDetected`] | inner call aborted |
//! | Custody | [`WellError::Custody`] | reserves restored, earlier transfers reversed |
//! | Pump reads | [`WellError::UnknownPump`], [`WellError::PumpReadFailed`] | read-only, nothing changes |
//! | Pumps | [`PumpError`] | swallowed and logged |

use crate::domain::Amount;

/// Convenience alias used across the crate.
pub type Result<T> = core::result::Result<T, WellError>;

/// Which side of a quote a slippage bound constrains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SlippageBound {
    /// The quoted amount must be at least the bound.
    Minimum,
    /// The quoted amount must be at most the bound.
    Maximum,
}

impl core::fmt::Display for SlippageBound {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Minimum => write!(f, "minimum"),
            Self::Maximum => write!(f, "maximum"),
        }
    }
}

/// Errors surfaced by Well operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WellError {
    /// `init` was called on a Well that already has a configuration.
    #[error("well is already initialized")]
    AlreadyInitialized,

    /// An operation was attempted before `init`.
    #[error("well is not initialized")]
    NotInitialized,

    /// The configuration violates a structural rule.
    #[error("invalid well configuration: {0}")]
    InvalidConfiguration(&'static str),

    /// The caller-supplied configuration differs from the persisted one.
    #[error("supplied well configuration does not match the initialized well")]
    ConfigMismatch,

    /// A token index is outside `[0, token_count)`.
    #[error("token index {index} is out of range for a well with {token_count} tokens")]
    IndexOutOfRange {
        /// Offending index.
        index: usize,
        /// Number of tokens in the well.
        token_count: usize,
    },

    /// A token is not part of the well.
    #[error("token is not part of this well")]
    UnknownToken,

    /// Swap source and destination are the same token.
    #[error("swap requires two distinct token indices, got {0} twice")]
    InvalidTokenPair(usize),

    /// A per-token sequence has the wrong length.
    #[error("expected {expected} per-token entries, got {actual}")]
    LengthMismatch {
        /// Number of tokens in the well.
        expected: usize,
        /// Length supplied by the caller.
        actual: usize,
    },

    /// The operation is undefined for the current reserves.
    #[error("insufficient reserves: {0}")]
    InsufficientReserves(&'static str),

    /// A division by zero would be required (e.g. zero LP supply).
    #[error("division by zero")]
    DivideByZero,

    /// The quote violates the caller's slippage bound.
    #[error("slippage exceeded: quoted {quoted}, {kind} allowed {limit}")]
    SlippageExceeded {
        /// Direction of the bound.
        kind: SlippageBound,
        /// Caller-supplied bound.
        limit: u128,
        /// Amount the engine quoted.
        quoted: u128,
    },

    /// Applying a delta would push a reserve below zero.
    #[error("reserve at index {index} would become negative")]
    NegativeReserve {
        /// Index of the reserve.
        index: usize,
    },

    /// A call re-entered the Well while another call was in progress.
    #[error("re-entrant call into the well detected")]
    ReentrancyDetected,

    /// A pump rejected `attach` during initialization.
    #[error("pump {index} failed to attach: {source}")]
    PumpAttachFailed {
        /// Attachment position of the pump.
        index: usize,
        /// Underlying pump error.
        source: PumpError,
    },

    /// No pump is attached at the requested position.
    #[error("no pump at index {index} (well has {pump_count})")]
    UnknownPump {
        /// Requested position.
        index: usize,
        /// Number of attached pumps.
        pump_count: usize,
    },

    /// An external read through [`Well::read_pump`](crate::well::Well::read_pump) failed.
    #[error("pump {index} read failed: {source}")]
    PumpReadFailed {
        /// Attachment position of the pump.
        index: usize,
        /// Underlying pump error.
        source: PumpError,
    },

    /// The custody collaborator refused a transfer.
    #[error("custody failure: {0}")]
    Custody(#[from] CustodyError),

    /// Checked arithmetic overflowed.
    #[error("arithmetic overflow: {0}")]
    Overflow(&'static str),

    /// A pricing function could not decode its auxiliary data.
    #[error("invalid pricing function data: {0}")]
    InvalidFunctionData(&'static str),

    /// An iterative solver did not converge.
    #[error("solver did not converge: {0}")]
    NonConvergence(&'static str),
}

impl WellError {
    /// Builds a [`WellError::SlippageExceeded`] for a lower bound.
    #[must_use]
    pub const fn below_minimum(limit: Amount, quoted: Amount) -> Self {
        Self::SlippageExceeded {
            kind: SlippageBound::Minimum,
            limit: limit.get(),
            quoted: quoted.get(),
        }
    }

    /// Builds a [`WellError::SlippageExceeded`] for an upper bound.
    #[must_use]
    pub const fn above_maximum(limit: Amount, quoted: Amount) -> Self {
        Self::SlippageExceeded {
            kind: SlippageBound::Maximum,
            limit: limit.get(),
            quoted: quoted.get(),
        }
    }
}

/// Failure of a single pump invocation.
///
/// Always contained by the pump registry.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PumpError {
    /// The pump reported an error.
    #[error("pump rejected the call: {0}")]
    Rejected(String),

    /// The pump received or produced data it could not interpret.
    #[error("malformed pump data: {0}")]
    Malformed(String),

    /// The pump exceeded its resource allowance.
    #[error("pump exhausted its budget of {limit} units")]
    BudgetExhausted {
        /// Allowance granted for the call.
        limit: u64,
    },

    /// The pump ran longer than the configured wall-clock limit.
    #[error("pump exceeded its time limit ({elapsed_us} µs > {limit_us} µs)")]
    TimedOut {
        /// Observed duration in microseconds.
        elapsed_us: u128,
        /// Configured limit in microseconds.
        limit_us: u128,
    },

    /// The pump panicked.
    #[error("pump panicked: {0}")]
    Panicked(String),
}

/// Failure reported by the custody collaborator.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CustodyError {
    /// The source account or the pool does not hold enough tokens.
    #[error("insufficient token balance: needed {needed}, available {available}")]
    InsufficientBalance {
        /// Requested amount.
        needed: u128,
        /// Amount held by the source.
        available: u128,
    },

    /// The account does not hold enough LP shares to burn.
    #[error("insufficient LP balance: needed {needed}, available {available}")]
    InsufficientShares {
        /// Requested amount.
        needed: u128,
        /// Amount held by the account.
        available: u128,
    },

    /// A balance would overflow.
    #[error("custody balance overflow")]
    Overflow,

    /// Any other collaborator-specific refusal.
    #[error("transfer refused: {0}")]
    Refused(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slippage_display_mentions_both_amounts() {
        let err = WellError::below_minimum(Amount::new(100), Amount::new(90));
        let msg = err.to_string();
        assert!(msg.contains("quoted 90"));
        assert!(msg.contains("minimum allowed 100"));
    }

    #[test]
    fn custody_error_converts() {
        let err: WellError = CustodyError::Overflow.into();
        assert_eq!(err, WellError::Custody(CustodyError::Overflow));
    }

    #[test]
    fn attach_error_keeps_source() {
        let err = WellError::PumpAttachFailed {
            index: 2,
            source: PumpError::Rejected("bad data".into()),
        };
        assert!(err.to_string().contains("pump 2"));
        assert!(err.to_string().contains("bad data"));
    }
}
