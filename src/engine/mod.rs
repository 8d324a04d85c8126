//! Per-call building blocks composed by the [`Well`](crate::well::Well).
//!
//! | Component | Role |
//! |-----------|------|
//! | [`ReserveTracker`] | All-or-nothing reserve state |
//! | [`PumpRegistry`] | Staged, failure-isolated pump fan-out |
//! | [`SwapEngine`] | Exact-in / exact-out swap quotes |
//! | [`LiquidityEngine`] | Add, balanced / imbalanced / one-token remove quotes |
//!
//! Engines are pure: they read reserves and return quotes carrying the
//! post-operation reserves.  Only the Well mutates state.

mod liquidity_engine;
mod pump_registry;
mod reserve_tracker;
mod swap_engine;

#[cfg(test)]
#[allow(clippy::panic)]
mod proptest_properties;

pub use liquidity_engine::{LiquidityEngine, LiquidityQuote};
pub(crate) use pump_registry::is_updating_for;
pub use pump_registry::{FanOutReport, PumpFailure, PumpRegistry, StagedPumps};
pub use reserve_tracker::ReserveTracker;
pub use swap_engine::{SwapEngine, SwapQuote};
