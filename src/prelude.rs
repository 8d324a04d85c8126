//! Convenience re-exports for common types and traits.
//!
//! ```rust
//! use well_engine::prelude::*;
//! ```

pub use crate::config::{PricingFunctionRef, PumpRef, WellConfig, WellSettings};
pub use crate::custody::Ledger;
pub use crate::domain::{
    Address, Amount, AuxData, Invariant, Liquidity, Reserves, Rounding, Token, WellEvent,
};
pub use crate::engine::{FanOutReport, PumpFailure};
pub use crate::error::{CustodyError, PumpError, Result, WellError};
pub use crate::functions::{ConstantProduct, StableSwap};
pub use crate::math::CheckedArithmetic;
pub use crate::pumps::ReserveSnapshotPump;
pub use crate::traits::{CallBudget, Custody, PricingFunction, Pump};
pub use crate::well::{CallContext, Well};
