//! Collaborator seams of a Well.
//!
//! | Trait | Role |
//! |-------|------|
//! | [`PricingFunction`] | Curve: invariant and single-reserve solve |
//! | [`Pump`] | Oracle notified with pre-operation reserves |
//! | [`Custody`] | Token transfers and LP share ledger |

mod custody;
mod pricing_function;
mod pump;

pub use custody::Custody;
pub use pricing_function::PricingFunction;
pub use pump::{CallBudget, Pump};
