//! Built-in [`PricingFunction`](crate::traits::PricingFunction) implementations.
//!
//! | Function | Curve | Aux data |
//! |----------|-------|----------|
//! | [`ConstantProduct`] | `∏ rᵢ = k` | ignored |
//! | [`StableSwap`] | Curve StableSwap invariant `D` | amplification word |
//!
//! Any other curve can be plugged into a Well by implementing the trait.

mod constant_product;
mod stable_swap;

pub use constant_product::ConstantProduct;
pub use stable_swap::StableSwap;
