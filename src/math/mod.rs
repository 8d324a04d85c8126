//! Integer arithmetic helpers.
//!
//! | Item | Purpose |
//! |------|---------|
//! | [`CheckedArithmetic`] | `Result`-returning ops on [`Amount`](crate::domain::Amount) and [`Liquidity`](crate::domain::Liquidity) |
//! | [`div_round`], [`div_round_wide`] | Division with explicit [`Rounding`](crate::domain::Rounding) |
//! | [`mul_div`] | `a × b / c` over `U256` |
//! | [`product`], [`checked_pow`], [`nth_root_floor`] | Reserve products and roots |
//! | [`to_amount`] | Checked `U256` → `Amount` narrowing |

mod checked;
mod rounding;
mod wide;

pub use checked::CheckedArithmetic;
pub use rounding::{div_round, div_round_wide};
pub use wide::{checked_pow, mul_div, nth_root_floor, product, to_amount};
