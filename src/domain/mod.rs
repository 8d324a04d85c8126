//! Value types shared by every layer of the engine.
//!
//! | Type | Meaning |
//! |------|---------|
//! | [`Address`] | 32-byte identity of a token, account, well or collaborator |
//! | [`Token`] | A fungible asset held by a Well |
//! | [`Amount`] | Raw token quantity |
//! | [`Liquidity`] | LP share quantity |
//! | [`Reserves`] | Ordered per-token pool balances |
//! | [`ReserveDelta`] | Signed per-token change applied to reserves |
//! | [`Invariant`] | Scalar curve value (256-bit) |
//! | [`AuxData`] | Opaque collaborator payload |
//! | [`WellEvent`] | Record of a committed call |
//!
//! All quantities are unsigned integers; every division names its
//! [`Rounding`] direction.

mod address;
mod amount;
mod aux_data;
mod event;
mod invariant;
mod liquidity;
mod reserves;
mod rounding;
mod token;

pub use address::Address;
pub use amount::Amount;
pub use aux_data::AuxData;
pub use event::WellEvent;
pub use invariant::Invariant;
pub use liquidity::Liquidity;
pub use reserves::{ReserveChange, ReserveDelta, Reserves};
pub use rounding::Rounding;
pub use token::Token;
