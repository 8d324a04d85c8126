//! Built-in [`Custody`](crate::traits::Custody) implementations.

mod ledger;

pub use ledger::Ledger;
