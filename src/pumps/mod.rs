//! Built-in [`Pump`](crate::traits::Pump) implementations.

mod snapshot;

pub use snapshot::{QUERY_COUNT, QUERY_CUMULATIVE, QUERY_LAST, ReserveSnapshotPump};
