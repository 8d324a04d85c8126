//! The Well orchestrator.
//!
//! Every state-changing call runs the same pipeline under the Well's lock:
//!
//! | Step | Failure effect |
//! |------|----------------|
//! | Check the caller's config | `ConfigMismatch`, nothing changes |
//! | Quote against a reserve snapshot | call fails, nothing changes |
//! | Check the slippage bound | `SlippageExceeded`, nothing changes |
//! | Apply the reserve delta | call fails, nothing changes |
//! | Fan out the pre-call reserves to pumps | contained, reported |
//! | Settle custody movements | reserves restored, transfers reversed, pump updates dropped |
//! | Commit pump updates and record the event | cannot fail |

mod orchestrator;
mod settlement;

pub use orchestrator::{CallContext, Well};
