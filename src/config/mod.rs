//! Well identity and runtime settings.
//!
//! [`WellConfig`] is the immutable identity every operation is bound to;
//! [`WellSettings`] holds the pump resource limits of the hosting process.

mod settings;
mod well_config;

pub use settings::WellSettings;
pub use well_config::{PricingFunctionRef, PumpRef, WellConfig};
