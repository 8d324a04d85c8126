//! # Well Engine
//!
//! Generalized constant-function liquidity pools: price swaps and liquidity
//! events against a pluggable pricing function and notify attached oracles
//! ("pumps") on every state-changing call.
//!
//! A [`Well`](well::Well) holds N ≥ 2 tokens.  It supports exact-in and
//! exact-out swaps, balanced add and remove, imbalanced remove and
//! single-token remove.  Pump failures never affect a call's outcome.
//!
//! # Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `serde` | no | `Serialize` / `Deserialize` on value types, configs and events |
//!
//! # Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use well_engine::prelude::*;
//!
//! let usdc = Token::new(Address::from_low_u64(1));
//! let weth = Token::new(Address::from_low_u64(2));
//! let alice = Address::from_low_u64(0xA);
//!
//! // Custody: an in-memory ledger shared with the Well
//! let ledger = Ledger::new();
//! ledger.credit(&alice, &usdc, Amount::new(10_000));
//! ledger.credit(&alice, &weth, Amount::new(10_000));
//!
//! // A two-token constant product Well with one oracle
//! let config = WellConfig::new(
//!     vec![usdc, weth],
//!     ConstantProduct::function_ref(),
//!     vec![ReserveSnapshotPump::pump_ref()],
//! )?;
//! let well = Well::new(Box::new(ledger.clone()), WellSettings::default());
//! well.init(
//!     config.clone(),
//!     Arc::new(ConstantProduct),
//!     vec![Box::new(ReserveSnapshotPump::default())],
//! )?;
//!
//! let me = CallContext::own(alice);
//! well.add_liquidity(&config, &me, &[Amount::new(1_000), Amount::new(1_000)], Liquidity::ZERO)?;
//!
//! // Sell 100 USDC for at least 90 WETH
//! let out = well.swap_from(&config, &me, &usdc, &weth, Amount::new(100), Amount::new(90))?;
//! assert_eq!(out, Amount::new(90));
//! assert_eq!(well.reserves(&config)?, Reserves::from_raw(&[1_100, 910]));
//! # Ok::<(), WellError>(())
//! ```
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐
//! │   Consumer    │  passes &WellConfig + CallContext
//! └──────┬───────┘
//!        ▼
//! ┌──────────────┐
//! │     Well      │  lock, bind config, slippage, commit / rollback
//! └──────┬───────┘
//!        │
//!   ┌────┴─────────────┬──────────────────┬──────────────┐
//!   ▼                  ▼                  ▼              ▼
//! SwapEngine    LiquidityEngine    PumpRegistry      Custody
//!   │                  │                  │
//!   └────────┬─────────┘                  ▼
//!            ▼                          Pumps
//!     PricingFunction
//! ```
//!
//! # Module Guide
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`domain`] | Value types: [`Amount`](domain::Amount), [`Reserves`](domain::Reserves), [`Token`](domain::Token), events |
//! | [`traits`] | Collaborator seams: [`PricingFunction`](traits::PricingFunction), [`Pump`](traits::Pump), [`Custody`](traits::Custody) |
//! | [`config`] | [`WellConfig`](config::WellConfig) identity and [`WellSettings`](config::WellSettings) |
//! | [`engine`] | Reserve tracking, pump fan-out, swap and liquidity quoting |
//! | [`well`] | The [`Well`](well::Well) orchestrator |
//! | [`functions`] | Built-in curves: constant product and StableSwap |
//! | [`pumps`] | Built-in reserve snapshot oracle |
//! | [`custody`] | In-memory [`Ledger`](custody::Ledger) |
//! | [`math`] | Checked and 256-bit arithmetic |
//! | [`error`] | [`WellError`](error::WellError), [`PumpError`](error::PumpError), [`CustodyError`](error::CustodyError) |
//! | [`prelude`] | Convenience re-exports |

pub mod config;
pub mod custody;
pub mod domain;
pub mod engine;
pub mod error;
pub mod functions;
pub mod math;
pub mod prelude;
pub mod pumps;
pub mod traits;
pub mod well;
