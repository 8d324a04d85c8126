//! Pump isolation example.
//!
//! Attaches a well-behaved snapshot pump and a pump that fails on every
//! update.  Swaps keep working, each failure is reported, and the snapshot
//! pump keeps observing pre-call reserves.
//!
//! # Run
//!
//! ```bash
//! RUST_LOG=well_engine=warn cargo run --example pump_isolation
//! ```

use std::sync::Arc;

use primitive_types::U256;
use tracing_subscriber::EnvFilter;
use well_engine::prelude::*;
use well_engine::pumps::{QUERY_COUNT, QUERY_LAST};

/// Pump whose backend is always down.
#[derive(Debug, Clone, Copy)]
struct Faulty;

impl Faulty {
    const TARGET: Address = Address::from_low_u64(0xBAD);
}

impl Pump for Faulty {
    fn attach(&mut self, _token_count: usize, _data: &AuxData) -> std::result::Result<(), PumpError> {
        Ok(())
    }

    fn update(
        &mut self,
        _reserves: &Reserves,
        _data: &AuxData,
        _budget: &mut CallBudget,
    ) -> std::result::Result<(), PumpError> {
        Err(PumpError::Rejected("oracle backend unavailable".into()))
    }

    fn read(&self, _well: &Address, _query: &[u8]) -> std::result::Result<Vec<u8>, PumpError> {
        Err(PumpError::Rejected("oracle backend unavailable".into()))
    }

    fn target(&self) -> Address {
        Self::TARGET
    }

    fn box_clone(&self) -> Box<dyn Pump> {
        Box::new(*self)
    }
}

fn words(bytes: &[u8]) -> Vec<U256> {
    bytes.chunks(32).map(U256::from_big_endian).collect()
}

fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("well_engine=warn")),
        )
        .init();

    println!("=== Pump isolation ===\n");

    let a = Token::new(Address::from_low_u64(1));
    let b = Token::new(Address::from_low_u64(2));
    let user = Address::from_low_u64(0xA);
    let ledger = Ledger::new();
    ledger.credit(&user, &a, Amount::new(100_000));
    ledger.credit(&user, &b, Amount::new(100_000));

    let config = WellConfig::new(
        vec![a, b],
        ConstantProduct::function_ref(),
        vec![
            ReserveSnapshotPump::pump_ref(),
            PumpRef::new(Faulty::TARGET, AuxData::empty()),
        ],
    )?;
    let well = Well::new(Box::new(ledger), WellSettings::default())
        .with_address(Address::from_low_u64(0x3E11));
    well.init(
        config.clone(),
        Arc::new(ConstantProduct),
        vec![Box::new(ReserveSnapshotPump::default()), Box::new(Faulty)],
    )?;

    let me = CallContext::own(user);
    well.add_liquidity(&config, &me, &[Amount::new(10_000), Amount::new(10_000)], Liquidity::ZERO)?;

    for round in 1..=3 {
        let out = well.swap_from(&config, &me, &a, &b, Amount::new(500), Amount::ZERO)?;
        let report = well.last_fan_out()?;
        println!(
            "swap {round}: out {out}, pumps ok {}/{}",
            report.succeeded(),
            report.attempted()
        );
        for failure in report.failures() {
            println!("  pump {} ({}) failed: {}", failure.index, failure.target, failure.error);
        }
    }

    println!("\nSnapshot pump:");
    println!("  updates: {:?}", words(&well.read_pump(0, QUERY_COUNT)?));
    println!("  last:    {:?}", words(&well.read_pump(0, QUERY_LAST)?));
    println!("  reserves now: {}", well.reserves(&config)?);

    match well.read_pump(1, QUERY_LAST) {
        Ok(_) => println!("\nfaulty pump answered"),
        Err(err) => println!("\nfaulty pump read: {err}"),
    }

    Ok(())
}
