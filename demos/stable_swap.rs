//! StableSwap Well example (Curve style).
//!
//! Compares the price impact of the same trade on a three-token StableSwap
//! Well at two amplification levels, then withdraws an exact basket.
//!
//! # Run
//!
//! ```bash
//! cargo run --example stable_swap
//! ```

use std::sync::Arc;

use tracing_subscriber::EnvFilter;
use well_engine::prelude::*;

const SEED: u128 = 1_000_000;
const TRADE: u128 = 100_000;

fn stable_well(amplification: u32) -> std::result::Result<(Well, WellConfig, Address), WellError> {
    let tokens: Vec<Token> = (1..=3).map(|n| Token::new(Address::from_low_u64(n))).collect();
    let whale = Address::from_low_u64(0xFEED);
    let ledger = Ledger::new();
    for token in &tokens {
        ledger.credit(&whale, token, Amount::new(10 * SEED));
    }

    let config = WellConfig::new(tokens, StableSwap::function_ref(amplification), vec![])?;
    let well = Well::new(Box::new(ledger), WellSettings::default());
    well.init(config.clone(), Arc::new(StableSwap), vec![])?;
    well.add_liquidity(
        &config,
        &CallContext::own(whale),
        &[Amount::new(SEED); 3],
        Liquidity::ZERO,
    )?;
    Ok((well, config, whale))
}

fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("well_engine=warn")),
        )
        .init();

    println!("=== StableSwap Well, 3 tokens ===\n");

    for amplification in [1, 10, 200, 2_000] {
        let (well, config, _) = stable_well(amplification)?;
        let tokens = config.tokens();
        let out = well.get_swap_out(&config, &tokens[0], &tokens[1], Amount::new(TRADE))?;
        println!("A = {amplification:>5}: {TRADE} in -> {out} out");
    }

    // ── Exact basket withdrawal ─────────────────────────────────────────
    let (well, config, whale) = stable_well(200)?;
    let basket = [Amount::new(50_000), Amount::new(0), Amount::new(20_000)];
    let cost = well.get_remove_liquidity_imbalanced_in(&config, &basket)?;
    let burned = well.remove_liquidity_imbalanced(&config, &CallContext::own(whale), cost, &basket)?;
    println!("\nWithdraw [50000, 0, 20000]: burned {burned} LP");
    println!("Reserves now: {}", well.reserves(&config)?);

    Ok(())
}
