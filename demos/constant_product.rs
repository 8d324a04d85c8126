//! Constant product Well example (`x · y = k`).
//!
//! Seeds a two-token Well, runs exact-in and exact-out swaps, then exits
//! through a balanced and a single-token withdrawal.
//!
//! # Run
//!
//! ```bash
//! RUST_LOG=well_engine=debug cargo run --example constant_product
//! ```

use std::sync::Arc;

use tracing_subscriber::EnvFilter;
use well_engine::prelude::*;

fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("well_engine=info")),
        )
        .init();

    println!("=== Constant Product Well (x · y = k) ===\n");

    // ── 1. Tokens, accounts and custody ─────────────────────────────────
    let usdc = Token::new(Address::from_low_u64(1));
    let weth = Token::new(Address::from_low_u64(2));
    let lp = Address::from_low_u64(0x1);
    let trader = Address::from_low_u64(0x2);

    let ledger = Ledger::new();
    ledger.credit(&lp, &usdc, Amount::new(1_000_000));
    ledger.credit(&lp, &weth, Amount::new(1_000_000));
    ledger.credit(&trader, &usdc, Amount::new(50_000));

    // ── 2. Initialize the Well ──────────────────────────────────────────
    let config = WellConfig::new(vec![usdc, weth], ConstantProduct::function_ref(), vec![])?;
    let well = Well::new(Box::new(ledger.clone()), WellSettings::default());
    well.init(config.clone(), Arc::new(ConstantProduct), vec![])?;

    let minted = well.add_liquidity(
        &config,
        &CallContext::own(lp),
        &[Amount::new(1_000_000), Amount::new(1_000_000)],
        Liquidity::ZERO,
    )?;
    println!("Seeded reserves: {}", well.reserves(&config)?);
    println!("LP minted:       {minted}");

    // ── 3. Exact-in swap: sell 10 000 USDC ──────────────────────────────
    let me = CallContext::own(trader);
    let quoted = well.get_swap_out(&config, &usdc, &weth, Amount::new(10_000))?;
    let out = well.swap_from(&config, &me, &usdc, &weth, Amount::new(10_000), quoted)?;
    println!("\n--- Sell 10000 USDC ---");
    println!("  WETH out:  {out}");
    println!("  Reserves:  {}", well.reserves(&config)?);

    // ── 4. Exact-out swap: buy back 5 000 USDC ──────────────────────────
    let cost = well.get_swap_in(&config, &weth, &usdc, Amount::new(5_000))?;
    let paid = well.swap_to(&config, &me, &weth, &usdc, cost, Amount::new(5_000))?;
    println!("\n--- Buy 5000 USDC ---");
    println!("  WETH paid: {paid}");
    println!("  Reserves:  {}", well.reserves(&config)?);

    // ── 5. Withdraw ─────────────────────────────────────────────────────
    let owner = CallContext::own(lp);
    let half = Liquidity::new(minted.get() / 2);
    let balanced = well.remove_liquidity(&config, &owner, half, &[Amount::ZERO, Amount::ZERO])?;
    println!("\n--- Burn {half} LP (balanced) ---");
    println!("  Out: {} USDC, {} WETH", balanced[0], balanced[1]);

    let tenth = Liquidity::new(minted.get() / 10);
    let single = well.remove_liquidity_one_token(&config, &owner, tenth, &weth, Amount::ZERO)?;
    println!("\n--- Burn {tenth} LP for WETH only ---");
    println!("  Out: {single} WETH");
    println!("  Reserves:  {}", well.reserves(&config)?);

    // ── 6. Event log ────────────────────────────────────────────────────
    println!("\nEvents:");
    for event in well.drain_events()? {
        println!("  {}", event.kind());
    }

    Ok(())
}
