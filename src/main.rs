//! QR Rewards - demo binary
//!
//! Builds the initial allocation for a product run and prints its tiers,
//! scores and order summary.

use std::path::PathBuf;

use clap::Parser;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::info;

use qr_rewards::engine::summary::OrderSummary;
use qr_rewards::feed::{LastKnownPrice, RefreshOutcome, StaticPriceFeed};
use qr_rewards::types::currency::to_minor_unit;
use qr_rewards::{Allocation, EngineConfig, RewardEngine, ScoreCard, TierKind};

#[derive(Debug, Parser)]
#[command(name = "qr-rewards", about = "Plan bitcoin rewards for a QR code product run")]
struct Args {
    /// Retail price of one product unit in USD
    #[arg(long)]
    price: Decimal,

    /// Number of reward-bearing codes
    #[arg(long)]
    codes: u64,

    /// BTC price in USD, used to show rewards in sats
    #[arg(long)]
    btc_usd: Option<Decimal>,

    /// Path to a TOML config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print JSON instead of text
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct Report<'a> {
    allocation: &'a Allocation,
    fingerprint: String,
    scores: ScoreCard,
    summary: OrderSummary,
    total_cost_sats: Option<u64>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };

    let mut price = LastKnownPrice::from_config(&config.price_feed);
    if let Some(btc_usd) = args.btc_usd {
        if let RefreshOutcome::KeptPrevious { error, .. } = price.refresh(&mut StaticPriceFeed::new(btc_usd)) {
            anyhow::bail!("unusable --btc-usd value: {}", error);
        }
    }
    let rate = price.sats_per_usd()?;

    let engine = RewardEngine::new(config);
    let alloc = engine.compute_initial_allocation(args.price, args.codes)?;
    let scores = engine.scores(&alloc);
    let summary = engine.summary(&alloc)?;
    let total_cost_sats = rate.map(|r| summary.total_cost_sats(r)).transpose()?;

    info!(
        codes = alloc.total_codes(),
        unit_price = %alloc.unit_price(),
        "allocation ready"
    );

    if args.json {
        let report = Report {
            allocation: &alloc,
            fingerprint: alloc.fingerprint_hex()?,
            scores,
            summary,
            total_cost_sats,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("===========================================");
    println!("  QR Rewards - {} codes at ${}", alloc.total_codes(), alloc.unit_price());
    println!("===========================================");
    for kind in TierKind::ALL {
        println!();
        println!("{:?} tier ({} codes)", kind, alloc.tier_total(kind));
        for level in &alloc.tier(kind).levels {
            match rate {
                Some(r) => println!(
                    "  ${:>10} x {:>6}  ({} sats)",
                    level.amount.round_dp(2),
                    level.count,
                    to_minor_unit(level.amount, r)?
                ),
                None => println!("  ${:>10} x {:>6}", level.amount.round_dp(2), level.count),
            }
        }
    }

    println!();
    println!("Trust:      {:>6}  {}", scores.trust.value.round_dp(1), scores.trust.level.label());
    println!(
        "Excitement: {:>6}  {}",
        scores.excitement.value.round_dp(1),
        scores.excitement.level.label()
    );
    println!("Hype:       {:>6}  {}", scores.hype.value.round_dp(1), scores.hype.level.label());

    println!();
    println!("Total reward cost:    ${}", summary.total_cost.round_dp(2));
    println!("Average per code:     ${}", summary.average_per_code.round_dp(4));
    println!("Suggested retail:     ${}", summary.suggested_retail.round_dp(2));
    println!("  with margin:        ${}", summary.suggested_retail_with_margin.round_dp(2));
    if let Some(sats) = total_cost_sats {
        println!("Total reward cost:    {} sats", sats);
    }
    println!("Fingerprint:          {}", alloc.fingerprint_hex()?);

    Ok(())
}
