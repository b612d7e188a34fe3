//! Resolve payout rates for a CSV file of vehicles
//!
//! Reads region_code,fuel_type,engine_capacity_cc,registration_month_year rows
//! and writes one output row per vehicle with its rate or failure reason.

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::Parser;
use satp_payout::query::load_queries;
use satp_payout::report::{resolve_batch, BatchStatus};
use satp_payout::{RateResolver, ReferenceSource};
use std::path::PathBuf;
use std::time::Instant;

#[derive(Debug, Parser)]
#[command(name = "run_batch", about = "Resolve payout rates for a file of vehicles")]
struct Args {
    /// Input CSV of queries
    #[arg(default_value = "data/sample_queries.csv")]
    input: PathBuf,

    /// Output CSV path
    #[arg(short, long, default_value = "payout_batch_output.csv")]
    output: PathBuf,

    /// Directory holding 4w_satp_rto.csv and 4w_satp.csv
    #[arg(long, env = "PAYOUT_REFERENCE_DIR", default_value = satp_payout::reference::DEFAULT_REFERENCE_PATH)]
    reference_dir: PathBuf,

    /// Evaluate vehicle ages as of this date (YYYY-MM-DD) instead of today
    #[arg(long)]
    as_of: Option<NaiveDate>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let start = Instant::now();
    let source = ReferenceSource::in_dir(&args.reference_dir);
    let resolver = RateResolver::from_source(&source).with_context(|| {
        format!("Failed to load reference data from {}", source.dir.display())
    })?;
    println!("Loaded reference data in {:?}", start.elapsed());

    let queries = load_queries(&args.input)
        .with_context(|| format!("Failed to read queries from {}", args.input.display()))?;
    println!("Loaded {} queries from {}", queries.len(), args.input.display());

    let today = args.as_of.unwrap_or_else(|| Local::now().date_naive());

    println!("Resolving payouts as of {}...", today);
    let resolve_start = Instant::now();

    let rows = resolve_batch(&resolver, &queries, today);

    println!("Resolved in {:?}", resolve_start.elapsed());

    let mut writer = csv::Writer::from_path(&args.output)
        .with_context(|| format!("Failed to create {}", args.output.display()))?;
    for row in &rows {
        writer.serialize(row)?;
    }
    writer.flush()?;

    let found = rows.iter().filter(|r| r.status == BatchStatus::Ok).count();
    let not_found = rows.iter().filter(|r| r.status == BatchStatus::NotFound).count();
    let invalid = rows.len() - found - not_found;

    println!("\nResults written to: {}", args.output.display());
    println!("\nSummary:");
    println!("  Queries: {}", rows.len());
    println!("  Payout found: {}", found);
    println!("  No matching rate: {}", not_found);
    println!("  Invalid input: {}", invalid);
    println!("  Total time: {:?}", start.elapsed());

    Ok(())
}
