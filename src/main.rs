//! SATP payout CLI
//!
//! Looks up the payout rate for one vehicle:
//!
//! ```text
//! payout --rto MH04 --fuel petrol --cc 1197 --registration 04/2018
//! ```

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::Parser;
use satp_payout::{report, PayoutQuery, PayoutReport, RateResolver, ReferenceSource};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(name = "payout", version, about = "Payout rate lookup for 4W SATP business")]
struct Cli {
    /// RTO code, e.g. MH04
    #[arg(long = "rto")]
    region_code: String,

    /// Fuel type (petrol, diesel, cng)
    #[arg(long = "fuel")]
    fuel_type: String,

    /// Engine capacity in cc
    #[arg(long = "cc", value_parser = clap::value_parser!(u32).range(1..))]
    engine_capacity_cc: u32,

    /// Registration month/year (MM/YYYY)
    #[arg(long = "registration")]
    registration_month_year: String,

    /// Directory holding 4w_satp_rto.csv and 4w_satp.csv
    #[arg(long, env = "PAYOUT_REFERENCE_DIR", default_value = satp_payout::reference::DEFAULT_REFERENCE_PATH)]
    reference_dir: PathBuf,

    /// Evaluate vehicle age as of this date (YYYY-MM-DD) instead of today
    #[arg(long)]
    as_of: Option<NaiveDate>,

    /// Print the result as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> Result<ExitCode> {
    env_logger::init();
    let cli = Cli::parse();

    let source = ReferenceSource::in_dir(&cli.reference_dir);
    let resolver = RateResolver::from_source(&source).with_context(|| {
        format!("Failed to load reference data from {}", source.dir.display())
    })?;

    let query = PayoutQuery::new(
        &cli.region_code,
        &cli.fuel_type,
        cli.engine_capacity_cc,
        &cli.registration_month_year,
    );
    let today = cli.as_of.unwrap_or_else(|| Local::now().date_naive());

    let result = resolver.resolve_on(&query, today)?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&PayoutReport::from(&result))?);
    } else {
        print!("{}", report::render_text(&result));
    }

    Ok(if result.is_payout() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
