//! AWS Lambda handler for payout lookups
//!
//! Accepts a payout query as JSON and returns the payout report:
//!
//! ```text
//! {"region_code":"MH04","fuel_type":"petrol","engine_capacity_cc":1197,"registration_month_year":"04/2018"}
//! ```
//!
//! Reference sheets are loaded once at cold start from `PAYOUT_REFERENCE_DIR`
//! (default data/reference). Supports Lambda Function URLs for direct HTTP access.

use chrono::Local;
use lambda_http::{run, service_fn, Body, Error, Request, Response};
use satp_payout::report::respond_to_json;
use satp_payout::{PayoutReport, RateResolver, ReferenceSource};
use std::sync::Arc;

fn cors(builder: lambda_http::http::response::Builder) -> lambda_http::http::response::Builder {
    builder
        .header("Access-Control-Allow-Origin", "*")
        .header("Access-Control-Allow-Methods", "POST, OPTIONS")
        .header("Access-Control-Allow-Headers", "Content-Type")
}

fn json_response(status: u16, body: &PayoutReport) -> Result<Response<Body>, Error> {
    let response = cors(Response::builder())
        .status(status)
        .header("Content-Type", "application/json")
        .body(Body::Text(serde_json::to_string(body)?))?;
    Ok(response)
}

/// Lambda handler function
async fn handler(resolver: &RateResolver, event: Request) -> Result<Response<Body>, Error> {
    // Handle CORS preflight
    if event.method().as_str() == "OPTIONS" {
        return Ok(cors(Response::builder()).status(200).body(Body::Empty)?);
    }

    let body_str = match event.body() {
        Body::Text(s) => s.clone(),
        Body::Binary(b) => String::from_utf8_lossy(b).to_string(),
        Body::Empty => "{}".to_string(),
    };

    let (status, report) = respond_to_json(resolver, &body_str, Local::now().date_naive());
    log::info!("{} {}", status, report.message);
    json_response(status, &report)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    env_logger::init();

    let source = std::env::var("PAYOUT_REFERENCE_DIR")
        .map(ReferenceSource::in_dir)
        .unwrap_or_default();

    // Without reference data no query can succeed, so a load failure stops the cold start
    let resolver = Arc::new(RateResolver::from_source(&source)?);

    run(service_fn(move |event: Request| {
        let resolver = Arc::clone(&resolver);
        async move { handler(&resolver, event).await }
    }))
    .await
}
