//! Presentation of payout results for the CLI, batch output and HTTP handler

use crate::error::Result;
use crate::query::PayoutQuery;
use crate::rating::{PayoutResult, RateResolver};
use crate::reference::RateRow;
use chrono::NaiveDate;
use rayon::prelude::*;
use serde::Serialize;
use std::fmt::Write;

/// Rate fraction as a percentage with one decimal, e.g. 0.25 -> "25.0%"
pub fn format_payout_pct(rate: f64) -> String {
    format!("{:.1}%", rate * 100.0)
}

/// Serializable view of a payout result
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PayoutReport {
    pub success: bool,
    /// Success banner or failure reason
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_rate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payout_pct: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cluster: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub segment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age_band: Option<String>,
    pub rows: Vec<RateRow>,
}

impl PayoutReport {
    /// Report for a query that failed before or during resolution
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            avg_rate: None,
            payout_pct: None,
            cluster: None,
            segment: None,
            age_band: None,
            rows: Vec::new(),
        }
    }
}

impl From<&PayoutResult> for PayoutReport {
    fn from(result: &PayoutResult) -> Self {
        match result {
            PayoutResult::Payout(payout) => {
                let pct = format_payout_pct(payout.avg_rate);
                Self {
                    success: true,
                    message: format!("The payout for the given criteria is: {pct}"),
                    avg_rate: Some(payout.avg_rate),
                    payout_pct: Some(pct),
                    cluster: Some(payout.cluster.clone()),
                    segment: Some(payout.segment.label().to_string()),
                    age_band: Some(payout.age_band.label().to_string()),
                    rows: payout.rows.clone(),
                }
            }
            PayoutResult::Miss(miss) => Self::failure(miss.to_string()),
        }
    }
}

/// HTTP status for a resolution outcome
///
/// A lookup miss is still a 200: the request was valid and the report carries
/// the reason. Bad input is a 400; reference data problems are a 500.
pub fn http_status(outcome: &Result<PayoutResult>) -> u16 {
    match outcome {
        Ok(_) => 200,
        Err(e) if e.is_per_query() => 400,
        Err(_) => 500,
    }
}

/// Answer a JSON-encoded query: status code plus report body
pub fn respond_to_json(resolver: &RateResolver, body: &str, today: NaiveDate) -> (u16, PayoutReport) {
    let query: PayoutQuery = match serde_json::from_str(body) {
        Ok(q) => q,
        Err(e) => return (400, PayoutReport::failure(format!("Invalid JSON: {}", e))),
    };

    let outcome = resolver.resolve_on(&query.normalized(), today);
    let report = match &outcome {
        Ok(result) => PayoutReport::from(result),
        Err(e) => PayoutReport::failure(e.to_string()),
    };
    (http_status(&outcome), report)
}

/// Outcome class of one batch line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchStatus {
    Ok,
    NotFound,
    Invalid,
}

/// One line of the batch output file
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchRow {
    pub region_code: String,
    pub fuel_type: String,
    pub engine_capacity_cc: u32,
    pub registration_month_year: String,
    pub status: BatchStatus,
    pub cluster: String,
    pub segment: String,
    pub age_band: String,
    pub avg_rate: Option<f64>,
    pub payout_pct: String,
    pub matching_rows: usize,
    pub message: String,
}

impl BatchRow {
    /// Record an outcome; errors become an `Invalid` line, never a failure of the batch
    pub fn new(query: &PayoutQuery, outcome: Result<PayoutResult>) -> Self {
        let mut row = Self {
            region_code: query.region_code.clone(),
            fuel_type: query.fuel_type.clone(),
            engine_capacity_cc: query.engine_capacity_cc,
            registration_month_year: query.registration_month_year.clone(),
            status: BatchStatus::Ok,
            cluster: String::new(),
            segment: String::new(),
            age_band: String::new(),
            avg_rate: None,
            payout_pct: String::new(),
            matching_rows: 0,
            message: String::new(),
        };

        match outcome {
            Ok(PayoutResult::Payout(payout)) => {
                row.cluster = payout.cluster;
                row.segment = payout.segment.label().to_string();
                row.age_band = payout.age_band.label().to_string();
                row.avg_rate = Some(payout.avg_rate);
                row.payout_pct = format_payout_pct(payout.avg_rate);
                row.matching_rows = payout.rows.len();
            }
            Ok(PayoutResult::Miss(miss)) => {
                row.status = BatchStatus::NotFound;
                row.message = miss.to_string();
            }
            Err(e) => {
                row.status = BatchStatus::Invalid;
                row.message = e.to_string();
            }
        }

        row
    }
}

/// Resolve every query against the shared reference data
pub fn resolve_batch(resolver: &RateResolver, queries: &[PayoutQuery], today: NaiveDate) -> Vec<BatchRow> {
    // Reference tables are read-only, so queries resolve in parallel
    queries
        .par_iter()
        .map(|query| BatchRow::new(query, resolver.resolve_on(query, today)))
        .collect()
}

fn fmt_rate(rate: Option<f64>) -> String {
    rate.map_or_else(|| "-".to_string(), |r| format!("{r:.4}"))
}

/// Fixed-width table of supporting rate rows
pub fn render_rows(rows: &[RateRow]) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<20} {:<16} {:<8} {:>10} {:>10}",
        "Cluster", "Segment", "Age Band", "Max Rate", "Avg Rate"
    );
    let _ = writeln!(out, "{}", "-".repeat(68));
    for row in rows {
        let _ = writeln!(
            out,
            "{:<20} {:<16} {:<8} {:>10} {:>10.4}",
            row.cluster,
            row.segment,
            row.age_band.map_or("-", |b| b.label()),
            fmt_rate(row.max_rate),
            row.avg_rate,
        );
    }
    out
}

/// Text rendering: banner line, then the supporting rows on success
pub fn render_text(result: &PayoutResult) -> String {
    let report = PayoutReport::from(result);
    if !report.success {
        return format!("Error: {}\n", report.message);
    }

    let mut out = format!("{}\n\nRelevant Segment Data:\n", report.message);
    out.push_str(&render_rows(&report.rows));
    out
}
