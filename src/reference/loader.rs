//! CSV-based reference sheet loader
//!
//! Reads the "4W SATP RTO" and "4W SATP" sheets exported as CSV files.

use super::{ClusterMap, RateRow, RateTable};
use crate::error::{PayoutError, Result};
use crate::rating::AgeBand;
use csv::{ReaderBuilder, StringRecord, Trim};
use log::{debug, warn};
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

/// Sheet name of the RTO → cluster mapping
pub const CLUSTER_SHEET: &str = "4W SATP RTO";

/// Sheet name of the rate table
pub const RATE_SHEET: &str = "4W SATP";

/// Accepted headers for the RTO code column, in order of preference
const REGION_CODE_HEADERS: &[&str] = &["RTO", "RTO Code"];

/// Accepted headers for the cluster column, in order of preference
const CLUSTER_HEADERS: &[&str] = &["New Cluster", "Cluster"];

/// Positional column names of the rate sheet
const RATE_COLUMNS: [&str; 5] = ["Cluster", "Segment Mapping", "Age Band", "Max Rate", "Avg Rate"];

fn open_sheet(path: &Path) -> Result<File> {
    File::open(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => PayoutError::SourceNotFound {
            path: path.to_path_buf(),
        },
        _ => PayoutError::Io(e),
    })
}

/// Spreadsheet exports write these for a blank cell
const MISSING_MARKERS: &[&str] = &["nan", "n/a", "#n/a", "na", "null"];

fn is_missing(value: &str) -> bool {
    value.is_empty()
        || MISSING_MARKERS
            .iter()
            .any(|marker| value.eq_ignore_ascii_case(marker))
}

/// Cell at `idx`, `None` when blank or a missing-value marker
fn cell(record: &StringRecord, idx: usize) -> Option<&str> {
    record.get(idx).filter(|value| !is_missing(value))
}

fn find_column(headers: &StringRecord, names: &[&str]) -> Option<usize> {
    names
        .iter()
        .find_map(|name| headers.iter().position(|h| h.eq_ignore_ascii_case(name)))
}

fn line_of(record: &StringRecord) -> u64 {
    record.position().map_or(0, |pos| pos.line())
}

/// Load the RTO → cluster sheet from a CSV file
pub fn load_cluster_map(path: &Path) -> Result<ClusterMap> {
    debug!("Reading {} from {}", CLUSTER_SHEET, path.display());
    read_cluster_map(open_sheet(path)?)
}

/// Read the RTO → cluster sheet from any reader
///
/// The first row is the header. Rows missing either the RTO code or the
/// cluster are dropped; later duplicates of a code are ignored.
pub fn read_cluster_map<R: Read>(reader: R) -> Result<ClusterMap> {
    let mut csv_reader = ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    let code_idx = find_column(&headers, REGION_CODE_HEADERS).ok_or_else(|| {
        PayoutError::schema(CLUSTER_SHEET, "missing required column 'RTO'")
    })?;
    let cluster_idx = find_column(&headers, CLUSTER_HEADERS).ok_or_else(|| {
        PayoutError::schema(CLUSTER_SHEET, "missing required column 'New Cluster'")
    })?;

    let mut clusters = ClusterMap::default();
    let mut dropped = 0usize;
    let mut duplicates = 0usize;

    for result in csv_reader.records() {
        let record = result?;
        match (cell(&record, code_idx), cell(&record, cluster_idx)) {
            (Some(code), Some(cluster)) => {
                if !clusters.insert(code, cluster) {
                    duplicates += 1;
                }
            }
            _ => dropped += 1,
        }
    }

    debug!(
        "{}: {} RTO codes loaded, {} incomplete rows dropped, {} duplicate codes ignored",
        CLUSTER_SHEET,
        clusters.len(),
        dropped,
        duplicates,
    );

    Ok(clusters)
}

/// Load the rate sheet from a CSV file
pub fn load_rate_table(path: &Path) -> Result<RateTable> {
    debug!("Reading {} from {}", RATE_SHEET, path.display());
    read_rate_table(open_sheet(path)?)
}

/// Parse a rate cell. Accepts plain decimals ("0.25") and percentages ("25%").
fn parse_rate(record: &StringRecord, idx: usize) -> Result<Option<f64>> {
    let Some(raw) = cell(record, idx) else {
        return Ok(None);
    };

    let parsed = match raw.strip_suffix('%') {
        Some(pct) => pct.trim().parse::<f64>().map(|v| v / 100.0),
        None => raw.parse::<f64>(),
    };

    parsed
        .ok()
        .filter(|v| v.is_finite())
        .map(Some)
        .ok_or_else(|| {
            PayoutError::schema(
                RATE_SHEET,
                format!(
                    "line {}: {} '{}' is not a number",
                    line_of(record),
                    RATE_COLUMNS[idx],
                    raw
                ),
            )
        })
}

/// Read the rate sheet from any reader
///
/// The first row is a title row and is skipped; the second row is the header
/// and must have exactly five columns. Columns are taken positionally as
/// Cluster, Segment Mapping, Age Band, Max Rate, Avg Rate. Rows missing the
/// cluster, segment or average rate are dropped.
pub fn read_rate_table<R: Read>(reader: R) -> Result<RateTable> {
    let mut csv_reader = ReaderBuilder::new()
        .has_headers(false)
        .trim(Trim::All)
        .flexible(true)
        .from_reader(reader);
    let mut records = csv_reader.records();

    if records.next().transpose()?.is_none() {
        return Err(PayoutError::schema(RATE_SHEET, "sheet is empty"));
    }
    let header = records
        .next()
        .transpose()?
        .ok_or_else(|| PayoutError::schema(RATE_SHEET, "missing header row"))?;
    if header.len() != RATE_COLUMNS.len() {
        return Err(PayoutError::schema(
            RATE_SHEET,
            format!(
                "expected {} columns, found {}",
                RATE_COLUMNS.len(),
                header.len()
            ),
        ));
    }

    let mut rows = Vec::new();
    let mut dropped = 0usize;

    for result in records {
        let record = result?;

        let (Some(cluster), Some(segment)) = (cell(&record, 0), cell(&record, 1)) else {
            dropped += 1;
            continue;
        };
        let Some(avg_rate) = parse_rate(&record, 4)? else {
            dropped += 1;
            continue;
        };
        let max_rate = parse_rate(&record, 3)?;

        let age_band = cell(&record, 2).and_then(|label| {
            let band = AgeBand::from_label(label);
            if band.is_none() {
                warn!(
                    "{} line {}: unknown age band '{}', row will never match",
                    RATE_SHEET,
                    line_of(&record),
                    label
                );
            }
            band
        });

        rows.push(RateRow::new(cluster, segment, age_band, max_rate, avg_rate));
    }

    debug!(
        "{}: {} rate rows loaded, {} incomplete rows dropped",
        RATE_SHEET,
        rows.len(),
        dropped
    );

    Ok(RateTable::from_rows(rows))
}
