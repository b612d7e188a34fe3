//! Load batches of payout queries from CSV

use super::PayoutQuery;
use crate::error::Result;
use csv::{Reader, ReaderBuilder, Trim};
use std::io::Read;
use std::path::Path;

/// Raw CSV row matching the batch query file columns
#[derive(Debug, serde::Deserialize)]
struct CsvRow {
    #[serde(alias = "RTO")]
    region_code: String,
    #[serde(alias = "Fuel")]
    fuel_type: String,
    #[serde(alias = "CC")]
    engine_capacity_cc: u32,
    #[serde(alias = "Registration")]
    registration_month_year: String,
}

impl CsvRow {
    fn into_query(self) -> PayoutQuery {
        PayoutQuery::new(
            self.region_code,
            self.fuel_type,
            self.engine_capacity_cc,
            self.registration_month_year,
        )
    }
}

fn read_rows<R: Read>(mut reader: Reader<R>) -> Result<Vec<PayoutQuery>> {
    let mut queries = Vec::new();

    for result in reader.deserialize() {
        let row: CsvRow = result?;
        queries.push(row.into_query());
    }

    Ok(queries)
}

/// Load all queries from a CSV file
pub fn load_queries<P: AsRef<Path>>(path: P) -> Result<Vec<PayoutQuery>> {
    let reader = ReaderBuilder::new().trim(Trim::All).from_path(path)?;
    read_rows(reader)
}

/// Load queries from any reader (e.g., string buffer, request body)
pub fn load_queries_from_reader<R: Read>(reader: R) -> Result<Vec<PayoutQuery>> {
    read_rows(ReaderBuilder::new().trim(Trim::All).from_reader(reader))
}
