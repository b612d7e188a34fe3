//! Rate resolution: RTO → cluster → segment → age band → rate row
//!
//! Pre-loaded reference data is held by `RateResolver` so many queries can be
//! answered without re-reading the sheets.
//!
//! # Example
//! ```ignore
//! let resolver = RateResolver::from_source(&ReferenceSource::default())?;
//! let query = PayoutQuery::new("MH04", "petrol", 1197, "04/2018");
//! match resolver.resolve(&query)? {
//!     PayoutResult::Payout(payout) => println!("{:.1}%", payout.avg_rate * 100.0),
//!     PayoutResult::Miss(miss) => println!("{miss}"),
//! }
//! ```

use super::age_band::{age_band, AgeBand};
use super::segment::{classify_fuel, Segment};
use crate::error::Result;
use crate::query::PayoutQuery;
use crate::reference::{ClusterMap, RateRow, RateTable, ReferenceData, ReferenceSource};
use chrono::{Local, NaiveDate};
use log::debug;
use serde::Serialize;
use std::fmt;

/// A resolved payout rate with the rows it was drawn from
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Payout {
    pub cluster: String,
    pub segment: Segment,
    pub age_band: AgeBand,
    /// Avg rate of the first matching row, as a fraction
    pub avg_rate: f64,
    /// Every row matching cluster, segment and band (or "All"), sheet order
    pub rows: Vec<RateRow>,
}

/// Why no rate could be found for an otherwise valid query
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupMiss {
    UnknownRegion {
        region_code: String,
    },
    NoMatchingRate {
        cluster: String,
        segment: Option<Segment>,
        age_band: AgeBand,
    },
}

impl fmt::Display for LookupMiss {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LookupMiss::UnknownRegion { region_code } => {
                write!(f, "Cluster not found for RTO: {region_code}")
            }
            LookupMiss::NoMatchingRate {
                cluster,
                segment,
                age_band,
            } => write!(
                f,
                "No matching data for Cluster: {}, Segment: {}, Age Band: {}",
                cluster,
                segment.map_or("None", |s| s.label()),
                age_band
            ),
        }
    }
}

/// Outcome of a payout lookup
#[derive(Debug, Clone, PartialEq)]
pub enum PayoutResult {
    Payout(Payout),
    Miss(LookupMiss),
}

impl PayoutResult {
    pub fn is_payout(&self) -> bool {
        matches!(self, PayoutResult::Payout(_))
    }

    /// Avg rate as a fraction, if found
    pub fn rate(&self) -> Option<f64> {
        match self {
            PayoutResult::Payout(payout) => Some(payout.avg_rate),
            PayoutResult::Miss(_) => None,
        }
    }

    /// Supporting rows; empty on a miss
    pub fn rows(&self) -> &[RateRow] {
        match self {
            PayoutResult::Payout(payout) => &payout.rows,
            PayoutResult::Miss(_) => &[],
        }
    }

    /// Failure reason shown to the requester
    pub fn reason(&self) -> Option<String> {
        match self {
            PayoutResult::Payout(_) => None,
            PayoutResult::Miss(miss) => Some(miss.to_string()),
        }
    }
}

/// Resolve a query against the cluster map and rate table as of `today`
///
/// Only a malformed registration month/year is an error; unknown RTO codes
/// and missing rate rows come back as `PayoutResult::Miss`.
pub fn resolve(
    query: &PayoutQuery,
    clusters: &ClusterMap,
    rates: &RateTable,
    today: NaiveDate,
) -> Result<PayoutResult> {
    let region_code = ClusterMap::normalize_code(&query.region_code);
    let Some(cluster) = clusters.cluster_for(&region_code) else {
        debug!("No cluster for RTO {}", region_code);
        return Ok(PayoutResult::Miss(LookupMiss::UnknownRegion { region_code }));
    };

    let available = rates.segments_for(cluster);
    let segment = classify_fuel(&query.fuel_type, query.engine_capacity_cc, &available);
    let age_band = age_band(&query.registration_month_year, today)?;

    debug!(
        "RTO {} -> cluster {}, segment {:?}, age band {}",
        region_code, cluster, segment, age_band
    );

    let matched = segment.map(|segment| {
        let rows: Vec<RateRow> = rates
            .matching(cluster, segment.label(), age_band)
            .cloned()
            .collect();
        (segment, rows)
    });

    match matched {
        Some((segment, rows)) if !rows.is_empty() => {
            let avg_rate = rows[0].avg_rate;
            Ok(PayoutResult::Payout(Payout {
                cluster: cluster.to_string(),
                segment,
                age_band,
                avg_rate,
                rows,
            }))
        }
        _ => Ok(PayoutResult::Miss(LookupMiss::NoMatchingRate {
            cluster: cluster.to_string(),
            segment,
            age_band,
        })),
    }
}

/// Pre-loaded resolver for answering many queries
#[derive(Debug, Clone)]
pub struct RateResolver {
    reference: ReferenceData,
}

impl RateResolver {
    /// Create resolver with reference data already in memory
    pub fn new(reference: ReferenceData) -> Self {
        Self { reference }
    }

    /// Create resolver by loading the reference sheets
    pub fn from_source(source: &ReferenceSource) -> Result<Self> {
        Ok(Self::new(ReferenceData::load(source)?))
    }

    pub fn reference(&self) -> &ReferenceData {
        &self.reference
    }

    /// Validate and resolve a query as of `today`
    pub fn resolve_on(&self, query: &PayoutQuery, today: NaiveDate) -> Result<PayoutResult> {
        query.validate()?;
        resolve(query, &self.reference.clusters, &self.reference.rates, today)
    }

    /// Validate and resolve a query as of the local wall-clock date
    pub fn resolve(&self, query: &PayoutQuery) -> Result<PayoutResult> {
        self.resolve_on(query, Local::now().date_naive())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PayoutError;

    fn jan_2024() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    }

    fn single_row_reference() -> ReferenceData {
        ReferenceData::new(
            ClusterMap::from_pairs([("MH04", "ClusterA")]),
            RateTable::from_rows(vec![RateRow::new(
                "ClusterA",
                "Petrol<1000",
                Some(AgeBand::UpToTen),
                Some(0.30),
                0.25,
            )]),
        )
    }

    fn banded_reference() -> ReferenceData {
        ReferenceData::new(
            ClusterMap::from_pairs([("MH04", "Mumbai"), ("MH12", "Pune"), ("GJ01", "Ahmedabad")]),
            RateTable::from_rows(vec![
                RateRow::new("Mumbai", "Petrol1000-1500", Some(AgeBand::UpToTen), Some(0.40), 0.35),
                RateRow::new("Mumbai", "Petrol1000-1500", Some(AgeBand::All), Some(0.30), 0.28),
                RateRow::new("Mumbai", "Petrol>1500", Some(AgeBand::All), Some(0.25), 0.22),
                RateRow::new("Pune", "Petrol>1000", Some(AgeBand::UpToTen), Some(0.33), 0.31),
                RateRow::new("Pune", "Petrol>1000", Some(AgeBand::OverTen), Some(0.18), 0.16),
                RateRow::new("Pune", "Diesel<1500", Some(AgeBand::UpToTen), Some(0.20), 0.19),
            ]),
        )
    }

    #[test]
    fn test_single_row_payout() {
        let resolver = RateResolver::new(single_row_reference());
        let query = PayoutQuery::new("MH04", "petrol", 900, "01/2023");

        let result = resolver.resolve_on(&query, jan_2024()).unwrap();

        assert_eq!(result.rate(), Some(0.25));
        assert_eq!(result.rows().len(), 1);
        match result {
            PayoutResult::Payout(payout) => {
                assert_eq!(payout.cluster, "ClusterA");
                assert_eq!(payout.segment, Segment::PetrolUnder1000);
                assert_eq!(payout.age_band, AgeBand::UpToTen);
            }
            PayoutResult::Miss(miss) => panic!("unexpected miss: {miss}"),
        }
    }

    #[test]
    fn test_unknown_region() {
        let resolver = RateResolver::new(single_row_reference());
        let query = PayoutQuery::new("XX99", "petrol", 900, "01/2023");

        let result = resolver.resolve_on(&query, jan_2024()).unwrap();

        assert_eq!(result.reason().as_deref(), Some("Cluster not found for RTO: XX99"));
        assert!(result.rows().is_empty());
    }

    #[test]
    fn test_no_row_for_age_band() {
        let resolver = RateResolver::new(single_row_reference());
        let query = PayoutQuery::new("MH04", "petrol", 900, "06/2010");

        let result = resolver.resolve_on(&query, jan_2024()).unwrap();

        assert_eq!(
            result.reason().as_deref(),
            Some("No matching data for Cluster: ClusterA, Segment: Petrol<1000, Age Band: >10")
        );
        assert!(result.rows().is_empty());
    }

    #[test]
    fn test_unknown_fuel_reports_no_segment() {
        let resolver = RateResolver::new(single_row_reference());
        let query = PayoutQuery::new("MH04", "electric", 900, "01/2023");

        let result = resolver.resolve_on(&query, jan_2024()).unwrap();

        assert_eq!(
            result.reason().as_deref(),
            Some("No matching data for Cluster: ClusterA, Segment: None, Age Band: <10")
        );
    }

    #[test]
    fn test_known_regions_always_resolve_a_cluster() {
        let reference = banded_reference();
        for code in reference.clusters.region_codes() {
            for fuel in ["petrol", "diesel", "cng"] {
                let query = PayoutQuery::new(code, fuel, 1200, "05/2016");
                let result = resolve(&query, &reference.clusters, &reference.rates, jan_2024()).unwrap();
                assert!(!matches!(
                    result,
                    PayoutResult::Miss(LookupMiss::UnknownRegion { .. })
                ));
            }
        }
    }

    #[test]
    fn test_fine_band_and_first_match_wins() {
        let resolver = RateResolver::new(banded_reference());
        let query = PayoutQuery::new("MH04", "petrol", 1197, "04/2018");

        let result = resolver.resolve_on(&query, jan_2024()).unwrap();

        // Band row comes before the "All" row, both are supporting data
        assert_eq!(result.rate(), Some(0.35));
        assert_eq!(result.rows().len(), 2);
        assert_eq!(result.rows()[1].age_band, Some(AgeBand::All));
    }

    #[test]
    fn test_all_row_covers_old_vehicles() {
        let resolver = RateResolver::new(banded_reference());
        let query = PayoutQuery::new("MH04", "petrol", 1197, "04/2008");

        let result = resolver.resolve_on(&query, jan_2024()).unwrap();

        assert_eq!(result.rate(), Some(0.28));
        assert_eq!(result.rows().len(), 1);
    }

    #[test]
    fn test_coarse_fallback_cluster() {
        let resolver = RateResolver::new(banded_reference());

        let young = PayoutQuery::new("mh12", "Petrol", 1800, "04/2018");
        let result = resolver.resolve_on(&young, jan_2024()).unwrap();
        assert_eq!(result.rate(), Some(0.31));

        let old = PayoutQuery::new("MH12", "petrol", 1200, "12/2013");
        let result = resolver.resolve_on(&old, jan_2024()).unwrap();
        assert_eq!(result.rate(), Some(0.16));
    }

    #[test]
    fn test_cluster_without_rates() {
        let resolver = RateResolver::new(banded_reference());
        let query = PayoutQuery::new("GJ01", "cng", 1200, "04/2018");

        let result = resolver.resolve_on(&query, jan_2024()).unwrap();

        assert_eq!(
            result.reason().as_deref(),
            Some("No matching data for Cluster: Ahmedabad, Segment: CNG>1000, Age Band: <10")
        );
    }

    #[test]
    fn test_bad_registration_is_an_error() {
        let resolver = RateResolver::new(banded_reference());
        let query = PayoutQuery::new("MH04", "petrol", 1197, "April 2018");

        let err = resolver.resolve_on(&query, jan_2024()).unwrap_err();
        assert!(matches!(err, PayoutError::Format { .. }));

        // Unknown RTO is reported before the date is looked at
        let query = PayoutQuery::new("XX99", "petrol", 1197, "April 2018");
        assert!(!resolver.resolve_on(&query, jan_2024()).unwrap().is_payout());
    }

    #[test]
    fn test_invalid_query_rejected() {
        let resolver = RateResolver::new(banded_reference());
        let query = PayoutQuery::new("MH04", "petrol", 0, "04/2018");
        assert!(matches!(
            resolver.resolve_on(&query, jan_2024()),
            Err(PayoutError::InvalidQuery(_))
        ));
    }

    #[test]
    fn test_resolve_against_default_sheets() {
        let resolver = RateResolver::from_source(&ReferenceSource::default())
            .expect("Failed to load reference data");

        let query = PayoutQuery::new("MH04", "petrol", 1197, "04/2018");
        assert_eq!(resolver.resolve_on(&query, jan_2024()).unwrap().rate(), Some(0.26));

        // Gujarat defines the fine band, so its coarse ">10" row is never reached
        let query = PayoutQuery::new("GJ01", "petrol", 1199, "02/2010");
        let result = resolver.resolve_on(&query, jan_2024()).unwrap();
        assert_eq!(
            result.reason().as_deref(),
            Some("No matching data for Cluster: Gujarat, Segment: Petrol1000-1500, Age Band: >10")
        );

        // DL01 has no cluster in the sheet
        let query = PayoutQuery::new("DL01", "petrol", 998, "01/2020");
        let result = resolver.resolve_on(&query, jan_2024()).unwrap();
        assert_eq!(result.reason().as_deref(), Some("Cluster not found for RTO: DL01"));
    }

    #[test]
    fn test_resolution_does_not_touch_reference() {
        let resolver = RateResolver::new(banded_reference());
        let before = resolver.reference().clone();

        for code in ["MH04", "MH12", "XX99"] {
            let query = PayoutQuery::new(code, "petrol", 1300, "02/2015");
            let _ = resolver.resolve_on(&query, jan_2024());
        }

        assert_eq!(resolver.reference(), &before);
    }

    #[test]
    fn test_blank_rate_markers_fall_through_to_next_row() {
        let clusters =
            crate::reference::read_cluster_map("RTO,New Cluster\nMH04,ClusterA\n".as_bytes())
                .unwrap();
        let sheet = "\
title,,,,
Cluster,Segment,Age Band,Max,Avg
ClusterA,Petrol<1000,<10,0.30,NaN
ClusterA,Petrol<1000,<10,#N/A,0.25
";
        let rates = crate::reference::read_rate_table(sheet.as_bytes()).unwrap();
        let resolver = RateResolver::new(ReferenceData::new(clusters, rates));
        let query = PayoutQuery::new("MH04", "petrol", 900, "01/2023");

        let result = resolver.resolve_on(&query, jan_2024()).unwrap();

        assert_eq!(result.rate(), Some(0.25));
        assert_eq!(result.rows().len(), 1);
        assert_eq!(result.rows()[0].max_rate, None);
    }
}
