//! In-memory cluster map and rate table

use crate::rating::AgeBand;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// RTO code → cluster name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClusterMap {
    clusters: HashMap<String, String>,
}

impl ClusterMap {
    /// Normalize an RTO code the way keys are stored (trimmed, uppercase)
    pub fn normalize_code(code: &str) -> String {
        code.trim().to_uppercase()
    }

    /// Build from (code, cluster) pairs; the first entry for a code wins
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut map = Self::default();
        for (code, cluster) in pairs {
            map.insert(code.as_ref(), cluster);
        }
        map
    }

    /// Insert unless the code is already mapped. Returns false on a duplicate.
    pub(crate) fn insert(&mut self, code: &str, cluster: impl Into<String>) -> bool {
        let key = Self::normalize_code(code);
        if self.clusters.contains_key(&key) {
            return false;
        }
        self.clusters.insert(key, cluster.into());
        true
    }

    /// Cluster for an RTO code, matched on the normalized key
    pub fn cluster_for(&self, code: &str) -> Option<&str> {
        self.clusters
            .get(&Self::normalize_code(code))
            .map(String::as_str)
    }

    pub fn region_codes(&self) -> impl Iterator<Item = &str> {
        self.clusters.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.clusters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty()
    }
}

/// One row of the "4W SATP" sheet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateRow {
    pub cluster: String,
    /// Segment mapping label, e.g. "Petrol1000-1500"
    pub segment: String,
    /// `None` when the sheet cell is blank or not a known band
    pub age_band: Option<AgeBand>,
    pub max_rate: Option<f64>,
    pub avg_rate: f64,
}

impl RateRow {
    pub fn new(
        cluster: impl Into<String>,
        segment: impl Into<String>,
        age_band: Option<AgeBand>,
        max_rate: Option<f64>,
        avg_rate: f64,
    ) -> Self {
        Self {
            cluster: cluster.into(),
            segment: segment.into(),
            age_band,
            max_rate,
            avg_rate,
        }
    }

    /// Row applies to the band directly or through an "All" row
    pub fn covers(&self, band: AgeBand) -> bool {
        matches!(self.age_band, Some(b) if b == band || b == AgeBand::All)
    }
}

/// Rate rows in sheet order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RateTable {
    rows: Vec<RateRow>,
}

impl RateTable {
    pub fn from_rows(rows: Vec<RateRow>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[RateRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Distinct segment labels defined for a cluster
    pub fn segments_for(&self, cluster: &str) -> HashSet<&str> {
        self.rows
            .iter()
            .filter(|row| row.cluster == cluster)
            .map(|row| row.segment.as_str())
            .collect()
    }

    /// Rows for cluster and segment that cover the age band, in sheet order
    pub fn matching<'a>(
        &'a self,
        cluster: &'a str,
        segment: &'a str,
        band: AgeBand,
    ) -> impl Iterator<Item = &'a RateRow> + 'a {
        self.rows.iter().filter(move |row| {
            row.cluster == cluster && row.segment == segment && row.covers(band)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_table() -> RateTable {
        RateTable::from_rows(vec![
            RateRow::new("Mumbai", "Petrol<1000", Some(AgeBand::UpToTen), Some(0.30), 0.25),
            RateRow::new("Mumbai", "Petrol<1000", Some(AgeBand::OverTen), Some(0.20), 0.15),
            RateRow::new("Mumbai", "Petrol>1000", Some(AgeBand::All), None, 0.18),
            RateRow::new("Mumbai", "Petrol<1000", Some(AgeBand::All), Some(0.35), 0.28),
            RateRow::new("Pune", "Diesel<1500", Some(AgeBand::All), Some(0.22), 0.20),
            RateRow::new("Pune", "Diesel>1500", None, None, 0.10),
        ])
    }

    #[test]
    fn test_cluster_lookup_normalizes() {
        let map = ClusterMap::from_pairs([("mh04", "Mumbai"), ("MH12 ", "Pune")]);

        assert_eq!(map.cluster_for("MH04"), Some("Mumbai"));
        assert_eq!(map.cluster_for(" mh12"), Some("Pune"));
        assert_eq!(map.cluster_for("KA01"), None);
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn test_first_cluster_entry_wins() {
        let map = ClusterMap::from_pairs([("MH04", "Mumbai"), ("MH04", "Rest of MH")]);
        assert_eq!(map.cluster_for("MH04"), Some("Mumbai"));
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_segments_for_cluster() {
        let table = sample_table();

        let mumbai = table.segments_for("Mumbai");
        assert_eq!(mumbai.len(), 2);
        assert!(mumbai.contains("Petrol<1000"));
        assert!(mumbai.contains("Petrol>1000"));

        assert!(table.segments_for("Delhi").is_empty());
    }

    #[test]
    fn test_matching_keeps_sheet_order_and_all_rows() {
        let table = sample_table();

        let rows: Vec<_> = table
            .matching("Mumbai", "Petrol<1000", AgeBand::UpToTen)
            .collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].avg_rate, 0.25);
        assert_eq!(rows[1].age_band, Some(AgeBand::All));

        let rows: Vec<_> = table
            .matching("Mumbai", "Petrol<1000", AgeBand::OverTen)
            .collect();
        assert_eq!(rows[0].avg_rate, 0.15);
    }

    #[test]
    fn test_row_without_band_never_matches() {
        let table = sample_table();
        assert_eq!(table.matching("Pune", "Diesel>1500", AgeBand::UpToTen).count(), 0);
        assert_eq!(table.matching("Pune", "Diesel>1500", AgeBand::OverTen).count(), 0);
    }
}
