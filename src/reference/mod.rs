//! Reference data: RTO cluster map and SATP rate table
//!
//! Both tables are read once from two sheets exported as CSV and are never
//! mutated afterwards. Resolution code receives them as a `ReferenceData`
//! value rather than reaching for process-wide state.

mod table;
pub mod loader;

pub use table::{ClusterMap, RateRow, RateTable};
pub use loader::{
    load_cluster_map, load_rate_table, read_cluster_map, read_rate_table, CLUSTER_SHEET,
    RATE_SHEET,
};

use crate::error::Result;
use std::path::{Path, PathBuf};

/// Default directory holding the exported reference sheets
pub const DEFAULT_REFERENCE_PATH: &str = "data/reference";

/// Default file name of the "4W SATP RTO" sheet export
pub const DEFAULT_CLUSTER_FILE: &str = "4w_satp_rto.csv";

/// Default file name of the "4W SATP" sheet export
pub const DEFAULT_RATE_FILE: &str = "4w_satp.csv";

/// Location of the two reference sheets
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceSource {
    /// Directory containing both sheet files
    pub dir: PathBuf,
    /// File name of the RTO → cluster sheet
    pub cluster_file: String,
    /// File name of the rate sheet
    pub rate_file: String,
}

impl Default for ReferenceSource {
    fn default() -> Self {
        Self::in_dir(DEFAULT_REFERENCE_PATH)
    }
}

impl ReferenceSource {
    /// Default sheet file names inside `dir`
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            cluster_file: DEFAULT_CLUSTER_FILE.to_string(),
            rate_file: DEFAULT_RATE_FILE.to_string(),
        }
    }

    pub fn cluster_path(&self) -> PathBuf {
        self.dir.join(&self.cluster_file)
    }

    pub fn rate_path(&self) -> PathBuf {
        self.dir.join(&self.rate_file)
    }
}

/// Loaded reference tables, read-only after construction
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReferenceData {
    pub clusters: ClusterMap,
    pub rates: RateTable,
}

impl ReferenceData {
    /// Build from tables already in memory (tests, embedding)
    pub fn new(clusters: ClusterMap, rates: RateTable) -> Self {
        Self { clusters, rates }
    }

    /// Load both sheets from the default location (data/reference/)
    pub fn load_default() -> Result<Self> {
        Self::load(&ReferenceSource::default())
    }

    /// Load both sheets using default file names inside `dir`
    pub fn load_from(dir: &Path) -> Result<Self> {
        Self::load(&ReferenceSource::in_dir(dir))
    }

    /// Load both sheets described by `source`
    pub fn load(source: &ReferenceSource) -> Result<Self> {
        let clusters = load_cluster_map(&source.cluster_path())?;
        let rates = load_rate_table(&source.rate_path())?;

        log::info!(
            "Loaded reference data from {}: {} RTO codes, {} rate rows",
            source.dir.display(),
            clusters.len(),
            rates.len(),
        );

        Ok(Self { clusters, rates })
    }
}
