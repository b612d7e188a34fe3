//! SATP Payout - payout rate lookup for private car third-party business
//!
//! This library provides:
//! - Loading of the RTO cluster map and SATP rate grid from CSV sheets
//! - Segment classification from fuel type and engine capacity
//! - Vehicle age banding from registration month/year
//! - Rate resolution returning the average payout and supporting rows

pub mod error;
pub mod query;
pub mod rating;
pub mod reference;
pub mod report;

// Re-export commonly used types
pub use error::PayoutError;
pub use query::PayoutQuery;
pub use rating::{AgeBand, FuelType, LookupMiss, Payout, PayoutResult, RateResolver, Segment};
pub use reference::{ClusterMap, RateRow, RateTable, ReferenceData, ReferenceSource};
pub use report::PayoutReport;
