//! Payout rating: segment classification, age banding and rate resolution

mod age_band;
mod segment;
pub mod resolver;

pub use age_band::{age_band, AgeBand, RegistrationMonth, AGE_THRESHOLD_YEARS};
pub use segment::{classify, classify_fuel, FuelType, Segment};
pub use resolver::{resolve, LookupMiss, Payout, PayoutResult, RateResolver};
