//! Segment classification from fuel type and engine capacity
//!
//! Fine engine bands (1000-1500, >1500) exist only for some clusters. When the
//! cluster has no row for the fine band the coarser ">1000" segment is used.

use crate::error::PayoutError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

/// Fuel type of the vehicle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FuelType {
    Petrol,
    Diesel,
    Cng,
}

impl FuelType {
    /// Parse ignoring case and surrounding whitespace; `None` for anything other
    /// than petrol, diesel or cng
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "petrol" => Some(FuelType::Petrol),
            "diesel" => Some(FuelType::Diesel),
            "cng" => Some(FuelType::Cng),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FuelType::Petrol => "petrol",
            FuelType::Diesel => "diesel",
            FuelType::Cng => "cng",
        }
    }
}

impl FromStr for FuelType {
    type Err = PayoutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
            .ok_or_else(|| PayoutError::InvalidQuery(format!("unknown fuel type '{}'", s.trim())))
    }
}

impl fmt::Display for FuelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Segment mapping labels used as rate table keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Segment {
    #[serde(rename = "Petrol<1000")]
    PetrolUnder1000,
    #[serde(rename = "Petrol1000-1500")]
    Petrol1000To1500,
    #[serde(rename = "Petrol>1000")]
    PetrolOver1000,
    #[serde(rename = "Petrol>1500")]
    PetrolOver1500,
    #[serde(rename = "CNG<1000")]
    CngUnder1000,
    #[serde(rename = "CNG1000-1500")]
    Cng1000To1500,
    #[serde(rename = "CNG>1000")]
    CngOver1000,
    #[serde(rename = "CNG>1500")]
    CngOver1500,
    #[serde(rename = "Diesel<1500")]
    DieselUnder1500,
    #[serde(rename = "Diesel>1500")]
    DieselOver1500,
}

impl Segment {
    pub const ALL: [Segment; 10] = [
        Segment::PetrolUnder1000,
        Segment::Petrol1000To1500,
        Segment::PetrolOver1000,
        Segment::PetrolOver1500,
        Segment::CngUnder1000,
        Segment::Cng1000To1500,
        Segment::CngOver1000,
        Segment::CngOver1500,
        Segment::DieselUnder1500,
        Segment::DieselOver1500,
    ];

    /// Label as written in the rate sheet
    pub fn label(&self) -> &'static str {
        match self {
            Segment::PetrolUnder1000 => "Petrol<1000",
            Segment::Petrol1000To1500 => "Petrol1000-1500",
            Segment::PetrolOver1000 => "Petrol>1000",
            Segment::PetrolOver1500 => "Petrol>1500",
            Segment::CngUnder1000 => "CNG<1000",
            Segment::Cng1000To1500 => "CNG1000-1500",
            Segment::CngOver1000 => "CNG>1000",
            Segment::CngOver1500 => "CNG>1500",
            Segment::DieselUnder1500 => "Diesel<1500",
            Segment::DieselOver1500 => "Diesel>1500",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.label() == label)
    }

    pub fn fuel_type(&self) -> FuelType {
        match self {
            Segment::PetrolUnder1000
            | Segment::Petrol1000To1500
            | Segment::PetrolOver1000
            | Segment::PetrolOver1500 => FuelType::Petrol,
            Segment::CngUnder1000
            | Segment::Cng1000To1500
            | Segment::CngOver1000
            | Segment::CngOver1500 => FuelType::Cng,
            Segment::DieselUnder1500 | Segment::DieselOver1500 => FuelType::Diesel,
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Preferred fine band if the cluster defines it, else the coarse fallback
fn banded(preferred: Segment, fallback: Segment, available: &HashSet<&str>) -> Segment {
    if available.contains(preferred.label()) {
        preferred
    } else {
        fallback
    }
}

/// Classify a vehicle into a segment
///
/// `available` holds the segment labels the vehicle's cluster has rows for.
/// Only the 1000-1499cc and 1500cc+ petrol/CNG bands consult it.
pub fn classify(fuel_type: FuelType, engine_capacity_cc: u32, available: &HashSet<&str>) -> Segment {
    match fuel_type {
        FuelType::Petrol => match engine_capacity_cc {
            0..=999 => Segment::PetrolUnder1000,
            1000..=1499 => banded(Segment::Petrol1000To1500, Segment::PetrolOver1000, available),
            _ => banded(Segment::PetrolOver1500, Segment::PetrolOver1000, available),
        },
        FuelType::Cng => match engine_capacity_cc {
            0..=999 => Segment::CngUnder1000,
            1000..=1499 => banded(Segment::Cng1000To1500, Segment::CngOver1000, available),
            _ => banded(Segment::CngOver1500, Segment::CngOver1000, available),
        },
        FuelType::Diesel => match engine_capacity_cc {
            0..=1499 => Segment::DieselUnder1500,
            _ => Segment::DieselOver1500,
        },
    }
}

/// Classify from raw fuel type text
///
/// The text is trimmed and matched ignoring case, so " Petrol " and "petrol"
/// classify alike. Unknown fuel types have no segment.
pub fn classify_fuel(
    fuel_type: &str,
    engine_capacity_cc: u32,
    available: &HashSet<&str>,
) -> Option<Segment> {
    FuelType::parse(fuel_type).map(|fuel| classify(fuel, engine_capacity_cc, available))
}
