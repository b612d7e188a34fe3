//! Vehicle age band from registration month/year

use crate::error::{PayoutError, Result};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Vehicles older than this many years fall in the ">10" band
pub const AGE_THRESHOLD_YEARS: f64 = 10.0;

/// Age band label of a rate row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgeBand {
    /// Ten years or younger
    #[serde(rename = "<10")]
    UpToTen,
    /// Strictly older than ten years
    #[serde(rename = ">10")]
    OverTen,
    /// Wildcard row, applies to any age
    #[serde(rename = "All")]
    All,
}

impl AgeBand {
    pub fn label(&self) -> &'static str {
        match self {
            AgeBand::UpToTen => "<10",
            AgeBand::OverTen => ">10",
            AgeBand::All => "All",
        }
    }

    /// Parse a sheet label; whitespace inside the label is ignored ("< 10")
    pub fn from_label(label: &str) -> Option<Self> {
        let compact: String = label.chars().filter(|c| !c.is_whitespace()).collect();
        match compact.as_str() {
            "<10" => Some(AgeBand::UpToTen),
            ">10" => Some(AgeBand::OverTen),
            other if other.eq_ignore_ascii_case("all") => Some(AgeBand::All),
            _ => None,
        }
    }
}

impl fmt::Display for AgeBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Registration month and year, parsed from "MM/YYYY"
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistrationMonth {
    year: i32,
    month: u32,
}

impl RegistrationMonth {
    /// Parse "MM/YYYY" (a single-digit month is accepted)
    pub fn parse(input: &str) -> Result<Self> {
        let invalid = || PayoutError::format(input);

        let (month, year) = input.trim().split_once('/').ok_or_else(invalid)?;
        let digits = |s: &str, min: usize, max: usize| {
            (min..=max).contains(&s.len()) && s.bytes().all(|b| b.is_ascii_digit())
        };
        if !digits(month, 1, 2) || !digits(year, 4, 4) {
            return Err(invalid());
        }

        let month: u32 = month.parse().map_err(|_| invalid())?;
        let year: i32 = year.parse().map_err(|_| invalid())?;
        if year < 1 || NaiveDate::from_ymd_opt(year, month, 1).is_none() {
            return Err(invalid());
        }

        Ok(Self { year, month })
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// Elapsed age in fractional years at `today` (day of month is ignored)
    pub fn age_years(&self, today: NaiveDate) -> f64 {
        (today.year() - self.year) as f64 + (today.month() as f64 - self.month as f64) / 12.0
    }

    /// Exactly ten years is still "<10"
    pub fn age_band(&self, today: NaiveDate) -> AgeBand {
        if self.age_years(today) > AGE_THRESHOLD_YEARS {
            AgeBand::OverTen
        } else {
            AgeBand::UpToTen
        }
    }
}

impl FromStr for RegistrationMonth {
    type Err = PayoutError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Age band for a "MM/YYYY" registration as of `today`
pub fn age_band(registration_month_year: &str, today: NaiveDate) -> Result<AgeBand> {
    Ok(RegistrationMonth::parse(registration_month_year)?.age_band(today))
}
