//! Payout queries as entered by a requester

pub mod loader;

pub use loader::{load_queries, load_queries_from_reader};

use crate::error::{PayoutError, Result};
use serde::{Deserialize, Serialize};

/// One payout request: the four inputs of the form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayoutQuery {
    /// RTO code, e.g. "MH04"
    pub region_code: String,
    /// "petrol", "diesel" or "cng"
    pub fuel_type: String,
    /// Engine displacement in cc
    pub engine_capacity_cc: u32,
    /// Registration month/year, "MM/YYYY"
    pub registration_month_year: String,
}

impl PayoutQuery {
    /// Build a query, normalizing the way the input form does
    /// (RTO code uppercased, fuel type lowercased)
    pub fn new(
        region_code: impl AsRef<str>,
        fuel_type: impl AsRef<str>,
        engine_capacity_cc: u32,
        registration_month_year: impl AsRef<str>,
    ) -> Self {
        Self {
            region_code: region_code.as_ref().trim().to_uppercase(),
            fuel_type: fuel_type.as_ref().trim().to_lowercase(),
            engine_capacity_cc,
            registration_month_year: registration_month_year.as_ref().trim().to_string(),
        }
    }

    /// Same query with form normalization applied
    pub fn normalized(&self) -> Self {
        Self::new(
            &self.region_code,
            &self.fuel_type,
            self.engine_capacity_cc,
            &self.registration_month_year,
        )
    }

    /// Reject incomplete input before any lookup is attempted
    pub fn validate(&self) -> Result<()> {
        let missing = [
            ("RTO code", &self.region_code),
            ("fuel type", &self.fuel_type),
            ("registration month/year", &self.registration_month_year),
        ]
        .into_iter()
        .find(|(_, value)| value.trim().is_empty());

        if let Some((field, _)) = missing {
            return Err(PayoutError::InvalidQuery(format!("{field} is required")));
        }
        if self.engine_capacity_cc == 0 {
            return Err(PayoutError::InvalidQuery(
                "engine capacity must be at least 1 cc".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_normalizes_form_input() {
        let query = PayoutQuery::new(" mh04", "PETROL ", 1197, " 04/2018 ");
        assert_eq!(query.region_code, "MH04");
        assert_eq!(query.fuel_type, "petrol");
        assert_eq!(query.registration_month_year, "04/2018");
    }

    #[test]
    fn test_validate() {
        assert!(PayoutQuery::new("MH04", "petrol", 1197, "04/2018").validate().is_ok());

        let err = PayoutQuery::new("", "petrol", 1197, "04/2018").validate().unwrap_err();
        assert_eq!(err.to_string(), "Invalid query: RTO code is required");

        let err = PayoutQuery::new("MH04", "petrol", 0, "04/2018").validate().unwrap_err();
        assert!(matches!(err, PayoutError::InvalidQuery(_)));

        let err = PayoutQuery::new("MH04", "petrol", 1197, "  ").validate().unwrap_err();
        assert!(err.to_string().contains("registration month/year"));
    }

    #[test]
    fn test_deserialize_json() {
        let json = r#"{"region_code":"mh12","fuel_type":"Diesel","engine_capacity_cc":1498,"registration_month_year":"11/2012"}"#;
        let query: PayoutQuery = serde_json::from_str(json).unwrap();
        let query = query.normalized();
        assert_eq!(query.region_code, "MH12");
        assert_eq!(query.fuel_type, "diesel");
        assert_eq!(query.engine_capacity_cc, 1498);
    }
}
