//! Error types for reference loading and payout queries
//!
//! Source and schema errors are startup failures: without valid reference
//! data no query can be answered. Format and query errors belong to a single
//! request and never touch the loaded tables.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading reference sheets or resolving a query
#[derive(Debug, Error)]
pub enum PayoutError {
    /// A reference sheet could not be found
    #[error("Reference source not found: {}", path.display())]
    SourceNotFound { path: PathBuf },

    /// A reference sheet does not have the expected shape
    #[error("Sheet '{sheet}' has an unexpected layout: {message}")]
    Schema { sheet: String, message: String },

    /// Registration month/year is not in MM/YYYY form
    #[error("Invalid registration month/year '{input}', expected MM/YYYY")]
    Format { input: String },

    /// Query is incomplete or out of range
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),
}

impl PayoutError {
    /// Creates a schema error for the named sheet
    pub fn schema(sheet: impl Into<String>, message: impl Into<String>) -> Self {
        PayoutError::Schema {
            sheet: sheet.into(),
            message: message.into(),
        }
    }

    /// Creates a format error for a registration input
    pub fn format(input: impl Into<String>) -> Self {
        PayoutError::Format { input: input.into() }
    }

    /// Whether the error concerns a single query rather than the reference data
    pub fn is_per_query(&self) -> bool {
        matches!(self, PayoutError::Format { .. } | PayoutError::InvalidQuery(_))
    }
}

pub type Result<T> = std::result::Result<T, PayoutError>;
