//! Error types for delivtab.

use delivtab_sheet::SheetError;
use thiserror::Error;

/// Result type for delivtab operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors that can occur while processing one export file.
///
/// Everything except [`EngineError::InvalidConfig`] and
/// [`EngineError::Config`] describes bad input and is recorded per file by
/// the batch driver.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Decoding or reading the table failed.
    #[error(transparent)]
    Sheet(#[from] SheetError),

    /// A required logical column has no matching header.
    #[error("Column '{field}' not found (tried {candidates:?}); available: {available:?}")]
    ColumnNotFound {
        field: String,
        candidates: Vec<String>,
        available: Vec<String>,
    },

    /// No column looks like the configured metric.
    #[error("Metric column '{label}' not found; available: {available:?}")]
    MetricNotFound {
        label: String,
        available: Vec<String>,
    },

    /// No column holds the configured site codes.
    #[error("No column contains site codes {expected:?}; available: {available:?}")]
    CodeColumnNotFound {
        expected: Vec<String>,
        available: Vec<String>,
    },

    /// No sheet of the workbook produced a metric value.
    #[error("No sheet yielded metric values (scanned {sheets:?})")]
    NoMetricData { sheets: Vec<String> },

    /// The engine configuration breaks a contract (empty candidate list, ...).
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl EngineError {
    /// Create a column-not-found error.
    pub fn column_not_found(field: &str, candidates: &[String], available: &[String]) -> Self {
        Self::ColumnNotFound {
            field: field.to_string(),
            candidates: candidates.to_vec(),
            available: available.to_vec(),
        }
    }

    /// Create an invalid-configuration error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig(message.into())
    }

    /// True for defects in the calling integration rather than in the input data.
    pub fn is_contract_violation(&self) -> bool {
        matches!(self, Self::InvalidConfig(_) | Self::Config(_))
    }
}
