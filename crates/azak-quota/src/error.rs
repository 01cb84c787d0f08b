//! Error types for quota operations

use thiserror::Error;

/// Quota specific errors
///
/// Storage adapters and constructors return these. The tracker itself never
/// surfaces them: every failure is logged and degrades to a fresh record.
#[derive(Debug, Error)]
pub enum QuotaError {
    /// The backing store refused a read or write
    #[error("Persistence unavailable for {key}: {reason}")]
    PersistenceUnavailable { key: String, reason: String },

    /// Persisted data did not parse as a quota record
    #[error("Malformed quota record: {0}")]
    MalformedRecord(String),

    /// Filesystem error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Stock code failed validation
    #[error("Invalid stock code: {0:?}")]
    InvalidStockCode(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl From<serde_json::Error> for QuotaError {
    fn from(err: serde_json::Error) -> Self {
        QuotaError::MalformedRecord(err.to_string())
    }
}

impl QuotaError {
    pub(crate) fn unavailable(key: &str, reason: impl Into<String>) -> Self {
        QuotaError::PersistenceUnavailable {
            key: key.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result type alias for quota operations
pub type Result<T> = std::result::Result<T, QuotaError>;
