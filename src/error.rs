//! Error types for the scanner

use thiserror::Error;

/// Result type alias using our custom Error
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the scanner
#[derive(Error, Debug)]
pub enum Error {
    // Market data source errors
    #[error("Data source request failed: {0}")]
    DataSource(String),

    #[error("Data source returned status {status}: {body}")]
    DataSourceStatus { status: u16, body: String },

    // Activity oracle errors
    #[error("Activity oracle error: {0}")]
    Oracle(String),

    #[error("Activity oracle timeout after {0}ms")]
    OracleTimeout(u64),

    // Candidate errors
    #[error("Invalid candidate {pair}: {reason}")]
    InvalidCandidate { pair: String, reason: String },

    // Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl Error {
    /// Check if this error is retryable (transient)
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::DataSource(_) | Error::Oracle(_) | Error::OracleTimeout(_) => true,
            Error::DataSourceStatus { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

// Conversion from reqwest errors
impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::DataSource(e.to_string())
    }
}

// Conversion from serde_json errors
impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}
