//! Enrichment error types

use thiserror::Error;

/// Errors raised while fetching or interpreting provider data
#[derive(Debug, Error)]
pub enum EnrichmentError {
    /// HTTP request failed before a response arrived
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Provider answered with a non-success status
    #[error("HTTP {status}: {message}")]
    HttpStatus { status: u16, message: String },

    /// Response body could not be interpreted
    #[error("Invalid provider payload: {0}")]
    InvalidPayload(String),

    /// Request exceeded its timeout
    #[error("Request timeout")]
    Timeout,

    /// Retry budget spent
    #[error("Gave up after {attempts} attempts: {last_error}")]
    RetriesExhausted { attempts: u32, last_error: String },

    /// Provider configuration is unusable
    #[error("Invalid provider configuration: {0}")]
    InvalidConfig(String),
}

impl EnrichmentError {
    /// Whether another attempt may succeed.
    ///
    /// Any failure of the remote side counts, including non-success statuses
    /// and malformed payloads. Only local configuration problems and an
    /// already exhausted budget are final.
    pub fn is_retriable(&self) -> bool {
        match self {
            EnrichmentError::Request(_)
            | EnrichmentError::HttpStatus { .. }
            | EnrichmentError::InvalidPayload(_)
            | EnrichmentError::Timeout => true,

            EnrichmentError::RetriesExhausted { .. } | EnrichmentError::InvalidConfig(_) => false,
        }
    }
}

/// Result type for enrichment operations
pub type Result<T> = std::result::Result<T, EnrichmentError>;
