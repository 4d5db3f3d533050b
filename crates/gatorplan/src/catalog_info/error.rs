//! Error types for the catalog lookup subsystem.

use thiserror::Error;

/// Errors that can occur while fetching or parsing catalog pages.
///
/// These never escape [`CatalogClient::lookup`](super::CatalogClient::lookup),
/// which degrades to a placeholder record instead.
#[derive(Debug, Error, Clone)]
pub enum CatalogInfoError {
    /// Network/HTTP request failed
    #[error("Network error: {message}")]
    Network { message: String },

    /// Server answered with a non-success status
    #[error("Unexpected status {status} from {url}")]
    Status { status: u16, url: String },

    /// Failed to parse HTML content
    #[error("Parse error: {message}")]
    ParseError { message: String },

    /// URL parsing/construction failed
    #[error("URL error: {message}")]
    UrlError { message: String },

    /// Circuit breaker is open due to repeated failures
    #[error("Circuit breaker open - too many recent failures")]
    CircuitBreakerOpen,
}

impl CatalogInfoError {
    /// Returns true if this error is potentially transient and counts toward
    /// the circuit breaker.
    pub fn is_retryable(&self) -> bool {
        match self {
            CatalogInfoError::Network { .. } => true,
            CatalogInfoError::Status { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }
}

impl From<reqwest::Error> for CatalogInfoError {
    fn from(err: reqwest::Error) -> Self {
        CatalogInfoError::Network {
            message: err.to_string(),
        }
    }
}

impl From<url::ParseError> for CatalogInfoError {
    fn from(err: url::ParseError) -> Self {
        CatalogInfoError::UrlError {
            message: err.to_string(),
        }
    }
}
