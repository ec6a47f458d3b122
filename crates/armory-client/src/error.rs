//! Error types for regional API operations

use reqwest::StatusCode;
use thiserror::Error;

use crate::config::ConfigError;
use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum ArmoryError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Unknown region: {0}")]
    UnknownRegion(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP status {status} for {endpoint}")]
    HttpStatus {
        endpoint: String,
        status: StatusCode,
    },

    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Unexpected response from {endpoint}: {reason}")]
    UnexpectedResponse { endpoint: String, reason: String },

    #[error("Cache error: {0}")]
    Store(#[from] StoreError),
}

impl ArmoryError {
    /// Create an HTTP status error for an endpoint
    pub fn http_status(endpoint: impl Into<String>, status: StatusCode) -> Self {
        Self::HttpStatus {
            endpoint: endpoint.into(),
            status,
        }
    }

    /// Create an unexpected response error for an endpoint
    pub fn unexpected_response(endpoint: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::UnexpectedResponse {
            endpoint: endpoint.into(),
            reason: reason.into(),
        }
    }

    /// Whether the error came from configuration loading
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }
}

pub type Result<T> = std::result::Result<T, ArmoryError>;
