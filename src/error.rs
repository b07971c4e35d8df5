//! Error types for the trends engine

use thiserror::Error;

pub type Result<T> = std::result::Result<T, TrendsError>;

#[derive(Debug, Error)]
pub enum TrendsError {
    /// Network or endpoint failure. `endpoint` is the request path that failed.
    #[error("Failed to fetch {endpoint}: {message}")]
    Fetch { endpoint: String, message: String },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Sync already in progress")]
    SyncInProgress,

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl TrendsError {
    pub fn fetch(endpoint: impl Into<String>, message: impl std::fmt::Display) -> Self {
        TrendsError::Fetch {
            endpoint: endpoint.into(),
            message: message.to_string(),
        }
    }

    pub fn is_fetch(&self) -> bool {
        matches!(self, TrendsError::Fetch { .. })
    }
}
