//! Error types for repo-contents

use thiserror::Error;

/// Network-level failure talking to the contents API.
///
/// Distinct from a non-2xx response: a `TransportError` means no HTTP
/// response was obtained at all (DNS, TLS, connection reset, unreadable body).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct TransportError {
    pub message: String,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        TransportError::new(err.to_string())
    }
}

/// Errors that can occur while setting up or using the contents client
#[derive(Error, Debug)]
pub enum ContentsError {
    /// HTTP client could not be constructed
    #[error("HTTP client setup failed: {0}")]
    ClientSetup(String),

    /// Credential is missing or unusable as a header value
    #[error("Invalid credential: {0}")]
    InvalidCredential(String),

    /// Transport failure
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    /// Repository is not reachable with the configured credential
    #[error("Repository {repository} rejected access (HTTP {status}): {message}")]
    AccessDenied {
        repository: String,
        status: u16,
        message: String,
    },
}

impl From<reqwest::Error> for ContentsError {
    fn from(err: reqwest::Error) -> Self {
        ContentsError::ClientSetup(err.to_string())
    }
}
