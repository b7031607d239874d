//! Error types for the calls backend client

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for client operations
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors raised while talking to the calls backend
#[derive(Error, Debug)]
pub enum ClientError {
    /// Request could not be sent or the connection failed
    #[error("Failed to reach calls backend: {0}")]
    Transport(#[source] reqwest::Error),

    /// Request exceeded the configured timeout
    #[error("Calls request timed out after {seconds} seconds")]
    Timeout {
        /// Timeout duration
        seconds: u64,
    },

    /// Backend rejected the bearer token
    #[error("Backend rejected credentials ({status})")]
    Unauthorized {
        /// HTTP status code
        status: u16,
    },

    /// Backend answered with a non-success status
    #[error("Backend returned status {status} for {url}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Requested URL
        url: String,
    },

    /// Body could not be read
    #[error("Failed to read response body: {0}")]
    Body(#[source] reqwest::Error),

    /// Token file could not be read or written
    #[error("Token store error at {path}: {source}")]
    TokenStore {
        /// Token file
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// No location is configured for the token
    #[error("No token file location could be determined")]
    NoTokenLocation,

    /// Client could not be constructed
    #[error("Invalid client configuration: {message}")]
    Configuration {
        /// Error message
        message: String,
    },
}

impl From<ClientError> for callboard_core::Error {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Transport(e) => Self::Network(e.to_string()),
            ClientError::Timeout { seconds } => Self::Timeout {
                duration_ms: seconds.saturating_mul(1000),
            },
            ClientError::Unauthorized { status } => {
                Self::Authentication(format!("backend answered {status}"))
            }
            ClientError::Status { status, url } => Self::Http {
                status,
                message: format!("GET {url}"),
            },
            ClientError::Body(e) => Self::Network(e.to_string()),
            ClientError::TokenStore { source, .. } => Self::Io(source),
            other @ (ClientError::NoTokenLocation | ClientError::Configuration { .. }) => {
                Self::Configuration {
                    message: other.to_string(),
                }
            }
        }
    }
}
