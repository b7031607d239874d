//! Error types for the callboard dashboard

use std::{error::Error as StdError, fmt};

/// Main error type for callboard
#[derive(Debug)]
pub enum Error {
    /// I/O error
    Io(std::io::Error),

    /// Configuration error
    Configuration {
        /// Error message
        message: String,
    },

    /// Validation error
    Validation {
        /// Field that failed validation
        field: String,
        /// Validation error message
        message: String,
    },

    /// Backend could not be reached or answered with a transport error
    Network(String),

    /// Backend answered with a non-success status
    Http {
        /// HTTP status code
        status: u16,
        /// Short description of the failed request
        message: String,
    },

    /// Authentication error
    Authentication(String),

    /// Response payload did not match the configured contract
    UnexpectedPayload {
        /// Contract that was expected
        expected: String,
        /// Decoder message
        detail: String,
    },

    /// Timeout error
    Timeout {
        /// Timeout duration in milliseconds
        duration_ms: u64,
    },

    /// Not found error
    NotFound {
        /// Resource that was not found
        resource: String,
    },

    /// Serialization error
    Serialization(serde_json::Error),

    /// Other error
    Other(String),
}

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "I/O error: {err}"),
            Self::Configuration { message } => write!(f, "Configuration error: {message}"),
            Self::Validation { field, message } => {
                write!(f, "Validation error: {field} - {message}")
            }
            Self::Network(msg) => write!(f, "Network error: {msg}"),
            Self::Http { status, message } => write!(f, "HTTP {status}: {message}"),
            Self::Authentication(msg) => write!(f, "Authentication failed: {msg}"),
            Self::UnexpectedPayload { expected, detail } => {
                write!(f, "Unexpected response payload, expected {expected}: {detail}")
            }
            Self::Timeout { duration_ms } => {
                write!(f, "Operation timed out after {duration_ms}ms")
            }
            Self::NotFound { resource } => write!(f, "Resource not found: {resource}"),
            Self::Serialization(err) => write!(f, "Serialization error: {err}"),
            Self::Other(msg) => write!(f, "{msg}"),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Serialization(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err)
    }
}

impl From<config::ConfigError> for Error {
    fn from(err: config::ConfigError) -> Self {
        Self::Configuration {
            message: err.to_string(),
        }
    }
}

impl Error {
    /// Whether the error came from talking to the backend, as opposed to
    /// local configuration or input problems
    #[must_use]
    pub const fn is_remote(&self) -> bool {
        matches!(
            self,
            Self::Network(_)
                | Self::Http { .. }
                | Self::Authentication(_)
                | Self::UnexpectedPayload { .. }
                | Self::Timeout { .. }
        )
    }
}
