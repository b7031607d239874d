//! Core types and utilities for the callboard dashboard

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    rust_2018_idioms
)]

pub mod config;
pub mod error;
pub mod source;
pub mod types;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use error::{Error, Result};
pub use source::{CallSource, StaticSource};
pub use types::{ACTIVE_STATUS, CallId, CallRecord, CallsPayload, InteractionExchange, ResponseContract};

/// Initialize the logging system
///
/// `RUST_LOG` takes precedence over `level`. `format` selects `json` or
/// human-readable output. Logs are written to stderr so stdout stays usable
/// for command output.
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed.
pub fn init_logging(level: &str, format: &str) -> Result<()> {
    use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let registry = tracing_subscriber::registry().with(filter);

    let installed = if format.eq_ignore_ascii_case("json") {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .try_init()
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr),
            )
            .try_init()
    };

    installed.map_err(|e| Error::Configuration {
        message: format!("failed to initialize logging: {e}"),
    })
}
