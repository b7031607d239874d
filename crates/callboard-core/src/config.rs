//! Configuration management for callboard

use crate::types::ResponseContract;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use validator::Validate;

/// Environment prefix for configuration overrides (`CALLBOARD__API__BASE_URL`, ...)
pub const ENV_PREFIX: &str = "CALLBOARD";

/// Environment variable that overrides the stored bearer token
pub const TOKEN_ENV_VAR: &str = "CALLBOARD_TOKEN";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct Config {
    /// Backend API configuration
    #[serde(default)]
    #[validate(nested)]
    pub api: ApiConfig,

    /// Authentication configuration
    #[serde(default)]
    pub auth: AuthConfig,

    /// Web server configuration
    #[serde(default)]
    #[validate(nested)]
    pub webserver: WebServerConfig,

    /// Display configuration
    #[serde(default)]
    #[validate(nested)]
    pub display: DisplayConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Backend API configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ApiConfig {
    /// Base URL of the calls backend
    #[serde(default = "default_base_url")]
    #[validate(url)]
    pub base_url: String,

    /// Path of the calls listing endpoint
    #[serde(default = "default_calls_path")]
    #[validate(length(min = 1))]
    pub calls_path: String,

    /// Request timeout in seconds
    #[serde(default = "default_request_timeout")]
    #[validate(range(min = 1, max = 600))]
    pub request_timeout: u64,

    /// Accepted response shape
    #[serde(default)]
    pub contract: ResponseContract,
}

/// Authentication configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthConfig {
    /// File holding the bearer token; defaults to the user data directory
    #[serde(default)]
    pub token_file: Option<PathBuf>,
}

/// Web server configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct WebServerConfig {
    /// Host to bind to
    #[serde(default = "default_host")]
    #[validate(length(min = 1))]
    pub host: String,

    /// Port to listen on
    #[serde(default = "default_port")]
    #[validate(range(min = 1))]
    pub port: u16,

    /// Fetch calls when the server starts
    #[serde(default = "default_load_on_start")]
    pub load_on_start: bool,
}

/// Display configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct DisplayConfig {
    /// Offset from UTC, in minutes, used when rendering times
    #[serde(default)]
    #[validate(range(min = -720, max = 840))]
    pub utc_offset_minutes: i32,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format (json or pretty)
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_base_url() -> String {
    "http://127.0.0.1:8000".to_string()
}

fn default_calls_path() -> String {
    "/api/calls".to_string()
}

const fn default_request_timeout() -> u64 {
    30
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

const fn default_port() -> u16 {
    4200
}

const fn default_load_on_start() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            calls_path: default_calls_path(),
            request_timeout: default_request_timeout(),
            contract: ResponseContract::default(),
        }
    }
}

impl Default for WebServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            load_on_start: default_load_on_start(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl ApiConfig {
    /// Full URL of the calls endpoint
    #[must_use]
    pub fn calls_url(&self) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            self.calls_path.trim_start_matches('/')
        )
    }
}

impl AuthConfig {
    /// Token file to use, falling back to `<data dir>/callboard/token`
    #[must_use]
    pub fn resolved_token_file(&self) -> Option<PathBuf> {
        self.token_file.clone().or_else(|| {
            directories::ProjectDirs::from("", "", "callboard")
                .map(|dirs| dirs.data_dir().join("token"))
        })
    }
}

impl Config {
    /// Load configuration from `callboard.*` in the working directory and the
    /// environment
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded, parsed or validated.
    pub fn load() -> crate::Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration, reading an explicit file when given
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing, or the result cannot be parsed
    /// or validated.
    pub fn load_from(path: Option<&Path>) -> crate::Result<Self> {
        let builder = match path {
            Some(path) => config::Config::builder().add_source(config::File::from(path)),
            None => config::Config::builder()
                .add_source(config::File::with_name("callboard").required(false)),
        };

        let config: Self = builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        config.check()?;
        Ok(config)
    }

    /// Validate field ranges
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Configuration`] listing the invalid fields.
    pub fn check(&self) -> crate::Result<()> {
        self.validate().map_err(|e| crate::Error::Configuration {
            message: e.to_string(),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_config_default() {
        let config = Config::default();

        assert_eq!(config.api.base_url, "http://127.0.0.1:8000");
        assert_eq!(config.api.calls_path, "/api/calls");
        assert_eq!(config.api.request_timeout, 30);
        assert_eq!(config.api.contract, ResponseContract::Auto);
        assert!(config.auth.token_file.is_none());
        assert_eq!(config.webserver.port, 4200);
        assert!(config.webserver.load_on_start);
        assert_eq!(config.display.utc_offset_minutes, 0);
        assert_eq!(config.logging.level, "info");
        assert!(config.check().is_ok());
    }

    #[test]
    fn test_calls_url_joins_slashes() {
        let api = ApiConfig {
            base_url: "https://reports.example.com/".to_string(),
            ..ApiConfig::default()
        };
        assert_eq!(api.calls_url(), "https://reports.example.com/api/calls");
    }

    #[test]
    fn test_partial_config_deserialization() {
        let json_str = r#"{
            "api": {"base_url": "https://reports.example.com", "contract": "envelope"},
            "display": {"utc_offset_minutes": -360}
        }"#;

        let config: Config = serde_json::from_str(json_str).unwrap();

        assert_eq!(config.api.base_url, "https://reports.example.com");
        assert_eq!(config.api.contract, ResponseContract::Envelope);
        assert_eq!(config.api.request_timeout, 30);
        assert_eq!(config.display.utc_offset_minutes, -360);
        assert_eq!(config.webserver.host, "127.0.0.1");
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = Config::default();
        config.api.base_url = "not a url".to_string();
        config.api.request_timeout = 0;

        let err = config.check().unwrap_err();
        assert!(matches!(err, crate::Error::Configuration { .. }));
    }

    #[test]
    fn test_explicit_token_file_wins() {
        let auth = AuthConfig {
            token_file: Some(PathBuf::from("/tmp/jwt")),
        };
        assert_eq!(auth.resolved_token_file(), Some(PathBuf::from("/tmp/jwt")));
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        let result = Config::load_from(Some(Path::new("/definitely/not/here.toml")));
        assert!(result.is_err());
    }
}
