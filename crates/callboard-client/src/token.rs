//! Persistent bearer token storage
//!
//! The token lives in a small file so it survives restarts, the same way a
//! browser dashboard keeps its JWT in local storage. It is read again on every
//! request, so replacing the file takes effect without restarting anything.

use crate::error::{ClientError, ClientResult};
use callboard_core::config::{AuthConfig, TOKEN_ENV_VAR};
use std::{
    fs, io,
    path::{Path, PathBuf},
};
use tracing::debug;

/// Location of the bearer token
#[derive(Debug, Clone, Default)]
pub struct TokenStore {
    path: Option<PathBuf>,
    env_var: Option<String>,
}

impl TokenStore {
    /// Token store described by the auth configuration, honouring `CALLBOARD_TOKEN`
    #[must_use]
    pub fn from_config(auth: &AuthConfig) -> Self {
        Self {
            path: auth.resolved_token_file(),
            env_var: Some(TOKEN_ENV_VAR.to_string()),
        }
    }

    /// Token store backed only by `path`
    #[must_use]
    pub fn at_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            env_var: None,
        }
    }

    /// Store that never yields a token
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            path: None,
            env_var: None,
        }
    }

    /// Backing file, if any
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Read the current token
    ///
    /// A missing or blank file means "no token".
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read.
    pub fn current(&self) -> ClientResult<Option<String>> {
        if let Some(var) = &self.env_var
            && let Ok(value) = std::env::var(var)
            && !value.trim().is_empty()
        {
            return Ok(Some(value.trim().to_string()));
        }

        let Some(path) = &self.path else {
            return Ok(None);
        };

        match fs::read_to_string(path) {
            Ok(contents) => {
                let token = contents.trim();
                Ok((!token.is_empty()).then(|| token.to_string()))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(ClientError::TokenStore {
                path: path.clone(),
                source,
            }),
        }
    }

    /// Persist `token`, creating parent directories as needed
    ///
    /// # Errors
    ///
    /// Returns an error if no location is configured or the write fails.
    pub fn save(&self, token: &str) -> ClientResult<PathBuf> {
        let path = self.path.clone().ok_or(ClientError::NoTokenLocation)?;
        let io_err = |source| ClientError::TokenStore {
            path: path.clone(),
            source,
        };

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        fs::write(&path, format!("{}\n", token.trim())).map_err(io_err)?;

        debug!(path = %path.display(), "Stored bearer token");
        Ok(path)
    }

    /// Remove the stored token; returns whether a file was deleted
    ///
    /// # Errors
    ///
    /// Returns an error if no location is configured or removal fails.
    pub fn clear(&self) -> ClientResult<bool> {
        let path = self.path.as_ref().ok_or(ClientError::NoTokenLocation)?;
        match fs::remove_file(path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(source) => Err(ClientError::TokenStore {
                path: path.clone(),
                source,
            }),
        }
    }
}
