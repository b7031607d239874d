//! HTTP client for the calls backend

use crate::{
    error::{ClientError, ClientResult},
    token::TokenStore,
};
use async_trait::async_trait;
use callboard_core::{
    CallRecord, CallSource, CallsPayload, Config, ResponseContract, config::ApiConfig,
};
use reqwest::{Client, StatusCode, header};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// API client for the calls backend
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    calls_url: String,
    timeout_secs: u64,
    contract: ResponseContract,
    tokens: TokenStore,
}

impl ApiClient {
    /// Create a client from the API section of the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(api: &ApiConfig, tokens: TokenStore) -> ClientResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(api.request_timeout))
            .user_agent(concat!("callboard/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ClientError::Configuration {
                message: e.to_string(),
            })?;

        Ok(Self {
            client,
            calls_url: api.calls_url(),
            timeout_secs: api.request_timeout,
            contract: api.contract,
            tokens,
        })
    }

    /// Create a client using the full configuration, including the token store
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn from_config(config: &Config) -> ClientResult<Self> {
        Self::new(&config.api, TokenStore::from_config(&config.auth))
    }

    /// URL of the calls endpoint
    #[must_use]
    pub fn calls_url(&self) -> &str {
        &self.calls_url
    }

    /// Response contract in force
    #[must_use]
    pub const fn contract(&self) -> ResponseContract {
        self.contract
    }

    /// Token store used for the `Authorization` header
    #[must_use]
    pub const fn tokens(&self) -> &TokenStore {
        &self.tokens
    }

    /// Fetch the raw calls payload
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, timeout, non-success status, or
    /// when the token file cannot be read.
    pub async fn get_calls_payload(&self) -> callboard_core::Result<CallsPayload> {
        let body = self.get_calls_body().await?;
        CallsPayload::parse(&body, self.contract)
    }

    /// Fetch calls and normalize them to a list
    ///
    /// # Errors
    ///
    /// Same as [`Self::get_calls_payload`], plus duplicate identifiers.
    pub async fn get_calls(&self) -> callboard_core::Result<Vec<CallRecord>> {
        let calls = self.get_calls_payload().await?.into_calls()?;
        debug!(count = calls.len(), "Decoded calls payload");
        Ok(calls)
    }

    async fn get_calls_body(&self) -> ClientResult<Vec<u8>> {
        let mut request = self
            .client
            .get(&self.calls_url)
            .header(header::ACCEPT, "application/json");

        match self.tokens.current()? {
            Some(token) => request = request.bearer_auth(token),
            None => debug!("No bearer token available, sending anonymous request"),
        }

        let started = Instant::now();
        let response = request.send().await.map_err(|e| self.map_send_error(e))?;
        let status = response.status();

        info!(
            url = %self.calls_url,
            status = status.as_u16(),
            elapsed_ms = started.elapsed().as_millis(),
            "Calls request completed"
        );

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            warn!(status = status.as_u16(), "Backend rejected credentials");
            return Err(ClientError::Unauthorized {
                status: status.as_u16(),
            });
        }

        if !status.is_success() {
            return Err(ClientError::Status {
                status: status.as_u16(),
                url: self.calls_url.clone(),
            });
        }

        let body = response.bytes().await.map_err(|e| self.map_body_error(e))?;
        Ok(body.to_vec())
    }

    fn map_send_error(&self, err: reqwest::Error) -> ClientError {
        if err.is_timeout() {
            ClientError::Timeout {
                seconds: self.timeout_secs,
            }
        } else {
            ClientError::Transport(err)
        }
    }

    fn map_body_error(&self, err: reqwest::Error) -> ClientError {
        if err.is_timeout() {
            ClientError::Timeout {
                seconds: self.timeout_secs,
            }
        } else {
            ClientError::Body(err)
        }
    }
}

#[async_trait]
impl CallSource for ApiClient {
    async fn fetch_calls(&self) -> callboard_core::Result<Vec<CallRecord>> {
        self.get_calls().await
    }

    fn describe(&self) -> String {
        format!("GET {} ({} contract)", self.calls_url, self.contract)
    }
}
