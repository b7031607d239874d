//! HTTP client for the calls backend
//!
//! Issues the single `GET` the dashboard needs, attaches the stored bearer
//! token, and decodes the response under the configured contract.

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    rust_2018_idioms
)]

pub mod client;
pub mod error;
pub mod token;

pub use client::ApiClient;
pub use error::{ClientError, ClientResult};
pub use token::TokenStore;
