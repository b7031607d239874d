//! HTTP handlers

pub mod api;
pub mod error;
pub mod models;
pub mod pages;

pub use error::{ApiError, ApiResult};
