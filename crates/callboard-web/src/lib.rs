//! callboard web interface
//!
//! Serves the dashboard page and the JSON views it renders: statistics, the
//! filtered call list, chart series and the selected call.

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    rust_2018_idioms
)]

pub mod handlers;
pub mod routes;
pub mod server;
pub mod state;

pub use server::build_app;
pub use state::AppState;
