//! Route definitions for the web interface

use crate::{
    handlers::{api, pages},
    state::AppState,
};
use axum::{
    Router,
    routing::{get, post, put},
};
use std::sync::Arc;

/// Build the complete web application router
pub fn build_routes() -> Router<Arc<AppState>> {
    Router::new()
        // Page routes
        .route("/", get(pages::dashboard))
        // Derived views
        .route("/api/dashboard", get(api::dashboard))
        .route("/api/stats", get(api::stats))
        .route("/api/charts", get(api::charts))
        .route("/api/calls", get(api::list_calls))
        .route("/api/calls/:id", get(api::get_call))
        // View inputs
        .route("/api/filters", put(api::update_filters))
        .route(
            "/api/selection",
            get(api::get_selection)
                .put(api::select_call)
                .delete(api::clear_selection),
        )
        .route("/api/reload", post(api::reload))
        // Health check
        .route("/health", get(api::health_check))
}
