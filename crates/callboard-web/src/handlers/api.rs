//! JSON endpoints over the dashboard view

use crate::{
    handlers::{
        ApiError, ApiResult,
        models::{
            CallDetail, CallListResponse, CallRow, DashboardResponse, HealthResponse,
            ReloadResponse,
        },
    },
    state::AppState,
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use callboard_core::{CallId, utils::display_offset};
use callboard_dashboard::{CallStats, ChartSeries, FilterInputs, StatusFilter, filter_calls};
use chrono::{FixedOffset, Utc};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, info};
use validator::Validate;

/// Query parameters for listing calls
///
/// Either parameter overrides the view's current input for this request only.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct ListCallsQuery {
    /// Status to keep, or `"all"`
    #[validate(length(min = 1, max = 64))]
    pub status: Option<String>,

    /// Search text
    #[validate(length(max = 128))]
    pub q: Option<String>,
}

/// Partial update of the view's filter inputs
#[derive(Debug, Default, Deserialize, Validate)]
pub struct FilterUpdate {
    /// New status filter
    #[validate(length(min = 1, max = 64))]
    pub status: Option<String>,

    /// New search text
    #[validate(length(max = 128))]
    pub search: Option<String>,
}

/// Selection request
#[derive(Debug, Deserialize)]
pub struct SelectRequest {
    /// Call to select
    pub id: CallId,
}

fn offset(state: &AppState) -> FixedOffset {
    display_offset(state.config.display.utc_offset_minutes)
}

/// Health check
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let load_state = state.store().load_state();
    Json(HealthResponse {
        status: if load_state.is_failed() {
            "degraded"
        } else {
            "healthy"
        },
        version: env!("CARGO_PKG_VERSION"),
        timestamp: Utc::now(),
        load_state,
        calls: state.store().snapshot().calls.len(),
    })
}

/// Everything the page renders in one response
pub async fn dashboard(State(state): State<Arc<AppState>>) -> Json<DashboardResponse> {
    Json(DashboardResponse::new(state.view.snapshot(), offset(&state)))
}

/// Aggregate counters over the full list
pub async fn stats(State(state): State<Arc<AppState>>) -> Json<CallStats> {
    Json(state.view.stats())
}

/// Chart series over the full list
pub async fn charts(State(state): State<Arc<AppState>>) -> Json<Arc<ChartSeries>> {
    Json(state.view.charts())
}

/// Filtered call table
pub async fn list_calls(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListCallsQuery>,
) -> ApiResult<Json<CallListResponse>> {
    query.validate()?;
    let offset = offset(&state);

    if query.status.is_none() && query.q.is_none() {
        let listed = state.view.filtered_with_total();
        return Ok(Json(CallListResponse {
            filters: listed.filters,
            count: listed.calls.len(),
            calls: listed.calls.iter().map(|c| CallRow::new(c, offset)).collect(),
            total: listed.total,
        }));
    }

    let current = state.view.filters();
    let filters = FilterInputs {
        status: query.status.as_deref().map_or(current.status, StatusFilter::from),
        search: query.q.unwrap_or(current.search),
    };
    debug!(?filters, "Listing calls with request filters");

    let snapshot = state.store().snapshot();
    let calls: Vec<CallRow> = filter_calls(&snapshot.calls, &filters.status, &filters.search)
        .into_iter()
        .map(|c| CallRow::new(c, offset))
        .collect();

    Ok(Json(CallListResponse {
        filters,
        count: calls.len(),
        calls,
        total: snapshot.calls.len(),
    }))
}

/// One call with its transcript
pub async fn get_call(
    State(state): State<Arc<AppState>>,
    Path(id): Path<CallId>,
) -> ApiResult<Json<CallDetail>> {
    let call = state
        .store()
        .get(id)
        .ok_or_else(|| ApiError::not_found(format!("call {id}")))?;
    Ok(Json(CallDetail::new(&call, offset(&state))))
}

/// Change the view's status filter and/or search text
pub async fn update_filters(
    State(state): State<Arc<AppState>>,
    Json(update): Json<FilterUpdate>,
) -> ApiResult<Json<FilterInputs>> {
    update.validate()?;
    if let Some(status) = update.status {
        state.view.set_status_filter(status.as_str());
    }
    if let Some(search) = update.search {
        state.view.set_search(search);
    }
    Ok(Json(state.view.filters()))
}

/// Currently selected call
pub async fn get_selection(State(state): State<Arc<AppState>>) -> Json<Option<CallDetail>> {
    Json(
        state
            .store()
            .selected()
            .map(|c| CallDetail::new(&c, offset(&state))),
    )
}

/// Select a call from the current list
pub async fn select_call(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SelectRequest>,
) -> ApiResult<Json<CallDetail>> {
    let call = state.store().select_by_id(request.id)?;
    Ok(Json(CallDetail::new(&call, offset(&state))))
}

/// Clear the selection
pub async fn clear_selection(State(state): State<Arc<AppState>>) -> StatusCode {
    state.store().clear_selection();
    StatusCode::NO_CONTENT
}

/// Fetch the list again from the backend
pub async fn reload(State(state): State<Arc<AppState>>) -> ApiResult<Json<ReloadResponse>> {
    info!("Reload requested");
    let loaded = state.load().await.map_err(|e| ApiError::upstream(&e))?;
    Ok(Json(ReloadResponse {
        loaded,
        version: state.store().version(),
        load_state: state.store().load_state(),
    }))
}
