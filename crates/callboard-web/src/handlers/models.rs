//! Response bodies with display-ready fields

use callboard_core::{
    CallId, CallRecord, InteractionExchange,
    utils::{format_duration, format_phone, format_start_time, format_timestamp},
};
use callboard_dashboard::{CallStats, ChartSeries, DashboardSnapshot, FilterInputs, LoadState};
use chrono::FixedOffset;
use serde::Serialize;
use std::sync::Arc;

/// One row of the call table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CallRow {
    /// Call identifier
    pub id: CallId,
    /// Status tag as delivered
    pub status: String,
    /// Whether the status counts as active
    pub active: bool,
    /// Grouped phone number
    pub phone: String,
    /// Localized start time, or a dash
    pub started: String,
    /// `m:ss`, or a dash while ongoing
    pub duration: String,
    /// Number of exchanges
    pub interactions: usize,
    /// Detected intent
    pub intent: Option<String>,
}

impl CallRow {
    /// Render a record for the table
    #[must_use]
    pub fn new(call: &CallRecord, offset: FixedOffset) -> Self {
        Self {
            id: call.id,
            status: call.status.clone(),
            active: call.is_active(),
            phone: format_phone(&call.user_phone),
            started: call
                .start_time
                .as_deref()
                .map_or_else(|| "-".to_string(), |s| format_start_time(s, offset)),
            duration: format_duration(call.duration),
            interactions: call.interaction_count(),
            intent: call.user_intent.clone(),
        }
    }
}

/// One transcript exchange with its local time
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExchangeView {
    /// `HH:MM:SS`
    pub time: String,
    /// Human utterance
    pub user: String,
    /// Agent utterance
    pub ai: String,
}

impl ExchangeView {
    fn new(exchange: &InteractionExchange, offset: FixedOffset) -> Self {
        Self {
            time: format_timestamp(exchange.timestamp, offset),
            user: exchange.user.clone(),
            ai: exchange.ai.clone(),
        }
    }
}

/// Full detail of one call
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CallDetail {
    /// Table fields
    #[serde(flatten)]
    pub row: CallRow,
    /// Telephony session identifier
    pub call_sid: String,
    /// Transcript in delivery order
    pub transcript: Vec<ExchangeView>,
}

impl CallDetail {
    /// Render a record with its transcript
    #[must_use]
    pub fn new(call: &CallRecord, offset: FixedOffset) -> Self {
        Self {
            row: CallRow::new(call, offset),
            call_sid: call.call_sid.clone(),
            transcript: call
                .interaction_log
                .iter()
                .map(|e| ExchangeView::new(e, offset))
                .collect(),
        }
    }
}

/// Filtered call table
#[derive(Debug, Clone, Serialize)]
pub struct CallListResponse {
    /// Filters the list was computed with
    pub filters: FilterInputs,
    /// Rows passing the filters
    pub calls: Vec<CallRow>,
    /// Number of rows returned
    pub count: usize,
    /// Number of calls in the store
    pub total: usize,
}

/// Everything the dashboard page renders
#[derive(Debug, Clone, Serialize)]
pub struct DashboardResponse {
    /// Store version
    pub version: u64,
    /// Batch generation the counters, charts and rows were computed from
    pub generation: u64,
    /// Progress of the last fetch
    pub load_state: LoadState,
    /// Active filters
    pub filters: FilterInputs,
    /// Statuses offered by the status selector
    pub statuses: Vec<String>,
    /// Aggregate counters
    pub stats: CallStats,
    /// Chart series
    pub charts: Arc<ChartSeries>,
    /// Filtered rows
    pub calls: Vec<CallRow>,
    /// Selected call
    pub selected: Option<CallDetail>,
}

impl DashboardResponse {
    /// Render a view snapshot
    #[must_use]
    pub fn new(snapshot: DashboardSnapshot, offset: FixedOffset) -> Self {
        Self {
            version: snapshot.version,
            generation: snapshot.generation,
            load_state: snapshot.load_state,
            filters: snapshot.filters,
            statuses: snapshot.statuses,
            stats: snapshot.stats,
            charts: snapshot.charts,
            calls: snapshot
                .calls
                .iter()
                .map(|c| CallRow::new(c, offset))
                .collect(),
            selected: snapshot
                .selected
                .as_ref()
                .map(|c| CallDetail::new(c, offset)),
        }
    }
}

/// Result of a manual reload
#[derive(Debug, Clone, Serialize)]
pub struct ReloadResponse {
    /// Calls received
    pub loaded: usize,
    /// Store version after the reload
    pub version: u64,
    /// Load state after the reload
    pub load_state: LoadState,
}

/// Health check body
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// `"healthy"`, or `"degraded"` after a failed fetch
    pub status: &'static str,
    /// Service version
    pub version: &'static str,
    /// Time of the check
    pub timestamp: chrono::DateTime<chrono::Utc>,
    /// Progress of the last fetch
    pub load_state: LoadState,
    /// Calls held in the store
    pub calls: usize,
}
