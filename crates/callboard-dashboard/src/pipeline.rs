//! Statistics and filtering over a call list
//!
//! Everything here is a pure function of its inputs: calling it again with the
//! same list and filters yields the same result, and the inputs are never
//! modified. Output keeps store order.

use crate::filter::StatusFilter;
use callboard_core::CallRecord;
use serde::{Deserialize, Serialize};

/// Aggregate counters shown at the top of the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CallStats {
    /// Number of calls
    pub total: usize,
    /// Calls whose status is exactly `"active"`
    pub active: usize,
    /// Calls with at least one exchange
    pub with_interactions: usize,
    /// Mean exchanges per call, one decimal; 0 for an empty list
    pub avg_interactions: f64,
}

/// Compute the aggregate counters
#[must_use]
pub fn compute_stats(calls: &[CallRecord]) -> CallStats {
    let total = calls.len();
    let active = calls.iter().filter(|c| c.is_active()).count();
    let with_interactions = calls.iter().filter(|c| c.has_interactions()).count();
    let exchanges: usize = calls.iter().map(CallRecord::interaction_count).sum();

    CallStats {
        total,
        active,
        with_interactions,
        avg_interactions: average_one_decimal(exchanges, total),
    }
}

#[allow(clippy::cast_precision_loss)]
fn average_one_decimal(sum: usize, count: usize) -> f64 {
    if count == 0 {
        return 0.0;
    }
    let mean = sum as f64 / count as f64;
    (mean * 10.0).round() / 10.0
}

/// Whether `call` matches an already lower-cased, non-empty search needle
///
/// The phone number is compared as delivered since it holds digits and
/// symbols only; the session id is lower-cased; the id is compared in decimal.
#[must_use]
pub fn matches_search(call: &CallRecord, needle: &str) -> bool {
    call.user_phone.contains(needle)
        || call.call_sid.to_lowercase().contains(needle)
        || call.id.to_string().contains(needle)
}

/// Apply the status filter, then the search text
#[must_use]
pub fn filter_calls<'a>(
    calls: &'a [CallRecord],
    status: &StatusFilter,
    search: &str,
) -> Vec<&'a CallRecord> {
    let needle = search.to_lowercase();

    calls
        .iter()
        .filter(|call| status.matches(&call.status))
        .filter(|call| needle.is_empty() || matches_search(call, &needle))
        .collect()
}

/// Distinct statuses in first-seen order, for building filter choices
#[must_use]
pub fn distinct_statuses(calls: &[CallRecord]) -> Vec<String> {
    let mut statuses: Vec<String> = Vec::new();
    for call in calls {
        if !statuses.iter().any(|s| s == &call.status) {
            statuses.push(call.status.clone());
        }
    }
    statuses
}
