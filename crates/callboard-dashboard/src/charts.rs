//! Chart-ready series derived from the call list

use callboard_core::{CallId, CallRecord};
use serde::{Deserialize, Serialize};

/// Number of calls shown in the recent-volume bar series
pub const RECENT_CALLS: usize = 10;

/// Maximum number of buckets in the volume trend
pub const TREND_BUCKETS: usize = 10;

/// Two-bucket status proportion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StatusSplit {
    /// Calls with status `"active"`
    pub active: usize,
    /// Every other call
    pub others: usize,
}

/// One bar of the recent-volume series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractionVolume {
    /// Call identifier
    pub id: CallId,
    /// Number of exchanges in the call
    pub interactions: usize,
}

/// One bucket of the volume trend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendBucket {
    /// `"<first id>-<last id>"`
    pub label: String,
    /// Calls in the bucket
    pub count: usize,
}

/// Volume trend across the identifier range
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct VolumeTrend {
    /// Chunk size used to cut the list
    pub step: usize,
    /// At most [`TREND_BUCKETS`] buckets in store order
    pub buckets: Vec<TrendBucket>,
    /// Calls after the last emitted bucket
    pub omitted: usize,
}

/// All chart series for one call list
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ChartSeries {
    /// Active vs. other calls
    pub status_split: StatusSplit,
    /// Exchanges per call for the first calls in store order
    pub recent_volumes: Vec<InteractionVolume>,
    /// Coarse density histogram
    pub volume_trend: VolumeTrend,
}

/// Count active calls against everything else
#[must_use]
pub fn status_split(calls: &[CallRecord]) -> StatusSplit {
    let active = calls.iter().filter(|c| c.is_active()).count();
    StatusSplit {
        active,
        others: calls.len() - active,
    }
}

/// Pair the first [`RECENT_CALLS`] calls with their exchange counts
#[must_use]
pub fn recent_interaction_volumes(calls: &[CallRecord]) -> Vec<InteractionVolume> {
    calls
        .iter()
        .take(RECENT_CALLS)
        .map(|c| InteractionVolume {
            id: c.id,
            interactions: c.interaction_count(),
        })
        .collect()
}

/// Cut the list into chunks of `max(1, total / 10)` and label each chunk by
/// its first and last identifier, keeping at most [`TREND_BUCKETS`] chunks
#[must_use]
pub fn volume_trend(calls: &[CallRecord]) -> VolumeTrend {
    let step = (calls.len() / TREND_BUCKETS).max(1);

    let buckets: Vec<TrendBucket> = calls
        .chunks(step)
        .take(TREND_BUCKETS)
        .filter_map(|chunk| {
            let (first, last) = (chunk.first()?, chunk.last()?);
            Some(TrendBucket {
                label: format!("{}-{}", first.id, last.id),
                count: chunk.len(),
            })
        })
        .collect();

    let covered: usize = buckets.iter().map(|b| b.count).sum();

    VolumeTrend {
        step,
        buckets,
        omitted: calls.len() - covered,
    }
}

/// Compute every chart series
#[must_use]
pub fn chart_series(calls: &[CallRecord]) -> ChartSeries {
    ChartSeries {
        status_split: status_split(calls),
        recent_volumes: recent_interaction_volumes(calls),
        volume_trend: volume_trend(calls),
    }
}
