//! Dashboard view: filter inputs plus memoized derived values
//!
//! Reads recompute only when the call list or a filter input changed since the
//! last read; otherwise the cached `Arc` is handed out again.

use crate::{
    charts::{ChartSeries, chart_series},
    filter::StatusFilter,
    pipeline::{CallStats, compute_stats, distinct_statuses, filter_calls},
    store::{CallSnapshot, CallStore, LoadState, StoreState},
};
use callboard_core::CallRecord;
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::trace;

/// Filter inputs of the view
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FilterInputs {
    /// Status restriction
    #[serde(default)]
    pub status: StatusFilter,
    /// Free search text
    #[serde(default)]
    pub search: String,
}

/// Everything the dashboard renders, taken at one store version
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSnapshot {
    /// Store version the snapshot was taken at
    pub version: u64,
    /// Generation of the batch every derived field was computed from
    pub generation: u64,
    /// Progress of the last fetch
    pub load_state: LoadState,
    /// Active filter inputs
    pub filters: FilterInputs,
    /// Statuses present in the list
    pub statuses: Vec<String>,
    /// Aggregate counters over the full list
    pub stats: CallStats,
    /// Chart series over the full list
    pub charts: Arc<ChartSeries>,
    /// Calls passing the filters
    pub calls: Arc<Vec<CallRecord>>,
    /// Selected call
    pub selected: Option<CallRecord>,
}

/// Filtered calls together with the size of the batch they came from
#[derive(Debug, Clone, Serialize)]
pub struct FilteredCalls {
    /// Generation of the batch
    pub generation: u64,
    /// Filter inputs applied
    pub filters: FilterInputs,
    /// Calls in the batch before filtering
    pub total: usize,
    /// Calls passing the filters
    pub calls: Arc<Vec<CallRecord>>,
}

#[derive(Debug, Default)]
struct Inputs {
    filters: FilterInputs,
    generation: u64,
}

#[derive(Debug, Default)]
struct Memo {
    stats: Option<(u64, CallStats)>,
    charts: Option<(u64, Arc<ChartSeries>)>,
    statuses: Option<(u64, Arc<Vec<String>>)>,
    filtered: Option<((u64, u64), Arc<Vec<CallRecord>>)>,
}

/// Filters and derived views over a shared [`CallStore`]
#[derive(Debug)]
pub struct DashboardView {
    store: Arc<CallStore>,
    inputs: RwLock<Inputs>,
    memo: Mutex<Memo>,
}

impl DashboardView {
    /// Create a view with the `"all"` status filter and empty search
    #[must_use]
    pub fn new(store: Arc<CallStore>) -> Self {
        Self {
            store,
            inputs: RwLock::new(Inputs::default()),
            memo: Mutex::new(Memo::default()),
        }
    }

    /// Underlying store
    #[must_use]
    pub const fn store(&self) -> &Arc<CallStore> {
        &self.store
    }

    /// Current filter inputs
    #[must_use]
    pub fn filters(&self) -> FilterInputs {
        self.inputs.read().filters.clone()
    }

    /// Change the status filter
    pub fn set_status_filter(&self, status: impl Into<StatusFilter>) {
        let status = status.into();
        self.update(|filters| {
            if filters.status == status {
                false
            } else {
                filters.status = status;
                true
            }
        });
    }

    /// Change the search text
    pub fn set_search(&self, search: impl Into<String>) {
        let search = search.into();
        self.update(|filters| {
            if filters.search == search {
                false
            } else {
                filters.search = search;
                true
            }
        });
    }

    /// Replace both inputs at once
    pub fn set_filters(&self, next: FilterInputs) {
        self.update(|filters| {
            if *filters == next {
                false
            } else {
                *filters = next;
                true
            }
        });
    }

    /// Aggregate counters over the full list
    #[must_use]
    pub fn stats(&self) -> CallStats {
        self.stats_at(&self.store.snapshot())
    }

    /// Chart series over the full list
    #[must_use]
    pub fn charts(&self) -> Arc<ChartSeries> {
        self.charts_at(&self.store.snapshot())
    }

    /// Statuses present in the list, in first-seen order
    #[must_use]
    pub fn statuses(&self) -> Arc<Vec<String>> {
        self.statuses_at(&self.store.snapshot())
    }

    /// Calls passing the current filters
    #[must_use]
    pub fn filtered_calls(&self) -> Arc<Vec<CallRecord>> {
        let (filters, filter_generation) = self.inputs();
        self.filtered_at(&self.store.snapshot(), &filters, filter_generation)
    }

    /// Calls passing the current filters, with the unfiltered count of the
    /// same batch
    #[must_use]
    pub fn filtered_with_total(&self) -> FilteredCalls {
        let snapshot = self.store.snapshot();
        let (filters, filter_generation) = self.inputs();
        FilteredCalls {
            generation: snapshot.generation,
            total: snapshot.calls.len(),
            calls: self.filtered_at(&snapshot, &filters, filter_generation),
            filters,
        }
    }

    /// Everything the dashboard renders
    #[must_use]
    pub fn snapshot(&self) -> DashboardSnapshot {
        self.snapshot_at(self.store.state())
    }

    fn snapshot_at(&self, state: StoreState) -> DashboardSnapshot {
        let (filters, filter_generation) = self.inputs();
        let list = &state.calls;
        DashboardSnapshot {
            version: state.version,
            generation: list.generation,
            load_state: state.load_state,
            statuses: self.statuses_at(list).as_ref().clone(),
            stats: self.stats_at(list),
            charts: self.charts_at(list),
            calls: self.filtered_at(list, &filters, filter_generation),
            filters,
            selected: state.selected,
        }
    }

    fn inputs(&self) -> (FilterInputs, u64) {
        let inputs = self.inputs.read();
        (inputs.filters.clone(), inputs.generation)
    }

    fn stats_at(&self, snapshot: &CallSnapshot) -> CallStats {
        let mut memo = self.memo.lock();
        if let Some((generation, stats)) = memo.stats
            && generation == snapshot.generation
        {
            return stats;
        }

        trace!(generation = snapshot.generation, "Recomputing statistics");
        let stats = compute_stats(&snapshot.calls);
        memo.stats = Some((snapshot.generation, stats));
        stats
    }

    fn charts_at(&self, snapshot: &CallSnapshot) -> Arc<ChartSeries> {
        let mut memo = self.memo.lock();
        if let Some((generation, charts)) = &memo.charts
            && *generation == snapshot.generation
        {
            return Arc::clone(charts);
        }

        trace!(generation = snapshot.generation, "Recomputing chart series");
        let charts = Arc::new(chart_series(&snapshot.calls));
        memo.charts = Some((snapshot.generation, Arc::clone(&charts)));
        charts
    }

    fn statuses_at(&self, snapshot: &CallSnapshot) -> Arc<Vec<String>> {
        let mut memo = self.memo.lock();
        if let Some((generation, statuses)) = &memo.statuses
            && *generation == snapshot.generation
        {
            return Arc::clone(statuses);
        }

        let statuses = Arc::new(distinct_statuses(&snapshot.calls));
        memo.statuses = Some((snapshot.generation, Arc::clone(&statuses)));
        statuses
    }

    fn filtered_at(
        &self,
        snapshot: &CallSnapshot,
        filters: &FilterInputs,
        filter_generation: u64,
    ) -> Arc<Vec<CallRecord>> {
        let key = (snapshot.generation, filter_generation);
        let mut memo = self.memo.lock();
        if let Some((cached_key, calls)) = &memo.filtered
            && *cached_key == key
        {
            return Arc::clone(calls);
        }

        trace!(?key, "Recomputing filtered calls");
        let calls: Vec<CallRecord> = filter_calls(&snapshot.calls, &filters.status, &filters.search)
            .into_iter()
            .cloned()
            .collect();
        let calls = Arc::new(calls);
        memo.filtered = Some((key, Arc::clone(&calls)));
        calls
    }

    fn update(&self, apply: impl FnOnce(&mut FilterInputs) -> bool) {
        let mut inputs = self.inputs.write();
        if apply(&mut inputs.filters) {
            inputs.generation += 1;
            trace!(generation = inputs.generation, "Filter inputs changed");
        }
    }
}
