//! In-memory call store
//!
//! Holds the latest fetched batch and the selected call. Every mutation runs
//! under the version channel's write lock and bumps the store version, so a
//! [`StoreState`] read never mixes two versions and subscribers know when to
//! recompute.

use arc_swap::ArcSwap;
use callboard_core::{CallId, CallRecord, CallSource, Error, Result, types::ensure_unique_ids};
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::{Mutex, watch};
use tracing::{debug, info, warn};

/// Progress of the most recent fetch
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum LoadState {
    /// Nothing requested yet
    #[default]
    Idle,
    /// A fetch is in flight
    Loading,
    /// The last fetch replaced the list
    Loaded {
        /// Calls received
        count: usize,
        /// Completion time
        at: DateTime<Utc>,
    },
    /// The last fetch failed; the previous list is still in place
    Failed {
        /// Error description
        message: String,
        /// Failure time
        at: DateTime<Utc>,
    },
}

impl LoadState {
    /// Whether the last fetch failed
    #[must_use]
    pub const fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

/// Immutable view of one fetched batch
#[derive(Debug, Clone, Default)]
pub struct CallSnapshot {
    /// Increments every time the list is replaced
    pub generation: u64,
    /// Calls in delivery order
    pub calls: Vec<CallRecord>,
    /// When the batch was stored
    pub fetched_at: Option<DateTime<Utc>>,
}

/// Store contents read at one version
#[derive(Debug, Clone)]
pub struct StoreState {
    /// Store version of the read
    pub version: u64,
    /// Current batch
    pub calls: Arc<CallSnapshot>,
    /// Selected call
    pub selected: Option<CallRecord>,
    /// Progress of the most recent fetch
    pub load_state: LoadState,
}

/// Owner of the call list and the current selection
#[derive(Debug)]
pub struct CallStore {
    snapshot: ArcSwap<CallSnapshot>,
    selected: RwLock<Option<CallRecord>>,
    load_state: RwLock<LoadState>,
    load_lock: Mutex<()>,
    version: watch::Sender<u64>,
}

impl Default for CallStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CallStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        let (version, _) = watch::channel(0);
        Self {
            snapshot: ArcSwap::from_pointee(CallSnapshot::default()),
            selected: RwLock::new(None),
            load_state: RwLock::new(LoadState::Idle),
            load_lock: Mutex::new(()),
            version,
        }
    }

    /// Fetch from `source` and replace the stored list
    ///
    /// Concurrent callers are serialized, so at most one fetch is in flight.
    /// On failure the previous list stays in place and the load state records
    /// the error.
    ///
    /// # Errors
    ///
    /// Returns the source error, or a validation error for duplicate ids.
    pub async fn load(&self, source: &dyn CallSource) -> Result<usize> {
        let _guard = self.load_lock.lock().await;
        self.set_load_state(LoadState::Loading);
        info!(source = %source.describe(), "Loading calls");

        let result = match source.fetch_calls().await {
            Ok(calls) => self.replace(calls),
            Err(e) => Err(e),
        };

        match &result {
            Ok(count) => {
                info!(count, "Calls loaded");
                self.set_load_state(LoadState::Loaded {
                    count: *count,
                    at: Utc::now(),
                });
            }
            Err(e) => {
                warn!(error = %e, "Failed to load calls");
                self.set_load_state(LoadState::Failed {
                    message: e.to_string(),
                    at: Utc::now(),
                });
            }
        }

        result
    }

    /// Replace the whole list
    ///
    /// # Errors
    ///
    /// Returns a validation error if two calls share an identifier; the
    /// stored list is left untouched in that case.
    pub fn replace(&self, calls: Vec<CallRecord>) -> Result<usize> {
        ensure_unique_ids(&calls)?;
        let count = calls.len();
        let mut generation = 0;

        self.mutate(|| {
            generation = self.snapshot.load().generation + 1;
            self.snapshot.store(Arc::new(CallSnapshot {
                generation,
                calls,
                fetched_at: Some(Utc::now()),
            }));
        });
        debug!(generation, count, "Replaced call snapshot");
        Ok(count)
    }

    /// Current batch
    #[must_use]
    pub fn snapshot(&self) -> Arc<CallSnapshot> {
        self.snapshot.load_full()
    }

    /// Look up a call in the current batch
    #[must_use]
    pub fn get(&self, id: CallId) -> Option<CallRecord> {
        self.snapshot.load().calls.iter().find(|c| c.id == id).cloned()
    }

    /// Select a call by value; it is not checked against the current list
    pub fn select(&self, call: CallRecord) {
        debug!(id = call.id, "Selected call");
        self.mutate(|| *self.selected.write() = Some(call));
    }

    /// Select the call with `id` from the current batch
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] when no call has that id.
    pub fn select_by_id(&self, id: CallId) -> Result<CallRecord> {
        let call = self.get(id).ok_or_else(|| Error::NotFound {
            resource: format!("call {id}"),
        })?;
        self.select(call.clone());
        Ok(call)
    }

    /// Clear the selection; returns the previously selected call
    pub fn clear_selection(&self) -> Option<CallRecord> {
        let mut previous = None;
        self.version.send_if_modified(|version| {
            previous = self.selected.write().take();
            if previous.is_some() {
                *version += 1;
            }
            previous.is_some()
        });
        previous
    }

    /// Currently selected call
    #[must_use]
    pub fn selected(&self) -> Option<CallRecord> {
        self.selected.read().clone()
    }

    /// Progress of the most recent fetch
    #[must_use]
    pub fn load_state(&self) -> LoadState {
        self.load_state.read().clone()
    }

    /// Monotonic counter bumped on every mutation
    #[must_use]
    pub fn version(&self) -> u64 {
        *self.version.borrow()
    }

    /// List, selection and load state as of a single version
    #[must_use]
    pub fn state(&self) -> StoreState {
        let version = self.version.borrow();
        StoreState {
            version: *version,
            calls: self.snapshot.load_full(),
            selected: self.selected(),
            load_state: self.load_state(),
        }
    }

    /// Receive a notification on every mutation
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.version.subscribe()
    }

    fn set_load_state(&self, state: LoadState) {
        self.mutate(|| *self.load_state.write() = state);
    }

    /// Apply `change` and bump the version under the channel's write lock
    fn mutate(&self, change: impl FnOnce()) {
        self.version.send_modify(|version| {
            change();
            *version += 1;
        });
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing, clippy::panic)]
mod tests {
    use super::*;
    use crate::test_support::{call, sequential};
    use async_trait::async_trait;
    use callboard_core::StaticSource;
    use pretty_assertions::assert_eq;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct FailingSource;

    #[async_trait]
    impl CallSource for FailingSource {
        async fn fetch_calls(&self) -> Result<Vec<CallRecord>> {
            Err(Error::Network("connection refused".to_string()))
        }

        fn describe(&self) -> String {
            "failing".to_string()
        }
    }

    /// Records the peak number of overlapping fetches
    #[derive(Default)]
    struct SlowSource {
        in_flight: AtomicUsize,
        peak: AtomicUsize,
    }

    #[async_trait]
    impl CallSource for SlowSource {
        async fn fetch_calls(&self) -> Result<Vec<CallRecord>> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(20)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            Ok(sequential(3, "active"))
        }

        fn describe(&self) -> String {
            "slow".to_string()
        }
    }

    #[tokio::test]
    async fn test_load_replaces_list() {
        let store = CallStore::new();
        store.replace(sequential(5, "ended")).unwrap();

        let count = store
            .load(&StaticSource::new(vec![call(42, "active")]))
            .await
            .unwrap();

        assert_eq!(count, 1);
        let snapshot = store.snapshot();
        assert_eq!(snapshot.generation, 2);
        assert_eq!(snapshot.calls.len(), 1);
        assert_eq!(snapshot.calls[0].id, 42);
        assert!(matches!(store.load_state(), LoadState::Loaded { count: 1, .. }));
    }

    #[tokio::test]
    async fn test_failed_load_keeps_previous_list() {
        let store = CallStore::new();
        store.replace(sequential(3, "active")).unwrap();

        let err = store.load(&FailingSource).await.unwrap_err();

        assert!(err.is_remote());
        assert_eq!(store.snapshot().calls.len(), 3);
        match store.load_state() {
            LoadState::Failed { message, .. } => assert!(message.contains("connection refused")),
            other => panic!("unexpected state {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_duplicate_batch_rejected() {
        let store = CallStore::new();
        let err = store
            .load(&StaticSource::new(vec![call(1, "a"), call(1, "b")]))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Validation { .. }));
        assert!(store.snapshot().calls.is_empty());
        assert!(store.load_state().is_failed());
    }

    #[tokio::test]
    async fn test_loads_do_not_overlap() {
        let store = Arc::new(CallStore::new());
        let source = Arc::new(SlowSource::default());

        let tasks: Vec<_> = (0..4)
            .map(|_| {
                let store = Arc::clone(&store);
                let source = Arc::clone(&source);
                tokio::spawn(async move { store.load(source.as_ref()).await })
            })
            .collect();
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        assert_eq!(source.peak.load(Ordering::SeqCst), 1);
        assert_eq!(store.snapshot().generation, 4);
    }

    #[test]
    fn test_concurrent_replace_publishes_distinct_generations() {
        let store = CallStore::new();

        std::thread::scope(|scope| {
            for batch in 0..8 {
                let store = &store;
                scope.spawn(move || {
                    for round in 0..25 {
                        store
                            .replace(vec![call(batch * 100 + round, "active")])
                            .unwrap();
                    }
                });
            }
        });

        assert_eq!(store.snapshot().generation, 200);
        assert_eq!(store.version(), 200);
    }

    #[test]
    fn test_state_reads_one_version() {
        let store = CallStore::new();
        store.replace(sequential(3, "active")).unwrap();
        store.select_by_id(3).unwrap();

        let state = store.state();
        assert_eq!(state.version, store.version());
        assert_eq!(state.calls.generation, 1);
        assert_eq!(state.calls.calls.len(), 3);
        assert_eq!(state.selected.map(|c| c.id), Some(3));
        assert_eq!(state.load_state, LoadState::Idle);
    }

    #[test]
    fn test_selection_is_a_value_copy() {
        let store = CallStore::new();
        store.replace(sequential(3, "active")).unwrap();

        let selected = store.select_by_id(2).unwrap();
        store.replace(Vec::new()).unwrap();

        assert_eq!(store.selected(), Some(selected));
        assert_eq!(store.clear_selection().map(|c| c.id), Some(2));
        assert!(store.selected().is_none());
        assert!(store.clear_selection().is_none());
    }

    #[test]
    fn test_select_unknown_id() {
        let store = CallStore::new();
        assert!(matches!(store.select_by_id(9), Err(Error::NotFound { .. })));
        assert!(store.selected().is_none());
    }

    #[test]
    fn test_select_call_not_in_list() {
        let store = CallStore::new();
        store.select(call(77, "ended"));
        assert_eq!(store.selected().map(|c| c.id), Some(77));
    }

    #[tokio::test]
    async fn test_subscribers_see_mutations() {
        let store = CallStore::new();
        let mut rx = store.subscribe();
        let before = *rx.borrow_and_update();

        store.replace(sequential(2, "active")).unwrap();
        rx.changed().await.unwrap();
        assert!(*rx.borrow_and_update() > before);

        store.select(call(1, "active"));
        assert!(rx.has_changed().unwrap());
        assert_eq!(store.version(), *rx.borrow());
    }
}
