//! Application state management

use callboard_client::ApiClient;
use callboard_core::{CallSource, Config};
use callboard_dashboard::{CallStore, DashboardView};
use std::{fmt, sync::Arc};

/// Application state holding configuration, the call source and the view
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Config,
    /// Where calls are fetched from
    pub source: Arc<dyn CallSource>,
    /// Filters and derived values over the shared store
    pub view: Arc<DashboardView>,
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState")
            .field("source", &self.source.describe())
            .field("view", &self.view)
            .finish_non_exhaustive()
    }
}

impl AppState {
    /// Create state backed by the HTTP client described in `config`
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: Config) -> callboard_core::Result<Self> {
        let client = ApiClient::from_config(&config)?;
        Ok(Self::with_source(config, Arc::new(client)))
    }

    /// Create state backed by any call source
    #[must_use]
    pub fn with_source(config: Config, source: Arc<dyn CallSource>) -> Self {
        let store = Arc::new(CallStore::new());
        Self {
            config,
            source,
            view: Arc::new(DashboardView::new(store)),
        }
    }

    /// Shared call store
    #[must_use]
    pub fn store(&self) -> &Arc<CallStore> {
        self.view.store()
    }

    /// Fetch calls into the store
    ///
    /// # Errors
    ///
    /// Returns the fetch error; the store records it in its load state.
    pub async fn load(&self) -> callboard_core::Result<usize> {
        self.store().load(self.source.as_ref()).await
    }
}
