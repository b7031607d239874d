//! Seam between the call store and whatever produces call batches

use crate::{Result, types::CallRecord};
use async_trait::async_trait;

/// Something that can produce the current batch of calls
#[async_trait]
pub trait CallSource: Send + Sync {
    /// Fetch every call the backend currently reports, normalized to a list
    async fn fetch_calls(&self) -> Result<Vec<CallRecord>>;

    /// Short description used in logs
    fn describe(&self) -> String;
}

/// Fixed in-memory batch, used by tests and offline rendering
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    calls: Vec<CallRecord>,
}

impl StaticSource {
    /// Create a source that always answers with `calls`
    #[must_use]
    pub const fn new(calls: Vec<CallRecord>) -> Self {
        Self { calls }
    }
}

#[async_trait]
impl CallSource for StaticSource {
    async fn fetch_calls(&self) -> Result<Vec<CallRecord>> {
        crate::types::ensure_unique_ids(&self.calls)?;
        Ok(self.calls.clone())
    }

    fn describe(&self) -> String {
        format!("static batch of {} calls", self.calls.len())
    }
}
