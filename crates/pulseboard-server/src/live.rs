//! Live counter writes and reads.

use std::sync::Arc;

use pulseboard_core::record::{CounterPatch, LiveCounters};
use pulseboard_core::Result;

use crate::store::{realtime_counters_doc, realtime_doc, DocPath, DocumentStore, WriteBatch};

/// Merge-only access to the live counter singleton.
///
/// Every write lands in the authoritative document and its read-optimized
/// copy in one atomic batch, so subscribers of the copy never observe a
/// state the authoritative record does not hold.
pub struct LiveCounterStore {
    store: Arc<dyn DocumentStore>,
    primary: DocPath,
    mirror: DocPath,
}

impl LiveCounterStore {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            primary: realtime_doc(),
            mirror: realtime_counters_doc(),
        }
    }

    /// Merge `patch` into both live documents. A patch with no fields is a
    /// no-op; absent fields keep their stored values.
    pub async fn upsert(&self, patch: &CounterPatch) -> Result<()> {
        if patch.is_empty() {
            return Ok(());
        }
        let fields = patch.fields();
        let mut batch = WriteBatch::new();
        batch.merge(self.primary.clone(), fields.clone());
        batch.merge(self.mirror.clone(), fields);
        self.store.apply(batch).await
    }

    /// Read the authoritative counters. `Ok(None)` when never written.
    pub async fn read(&self) -> Result<Option<LiveCounters>> {
        let fields = self.store.get(&self.primary).await?;
        Ok(fields.map(|f| LiveCounters::from_fields(&f)))
    }
}
