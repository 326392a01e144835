//! In-memory document store.

use std::collections::BTreeMap;

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::sync::{broadcast, RwLock};

use pulseboard_core::record::{merge_fields, Fields};
use pulseboard_core::{PulseboardError, Result};

use super::{CollectionPath, DocPath, DocWatch, DocumentStore, WriteBatch, MAX_OPS_PER_COMMIT};

/// Buffered snapshots per watcher before the receiver is considered lagged.
const WATCH_CAPACITY: usize = 64;

/// Path-keyed document tree backed by a sorted map, with per-document
/// broadcast channels for change feeds.
///
/// Writes take the tree lock for the whole batch, so a batch is observed
/// all-or-nothing and watch notifications go out in commit order.
pub struct MemoryStore {
    docs: RwLock<BTreeMap<String, Fields>>,
    watchers: DashMap<String, broadcast::Sender<Fields>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            docs: RwLock::new(BTreeMap::new()),
            watchers: DashMap::new(),
        }
    }

    /// Number of documents currently stored.
    pub async fn len(&self) -> usize {
        self.docs.read().await.len()
    }

    fn notify(&self, path: &str, snapshot: Fields) {
        if let Some(tx) = self.watchers.get(path) {
            // Send fails only when every receiver is gone; stale senders are
            // cleaned up lazily on the next subscribe.
            let _ = tx.send(snapshot);
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get(&self, doc: &DocPath) -> Result<Option<Fields>> {
        Ok(self.docs.read().await.get(doc.as_str()).cloned())
    }

    async fn apply(&self, batch: WriteBatch) -> Result<()> {
        if batch.len() > MAX_OPS_PER_COMMIT {
            return Err(PulseboardError::BadRequest(format!(
                "write batch of {} ops exceeds the {MAX_OPS_PER_COMMIT}-op commit limit",
                batch.len()
            )));
        }
        if batch.is_empty() {
            return Ok(());
        }
        let mut docs = self.docs.write().await;
        for op in batch.into_ops() {
            let entry = docs.entry(op.doc.as_str().to_string()).or_default();
            merge_fields(entry, op.fields);
            // Notify while still holding the write lock so watchers observe
            // snapshots in commit order.
            self.notify(op.doc.as_str(), entry.clone());
        }
        Ok(())
    }

    async fn scan(
        &self,
        collection: &CollectionPath,
        from_id: &str,
    ) -> Result<Vec<(String, Fields)>> {
        let prefix = format!("{}/", collection.as_str());
        let start = format!("{prefix}{from_id}");
        let docs = self.docs.read().await;
        let rows = docs
            .range(start..)
            .take_while(|(path, _)| path.starts_with(&prefix))
            .filter_map(|(path, fields)| {
                let id = &path[prefix.len()..];
                // Skip grandchildren; scan returns direct children only.
                if id.contains('/') {
                    None
                } else {
                    Some((id.to_string(), fields.clone()))
                }
            })
            .collect();
        Ok(rows)
    }

    async fn watch(&self, doc: &DocPath) -> Result<DocWatch> {
        // Subscribe before reading the snapshot: a commit racing with this
        // call then lands either in `initial` or in `updates`, never in
        // neither.
        let updates = {
            let tx = self
                .watchers
                .entry(doc.as_str().to_string())
                .or_insert_with(|| broadcast::channel(WATCH_CAPACITY).0);
            tx.subscribe()
        };
        let initial = self.docs.read().await.get(doc.as_str()).cloned();
        Ok(DocWatch { initial, updates })
    }
}
