//! Document store seam.
//!
//! The store is treated as an opaque document/collection tree reachable by
//! path, supporting get, atomic merge-write batches, id-ordered range scans,
//! and per-document change subscriptions. `MemoryStore` is the only backend
//! that ships in-tree; remote backends plug in behind the same trait.

mod memory;

pub use memory::MemoryStore;

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::broadcast;

use pulseboard_core::record::Fields;
use pulseboard_core::{PulseboardError, Result};

use crate::config::{StoreBackend, StoreSection};

/// Singleton live counter document (authoritative).
pub const REALTIME_DOC: &str = "metrics/realtime";
/// Read-optimized copy of the live counters, consumed by the subscription
/// path. Written in the same batch as the authoritative record.
pub const REALTIME_COUNTERS_DOC: &str = "metrics/realtime/counters";
/// Hourly order buckets, one document per bucket key.
pub const HOURLY_ORDERS: &str = "metrics/hourly/orders";

/// Store limit on operations per atomic commit. Batches above this are
/// rejected; writers chunk into groups of at most this size.
pub const MAX_OPS_PER_COMMIT: usize = 500;

/// Validated document path (`a/b/c`, non-empty segments).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DocPath(String);

impl DocPath {
    pub fn new(path: impl Into<String>) -> Result<Self> {
        let path = path.into();
        validate_path(&path)?;
        Ok(Self(path))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Validated collection path; documents are its direct children.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CollectionPath(String);

impl CollectionPath {
    pub fn new(path: impl Into<String>) -> Result<Self> {
        let path = path.into();
        validate_path(&path)?;
        Ok(Self(path))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Child document path for `id`.
    pub fn doc(&self, id: &str) -> Result<DocPath> {
        if id.is_empty() || id.contains('/') {
            return Err(PulseboardError::BadRequest(format!(
                "invalid document id: {id:?}"
            )));
        }
        Ok(DocPath(format!("{}/{id}", self.0)))
    }
}

impl fmt::Display for CollectionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn validate_path(path: &str) -> Result<()> {
    if path.is_empty() || path.split('/').any(|seg| seg.is_empty()) {
        return Err(PulseboardError::BadRequest(format!(
            "invalid store path: {path:?}"
        )));
    }
    Ok(())
}

/// `metrics/realtime`.
pub fn realtime_doc() -> DocPath {
    DocPath(REALTIME_DOC.to_string())
}

/// `metrics/realtime/counters`.
pub fn realtime_counters_doc() -> DocPath {
    DocPath(REALTIME_COUNTERS_DOC.to_string())
}

/// `metrics/hourly/orders`.
pub fn hourly_orders() -> CollectionPath {
    CollectionPath(HOURLY_ORDERS.to_string())
}

/// One merge-write against a document.
#[derive(Debug, Clone)]
pub struct MergeOp {
    pub doc: DocPath,
    pub fields: Fields,
}

/// Ordered group of merge-writes committed atomically.
#[derive(Debug, Clone, Default)]
pub struct WriteBatch {
    ops: Vec<MergeOp>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a merge-write of `fields` into `doc`.
    pub fn merge(&mut self, doc: DocPath, fields: Fields) {
        self.ops.push(MergeOp { doc, fields });
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn into_ops(self) -> Vec<MergeOp> {
        self.ops
    }
}

/// Change feed for one document.
///
/// `initial` is the snapshot at subscribe time (`None` when the document
/// does not exist yet). `updates` then delivers one post-commit snapshot per
/// committed change, in commit order. Delivery is at-least-once: a lagging
/// receiver can lose intermediate states but always converges on the latest.
pub struct DocWatch {
    pub initial: Option<Fields>,
    pub updates: broadcast::Receiver<Fields>,
}

/// Async seam over the document store.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Read one document. `Ok(None)` when absent; absence is not an error.
    async fn get(&self, doc: &DocPath) -> Result<Option<Fields>>;

    /// Commit a batch of merge-writes atomically, in order.
    async fn apply(&self, batch: WriteBatch) -> Result<()>;

    /// Direct children of `collection` with id `>= from_id`, ascending by id.
    async fn scan(
        &self,
        collection: &CollectionPath,
        from_id: &str,
    ) -> Result<Vec<(String, Fields)>>;

    /// Subscribe to one document's change feed.
    async fn watch(&self, doc: &DocPath) -> Result<DocWatch>;
}

impl fmt::Debug for dyn DocumentStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("dyn DocumentStore")
    }
}

/// Instantiate the configured backend.
pub fn build_store(cfg: &StoreSection) -> Result<Arc<dyn DocumentStore>> {
    match cfg.backend {
        StoreBackend::Memory => Ok(Arc::new(MemoryStore::new())),
        StoreBackend::Remote => Err(PulseboardError::BadRequest(
            "store.backend 'remote' needs an external driver; only 'memory' ships in-tree".into(),
        )),
    }
}
