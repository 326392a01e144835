//! Push feed for the live counter document.

use std::sync::Arc;

use tokio::sync::{broadcast, watch};
use tracing::{debug, warn};

use pulseboard_core::record::LiveCounters;

use crate::store::{realtime_counters_doc, DocPath, DocumentStore};

/// Subscribes handlers to the read-optimized live counter copy.
pub struct LiveFeed {
    store: Arc<dyn DocumentStore>,
    doc: DocPath,
}

impl LiveFeed {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            doc: realtime_counters_doc(),
        }
    }

    /// Subscribe `handler` to the counter document.
    ///
    /// The handler first receives the snapshot at subscribe time (`None`
    /// when the document does not exist), then one call per committed
    /// change, in commit order. If the subscription cannot be established
    /// the failure is logged and an inactive handle comes back; the caller
    /// keeps running on its other data paths.
    pub async fn subscribe<F>(&self, handler: F) -> Subscription
    where
        F: Fn(Option<LiveCounters>) + Send + Sync + 'static,
    {
        let feed = match self.store.watch(&self.doc).await {
            Ok(feed) => feed,
            Err(e) => {
                warn!(code = e.code().as_str(), error = %e, doc = %self.doc, "live feed setup failed");
                return Subscription::noop();
            }
        };

        let (cancel_tx, mut cancel_rx) = watch::channel(false);
        let initial = feed.initial.map(|f| LiveCounters::from_fields(&f));
        let mut updates = feed.updates;

        tokio::spawn(async move {
            handler(initial);
            loop {
                tokio::select! {
                    _ = cancel_rx.changed() => break,
                    next = updates.recv() => match next {
                        Ok(fields) => handler(Some(LiveCounters::from_fields(&fields))),
                        Err(broadcast::error::RecvError::Lagged(missed)) => {
                            // Intermediate states are disposable; the next
                            // snapshot is already the latest.
                            debug!(missed, "live feed lagged");
                        }
                        Err(broadcast::error::RecvError::Closed) => break,
                    },
                }
            }
        });

        Subscription {
            cancel: Some(cancel_tx),
        }
    }
}

/// Handle for one live feed subscription. Dropping it unsubscribes.
pub struct Subscription {
    cancel: Option<watch::Sender<bool>>,
}

impl Subscription {
    /// Inactive handle; unsubscribing it is a no-op.
    pub fn noop() -> Self {
        Self { cancel: None }
    }

    /// Stop delivery. Safe to call more than once.
    pub fn unsubscribe(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            let _ = cancel.send(true);
        }
    }

    pub fn is_active(&self) -> bool {
        self.cancel.is_some()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}
