//! Dashboard read client wiring poll and push into one view.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use pulseboard_core::Result;

use crate::feed::{LiveFeed, Subscription};
use crate::live::LiveCounterStore;
use crate::poll::{lock_state, Poller};
use crate::query::RangeQueryService;
use crate::reconcile::{DashboardView, ReadReconciler};
use crate::store::DocumentStore;

/// Tuning for a dashboard client.
#[derive(Debug, Clone, Copy)]
pub struct DashboardOptions {
    pub poll_every: Duration,
    pub window_hours: u32,
}

impl Default for DashboardOptions {
    fn default() -> Self {
        Self {
            poll_every: Duration::from_secs(10),
            window_hours: 24,
        }
    }
}

/// Long-lived reader combining the polled history window with the pushed
/// live counter feed. [`view`](Self::view) is cheap and always consistent
/// with the latest data either channel has produced.
pub struct DashboardClient {
    state: Arc<Mutex<ReadReconciler>>,
    subscription: Subscription,
    poller: Poller,
}

impl DashboardClient {
    /// Start polling and subscribe to the push feed. A failed subscription
    /// setup degrades to poll-only operation instead of failing the start.
    pub async fn start(store: Arc<dyn DocumentStore>, opts: DashboardOptions) -> Result<Self> {
        let state = Arc::new(Mutex::new(ReadReconciler::new()));

        let feed = LiveFeed::new(Arc::clone(&store));
        let push_state = Arc::clone(&state);
        let subscription = feed
            .subscribe(move |snapshot| lock_state(&push_state).apply_push(snapshot))
            .await;

        let query = RangeQueryService::new(Arc::clone(&store));
        let live = Arc::new(LiveCounterStore::new(store));
        let poller = Poller::spawn(
            query,
            live,
            Arc::clone(&state),
            opts.poll_every,
            opts.window_hours,
        );

        Ok(Self {
            state,
            subscription,
            poller,
        })
    }

    /// Latest reconciled snapshot.
    pub fn view(&self) -> DashboardView {
        lock_state(&self.state).view()
    }

    /// Whether the push feed is delivering.
    pub fn push_active(&self) -> bool {
        self.subscription.is_active()
    }

    /// Detach both channels. Idempotent; the view stays readable and frozen.
    pub async fn shutdown(&mut self) {
        self.subscription.unsubscribe();
        self.poller.shutdown().await;
    }
}
