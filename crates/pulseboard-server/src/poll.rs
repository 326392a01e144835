//! Interval poller driving the reconciler's poll channel.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, warn};

use crate::live::LiveCounterStore;
use crate::query::RangeQueryService;
use crate::reconcile::ReadReconciler;

/// Periodic read task. Each tick queries the trailing history window and the
/// live counters, then folds both into the shared reconciler.
pub struct Poller {
    stop: watch::Sender<bool>,
    task: Option<JoinHandle<()>>,
}

impl Poller {
    pub fn spawn(
        query: RangeQueryService,
        live: Arc<LiveCounterStore>,
        state: Arc<Mutex<ReadReconciler>>,
        every: Duration,
        window_hours: u32,
    ) -> Self {
        let (stop, mut cancelled) = watch::channel(false);

        let task = tokio::spawn(async move {
            let mut ticks = interval(every);
            ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = cancelled.changed() => break,
                    _ = ticks.tick() => {}
                }

                let outcome = query.query_window(window_hours).await;
                let (counters, live_error) = match live.read().await {
                    Ok(counters) => (counters, None),
                    Err(e) => {
                        warn!(code = e.code().as_str(), error = %e, "live counter poll failed");
                        (None, Some(e.to_string()))
                    }
                };

                // The reads above awaited; cancellation may have landed in
                // the meantime and the result must not reach the reconciler.
                if *cancelled.borrow() {
                    debug!("discarding in-flight poll result after cancellation");
                    break;
                }

                let error = outcome.error.or(live_error);
                lock_state(&state).apply_poll(outcome.points, counters, error);
            }
        });

        Self {
            stop,
            task: Some(task),
        }
    }

    /// Signal the task to stop without waiting for it.
    pub fn cancel(&self) {
        let _ = self.stop.send(true);
    }

    /// Stop the task and wait for it to finish. Idempotent.
    pub async fn shutdown(&mut self) {
        self.cancel();
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

/// Lock the shared reconciler, recovering from a poisoned mutex. The
/// reconciler's state stays usable because every mutation replaces whole
/// slots.
pub(crate) fn lock_state(state: &Mutex<ReadReconciler>) -> std::sync::MutexGuard<'_, ReadReconciler> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}
