//! Reconciliation of polled and pushed reads into one dashboard view.

use serde::Serialize;

use pulseboard_core::record::{LiveCounters, MetricPoint};

/// Shown for `last_updated` when no source has produced a timestamp.
pub const LAST_UPDATED_PLACEHOLDER: &str = "—";

/// Where the live counters in a view came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CounterSource {
    Pushed,
    Polled,
    Defaults,
}

impl CounterSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            CounterSource::Pushed => "pushed",
            CounterSource::Polled => "polled",
            CounterSource::Defaults => "defaults",
        }
    }
}

/// One consistent snapshot for rendering.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardView {
    pub orders_hourly: Vec<MetricPoint>,
    pub online_users: u64,
    pub queue_depth: u64,
    pub last_updated: Option<String>,
    pub source: CounterSource,
    pub error: Option<String>,
}

impl DashboardView {
    /// `last_updated`, or the placeholder when absent.
    pub fn last_updated_display(&self) -> &str {
        self.last_updated
            .as_deref()
            .unwrap_or(LAST_UPDATED_PLACEHOLDER)
    }
}

/// Merges the two read channels.
///
/// Pushed counters beat polled ones whenever a push has arrived; a pushed
/// `None` (document absent) falls back to the poll. History always comes
/// from the poll. Each channel only ever overwrites its own slot, so a
/// stale poll cannot clobber a fresher push.
#[derive(Debug, Default)]
pub struct ReadReconciler {
    history: Vec<MetricPoint>,
    polled: Option<LiveCounters>,
    pushed: Option<Option<LiveCounters>>,
    error: Option<String>,
}

impl ReadReconciler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold in one completed poll. Refreshes history, the polled counters,
    /// and the error slot, even when the poll degraded.
    pub fn apply_poll(
        &mut self,
        points: Vec<MetricPoint>,
        live: Option<LiveCounters>,
        error: Option<String>,
    ) {
        self.history = points;
        self.polled = live;
        self.error = error;
    }

    /// Fold in one pushed snapshot.
    pub fn apply_push(&mut self, snapshot: Option<LiveCounters>) {
        self.pushed = Some(snapshot);
    }

    /// Current merged view.
    pub fn view(&self) -> DashboardView {
        let (counters, source) = match (&self.pushed, &self.polled) {
            (Some(Some(pushed)), _) => (pushed.clone(), CounterSource::Pushed),
            (_, Some(polled)) => (polled.clone(), CounterSource::Polled),
            _ => (LiveCounters::default(), CounterSource::Defaults),
        };
        DashboardView {
            orders_hourly: self.history.clone(),
            online_users: counters.online_users,
            queue_depth: counters.queue_depth,
            last_updated: counters.last_updated,
            source,
            error: self.error.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    fn counters(online: u64, queue: u64, ts: &str) -> LiveCounters {
        LiveCounters {
            online_users: online,
            queue_depth: queue,
            last_updated: Some(ts.to_string()),
        }
    }

    fn point(ts: &str, count: u64) -> MetricPoint {
        MetricPoint {
            ts: ts.to_string(),
            count,
            revenue: 0.0,
        }
    }

    #[test]
    fn empty_reconciler_serves_defaults_and_placeholder() {
        let view = ReadReconciler::new().view();
        assert!(view.orders_hourly.is_empty());
        assert_eq!(view.online_users, 0);
        assert_eq!(view.queue_depth, 0);
        assert_eq!(view.source, CounterSource::Defaults);
        assert_eq!(view.last_updated_display(), LAST_UPDATED_PLACEHOLDER);
        assert!(view.error.is_none());
    }

    #[test]
    fn poll_fills_history_and_counters() {
        let mut rec = ReadReconciler::new();
        rec.apply_poll(
            vec![point("2025-08-23T09:00:00.000Z", 4)],
            Some(counters(12, 3, "2025-08-23T09:30:00.000Z")),
            None,
        );
        let view = rec.view();
        assert_eq!(view.orders_hourly.len(), 1);
        assert_eq!(view.online_users, 12);
        assert_eq!(view.source, CounterSource::Polled);
        assert_eq!(view.last_updated_display(), "2025-08-23T09:30:00.000Z");
    }

    #[test]
    fn pushed_counters_beat_polled() {
        let mut rec = ReadReconciler::new();
        rec.apply_poll(
            vec![point("2025-08-23T09:00:00.000Z", 4)],
            Some(counters(12, 3, "2025-08-23T09:30:00.000Z")),
            None,
        );
        rec.apply_push(Some(counters(99, 7, "2025-08-23T09:31:00.000Z")));
        let view = rec.view();
        assert_eq!(view.online_users, 99);
        assert_eq!(view.queue_depth, 7);
        assert_eq!(view.source, CounterSource::Pushed);
        // History still comes from the poll.
        assert_eq!(view.orders_hourly.len(), 1);
    }

    #[test]
    fn later_poll_does_not_clobber_push() {
        let mut rec = ReadReconciler::new();
        rec.apply_push(Some(counters(99, 7, "2025-08-23T09:31:00.000Z")));
        rec.apply_poll(
            Vec::new(),
            Some(counters(12, 3, "2025-08-23T09:30:00.000Z")),
            None,
        );
        assert_eq!(rec.view().online_users, 99);
        assert_eq!(rec.view().source, CounterSource::Pushed);
    }

    #[test]
    fn pushed_absence_falls_back_to_poll() {
        let mut rec = ReadReconciler::new();
        rec.apply_poll(
            Vec::new(),
            Some(counters(12, 3, "2025-08-23T09:30:00.000Z")),
            None,
        );
        rec.apply_push(None);
        let view = rec.view();
        assert_eq!(view.online_users, 12);
        assert_eq!(view.source, CounterSource::Polled);
    }

    #[test]
    fn degraded_poll_keeps_error_until_next_poll() {
        let mut rec = ReadReconciler::new();
        rec.apply_poll(Vec::new(), None, Some("store unavailable".to_string()));
        assert_eq!(rec.view().error.as_deref(), Some("store unavailable"));

        rec.apply_poll(vec![point("2025-08-23T09:00:00.000Z", 1)], None, None);
        assert!(rec.view().error.is_none());
        assert_eq!(rec.view().orders_hourly.len(), 1);
    }
}
