//! HTTP data API.

use std::time::Instant;

use axum::extract::State;
use axum::Json;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use tracing::warn;

use pulseboard_core::record::{LiveCounters, MetricPoint};

use crate::app_state::AppState;

/// `GET /api/metrics` response body.
///
/// `realtime` serializes as an empty object when the counters have never
/// been written, so consumers can always index into it.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsPayload {
    pub orders_hourly: Vec<MetricPoint>,
    #[serde(serialize_with = "empty_object_when_absent")]
    pub realtime: Option<LiveCounters>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

fn empty_object_when_absent<S>(
    counters: &Option<LiveCounters>,
    serializer: S,
) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match counters {
        Some(counters) => counters.serialize(serializer),
        None => serializer.serialize_map(Some(0))?.end(),
    }
}

/// Assemble the combined payload. Store failures degrade to empty data with
/// the failure text attached; this never returns an error.
pub async fn metrics_payload(state: &AppState) -> MetricsPayload {
    let started = Instant::now();
    let outcome = state.query().query_window(state.window_hours()).await;
    let (realtime, live_error) = match state.live().read().await {
        Ok(counters) => (counters, None),
        Err(e) => {
            warn!(code = e.code().as_str(), error = %e, "live counter read failed");
            (None, Some(e.to_string()))
        }
    };
    state
        .metrics()
        .query_duration
        .observe(&[("endpoint", "/api/metrics")], started.elapsed());

    let error = outcome.error.or(live_error);
    if error.is_some() {
        state.metrics().degraded_reads.inc(&[("endpoint", "/api/metrics")]);
    }
    MetricsPayload {
        orders_hourly: outcome.points,
        realtime,
        error,
    }
}

/// `GET /api/metrics`. Always 200; degradation is in-band.
pub async fn metrics_handler(State(state): State<AppState>) -> Json<MetricsPayload> {
    state.metrics().api_inflight.inc(&[("endpoint", "/api/metrics")]);
    let payload = metrics_payload(&state).await;
    state.metrics().api_inflight.dec(&[("endpoint", "/api/metrics")]);

    let outcome = if payload.error.is_some() { "degraded" } else { "ok" };
    state
        .metrics()
        .api_requests
        .inc(&[("endpoint", "/api/metrics"), ("outcome", outcome)]);
    Json(payload)
}
