//! Operational HTTP endpoints.
//!
//! - `/healthz` : liveness
//! - `/readyz`  : readiness (503 when the store is unreachable)
//! - `/metrics` : Prometheus text format

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use tracing::warn;

use crate::app_state::AppState;
use crate::store::realtime_doc;

pub async fn healthz() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

pub async fn readyz(State(state): State<AppState>) -> impl IntoResponse {
    // A probe read against the live singleton; absence is fine, failure is
    // not.
    match state.store().get(&realtime_doc()).await {
        Ok(_) => (StatusCode::OK, "ready"),
        Err(e) => {
            warn!(code = e.code().as_str(), error = %e, "readiness probe failed");
            (StatusCode::SERVICE_UNAVAILABLE, "store unavailable")
        }
    }
}

pub async fn metrics(State(state): State<AppState>) -> Response {
    let uptime = state.uptime().as_secs();
    let body = state
        .metrics()
        .render(&[("pulseboard_uptime_seconds", uptime)]);

    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4; charset=utf-8")],
        body,
    )
        .into_response()
}
