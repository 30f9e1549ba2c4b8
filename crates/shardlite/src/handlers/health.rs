//! Health and metrics endpoints.
//!
//! - `/livez` - Basic liveness probe (immediate 200, no checks)
//! - `/metrics` - Request counters and latency percentiles as JSON

use axum::{extract::State, http::StatusCode, Json};

use crate::{metrics::MetricsSnapshot, state::AppState};

/// GET /livez - Basic liveness probe.
pub async fn livez() -> StatusCode {
    StatusCode::OK
}

/// GET /metrics - Snapshot of the request observer.
pub async fn metrics(State(state): State<AppState>) -> Json<MetricsSnapshot> {
    Json(state.metrics.snapshot())
}
