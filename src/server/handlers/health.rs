use crate::server::state::AppState;
use axum::{Json, extract::State, response::IntoResponse};
use serde_json::json;

/// Liveness probe with basic process stats
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "cache_entries": state.cache.len(),
        "uptime_seconds": state.started_at.elapsed().as_secs(),
    }))
}

/// Prometheus exposition endpoint
pub async fn prometheus_metrics() -> impl IntoResponse {
    crate::metrics::prometheus_handle().render()
}
