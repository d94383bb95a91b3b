//! Prometheus metrics helpers.
//!
//! Handlers record a counter per request outcome and a duration histogram
//! per endpoint; the cache paths record hit/miss counters. The recorder is
//! installed once per process and rendered by `GET /metrics`.

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;
use std::time::Instant;

static HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Install the global Prometheus recorder on first call and return the
/// render handle. Safe to call from every router construction — the
/// OnceLock guarantees a single install per process.
pub fn prometheus_handle() -> &'static PrometheusHandle {
    HANDLE.get_or_init(|| {
        PrometheusBuilder::new()
            .install_recorder()
            .expect("Prometheus recorder installed twice")
    })
}

pub fn record_request(endpoint: &'static str, status: u16) {
    counter!(
        "lounge_requests_total",
        "endpoint" => endpoint,
        "status" => status.to_string()
    )
    .increment(1);
}

pub fn record_duration(endpoint: &'static str, start: Instant) {
    histogram!("lounge_request_duration_seconds", "endpoint" => endpoint)
        .record(start.elapsed().as_secs_f64());
}

pub fn record_cache_hit(endpoint: &'static str) {
    counter!("lounge_cache_hits_total", "endpoint" => endpoint).increment(1);
}

pub fn record_cache_miss(endpoint: &'static str) {
    counter!("lounge_cache_misses_total", "endpoint" => endpoint).increment(1);
}

pub fn record_upstream_error(endpoint: &'static str) {
    counter!("lounge_upstream_errors_total", "endpoint" => endpoint).increment(1);
}
