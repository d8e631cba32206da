//! Prometheus metrics for observability.
//!
//! This module provides metrics for monitoring the petdiag server:
//! - HTTP request metrics (latency, counts, in flight)
//! - Live narrowing sessions
//! - Core narrowing metrics, registered from `petdiag_core::metrics`

use once_cell::sync::Lazy;
use prometheus::{
    self, Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts,
    Registry, TextEncoder,
};
use regex_lite::Regex;

/// Global metrics registry.
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let registry = Registry::new();
    register_metrics(&registry);
    registry
});

// =============================================================================
// HTTP Request Metrics
// =============================================================================

/// HTTP request duration in seconds.
pub static HTTP_REQUEST_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "petdiag_http_request_duration_seconds",
            "HTTP request duration in seconds",
        )
        .buckets(vec![
            0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0,
        ]),
        &["method", "path", "status"],
    )
    .unwrap()
});

/// HTTP requests total count.
pub static HTTP_REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("petdiag_http_requests_total", "Total HTTP requests"),
        &["method", "path", "status"],
    )
    .unwrap()
});

/// HTTP requests currently in flight.
pub static HTTP_REQUESTS_IN_FLIGHT: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "petdiag_http_requests_in_flight",
        "Number of HTTP requests currently being processed",
    )
    .unwrap()
});

// =============================================================================
// Session Metrics
// =============================================================================

/// Narrowing sessions currently held in memory.
pub static ACTIVE_SESSIONS: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "petdiag_active_sessions",
        "Number of narrowing sessions held in memory",
    )
    .unwrap()
});

/// Sessions dropped after sitting idle.
pub static SESSIONS_EXPIRED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "petdiag_sessions_expired_total",
        "Narrowing sessions evicted for inactivity",
    )
    .unwrap()
});

/// Records in the loaded disease catalog.
pub static CATALOG_RECORDS: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "petdiag_catalog_records",
        "Number of disease records in the loaded catalog",
    )
    .unwrap()
});

// =============================================================================
// Registration
// =============================================================================

fn register_metrics(registry: &Registry) {
    // HTTP
    registry
        .register(Box::new(HTTP_REQUEST_DURATION.clone()))
        .unwrap();
    registry
        .register(Box::new(HTTP_REQUESTS_TOTAL.clone()))
        .unwrap();
    registry
        .register(Box::new(HTTP_REQUESTS_IN_FLIGHT.clone()))
        .unwrap();

    // Sessions and catalog
    registry
        .register(Box::new(ACTIVE_SESSIONS.clone()))
        .unwrap();
    registry
        .register(Box::new(SESSIONS_EXPIRED.clone()))
        .unwrap();
    registry
        .register(Box::new(CATALOG_RECORDS.clone()))
        .unwrap();

    // Core metrics (sessions, matching, narrowing)
    for metric in petdiag_core::metrics::all_metrics() {
        registry.register(metric).unwrap();
    }
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer).unwrap();
    String::from_utf8(buffer).unwrap()
}

static UUID_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}")
        .unwrap()
});

static NUMERIC_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"/\d+(/|$)").unwrap());

/// Normalize a path for metric labels (replace IDs with placeholders).
pub fn normalize_path(path: &str) -> String {
    let result = UUID_REGEX.replace_all(path, "{id}");
    let result = NUMERIC_REGEX.replace_all(&result, "/{id}$1");
    result.to_string()
}
