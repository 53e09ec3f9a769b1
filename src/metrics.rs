// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Prometheus metrics for the OPNsense webhook.
//!
//! All metrics share the namespace prefix `opnsense_webhook_`.
//!
//! # Metrics Categories
//!
//! - **Unbound API Metrics** - Every request made to OPNsense, by endpoint and status
//! - **Record Change Metrics** - Host overrides created and deleted
//! - **Apply Metrics** - Outcome and duration of each change set
//!
//! # Example
//!
//! ```rust,no_run
//! use opnsense_webhook::metrics::{gather_metrics, record_apply_changes};
//!
//! record_apply_changes(true, std::time::Duration::from_millis(250));
//! let text = gather_metrics().unwrap();
//! ```

use prometheus::{
    CounterVec, Encoder, Histogram, HistogramOpts, HistogramVec, Opts, Registry, TextEncoder,
};
use std::sync::LazyLock;
use std::time::Duration;

// ============================================================================
// Metric Name Constants
// ============================================================================

/// Namespace prefix for all webhook metrics
const METRICS_NAMESPACE: &str = "opnsense_webhook";

// ============================================================================
// Global Metrics Registry
// ============================================================================

/// Global Prometheus metrics registry
///
/// All metrics are registered in this registry and exposed via `/metrics` endpoint.
pub static METRICS_REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

// ============================================================================
// Unbound API Metrics
// ============================================================================

/// Total number of requests sent to the Unbound API
///
/// Labels:
/// - `endpoint`: API path template (e.g., `api/unbound/service/status`)
/// - `status`: HTTP status code, or `transport_error`
pub static UNBOUND_REQUESTS_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_unbound_requests_total"),
        "Total number of requests sent to the OPNsense Unbound API by endpoint and status",
    );
    let counter = CounterVec::new(opts, &["endpoint", "status"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

/// Duration of Unbound API requests in seconds
///
/// Labels:
/// - `endpoint`: API path template
pub static UNBOUND_REQUEST_DURATION_SECONDS: LazyLock<HistogramVec> = LazyLock::new(|| {
    let opts = HistogramOpts::new(
        format!("{METRICS_NAMESPACE}_unbound_request_duration_seconds"),
        "Duration of OPNsense Unbound API requests in seconds by endpoint",
    )
    .buckets(vec![0.005, 0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]);
    let histogram = HistogramVec::new(opts, &["endpoint"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(histogram.clone()))
        .unwrap();
    histogram
});

// ============================================================================
// Record Change Metrics
// ============================================================================

/// Total number of host override changes applied
///
/// Labels:
/// - `action`: `create` or `delete`
/// - `record_type`: Bare record type (`A`, `AAAA`, `MX`)
pub static RECORD_CHANGES_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_record_changes_total"),
        "Total number of host override changes applied by action and record type",
    );
    let counter = CounterVec::new(opts, &["action", "record_type"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

// ============================================================================
// Apply Metrics
// ============================================================================

/// Total number of change sets applied
///
/// Labels:
/// - `status`: `success` or `error`
pub static APPLY_CHANGES_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_apply_changes_total"),
        "Total number of change sets applied by outcome",
    );
    let counter = CounterVec::new(opts, &["status"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

/// Duration of change set application in seconds
pub static APPLY_CHANGES_DURATION_SECONDS: LazyLock<Histogram> = LazyLock::new(|| {
    let opts = HistogramOpts::new(
        format!("{METRICS_NAMESPACE}_apply_changes_duration_seconds"),
        "Duration of change set application in seconds",
    )
    .buckets(vec![0.01, 0.1, 0.5, 1.0, 2.0, 5.0, 10.0, 30.0, 60.0]);
    let histogram = Histogram::with_opts(opts).unwrap();
    METRICS_REGISTRY
        .register(Box::new(histogram.clone()))
        .unwrap();
    histogram
});

// ============================================================================
// Helper Functions
// ============================================================================

/// Record a completed Unbound API request
///
/// # Arguments
/// * `endpoint` - API path template
/// * `status` - HTTP status code or `transport_error`
/// * `duration` - Time from send to response body read
pub fn record_unbound_request(endpoint: &str, status: &str, duration: Duration) {
    UNBOUND_REQUESTS_TOTAL
        .with_label_values(&[endpoint, status])
        .inc();
    UNBOUND_REQUEST_DURATION_SECONDS
        .with_label_values(&[endpoint])
        .observe(duration.as_secs_f64());
}

/// Record a host override change
///
/// # Arguments
/// * `action` - `create` or `delete`
/// * `record_type` - Bare record type
pub fn record_change(action: &str, record_type: &str) {
    RECORD_CHANGES_TOTAL
        .with_label_values(&[action, record_type])
        .inc();
}

/// Record the outcome of applying a change set
pub fn record_apply_changes(success: bool, duration: Duration) {
    let status = if success { "success" } else { "error" };
    APPLY_CHANGES_TOTAL.with_label_values(&[status]).inc();
    APPLY_CHANGES_DURATION_SECONDS.observe(duration.as_secs_f64());
}

/// Gather and encode all metrics in Prometheus text format
///
/// # Returns
/// Prometheus-formatted metrics as a String
///
/// # Errors
/// Returns error if encoding fails
pub fn gather_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = METRICS_REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(format!("UTF-8 error: {e}")))
}
