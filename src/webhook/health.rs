// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Liveness, readiness and metrics endpoints.

use crate::metrics::gather_metrics;
use axum::http::header::CONTENT_TYPE;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tracing::{debug, error};

const METRICS_CONTENT_TYPE: &str = "text/plain; version=0.0.4";

/// `GET /healthz`
pub async fn health_check() -> &'static str {
    debug!("Health check requested");
    "OK"
}

/// `GET /readyz`
pub async fn readiness_check() -> &'static str {
    debug!("Readiness check requested");
    "OK"
}

/// `GET /metrics`: Prometheus text exposition.
pub async fn metrics() -> Response {
    match gather_metrics() {
        Ok(text) => ([(CONTENT_TYPE, METRICS_CONTENT_TYPE)], text).into_response(),
        Err(e) => {
            error!(error = %e, "Failed to encode metrics");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}
