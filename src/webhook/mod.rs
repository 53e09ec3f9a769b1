// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! HTTP front end speaking the external-dns webhook protocol.
//!
//! Two routers are exposed, served on separate listeners:
//!
//! - [`webhook_router`]: the protocol endpoints external-dns calls
//! - [`health_router`]: `/healthz`, `/readyz` and `/metrics`
//!
//! Both get the same read and write timeouts through [`with_timeouts`].
//!
//! # Endpoints
//!
//! | Method | Path | Headers | Success |
//! |--------|------|---------|---------|
//! | GET | `/` | `Accept` | 200, domain filter |
//! | GET | `/records` | `Accept` | 200, endpoints |
//! | POST | `/records` | `Content-Type` | 204 |
//! | POST | `/adjustendpoints` | `Accept`, `Content-Type` | 200, endpoints |
//!
//! # Example
//!
//! ```rust,no_run
//! use opnsense_webhook::provider::DnsProvider;
//! use opnsense_webhook::webhook::{webhook_router, with_timeouts, WebhookState};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! # async fn example(provider: Arc<dyn DnsProvider>) -> std::io::Result<()> {
//! let app = webhook_router(WebhookState::new(provider));
//! let app = with_timeouts(app, Duration::from_secs(5), Duration::from_secs(10));
//! let listener = tokio::net::TcpListener::bind("localhost:8888").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod handlers;
pub mod health;
pub mod media_type;

pub use error::WebhookError;

use crate::provider::DnsProvider;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tower_http::timeout::{RequestBodyTimeoutLayer, TimeoutLayer};

/// Shared state of the webhook handlers.
#[derive(Clone)]
pub struct WebhookState {
    /// Provider serving the requests
    pub provider: Arc<dyn DnsProvider>,
    /// Held while a change set is applied
    pub apply_lock: Arc<Mutex<()>>,
}

impl WebhookState {
    /// State around a provider.
    #[must_use]
    pub fn new(provider: Arc<dyn DnsProvider>) -> Self {
        Self {
            provider,
            apply_lock: Arc::new(Mutex::new(())),
        }
    }
}

/// Router for the external-dns webhook protocol.
pub fn webhook_router(state: WebhookState) -> Router {
    Router::new()
        .route("/", get(handlers::negotiate))
        .route(
            "/records",
            get(handlers::records).post(handlers::apply_changes),
        )
        .route("/adjustendpoints", post(handlers::adjust_endpoints))
        .with_state(state)
}

/// Router for health checks and metrics.
pub fn health_router() -> Router {
    Router::new()
        .route("/healthz", get(health::health_check))
        .route("/readyz", get(health::readiness_check))
        .route("/metrics", get(health::metrics))
}

/// Bound how long a request may take on either listener.
///
/// `read` limits reading the request body; `write` limits the whole request
/// and answers `408 Request Timeout` when exceeded.
pub fn with_timeouts(router: Router, read: Duration, write: Duration) -> Router {
    router
        .layer(RequestBodyTimeoutLayer::new(read))
        .layer(TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, write))
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod mod_tests;
