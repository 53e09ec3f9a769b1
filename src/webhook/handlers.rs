// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Request handlers for the external-dns webhook endpoints.

use super::error::WebhookError;
use super::media_type::{check_and_get_media_type_header_value, media_type_version};
use super::WebhookState;
use crate::endpoint::{Changes, Endpoint};
use axum::body::Bytes;
use axum::extract::State;
use axum::http::header::{ACCEPT, CONTENT_TYPE};
use axum::http::{HeaderMap, HeaderName, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

/// Non-empty value of a header, if present.
fn header_value(headers: &HeaderMap, name: &HeaderName) -> Option<String> {
    headers
        .get(name)
        .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
        .filter(|v| !v.is_empty())
}

/// Protocol version named by the `Accept` header.
fn accepted_version(headers: &HeaderMap) -> Result<&'static str, WebhookError> {
    let value = header_value(headers, &ACCEPT).ok_or(WebhookError::MissingAccept)?;
    check_and_get_media_type_header_value(&value).map_err(WebhookError::UnacceptableMediaType)
}

/// Protocol version named by the `Content-Type` header.
fn content_version(headers: &HeaderMap) -> Result<&'static str, WebhookError> {
    let value = header_value(headers, &CONTENT_TYPE).ok_or(WebhookError::MissingContentType)?;
    check_and_get_media_type_header_value(&value).map_err(WebhookError::UnsupportedMediaType)
}

fn decode_body<T: DeserializeOwned>(body: &Bytes, what: &'static str) -> Result<T, WebhookError> {
    serde_json::from_slice(body).map_err(|e| WebhookError::InvalidBody {
        what,
        reason: e.to_string(),
    })
}

/// JSON response tagged with the negotiated media type.
fn webhook_json<T: Serialize + ?Sized>(version: &str, value: &T) -> Result<Response, WebhookError> {
    let body = serde_json::to_vec(value).map_err(|e| WebhookError::Encode(e.to_string()))?;
    Ok(([(CONTENT_TYPE, media_type_version(version))], body).into_response())
}

/// `GET /`: negotiate the protocol and report the domain filter.
pub async fn negotiate(
    State(state): State<WebhookState>,
    headers: HeaderMap,
) -> Result<Response, WebhookError> {
    let version = accepted_version(&headers)?;
    debug!(version, "Negotiating webhook protocol");
    webhook_json(version, &state.provider.domain_filter().to_json())
}

/// `GET /records`: current records owned by this provider.
pub async fn records(
    State(state): State<WebhookState>,
    headers: HeaderMap,
) -> Result<Response, WebhookError> {
    let version = accepted_version(&headers)?;
    let endpoints = state.provider.records().await?;
    debug!(count = endpoints.len(), "Returning records");
    webhook_json(version, &endpoints)
}

/// `POST /records`: apply a change set.
///
/// Change sets are applied one at a time; a second request waits for the
/// first to finish.
pub async fn apply_changes(
    State(state): State<WebhookState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<StatusCode, WebhookError> {
    content_version(&headers)?;
    let changes: Changes = decode_body(&body, "changes")?;

    debug!(
        create = changes.create.len(),
        update_old = changes.update_old.len(),
        update_new = changes.update_new.len(),
        delete = changes.delete.len(),
        "Received changes"
    );

    let _guard = state.apply_lock.lock().await;
    state.provider.apply_changes(&changes).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// `POST /adjustendpoints`: rewrite desired endpoints before planning.
pub async fn adjust_endpoints(
    State(state): State<WebhookState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, WebhookError> {
    content_version(&headers)?;
    let version = accepted_version(&headers)?;
    let endpoints: Vec<Endpoint> = decode_body(&body, "endpoints")?;

    let adjusted = state.provider.adjust_endpoints(endpoints);
    webhook_json(version, &adjusted)
}
