// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Errors returned to external-dns by the webhook handlers.
//!
//! | Error | HTTP status |
//! |-------|-------------|
//! | `MissingAccept` | 406 |
//! | `UnacceptableMediaType` | 406 |
//! | `MissingContentType` | 415 |
//! | `UnsupportedMediaType` | 415 |
//! | `InvalidBody` | 400 |
//! | `Provider` | 500 |
//! | `Encode` | 500 |

use super::media_type::UnsupportedMediaVersion;
use crate::errors::UnboundError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::{error, warn};

/// Failure of a webhook request.
#[derive(Error, Debug)]
pub enum WebhookError {
    /// No `Accept` header on a request that returns a body
    #[error("client must provide an accept header")]
    MissingAccept,

    /// No `Content-Type` header on a request that carries a body
    #[error("client must provide a content type")]
    MissingContentType,

    /// `Accept` names an unsupported media type
    #[error(transparent)]
    UnacceptableMediaType(UnsupportedMediaVersion),

    /// `Content-Type` names an unsupported media type
    #[error(transparent)]
    UnsupportedMediaType(UnsupportedMediaVersion),

    /// Request body is not the expected JSON
    #[error("error decoding {what}: {reason}")]
    InvalidBody { what: &'static str, reason: String },

    /// The provider failed
    #[error(transparent)]
    Provider(#[from] UnboundError),

    /// Response body could not be encoded
    #[error("error encoding response: {0}")]
    Encode(String),
}

impl WebhookError {
    /// HTTP status sent back to external-dns.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::MissingAccept | Self::UnacceptableMediaType(_) => StatusCode::NOT_ACCEPTABLE,
            Self::MissingContentType | Self::UnsupportedMediaType(_) => {
                StatusCode::UNSUPPORTED_MEDIA_TYPE
            }
            Self::InvalidBody { .. } => StatusCode::BAD_REQUEST,
            Self::Provider(_) | Self::Encode(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for WebhookError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(status = %status, error = %self, "Webhook request failed");
        } else {
            warn!(status = %status, error = %self, "Rejecting webhook request");
        }
        (status, self.to_string()).into_response()
    }
}
