// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Error types for OPNsense Unbound API operations.
//!
//! Every failure the client or provider can produce is a variant of
//! [`UnboundError`]. Variants carry the HTTP method, request path, status and
//! (when available) response body, so a single log line is enough to find the
//! root cause. Nothing is retried and nothing is swallowed.

use thiserror::Error;

/// Errors that can occur while talking to the OPNsense Unbound API.
#[derive(Error, Debug)]
pub enum UnboundError {
    /// The request never produced an HTTP response (DNS, TCP, TLS, timeout)
    #[error("{method} request to {path} failed: {source}")]
    Transport {
        /// HTTP method of the failed request
        method: String,
        /// API path of the failed request
        path: String,
        /// Underlying transport error
        #[source]
        source: reqwest::Error,
    },

    /// OPNsense answered with a status other than 200
    #[error("{method} request to {path} was not successful (HTTP {status}): {body}")]
    Protocol {
        /// HTTP method of the failed request
        method: String,
        /// API path of the failed request
        path: String,
        /// HTTP status code returned
        status: u16,
        /// Response body, empty when it could not be read
        body: String,
    },

    /// OPNsense rejected the API key/secret (HTTP 401)
    ///
    /// Credentials are invalid, expired or lack the Unbound privileges. The
    /// client does not re-authenticate.
    #[error("{method} request to {path} was rejected: API credentials are invalid or expired (HTTP 401)")]
    Unauthorized {
        /// HTTP method of the failed request
        method: String,
        /// API path of the failed request
        path: String,
    },

    /// The response body could not be decoded
    #[error("failed to decode response of {method} {path}: {reason}")]
    Decode {
        /// HTTP method of the request
        method: String,
        /// API path of the request
        path: String,
        /// Decoder error message
        reason: String,
    },

    /// The status check failed while constructing the client
    #[error("authentication against OPNsense at {host} failed: {source}")]
    Auth {
        /// Configured OPNsense host
        host: String,
        /// Error returned by the status check
        #[source]
        source: Box<UnboundError>,
    },

    /// A host override with the same name and type already exists
    #[error("{record_type} record '{name}' already exists (uuid {id})")]
    AlreadyExists {
        /// Fully-qualified record name
        name: String,
        /// Bare record type
        record_type: String,
        /// UUID of the existing host override
        id: String,
    },

    /// No host override matches the name and type
    #[error("{record_type} record '{name}' not found")]
    NotFound {
        /// Fully-qualified record name
        name: String,
        /// Bare record type
        record_type: String,
    },

    /// OPNsense returned 200 but reported the change as failed
    #[error("OPNsense rejected {operation} for '{name}': {details}")]
    Rejected {
        /// Operation that was rejected (e.g. `addHostOverride`)
        operation: String,
        /// Fully-qualified record name
        name: String,
        /// Validation messages from the response
        details: String,
    },

    /// The endpoint cannot be expressed as a host override
    #[error("invalid endpoint '{name}': {reason}")]
    InvalidEndpoint {
        /// Fully-qualified record name
        name: String,
        /// Explanation of what is invalid
        reason: String,
    },

    /// Host overrides cannot hold this record type
    #[error("unsupported record type '{record_type}' (supported: A, AAAA, MX)")]
    UnsupportedRecordType {
        /// The record type as received
        record_type: String,
    },

    /// The configured OPNsense host is not a valid URL
    #[error("invalid OPNsense host '{host}': {reason}")]
    InvalidUrl {
        /// Configured host
        host: String,
        /// Parser error message
        reason: String,
    },

    /// The HTTP client could not be built (TLS backend setup)
    #[error("failed to build HTTP client: {source}")]
    ClientBuild {
        /// Underlying builder error
        #[source]
        source: reqwest::Error,
    },

    /// Record changes were applied but Unbound could not be reconfigured
    ///
    /// The edits stay in OPNsense's configuration and become active on the
    /// next successful reconfigure.
    #[error("applied {applied} record change(s) but reconfiguring Unbound failed: {source}")]
    ReconfigureFailed {
        /// Number of record changes applied before the reconfigure
        applied: usize,
        /// Error returned by the reconfigure call
        #[source]
        source: Box<UnboundError>,
    },
}

impl UnboundError {
    /// HTTP status code carried by this error, if any.
    #[must_use]
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Protocol { status, .. } => Some(*status),
            Self::Unauthorized { .. } => Some(401),
            Self::Auth { source, .. } | Self::ReconfigureFailed { source, .. } => {
                source.status_code()
            }
            _ => None,
        }
    }

    /// Whether this error means the API credentials are not accepted.
    #[must_use]
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, Self::Unauthorized { .. } | Self::Auth { .. })
    }

    /// Short machine-friendly category, logged alongside the message.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Transport { .. } => "transport",
            Self::Protocol { .. } => "protocol",
            Self::Unauthorized { .. } => "unauthorized",
            Self::Decode { .. } => "decode",
            Self::Auth { .. } => "auth",
            Self::AlreadyExists { .. } => "already_exists",
            Self::NotFound { .. } => "not_found",
            Self::Rejected { .. } => "rejected",
            Self::InvalidEndpoint { .. } => "invalid_endpoint",
            Self::UnsupportedRecordType { .. } => "unsupported_record_type",
            Self::InvalidUrl { .. } => "invalid_url",
            Self::ClientBuild { .. } => "client_build",
            Self::ReconfigureFailed { .. } => "reconfigure_failed",
        }
    }
}

#[cfg(test)]
#[path = "errors_tests.rs"]
mod errors_tests;
