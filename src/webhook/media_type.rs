// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Versioned media type of the external-dns webhook protocol.
//!
//! The header value must match `application/external.dns.webhook+json;version=N`
//! exactly, for one of the supported versions.

use crate::constants::{MEDIA_TYPE_FORMAT, SUPPORTED_MEDIA_VERSIONS};
use thiserror::Error;

/// Header value naming a media type version the webhook does not speak.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unsupported media type version: '{value}'. supported media types are: '{supported}'")]
pub struct UnsupportedMediaVersion {
    /// Header value the client sent
    pub value: String,
    /// Comma-separated list of acceptable header values
    pub supported: String,
}

/// Full media type for a protocol version.
#[must_use]
pub fn media_type_version(version: &str) -> String {
    format!("{MEDIA_TYPE_FORMAT}version={version}")
}

/// Every media type the webhook accepts, comma-separated.
#[must_use]
pub fn supported_media_types() -> String {
    SUPPORTED_MEDIA_VERSIONS
        .iter()
        .map(|v| media_type_version(v))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Check a header value and return the protocol version it names.
///
/// # Errors
///
/// Returns [`UnsupportedMediaVersion`] when the value is not exactly one of
/// the supported media types.
pub fn check_and_get_media_type_header_value(
    value: &str,
) -> Result<&'static str, UnsupportedMediaVersion> {
    SUPPORTED_MEDIA_VERSIONS
        .iter()
        .find(|v| media_type_version(v) == value)
        .copied()
        .ok_or_else(|| UnsupportedMediaVersion {
            value: value.to_string(),
            supported: supported_media_types(),
        })
}

#[cfg(test)]
#[path = "media_type_tests.rs"]
mod media_type_tests;
