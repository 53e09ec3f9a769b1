// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `media_type.rs`

#[cfg(test)]
mod tests {
    use crate::webhook::media_type::{
        check_and_get_media_type_header_value, media_type_version, supported_media_types,
    };

    #[test]
    fn test_media_type_version() {
        assert_eq!(
            media_type_version("1"),
            "application/external.dns.webhook+json;version=1"
        );
    }

    #[test]
    fn test_supported_version_is_accepted() {
        let version =
            check_and_get_media_type_header_value("application/external.dns.webhook+json;version=1")
                .unwrap();
        assert_eq!(version, "1");
    }

    #[test]
    fn test_unknown_version_is_rejected() {
        let err =
            check_and_get_media_type_header_value("application/external.dns.webhook+json;version=2")
                .unwrap_err();
        assert_eq!(
            err.to_string(),
            "unsupported media type version: 'application/external.dns.webhook+json;version=2'. \
             supported media types are: 'application/external.dns.webhook+json;version=1'"
        );
    }

    #[test]
    fn test_match_is_exact() {
        // No whitespace tolerance and no plain JSON fallback
        assert!(check_and_get_media_type_header_value(
            "application/external.dns.webhook+json; version=1"
        )
        .is_err());
        assert!(check_and_get_media_type_header_value("application/json").is_err());
        assert!(check_and_get_media_type_header_value("").is_err());
    }

    #[test]
    fn test_supported_media_types_lists_all_versions() {
        assert_eq!(
            supported_media_types(),
            "application/external.dns.webhook+json;version=1"
        );
    }
}
