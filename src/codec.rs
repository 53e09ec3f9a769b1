// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Conversions between external-dns names/types and OPNsense's host override fields.
//!
//! OPNsense stores a host override as a `hostname` (leftmost label) plus a
//! `domain` (everything after the first dot), and decorates record types in
//! listings (`"A (IPv4 address)"`). Everything that knows about those quirks
//! lives here so the rest of the crate only ever sees full names and bare
//! [`RecordType`] values.
//!
//! # Example
//!
//! ```rust
//! use opnsense_webhook::codec::{join_fqdn, prune_type, split_fqdn};
//!
//! let (hostname, domain) = split_fqdn("www.lab.example.com");
//! assert_eq!(hostname, "www");
//! assert_eq!(domain, "lab.example.com");
//! assert_eq!(join_fqdn(hostname, domain), "www.lab.example.com");
//!
//! assert_eq!(prune_type("AAAA (IPv6 address)"), "AAAA");
//! ```

use crate::constants::{IPV4_TYPE_SUFFIX, IPV6_TYPE_SUFFIX};
use crate::errors::UnboundError;
use std::fmt;
use std::str::FromStr;

/// Split a fully-qualified name into `(hostname, domain)` on the first dot.
///
/// The domain keeps any further dots, so multi-label zones survive intact.
/// A name without a dot yields an empty domain.
#[must_use]
pub fn split_fqdn(name: &str) -> (&str, &str) {
    name.split_once('.').unwrap_or((name, ""))
}

/// Join a hostname and domain back into a fully-qualified name.
///
/// Inverse of [`split_fqdn`]: an empty domain returns the bare hostname.
#[must_use]
pub fn join_fqdn(hostname: &str, domain: &str) -> String {
    if domain.is_empty() {
        hostname.to_string()
    } else {
        format!("{hostname}.{domain}")
    }
}

/// Strip OPNsense's human-readable suffix from a record type.
///
/// Returns everything before the first space, or the whole string.
#[must_use]
pub fn prune_type(decorated: &str) -> &str {
    decorated
        .split_once(' ')
        .map_or(decorated, |(bare, _)| bare)
}

/// Add the suffix OPNsense shows for A and AAAA records.
///
/// Other types are returned unchanged. The write endpoint accepts bare types.
#[must_use]
pub fn embellish_type(bare: &str) -> String {
    match bare {
        "A" => format!("{bare}{IPV4_TYPE_SUFFIX}"),
        "AAAA" => format!("{bare}{IPV6_TYPE_SUFFIX}"),
        _ => bare.to_string(),
    }
}

/// Render MX fields as an external-dns MX target (`"<priority> <host>"`).
#[must_use]
pub fn format_mx_target(priority: &str, exchange: &str) -> String {
    format!("{priority} {exchange}")
}

/// Parse an external-dns MX target into `(priority, host)`.
///
/// Returns `None` when the priority is missing or not a number.
#[must_use]
pub fn parse_mx_target(target: &str) -> Option<(u16, &str)> {
    let (priority, exchange) = target.trim().split_once(char::is_whitespace)?;
    let priority = priority.parse().ok()?;
    let exchange = exchange.trim();
    if exchange.is_empty() {
        return None;
    }
    Some((priority, exchange))
}

/// Record types a host override can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordType {
    /// IPv4 address record
    A,
    /// IPv6 address record
    Aaaa,
    /// Mail exchanger record
    Mx,
}

impl RecordType {
    /// All supported types, in the order OPNsense lists them.
    pub const ALL: [Self; 3] = [Self::A, Self::Aaaa, Self::Mx];

    /// Bare type token as used by external-dns and the write endpoint.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::A => "A",
            Self::Aaaa => "AAAA",
            Self::Mx => "MX",
        }
    }

    /// Type as OPNsense decorates it in listings.
    #[must_use]
    pub fn embellished(self) -> String {
        embellish_type(self.as_str())
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordType {
    type Err = UnboundError;

    /// Accepts bare (`"A"`) and decorated (`"A (IPv4 address)"`) input.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match prune_type(s.trim()) {
            "A" => Ok(Self::A),
            "AAAA" => Ok(Self::Aaaa),
            "MX" => Ok(Self::Mx),
            _ => Err(UnboundError::UnsupportedRecordType {
                record_type: s.to_string(),
            }),
        }
    }
}

#[cfg(test)]
#[path = "codec_tests.rs"]
mod codec_tests;
