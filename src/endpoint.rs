// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! external-dns wire types: endpoints and change sets.
//!
//! These mirror the JSON external-dns exchanges with webhook providers. Only
//! `dnsName`, `recordType`, `targets` and `setIdentifier` carry meaning for
//! OPNsense; the remaining fields are passed through untouched.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// Treat an explicit JSON `null` like a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn is_zero(ttl: &i64) -> bool {
    *ttl == 0
}

/// A provider-specific key/value attached to an endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderSpecificProperty {
    /// Property name
    pub name: String,
    /// Property value
    pub value: String,
}

/// A DNS record in the framework-neutral shape external-dns uses.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Endpoint {
    /// Fully-qualified name, without a trailing dot
    pub dns_name: String,
    /// Record values; OPNsense holds one target per host override
    #[serde(default, deserialize_with = "null_as_default")]
    pub targets: Vec<String>,
    /// Bare record type (`A`, `AAAA`, `MX`, ...)
    #[serde(default)]
    pub record_type: String,
    /// Identifier distinguishing records that share name and type
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "String::is_empty"
    )]
    pub set_identifier: String,
    /// TTL in seconds; host overrides have no TTL so this is passed through
    #[serde(rename = "recordTTL", default, skip_serializing_if = "is_zero")]
    pub record_ttl: i64,
    /// external-dns ownership labels
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub labels: BTreeMap<String, String>,
    /// Provider-specific properties
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub provider_specific: Vec<ProviderSpecificProperty>,
}

impl Endpoint {
    /// Create an endpoint with a name, type and targets.
    #[must_use]
    pub fn new(dns_name: impl Into<String>, record_type: impl Into<String>, targets: Vec<String>) -> Self {
        Self {
            dns_name: dns_name.into(),
            record_type: record_type.into(),
            targets,
            ..Self::default()
        }
    }

    /// First target, the only one OPNsense stores.
    #[must_use]
    pub fn first_target(&self) -> Option<&str> {
        self.targets.first().map(String::as_str)
    }
}

/// Changes external-dns wants applied in one reconciliation cycle.
///
/// Updates arrive as an old/new pair; OPNsense has no update call so the old
/// side is deleted and the new side created.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Changes {
    /// Records to create
    #[serde(rename = "Create", alias = "create", default, deserialize_with = "null_as_default")]
    pub create: Vec<Endpoint>,
    /// Current state of records being updated
    #[serde(rename = "UpdateOld", alias = "updateOld", default, deserialize_with = "null_as_default")]
    pub update_old: Vec<Endpoint>,
    /// Desired state of records being updated
    #[serde(rename = "UpdateNew", alias = "updateNew", default, deserialize_with = "null_as_default")]
    pub update_new: Vec<Endpoint>,
    /// Records to delete
    #[serde(rename = "Delete", alias = "delete", default, deserialize_with = "null_as_default")]
    pub delete: Vec<Endpoint>,
}

impl Changes {
    /// Endpoints to remove: `UpdateOld` first, then `Delete`.
    pub fn deletions(&self) -> impl Iterator<Item = &Endpoint> {
        self.update_old.iter().chain(self.delete.iter())
    }

    /// Endpoints to add: `Create` first, then `UpdateNew`.
    pub fn creations(&self) -> impl Iterator<Item = &Endpoint> {
        self.create.iter().chain(self.update_new.iter())
    }

    /// Total number of record operations this change set implies.
    #[must_use]
    pub fn len(&self) -> usize {
        self.create.len() + self.update_old.len() + self.update_new.len() + self.delete.len()
    }

    /// Whether there is nothing to apply.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
#[path = "endpoint_tests.rs"]
mod endpoint_tests;
