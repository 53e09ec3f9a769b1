// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Wire types of the OPNsense Unbound host override API.

use crate::codec::{format_mx_target, join_fqdn, parse_mx_target, prune_type, split_fqdn, RecordType};
use crate::endpoint::Endpoint;
use crate::errors::UnboundError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// Serde adapter for OPNsense's `"1"`/`"0"` boolean flags.
///
/// Listings are lenient: booleans and numbers are accepted as well.
mod flag {
    use super::{Deserialize, Deserializer, Serializer, Value};
    use crate::constants::{DISABLED_FLAG, ENABLED_FLAG};
    use serde::de::Error;

    #[allow(clippy::trivially_copy_pass_by_ref)]
    pub(super) fn serialize<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(if *value { ENABLED_FLAG } else { DISABLED_FLAG })
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        match Value::deserialize(deserializer)? {
            Value::Bool(b) => Ok(b),
            Value::String(s) => Ok(s == ENABLED_FLAG || s.eq_ignore_ascii_case("true")),
            Value::Number(n) => Ok(n.as_u64() == Some(1)),
            Value::Null => Ok(false),
            other => Err(D::Error::custom(format!("invalid enabled flag: {other}"))),
        }
    }
}

/// Accept strings, numbers or null for fields OPNsense sometimes sends untyped.
fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    })
}

const fn enabled_by_default() -> bool {
    true
}

/// A host override: one manually configured record served by Unbound.
///
/// OPNsense stores the name split at the first dot. `record_type` is
/// decorated in listings (`"A (IPv4 address)"`); use [`Self::bare_type`]
/// before comparing it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostOverride {
    /// UUID assigned by OPNsense, empty until created
    #[serde(rename = "uuid", default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    /// Whether Unbound serves this record
    #[serde(with = "flag", default = "enabled_by_default")]
    pub enabled: bool,
    /// Leftmost label
    #[serde(default)]
    pub hostname: String,
    /// Remaining labels
    #[serde(default)]
    pub domain: String,
    /// Record type, possibly decorated
    #[serde(rename = "rr", default)]
    pub record_type: String,
    /// IP address for A/AAAA records
    #[serde(rename = "server", default)]
    pub target: String,
    /// Free text; carries the external-dns set identifier both ways
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    /// Mail exchanger host for MX records
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub mx: String,
    /// Mail exchanger priority for MX records
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "String::is_empty")]
    pub mxprio: String,
}

impl HostOverride {
    /// New enabled host override for an address record.
    #[must_use]
    pub fn new(
        hostname: impl Into<String>,
        domain: impl Into<String>,
        record_type: RecordType,
        target: impl Into<String>,
    ) -> Self {
        Self {
            id: String::new(),
            enabled: true,
            hostname: hostname.into(),
            domain: domain.into(),
            record_type: record_type.as_str().to_string(),
            target: target.into(),
            description: String::new(),
            mx: String::new(),
            mxprio: String::new(),
        }
    }

    /// Build the record to submit for an external-dns endpoint.
    ///
    /// Uses the first target only. MX targets (`"10 mail.example.com"`) are
    /// split into `mxprio` and `mx`.
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedRecordType` for types a host override cannot hold
    /// and `InvalidEndpoint` when there is no usable target.
    pub fn from_endpoint(endpoint: &Endpoint) -> Result<Self, UnboundError> {
        let record_type: RecordType = endpoint.record_type.parse()?;
        let target = endpoint
            .first_target()
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| UnboundError::InvalidEndpoint {
                name: endpoint.dns_name.clone(),
                reason: "endpoint has no targets".to_string(),
            })?;

        let (hostname, domain) = split_fqdn(&endpoint.dns_name);

        let mut record = match record_type {
            RecordType::A | RecordType::Aaaa => {
                HostOverride::new(hostname, domain, record_type, target.trim())
            }
            RecordType::Mx => {
                let (priority, exchange) =
                    parse_mx_target(target).ok_or_else(|| UnboundError::InvalidEndpoint {
                        name: endpoint.dns_name.clone(),
                        reason: format!("MX target '{target}' is not '<priority> <host>'"),
                    })?;
                let mut record = HostOverride::new(hostname, domain, record_type, "");
                record.mx = exchange.to_string();
                record.mxprio = priority.to_string();
                record
            }
        };
        record.description.clone_from(&endpoint.set_identifier);

        Ok(record)
    }

    /// Fully-qualified name of this record.
    #[must_use]
    pub fn fqdn(&self) -> String {
        join_fqdn(&self.hostname, &self.domain)
    }

    /// Record type without OPNsense's decoration.
    #[must_use]
    pub fn bare_type(&self) -> &str {
        prune_type(&self.record_type)
    }

    /// Whether this record is the one identified by split name and bare type.
    #[must_use]
    pub fn is_identified_by(&self, hostname: &str, domain: &str, record_type: &str) -> bool {
        self.hostname == hostname && self.domain == domain && self.bare_type() == record_type
    }

    /// The single target this record serves, in external-dns format.
    #[must_use]
    pub fn endpoint_target(&self) -> String {
        if self.bare_type() == RecordType::Mx.as_str() {
            format_mx_target(&self.mxprio, &self.mx)
        } else {
            self.target.clone()
        }
    }

    /// Convert to the neutral endpoint representation.
    ///
    /// `description` comes back as the set identifier it was written from.
    #[must_use]
    pub fn to_endpoint(&self) -> Endpoint {
        let mut endpoint =
            Endpoint::new(self.fqdn(), self.bare_type(), vec![self.endpoint_target()]);
        endpoint.set_identifier.clone_from(&self.description);
        endpoint
    }
}

/// Envelope returned by `searchHostOverride`.
///
/// Pagination metadata is decoded but unused; only `rows` matters.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostOverrideList {
    /// Rows on this page
    #[serde(default)]
    pub row_count: u64,
    /// Total rows
    #[serde(default)]
    pub total: u64,
    /// Current page
    #[serde(default)]
    pub current: u64,
    /// Host overrides
    #[serde(rename = "rows", alias = "Rows", default)]
    pub rows: Vec<HostOverride>,
}

/// Body of an `addHostOverride` request.
#[derive(Debug, Serialize)]
pub struct AddHostOverrideRequest<'a> {
    /// Record to create
    pub host: &'a HostOverride,
}

/// Response of mutation endpoints (`addHostOverride`, `delHostOverride`).
///
/// Every field is optional; OPNsense versions differ in what they echo back.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MutationResponse {
    /// `"saved"`, `"deleted"`, `"failed"`, ...
    #[serde(default)]
    pub result: Option<String>,
    /// UUID of the created record
    #[serde(default)]
    pub uuid: Option<String>,
    /// Field-level validation messages on failure
    #[serde(default)]
    pub validations: Option<Value>,
}

impl MutationResponse {
    /// Whether OPNsense reported the change as failed.
    #[must_use]
    pub fn is_failed(&self) -> bool {
        self.result.as_deref() == Some(crate::constants::MUTATION_RESULT_FAILED)
    }

    /// Whether OPNsense reported the target record as missing.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.result.as_deref() == Some(crate::constants::MUTATION_RESULT_NOT_FOUND)
    }

    /// Validation details for error messages.
    #[must_use]
    pub fn details(&self) -> String {
        self.validations
            .as_ref()
            .map_or_else(|| "no validation details".to_string(), Value::to_string)
    }
}

#[cfg(test)]
#[path = "types_tests.rs"]
mod types_tests;
