// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Host override operations (list, lookup, create, delete).
//!
//! OPNsense never derives a record's UUID from its name, so every create and
//! delete starts by listing all overrides and scanning for an exact
//! hostname + domain + type match. Host override tables on a firewall are
//! small, so the linear scan is kept.

use super::types::{AddHostOverrideRequest, HostOverride, HostOverrideList, MutationResponse};
use super::UnboundClient;
use crate::codec::split_fqdn;
use crate::constants::{
    UNBOUND_ADD_HOST_OVERRIDE_PATH, UNBOUND_DEL_HOST_OVERRIDE_PATH,
    UNBOUND_SEARCH_HOST_OVERRIDE_PATH,
};
use crate::endpoint::Endpoint;
use crate::errors::UnboundError;
use reqwest::Method;
use serde_json::json;
use tracing::{debug, info, warn};

impl UnboundClient {
    /// Decode the body of a mutation call.
    ///
    /// OPNsense versions differ in what they echo; an empty body is fine.
    fn decode_mutation(path: &str, text: &str) -> Result<MutationResponse, UnboundError> {
        if text.trim().is_empty() {
            Ok(MutationResponse::default())
        } else {
            Self::decode(&Method::POST, path, text)
        }
    }

    /// List every host override configured in Unbound.
    ///
    /// # Errors
    ///
    /// Returns `Transport` on network failure, `Protocol`/`Unauthorized` on a
    /// non-200 status, and `Decode` on a malformed body.
    pub async fn list_host_overrides(&self) -> Result<Vec<HostOverride>, UnboundError> {
        let text = self
            .request::<()>(Method::GET, UNBOUND_SEARCH_HOST_OVERRIDE_PATH, &[], None)
            .await?;

        let list: HostOverrideList =
            Self::decode(&Method::GET, UNBOUND_SEARCH_HOST_OVERRIDE_PATH, &text)?;

        debug!(count = list.rows.len(), "Retrieved host overrides");
        Ok(list.rows)
    }

    /// Find the UUID of the host override for `fqdn` and `record_type`.
    ///
    /// Matching is exact and case-sensitive on hostname, domain and bare
    /// record type; the first match wins. `None` means no such record.
    ///
    /// # Errors
    ///
    /// Returns any error from [`Self::list_host_overrides`].
    pub async fn find_host_override_id(
        &self,
        fqdn: &str,
        record_type: &str,
    ) -> Result<Option<String>, UnboundError> {
        let records = self.list_host_overrides().await?;
        let (hostname, domain) = split_fqdn(fqdn);

        let id = records
            .into_iter()
            .find(|r| r.is_identified_by(hostname, domain, record_type))
            .map(|r| r.id);

        match &id {
            Some(id) => debug!(fqdn, record_type, uuid = %id, "Host override found"),
            None => debug!(
                hostname,
                domain, record_type, "No matching host override found"
            ),
        }

        Ok(id)
    }

    /// Create a host override for an endpoint.
    ///
    /// Creating a record that already exists is an error; the caller must
    /// delete it first. The returned record is the submission with the UUID
    /// OPNsense assigned, when the response carries one.
    ///
    /// # Errors
    ///
    /// Returns `AlreadyExists` (no write is made), `InvalidEndpoint` or
    /// `UnsupportedRecordType` for endpoints that cannot be stored, `Rejected`
    /// when OPNsense answers `{"result": "failed"}`, and any request error.
    pub async fn create_host_override(
        &self,
        endpoint: &Endpoint,
    ) -> Result<HostOverride, UnboundError> {
        let mut record = HostOverride::from_endpoint(endpoint)?;

        if let Some(id) = self
            .find_host_override_id(&endpoint.dns_name, record.bare_type())
            .await?
        {
            warn!(
                name = %endpoint.dns_name,
                record_type = %endpoint.record_type,
                uuid = %id,
                "Host override already exists, refusing to create a duplicate"
            );
            return Err(UnboundError::AlreadyExists {
                name: endpoint.dns_name.clone(),
                record_type: record.bare_type().to_string(),
                id,
            });
        }

        let text = self
            .request(
                Method::POST,
                UNBOUND_ADD_HOST_OVERRIDE_PATH,
                &[],
                Some(&AddHostOverrideRequest { host: &record }),
            )
            .await?;

        let response = Self::decode_mutation(UNBOUND_ADD_HOST_OVERRIDE_PATH, &text)?;

        if response.is_failed() {
            return Err(UnboundError::Rejected {
                operation: "addHostOverride".to_string(),
                name: endpoint.dns_name.clone(),
                details: response.details(),
            });
        }

        if let Some(uuid) = response.uuid {
            record.id = uuid;
        }

        info!(
            name = %endpoint.dns_name,
            record_type = %record.record_type,
            uuid = %record.id,
            "Created host override"
        );

        Ok(record)
    }

    /// Delete the host override matching an endpoint's name and type.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when no record matches (no delete call is made) or
    /// OPNsense answers `{"result": "not found"}`, `Decode` when the matching
    /// row has no UUID, `Rejected` when OPNsense answers `{"result": "failed"}`,
    /// and any request error.
    pub async fn delete_host_override(&self, endpoint: &Endpoint) -> Result<(), UnboundError> {
        let not_found = || UnboundError::NotFound {
            name: endpoint.dns_name.clone(),
            record_type: endpoint.record_type.clone(),
        };

        let id = self
            .find_host_override_id(&endpoint.dns_name, &endpoint.record_type)
            .await?
            .ok_or_else(not_found)?;

        if id.is_empty() {
            return Err(UnboundError::Decode {
                method: Method::GET.to_string(),
                path: UNBOUND_SEARCH_HOST_OVERRIDE_PATH.to_string(),
                reason: format!("host override '{}' is listed without a uuid", endpoint.dns_name),
            });
        }

        // The endpoint rejects an empty body, so send an empty object
        let text = self
            .request(
                Method::POST,
                UNBOUND_DEL_HOST_OVERRIDE_PATH,
                &[id.as_str()],
                Some(&json!({})),
            )
            .await?;

        let response = Self::decode_mutation(UNBOUND_DEL_HOST_OVERRIDE_PATH, &text)?;
        if response.is_not_found() {
            warn!(name = %endpoint.dns_name, uuid = %id, "Host override vanished before delete");
            return Err(not_found());
        }
        if response.is_failed() {
            return Err(UnboundError::Rejected {
                operation: "delHostOverride".to_string(),
                name: endpoint.dns_name.clone(),
                details: response.details(),
            });
        }

        info!(
            name = %endpoint.dns_name,
            record_type = %endpoint.record_type,
            uuid = %id,
            "Deleted host override"
        );

        Ok(())
    }
}
