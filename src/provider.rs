// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! external-dns provider backed by OPNsense Unbound host overrides.
//!
//! The provider keeps no state between calls besides the client and the
//! domain filter: every call re-lists OPNsense.
//!
//! # Apply order
//!
//! A change set is applied in two phases:
//!
//! 1. All deletions (`UpdateOld`, then `Delete`)
//! 2. All creations (`Create`, then `UpdateNew`)
//!
//! followed by exactly one Unbound reconfigure. An update is a delete plus a
//! create of the same name and type, so deleting first keeps it from
//! colliding with itself. The first failing operation aborts the cycle;
//! operations already applied are not rolled back.
//!
//! # Example
//!
//! ```rust,no_run
//! use opnsense_webhook::config::OpnsenseConfig;
//! use opnsense_webhook::domain_filter::DomainFilter;
//! use opnsense_webhook::provider::{DnsProvider, UnboundProvider};
//!
//! # async fn example(config: OpnsenseConfig) -> Result<(), opnsense_webhook::errors::UnboundError> {
//! let provider = UnboundProvider::new(DomainFilter::default(), &config).await?;
//! let endpoints = provider.records().await?;
//! # Ok(())
//! # }
//! ```

use crate::codec::RecordType;
use crate::config::OpnsenseConfig;
use crate::domain_filter::DomainFilter;
use crate::endpoint::{Changes, Endpoint};
use crate::errors::UnboundError;
use crate::metrics;
use crate::unbound::UnboundClient;
use async_trait::async_trait;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Operations an external-dns webhook front end calls per request.
#[async_trait]
pub trait DnsProvider: Send + Sync {
    /// Current records, filtered by the domain filter.
    async fn records(&self) -> Result<Vec<Endpoint>, UnboundError>;

    /// Converge the DNS backend to the given changes.
    async fn apply_changes(&self, changes: &Changes) -> Result<(), UnboundError>;

    /// Rewrite desired endpoints into what the backend can represent.
    fn adjust_endpoints(&self, endpoints: Vec<Endpoint>) -> Vec<Endpoint>;

    /// Filter deciding which names this provider owns.
    fn domain_filter(&self) -> &DomainFilter;
}

/// Provider managing OPNsense Unbound host overrides.
#[derive(Debug, Clone)]
pub struct UnboundProvider {
    client: UnboundClient,
    domain_filter: DomainFilter,
}

impl UnboundProvider {
    /// Connect to OPNsense and build the provider.
    ///
    /// # Errors
    ///
    /// Returns any error from [`UnboundClient::new`], including `Auth` when
    /// the credentials are rejected.
    pub async fn new(domain_filter: DomainFilter, config: &OpnsenseConfig) -> Result<Self, UnboundError> {
        let client = UnboundClient::new(config).await?;
        Ok(Self::with_client(client, domain_filter))
    }

    /// Build the provider around an existing client.
    #[must_use]
    pub fn with_client(client: UnboundClient, domain_filter: DomainFilter) -> Self {
        Self {
            client,
            domain_filter,
        }
    }

    /// Underlying API client.
    #[must_use]
    pub fn client(&self) -> &UnboundClient {
        &self.client
    }

    /// Deletions then creations, without the trailing reconfigure.
    ///
    /// Returns the number of record operations applied.
    async fn apply_record_changes(&self, changes: &Changes) -> Result<usize, UnboundError> {
        let mut applied = 0;

        for endpoint in changes.deletions() {
            debug!(name = %endpoint.dns_name, record_type = %endpoint.record_type, "Deleting record");
            self.client.delete_host_override(endpoint).await?;
            metrics::record_change("delete", &endpoint.record_type);
            applied += 1;
        }

        for endpoint in changes.creations() {
            debug!(name = %endpoint.dns_name, record_type = %endpoint.record_type, "Creating record");
            self.client.create_host_override(endpoint).await?;
            metrics::record_change("create", &endpoint.record_type);
            applied += 1;
        }

        Ok(applied)
    }
}

#[async_trait]
impl DnsProvider for UnboundProvider {
    async fn records(&self) -> Result<Vec<Endpoint>, UnboundError> {
        let records = self.client.list_host_overrides().await?;
        let total = records.len();

        let endpoints: Vec<Endpoint> = records
            .iter()
            .map(|record| record.to_endpoint())
            .filter(|endpoint| self.domain_filter.matches(&endpoint.dns_name))
            .collect();

        debug!(
            total,
            returned = endpoints.len(),
            "Retrieved records from OPNsense"
        );

        Ok(endpoints)
    }

    async fn apply_changes(&self, changes: &Changes) -> Result<(), UnboundError> {
        let start = Instant::now();
        info!(
            create = changes.create.len(),
            update = changes.update_new.len(),
            delete = changes.delete.len(),
            "Applying changes"
        );

        let applied = match self.apply_record_changes(changes).await {
            Ok(applied) => applied,
            Err(e) => {
                error!(kind = e.kind(), error = %e, "Applying changes failed, aborting cycle");
                metrics::record_apply_changes(false, start.elapsed());
                return Err(e);
            }
        };

        if let Err(e) = self.client.reconfigure().await {
            error!(
                applied,
                kind = e.kind(),
                error = %e,
                "Record changes applied but Unbound reconfigure failed"
            );
            metrics::record_apply_changes(false, start.elapsed());
            return Err(UnboundError::ReconfigureFailed {
                applied,
                source: Box::new(e),
            });
        }

        metrics::record_apply_changes(true, start.elapsed());
        info!(applied, elapsed = ?start.elapsed(), "Changes applied");
        Ok(())
    }

    fn adjust_endpoints(&self, endpoints: Vec<Endpoint>) -> Vec<Endpoint> {
        endpoints
            .into_iter()
            .filter_map(|mut endpoint| {
                if endpoint.record_type.parse::<RecordType>().is_err() {
                    warn!(
                        name = %endpoint.dns_name,
                        record_type = %endpoint.record_type,
                        "Dropping endpoint with a record type host overrides cannot hold"
                    );
                    return None;
                }
                if endpoint.targets.len() > 1 {
                    warn!(
                        name = %endpoint.dns_name,
                        targets = ?endpoint.targets,
                        "Host overrides hold one target, keeping the first"
                    );
                    endpoint.targets.truncate(1);
                }
                Some(endpoint)
            })
            .collect()
    }

    fn domain_filter(&self) -> &DomainFilter {
        &self.domain_filter
    }
}

#[cfg(test)]
#[path = "provider_tests.rs"]
mod provider_tests;
