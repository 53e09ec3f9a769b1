// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unbound service operations.

use super::UnboundClient;
use crate::constants::{UNBOUND_RECONFIGURE_PATH, UNBOUND_STATUS_PATH};
use crate::errors::UnboundError;
use reqwest::Method;
use serde_json::json;
use tracing::info;

impl UnboundClient {
    /// Query the Unbound service status.
    ///
    /// Cheap, read-only call used to validate credentials.
    ///
    /// # Errors
    ///
    /// Returns any request error.
    pub async fn status(&self) -> Result<String, UnboundError> {
        self.request::<()>(Method::GET, UNBOUND_STATUS_PATH, &[], None)
            .await
    }

    /// Reload Unbound so it serves the current host overrides.
    ///
    /// Record edits are written to OPNsense's configuration but stay inactive
    /// until this is called. Call it once per batch, not per record.
    ///
    /// # Errors
    ///
    /// Returns any request error.
    pub async fn reconfigure(&self) -> Result<(), UnboundError> {
        self.request(Method::POST, UNBOUND_RECONFIGURE_PATH, &[], Some(&json!({})))
            .await?;

        info!("Reconfigured Unbound");
        Ok(())
    }
}
