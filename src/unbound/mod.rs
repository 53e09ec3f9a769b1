// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! OPNsense Unbound management via its HTTP API.
//!
//! This module provides the authenticated client the provider drives. It handles:
//!
//! - Validating credentials with a status check at construction
//! - Listing, looking up, creating and deleting host overrides
//! - Reconfiguring Unbound after record changes
//!
//! # Architecture
//!
//! Every call goes through one request primitive that builds the URL from a
//! path template, attaches Basic authentication and JSON headers, and treats
//! exactly HTTP 200 as success. There is no retry policy and no
//! re-authentication: errors go straight back to the caller.
//!
//! # Example
//!
//! ```rust,no_run
//! use opnsense_webhook::config::OpnsenseConfig;
//! use opnsense_webhook::unbound::UnboundClient;
//!
//! # async fn example(config: OpnsenseConfig) -> Result<(), opnsense_webhook::errors::UnboundError> {
//! let client = UnboundClient::new(&config).await?;
//!
//! for record in client.list_host_overrides().await? {
//!     println!("{} {}", record.fqdn(), record.bare_type());
//! }
//! # Ok(())
//! # }
//! ```

// Module declarations
pub mod host_overrides;
pub mod service;
pub mod types;

pub use types::{AddHostOverrideRequest, HostOverride, HostOverrideList, MutationResponse};

use crate::config::OpnsenseConfig;
use crate::constants::{
    DEFAULT_API_SCHEME, JSON_ACCEPT, JSON_CONTENT_TYPE, PATH_PARAM_PLACEHOLDER,
};
use crate::errors::UnboundError;
use crate::metrics;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::header::{HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client as HttpClient, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info};
use url::Url;

/// Build the API base URL from the configured host.
///
/// Adds `https://` when no scheme is given and strips trailing slashes, so
/// `"192.168.1.1/"` becomes `"https://192.168.1.1"`.
#[must_use]
pub fn build_api_url(host: &str) -> String {
    let host = host.trim().trim_end_matches('/');
    if host.starts_with("http://") || host.starts_with("https://") {
        host.to_string()
    } else {
        format!("{DEFAULT_API_SCHEME}://{host}")
    }
}

/// Fill the `{}` placeholders of a path template with positional parameters.
///
/// Placeholders without a matching parameter are dropped; an empty
/// parameter is inserted as is, so callers must reject empty values.
#[must_use]
pub fn format_url(template: &str, params: &[&str]) -> String {
    let mut params = params.iter();
    let mut segments = template.split(PATH_PARAM_PLACEHOLDER);
    let mut url = segments.next().unwrap_or_default().to_string();

    for segment in segments {
        if let Some(param) = params.next() {
            url.push_str(param);
        }
        url.push_str(segment);
    }

    url
}

/// Encode `key:secret` as a Basic authorization header value.
fn basic_auth_header(key: &str, secret: &str) -> HeaderValue {
    let encoded = STANDARD.encode(format!("{key}:{secret}"));
    // Base64 output is always a valid header value
    let mut value = HeaderValue::from_str(&format!("Basic {encoded}"))
        .unwrap_or_else(|_| HeaderValue::from_static("Basic"));
    value.set_sensitive(true);
    value
}

/// Authenticated client for the OPNsense Unbound API.
///
/// Cheap to clone; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct UnboundClient {
    /// HTTP client for API requests
    client: Arc<HttpClient>,
    /// Base URL without trailing slash, e.g. `https://192.168.1.1`
    base_url: Arc<String>,
    /// Precomputed `Authorization` header
    auth_header: HeaderValue,
}

impl UnboundClient {
    /// Create a client and validate the credentials.
    ///
    /// Performs a status check so that bad credentials or an unreachable
    /// firewall fail here instead of on the first reconciliation.
    ///
    /// # Errors
    ///
    /// Returns `InvalidUrl` for an unparsable host, `ClientBuild` if the HTTP
    /// client cannot be built, and `Auth` if the status check fails.
    pub async fn new(config: &OpnsenseConfig) -> Result<Self, UnboundError> {
        let client = Self::without_status_check(config)?;

        client
            .status()
            .await
            .map_err(|e| UnboundError::Auth {
                host: config.host.clone(),
                source: Box::new(e),
            })?;

        info!(
            base_url = %client.base_url,
            skip_tls_verify = config.skip_tls_verify,
            "Authenticated against OPNsense Unbound API"
        );

        Ok(client)
    }

    /// Create a client without contacting OPNsense.
    ///
    /// # Errors
    ///
    /// Returns `InvalidUrl` for an unparsable host and `ClientBuild` if the
    /// HTTP client cannot be built.
    pub fn without_status_check(config: &OpnsenseConfig) -> Result<Self, UnboundError> {
        let base_url = build_api_url(&config.host);
        Url::parse(&base_url).map_err(|e| UnboundError::InvalidUrl {
            host: config.host.clone(),
            reason: e.to_string(),
        })?;

        let mut builder =
            HttpClient::builder().danger_accept_invalid_certs(config.skip_tls_verify);
        if let Some(timeout) = config.http_timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|source| UnboundError::ClientBuild { source })?;

        Ok(Self {
            client: Arc::new(client),
            base_url: Arc::new(base_url),
            auth_header: basic_auth_header(&config.api_key, &config.api_secret),
        })
    }

    /// Base URL requests are sent to.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Execute one API request and return the response body.
    ///
    /// All operations funnel through here. Exactly HTTP 200 is success; 401
    /// maps to `Unauthorized` and any other status to `Protocol` with the
    /// response body attached.
    ///
    /// # Arguments
    /// * `method` - HTTP method
    /// * `template` - API path with `{}` placeholders
    /// * `params` - Positional values for the placeholders
    /// * `body` - JSON body, only sent for non-GET requests
    ///
    /// # Errors
    ///
    /// Returns `Transport`, `Unauthorized` or `Protocol`.
    pub(crate) async fn request<B: Serialize + ?Sized>(
        &self,
        method: Method,
        template: &str,
        params: &[&str],
        body: Option<&B>,
    ) -> Result<String, UnboundError> {
        let path = format_url(template, params);
        let url = format!("{}/{path}", self.base_url);
        let start = Instant::now();

        debug!(method = %method, url = %url, "HTTP API request to OPNsense");

        let mut request = self
            .client
            .request(method.clone(), &url)
            .header(AUTHORIZATION, self.auth_header.clone())
            .header(ACCEPT, JSON_ACCEPT);

        if method != Method::GET {
            request = request.header(CONTENT_TYPE, JSON_CONTENT_TYPE);
            if let Some(body) = body {
                let payload = serde_json::to_vec(body).map_err(|e| UnboundError::Decode {
                    method: method.to_string(),
                    path: path.clone(),
                    reason: format!("failed to encode request body: {e}"),
                })?;
                request = request.body(payload);
            }
        }

        let transport_error = |source| UnboundError::Transport {
            method: method.to_string(),
            path: path.clone(),
            source,
        };

        let response = match request.send().await {
            Ok(response) => response,
            Err(source) => {
                metrics::record_unbound_request(template, "transport_error", start.elapsed());
                error!(method = %method, url = %url, error = %source, "HTTP API request failed to send");
                return Err(transport_error(source));
            }
        };

        let status = response.status();
        let text = response.text().await.map_err(transport_error)?;

        metrics::record_unbound_request(template, status.as_str(), start.elapsed());
        debug!(
            method = %method,
            url = %url,
            status = %status,
            response_len = text.len(),
            "HTTP API response from OPNsense"
        );

        match status {
            StatusCode::OK => Ok(text),
            StatusCode::UNAUTHORIZED => {
                error!(method = %method, url = %url, "OPNsense rejected the API credentials");
                Err(UnboundError::Unauthorized {
                    method: method.to_string(),
                    path,
                })
            }
            _ => {
                error!(
                    method = %method,
                    url = %url,
                    status = %status,
                    error = %text,
                    "HTTP API request was not successful"
                );
                Err(UnboundError::Protocol {
                    method: method.to_string(),
                    path,
                    status: status.as_u16(),
                    body: text,
                })
            }
        }
    }

    /// Decode a response body, naming the request on failure.
    pub(crate) fn decode<T: DeserializeOwned>(
        method: &Method,
        path: &str,
        text: &str,
    ) -> Result<T, UnboundError> {
        serde_json::from_str(text).map_err(|e| UnboundError::Decode {
            method: method.to_string(),
            path: path.to_string(),
            reason: e.to_string(),
        })
    }
}
