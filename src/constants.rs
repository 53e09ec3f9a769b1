// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Global constants for the OPNsense webhook.
//!
//! This module contains all numeric and string constants used throughout the codebase.
//! Constants are organized by category for easy maintenance.

// ============================================================================
// OPNsense Unbound API Paths
// ============================================================================

/// Service status endpoint, used to validate credentials at startup
pub const UNBOUND_STATUS_PATH: &str = "api/unbound/service/status";

/// Service reconfigure endpoint, reloads Unbound after record changes
pub const UNBOUND_RECONFIGURE_PATH: &str = "api/unbound/service/reconfigure";

/// Host override search endpoint
pub const UNBOUND_SEARCH_HOST_OVERRIDE_PATH: &str = "api/unbound/settings/searchHostOverride";

/// Host override creation endpoint
pub const UNBOUND_ADD_HOST_OVERRIDE_PATH: &str = "api/unbound/settings/addHostOverride";

/// Host override deletion endpoint, parameterized by the record UUID
pub const UNBOUND_DEL_HOST_OVERRIDE_PATH: &str = "api/unbound/settings/delHostOverride/{}";

/// Placeholder used in path templates for positional parameters
pub const PATH_PARAM_PLACEHOLDER: &str = "{}";

/// Scheme assumed when the configured host has none
pub const DEFAULT_API_SCHEME: &str = "https";

/// Content type for requests carrying a JSON body
pub const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";

/// Accept header value for all API requests
pub const JSON_ACCEPT: &str = "application/json";

/// Value of `result` in a mutation response when OPNsense rejected the change
pub const MUTATION_RESULT_FAILED: &str = "failed";

/// Value of `result` in a delete response when the UUID does not exist
pub const MUTATION_RESULT_NOT_FOUND: &str = "not found";

// ============================================================================
// Record Type Decorations
// ============================================================================

/// Suffix OPNsense appends to A records in listings
pub const IPV4_TYPE_SUFFIX: &str = " (IPv4 address)";

/// Suffix OPNsense appends to AAAA records in listings
pub const IPV6_TYPE_SUFFIX: &str = " (IPv6 address)";

/// Enabled flag as sent on the wire
pub const ENABLED_FLAG: &str = "1";

/// Disabled flag as sent on the wire
pub const DISABLED_FLAG: &str = "0";

// ============================================================================
// Webhook Protocol Constants
// ============================================================================

/// Media type prefix of the external-dns webhook protocol
pub const MEDIA_TYPE_FORMAT: &str = "application/external.dns.webhook+json;";

/// Webhook protocol versions this server speaks
pub const SUPPORTED_MEDIA_VERSIONS: &[&str] = &["1"];

/// Default listen address for the webhook server
pub const DEFAULT_SERVER_HOST: &str = "localhost";

/// Default listen port for the webhook server
pub const DEFAULT_SERVER_PORT: u16 = 8888;

/// Default listen address for the health and metrics server
pub const DEFAULT_HEALTH_HOST: &str = "0.0.0.0";

/// Default listen port for the health and metrics server
pub const DEFAULT_HEALTH_PORT: u16 = 8080;

/// Default time allowed to read a request body, in seconds
pub const DEFAULT_SERVER_READ_TIMEOUT_SECS: u64 = 5;

/// Default time allowed to produce a response, in seconds
pub const DEFAULT_SERVER_WRITE_TIMEOUT_SECS: u64 = 10;

// ============================================================================
// Runtime Constants
// ============================================================================

/// Number of tokio worker threads
pub const TOKIO_WORKER_THREADS: usize = 2;

/// Thread name prefix for tokio workers
pub const TOKIO_THREAD_NAME: &str = "opnsense-webhook";
