// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Process configuration.
//!
//! Every setting can be given as a command-line flag or through the
//! environment variable named next to it, which is how the webhook is usually
//! deployed as an external-dns sidecar.
//!
//! | Variable | Default | Meaning |
//! |----------|---------|---------|
//! | `OPNSENSE_HOST` | required | Firewall URL, `https://` assumed without a scheme |
//! | `OPNSENSE_API_KEY` | required | API key |
//! | `OPNSENSE_API_SECRET` | required | API secret |
//! | `OPNSENSE_SKIP_TLS_VERIFY` | `true` | Accept the firewall's self-signed certificate |
//! | `OPNSENSE_HTTP_TIMEOUT` | none | Per-request timeout in seconds |
//! | `SERVER_HOST` / `SERVER_PORT` | `localhost` / `8888` | Webhook listener |
//! | `HEALTH_HOST` / `HEALTH_PORT` | `0.0.0.0` / `8080` | Health and metrics listener |
//! | `SERVER_READ_TIMEOUT` | `5` | Seconds allowed to read a request body |
//! | `SERVER_WRITE_TIMEOUT` | `10` | Seconds allowed to produce a response |
//! | `DOMAIN_FILTER` | empty | Comma-separated domains to manage |
//! | `EXCLUDE_DOMAIN_FILTER` | empty | Comma-separated domains to ignore |
//! | `REGEXP_DOMAIN_FILTER` | none | Include regex, replaces the lists |
//! | `REGEXP_DOMAIN_FILTER_EXCLUSION` | none | Exclusion regex |

use crate::constants::{
    DEFAULT_HEALTH_HOST, DEFAULT_HEALTH_PORT, DEFAULT_SERVER_HOST, DEFAULT_SERVER_PORT,
    DEFAULT_SERVER_READ_TIMEOUT_SECS, DEFAULT_SERVER_WRITE_TIMEOUT_SECS,
};
use clap::builder::BoolishValueParser;
use clap::{ArgAction, Args, Parser};
use std::fmt;
use std::time::Duration;

/// Top-level configuration.
#[derive(Parser, Debug, Clone)]
#[command(name = "opnsense-webhook", version, about)]
pub struct Config {
    /// OPNsense API connection
    #[command(flatten)]
    pub opnsense: OpnsenseConfig,

    /// Listen addresses
    #[command(flatten)]
    pub server: ServerConfig,

    /// Which names this webhook manages
    #[command(flatten)]
    pub domain_filter: DomainFilterConfig,
}

/// Connection settings for the OPNsense Unbound API.
#[derive(Args, Clone)]
pub struct OpnsenseConfig {
    /// Firewall URL, e.g. `https://192.168.1.1`
    #[arg(id = "opnsense_host", long = "opnsense-host", env = "OPNSENSE_HOST")]
    pub host: String,

    /// API key
    #[arg(long = "opnsense-api-key", env = "OPNSENSE_API_KEY", hide_env_values = true)]
    pub api_key: String,

    /// API secret
    #[arg(long = "opnsense-api-secret", env = "OPNSENSE_API_SECRET", hide_env_values = true)]
    pub api_secret: String,

    /// Skip TLS certificate verification
    #[arg(
        long = "opnsense-skip-tls-verify",
        env = "OPNSENSE_SKIP_TLS_VERIFY",
        default_value_t = true,
        action = ArgAction::Set,
        value_parser = BoolishValueParser::new()
    )]
    pub skip_tls_verify: bool,

    /// Per-request timeout in seconds; unbounded when unset
    #[arg(long = "opnsense-http-timeout", env = "OPNSENSE_HTTP_TIMEOUT")]
    pub http_timeout_secs: Option<u64>,
}

impl OpnsenseConfig {
    /// Per-request timeout, if configured.
    #[must_use]
    pub fn http_timeout(&self) -> Option<Duration> {
        self.http_timeout_secs.map(Duration::from_secs)
    }
}

impl fmt::Debug for OpnsenseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpnsenseConfig")
            .field("host", &self.host)
            .field("api_key", &"<redacted>")
            .field("api_secret", &"<redacted>")
            .field("skip_tls_verify", &self.skip_tls_verify)
            .field("http_timeout_secs", &self.http_timeout_secs)
            .finish()
    }
}

/// Listen addresses for the webhook and health servers.
#[derive(Args, Debug, Clone)]
pub struct ServerConfig {
    /// Webhook listen host
    #[arg(long = "server-host", env = "SERVER_HOST", default_value = DEFAULT_SERVER_HOST)]
    pub host: String,

    /// Webhook listen port
    #[arg(long = "server-port", env = "SERVER_PORT", default_value_t = DEFAULT_SERVER_PORT)]
    pub port: u16,

    /// Health and metrics listen host
    #[arg(long = "health-host", env = "HEALTH_HOST", default_value = DEFAULT_HEALTH_HOST)]
    pub health_host: String,

    /// Health and metrics listen port
    #[arg(long = "health-port", env = "HEALTH_PORT", default_value_t = DEFAULT_HEALTH_PORT)]
    pub health_port: u16,

    /// Seconds allowed to read a request body, on both listeners
    #[arg(
        long = "server-read-timeout",
        env = "SERVER_READ_TIMEOUT",
        default_value_t = DEFAULT_SERVER_READ_TIMEOUT_SECS
    )]
    pub read_timeout_secs: u64,

    /// Seconds allowed to produce a response, on both listeners
    #[arg(
        long = "server-write-timeout",
        env = "SERVER_WRITE_TIMEOUT",
        default_value_t = DEFAULT_SERVER_WRITE_TIMEOUT_SECS
    )]
    pub write_timeout_secs: u64,
}

impl ServerConfig {
    /// `host:port` of the webhook listener.
    #[must_use]
    pub fn webhook_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// `host:port` of the health listener.
    #[must_use]
    pub fn health_addr(&self) -> String {
        format!("{}:{}", self.health_host, self.health_port)
    }

    /// Request body read timeout.
    #[must_use]
    pub fn read_timeout(&self) -> Duration {
        Duration::from_secs(self.read_timeout_secs)
    }

    /// Response timeout.
    #[must_use]
    pub fn write_timeout(&self) -> Duration {
        Duration::from_secs(self.write_timeout_secs)
    }
}

/// Domain filter settings, see [`crate::domain_filter`].
#[derive(Args, Debug, Clone, Default)]
pub struct DomainFilterConfig {
    /// Domains to manage
    #[arg(long = "domain-filter", env = "DOMAIN_FILTER", value_delimiter = ',')]
    pub domain_filter: Vec<String>,

    /// Domains to ignore
    #[arg(long = "exclude-domain-filter", env = "EXCLUDE_DOMAIN_FILTER", value_delimiter = ',')]
    pub exclude_domains: Vec<String>,

    /// Regex of names to manage; replaces the domain lists
    #[arg(long = "regexp-domain-filter", env = "REGEXP_DOMAIN_FILTER")]
    pub regex_domain_filter: Option<String>,

    /// Regex of names to ignore
    #[arg(
        long = "regexp-domain-filter-exclusion",
        env = "REGEXP_DOMAIN_FILTER_EXCLUSION"
    )]
    pub regex_domain_exclusion: Option<String>,
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod config_tests;
