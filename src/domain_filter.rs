// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Domain filtering for listed records.
//!
//! Decides which names this webhook reports to external-dns. Two modes exist:
//!
//! - **Suffix lists** - include and exclude lists of domains. A name matches a
//!   filter when it equals the filter or is a subdomain of it. A filter with a
//!   leading dot (`.example.com`) matches subdomains only. An empty include
//!   list matches everything; exclusions always win.
//! - **Regular expressions** - an include regex plus an optional exclusion
//!   regex, used when an include regex is configured.
//!
//! Names are compared lowercase and without a trailing dot.
//!
//! # Example
//!
//! ```rust
//! use opnsense_webhook::domain_filter::DomainFilter;
//!
//! let filter = DomainFilter::new(
//!     vec!["example.com".to_string()],
//!     vec!["internal.example.com".to_string()],
//! );
//! assert!(filter.matches("www.example.com"));
//! assert!(!filter.matches("db.internal.example.com"));
//! assert!(!filter.matches("www.example.org"));
//! ```

use crate::config::DomainFilterConfig;
use regex::Regex;
use serde::Serialize;
use std::fmt;

/// Lowercase a name and strip surrounding whitespace and the trailing dot.
fn normalize(name: &str) -> String {
    name.trim().trim_end_matches('.').to_lowercase()
}

fn prepare_filters(filters: &[String]) -> Vec<String> {
    filters
        .iter()
        .map(|f| normalize(f))
        .filter(|f| !f.is_empty())
        .collect()
}

/// Whether `name` (already normalized) is covered by any filter.
///
/// Returns `when_empty` if there are no filters.
fn match_filters(filters: &[String], name: &str, when_empty: bool) -> bool {
    if filters.is_empty() {
        return when_empty;
    }

    filters.iter().any(|filter| {
        if filter.starts_with('.') {
            name.ends_with(filter.as_str())
        } else {
            name == filter
                || name
                    .strip_suffix(filter.as_str())
                    .is_some_and(|prefix| prefix.ends_with('.'))
        }
    })
}

fn is_empty_slice(filters: &&[String]) -> bool {
    filters.is_empty()
}

/// Filter deciding which record names belong to this webhook.
#[derive(Debug, Clone, Default)]
pub struct DomainFilter {
    include: Vec<String>,
    exclude: Vec<String>,
    regex_include: Option<Regex>,
    regex_exclude: Option<Regex>,
}

/// JSON form sent to external-dns during negotiation.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DomainFilterJson<'a> {
    #[serde(skip_serializing_if = "is_empty_slice")]
    include: &'a [String],
    #[serde(skip_serializing_if = "is_empty_slice")]
    exclude: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    regex_include: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    regex_exclude: Option<&'a str>,
}

impl DomainFilter {
    /// Suffix-list filter with inclusions and exclusions.
    #[must_use]
    pub fn new(include: Vec<String>, exclude: Vec<String>) -> Self {
        Self {
            include: prepare_filters(&include),
            exclude: prepare_filters(&exclude),
            regex_include: None,
            regex_exclude: None,
        }
    }

    /// Regex filter. An empty exclusion pattern means "exclude nothing".
    #[must_use]
    pub fn with_regex(include: Regex, exclude: Option<Regex>) -> Self {
        Self {
            include: Vec::new(),
            exclude: Vec::new(),
            regex_include: Some(include),
            regex_exclude: exclude.filter(|re| !re.as_str().is_empty()),
        }
    }

    /// Build the filter from configuration.
    ///
    /// A non-empty `REGEXP_DOMAIN_FILTER` selects regex mode; the suffix lists
    /// are ignored in that case.
    ///
    /// # Errors
    ///
    /// Returns an error if either regular expression does not compile.
    pub fn from_config(config: &DomainFilterConfig) -> Result<Self, regex::Error> {
        match config.regex_domain_filter.as_deref() {
            Some(pattern) if !pattern.is_empty() => {
                let include = Regex::new(pattern)?;
                let exclude = config
                    .regex_domain_exclusion
                    .as_deref()
                    .map(Regex::new)
                    .transpose()?;
                Ok(Self::with_regex(include, exclude))
            }
            _ => Ok(Self::new(
                config.domain_filter.clone(),
                config.exclude_domains.clone(),
            )),
        }
    }

    /// Whether `name` belongs to this webhook.
    #[must_use]
    pub fn matches(&self, name: &str) -> bool {
        let name = normalize(name);

        if let Some(include) = &self.regex_include {
            let excluded = self
                .regex_exclude
                .as_ref()
                .is_some_and(|re| re.is_match(&name));
            return include.is_match(&name) && !excluded;
        }

        match_filters(&self.include, &name, true) && !match_filters(&self.exclude, &name, false)
    }

    /// Whether any filtering is configured at all.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.regex_include.is_some() || !self.include.is_empty() || !self.exclude.is_empty()
    }

    /// JSON value external-dns expects from the negotiation endpoint.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        let json = DomainFilterJson {
            include: &self.include,
            exclude: &self.exclude,
            regex_include: self.regex_include.as_ref().map(Regex::as_str),
            regex_exclude: self.regex_exclude.as_ref().map(Regex::as_str),
        };
        serde_json::to_value(json).unwrap_or_else(|_| serde_json::json!({}))
    }
}

impl fmt::Display for DomainFilter {
    /// Human description for the startup log.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();

        if let Some(include) = &self.regex_include {
            parts.push(format!("regexp domain filter: '{}'", include.as_str()));
            if let Some(exclude) = &self.regex_exclude {
                parts.push(format!("with exclusion: '{}'", exclude.as_str()));
            }
        } else {
            if !self.include.is_empty() {
                parts.push(format!("domain filter: '{}'", self.include.join(",")));
            }
            if !self.exclude.is_empty() {
                parts.push(format!("exclude domain filter: '{}'", self.exclude.join(",")));
            }
        }

        if parts.is_empty() {
            f.write_str("no kind of domain filters")
        } else {
            f.write_str(&parts.join(", "))
        }
    }
}

#[cfg(test)]
#[path = "domain_filter_tests.rs"]
mod domain_filter_tests;
