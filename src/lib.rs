// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! # opnsense-webhook - external-dns provider for OPNsense Unbound
//!
//! An external-dns webhook provider that keeps OPNsense Unbound host
//! overrides in step with the records external-dns wants, using the
//! OPNsense HTTP API.
//!
//! ## Overview
//!
//! This library provides:
//!
//! - The external-dns wire types (endpoints and change sets)
//! - An authenticated client for the Unbound host override API
//! - A provider that converges host overrides to a change set
//! - The axum routers serving the webhook protocol and health checks
//!
//! ## Modules
//!
//! - [`endpoint`] - external-dns endpoints and change sets
//! - [`codec`] - FQDN splitting and record type decoration
//! - [`unbound`] - OPNsense Unbound API client
//! - [`provider`] - Reconciliation of change sets against Unbound
//! - [`domain_filter`] - Which names this webhook owns
//! - [`webhook`] - HTTP front end for external-dns
//! - [`config`] - Command line and environment configuration
//!
//! ## Example
//!
//! ```rust
//! use opnsense_webhook::codec::split_fqdn;
//! use opnsense_webhook::endpoint::Endpoint;
//! use opnsense_webhook::unbound::HostOverride;
//!
//! let endpoint = Endpoint::new("www.example.com", "A", vec!["1.2.3.4".to_string()]);
//! let record = HostOverride::from_endpoint(&endpoint).unwrap();
//!
//! assert_eq!(split_fqdn("www.example.com"), ("www", "example.com"));
//! assert_eq!(record.hostname, "www");
//! assert_eq!(record.to_endpoint(), endpoint);
//! ```
//!
//! ## Supported Records
//!
//! - **A** / **AAAA** - Address host overrides
//! - **MX** - Mail exchanger host overrides, target `"<priority> <host>"`

pub mod codec;
pub mod config;
pub mod constants;
pub mod domain_filter;
pub mod endpoint;
pub mod errors;
pub mod metrics;
pub mod provider;
pub mod unbound;
pub mod webhook;
