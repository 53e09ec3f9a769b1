// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

// Common test utilities for integration tests

#![allow(dead_code)]

use opnsense_webhook::config::OpnsenseConfig;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use wiremock::matchers::any;
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

pub const API_KEY: &str = "key";
pub const API_SECRET: &str = "secret";

/// `Basic base64("key:secret")`
const EXPECTED_AUTH: &str = "Basic a2V5OnNlY3JldA==";

#[derive(Default)]
struct FakeState {
    rows: Vec<Value>,
    next_id: u64,
    reconfigures: usize,
    vanish_after_listing: bool,
}

/// Stateful stand-in for the OPNsense Unbound API.
///
/// Host overrides added through the API show up in later listings with a
/// decorated `rr`, the way OPNsense reports them.
#[derive(Clone, Default)]
pub struct FakeOpnsense {
    state: Arc<Mutex<FakeState>>,
}

impl FakeOpnsense {
    /// Start a mock server backed by this fake.
    pub async fn start(&self) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(any())
            .respond_with(self.clone())
            .mount(&server)
            .await;
        server
    }

    /// Seed an existing host override.
    pub fn with_override(self, hostname: &str, domain: &str, rr: &str, server: &str) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            state.next_id += 1;
            let uuid = format!("seed-{}", state.next_id);
            state.rows.push(json!({
                "uuid": uuid, "enabled": "1", "hostname": hostname, "domain": domain,
                "rr": decorate(rr), "server": server, "mx": "", "mxprio": "", "description": ""
            }));
        }
        self
    }

    /// `hostname.domain` and server of every stored override, in order.
    pub fn names(&self) -> Vec<(String, String)> {
        self.state
            .lock()
            .unwrap()
            .rows
            .iter()
            .map(|row| {
                (
                    format!("{}.{}", row["hostname"].as_str().unwrap(), row["domain"].as_str().unwrap()),
                    row["server"].as_str().unwrap_or_default().to_string(),
                )
            })
            .collect()
    }

    /// Drop every stored override right after the next listing is served.
    pub fn vanish_after_next_listing(&self) {
        self.state.lock().unwrap().vanish_after_listing = true;
    }

    /// Number of reconfigure calls received.
    pub fn reconfigures(&self) -> usize {
        self.state.lock().unwrap().reconfigures
    }
}

fn decorate(rr: &str) -> String {
    match rr {
        "A" => "A (IPv4 address)".to_string(),
        "AAAA" => "AAAA (IPv6 address)".to_string(),
        "MX" => "MX (Mail server)".to_string(),
        other => other.to_string(),
    }
}

fn ok(body: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(body)
}

impl Respond for FakeOpnsense {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let authorized = request
            .headers
            .get("authorization")
            .is_some_and(|v| v.as_bytes() == EXPECTED_AUTH.as_bytes());
        if !authorized {
            return ResponseTemplate::new(401).set_body_string("Authentication Failed");
        }

        let mut state = self.state.lock().unwrap();
        let path = request.url.path();

        match (request.method.as_str(), path) {
            ("GET", "/api/unbound/service/status") => ok(json!({"status": "running"})),
            ("GET", "/api/unbound/settings/searchHostOverride") => {
                let listing = ok(json!({
                    "rowCount": state.rows.len(),
                    "total": state.rows.len(),
                    "current": 1,
                    "rows": state.rows,
                }));
                if state.vanish_after_listing {
                    state.vanish_after_listing = false;
                    state.rows.clear();
                }
                listing
            }
            ("POST", "/api/unbound/settings/addHostOverride") => {
                let Ok(body) = serde_json::from_slice::<Value>(&request.body) else {
                    return ResponseTemplate::new(400);
                };
                let mut host = body["host"].clone();
                state.next_id += 1;
                let uuid = format!("uuid-{}", state.next_id);
                host["uuid"] = json!(uuid);
                host["rr"] = json!(decorate(host["rr"].as_str().unwrap_or_default()));
                state.rows.push(host);
                ok(json!({"result": "saved", "uuid": uuid}))
            }
            ("POST", "/api/unbound/service/reconfigure") => {
                state.reconfigures += 1;
                ok(json!({"status": "ok"}))
            }
            ("POST", p) if p.starts_with("/api/unbound/settings/delHostOverride/") => {
                let uuid = p.trim_start_matches("/api/unbound/settings/delHostOverride/");
                let before = state.rows.len();
                state.rows.retain(|row| row["uuid"] != uuid);
                if state.rows.len() < before {
                    ok(json!({"result": "deleted"}))
                } else {
                    ok(json!({"result": "not found"}))
                }
            }
            _ => ResponseTemplate::new(404),
        }
    }
}

/// Client configuration pointing at a mock server.
pub fn opnsense_config(server: &MockServer, api_secret: &str) -> OpnsenseConfig {
    OpnsenseConfig {
        host: server.uri(),
        api_key: API_KEY.to_string(),
        api_secret: api_secret.to_string(),
        skip_tls_verify: false,
        http_timeout_secs: Some(5),
    }
}
