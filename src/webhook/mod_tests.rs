// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for the webhook routers

#[cfg(test)]
mod tests {
    use crate::domain_filter::DomainFilter;
    use crate::endpoint::{Changes, Endpoint};
    use crate::errors::UnboundError;
    use crate::provider::DnsProvider;
    use crate::webhook::{health_router, webhook_router, with_timeouts, WebhookState};
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use axum::response::Response;
    use axum::routing::get as get_route;
    use axum::Router;
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;
    use tower::ServiceExt;

    const MEDIA_TYPE: &str = "application/external.dns.webhook+json;version=1";

    /// In-memory provider recording the change sets it receives.
    #[derive(Default)]
    struct FakeProvider {
        records: Vec<Endpoint>,
        filter: DomainFilter,
        fail: bool,
        applied: Mutex<Vec<Changes>>,
    }

    impl FakeProvider {
        fn failure() -> UnboundError {
            UnboundError::Protocol {
                method: "GET".into(),
                path: "api/unbound/settings/searchHostOverride".into(),
                status: 500,
                body: "boom".into(),
            }
        }
    }

    #[async_trait]
    impl DnsProvider for FakeProvider {
        async fn records(&self) -> Result<Vec<Endpoint>, UnboundError> {
            if self.fail {
                return Err(Self::failure());
            }
            Ok(self.records.clone())
        }

        async fn apply_changes(&self, changes: &Changes) -> Result<(), UnboundError> {
            if self.fail {
                return Err(Self::failure());
            }
            self.applied.lock().unwrap().push(changes.clone());
            Ok(())
        }

        fn adjust_endpoints(&self, mut endpoints: Vec<Endpoint>) -> Vec<Endpoint> {
            endpoints.retain(|e| e.record_type != "CNAME");
            endpoints
        }

        fn domain_filter(&self) -> &DomainFilter {
            &self.filter
        }
    }

    fn router(provider: Arc<FakeProvider>) -> Router {
        webhook_router(WebhookState::new(provider))
    }

    fn get(uri: &str, accept: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().method("GET").uri(uri);
        if let Some(accept) = accept {
            builder = builder.header(header::ACCEPT, accept);
        }
        builder.body(Body::empty()).unwrap()
    }

    fn post(uri: &str, content_type: Option<&str>, accept: Option<&str>, body: &str) -> Request<Body> {
        let mut builder = Request::builder().method("POST").uri(uri);
        if let Some(content_type) = content_type {
            builder = builder.header(header::CONTENT_TYPE, content_type);
        }
        if let Some(accept) = accept {
            builder = builder.header(header::ACCEPT, accept);
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    async fn body_text(response: Response) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    async fn body_json(response: Response) -> Value {
        serde_json::from_str(&body_text(response).await).unwrap()
    }

    // =====================================================
    // Negotiation
    // =====================================================

    #[tokio::test]
    async fn test_negotiate_returns_domain_filter() {
        let provider = Arc::new(FakeProvider {
            filter: DomainFilter::new(vec!["example.com".into()], vec![]),
            ..FakeProvider::default()
        });

        let response = router(provider).oneshot(get("/", Some(MEDIA_TYPE))).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], MEDIA_TYPE);
        assert_eq!(body_json(response).await, json!({"include": ["example.com"]}));
    }

    #[tokio::test]
    async fn test_negotiate_without_accept_is_406() {
        let response = router(Arc::default()).oneshot(get("/", None)).await.unwrap();

        assert_eq!(response.status(), StatusCode::NOT_ACCEPTABLE);
        assert_eq!(body_text(response).await, "client must provide an accept header");
    }

    #[tokio::test]
    async fn test_negotiate_with_unknown_version_is_406() {
        let response = router(Arc::default())
            .oneshot(get("/", Some("application/external.dns.webhook+json;version=9")))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_ACCEPTABLE);
        assert!(body_text(response)
            .await
            .contains("supported media types are: 'application/external.dns.webhook+json;version=1'"));
    }

    // =====================================================
    // GET /records
    // =====================================================

    #[tokio::test]
    async fn test_records_returns_endpoints() {
        let provider = Arc::new(FakeProvider {
            records: vec![Endpoint::new("www.example.com", "A", vec!["1.2.3.4".into()])],
            ..FakeProvider::default()
        });

        let response = router(provider)
            .oneshot(get("/records", Some(MEDIA_TYPE)))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], MEDIA_TYPE);
        assert_eq!(
            body_json(response).await,
            json!([{"dnsName": "www.example.com", "targets": ["1.2.3.4"], "recordType": "A"}])
        );
    }

    #[tokio::test]
    async fn test_records_provider_error_is_500() {
        let provider = Arc::new(FakeProvider {
            fail: true,
            ..FakeProvider::default()
        });

        let response = router(provider)
            .oneshot(get("/records", Some(MEDIA_TYPE)))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    // =====================================================
    // POST /records
    // =====================================================

    #[tokio::test]
    async fn test_apply_changes_returns_204() {
        let provider = Arc::new(FakeProvider::default());
        let body = r#"{"Create":[{"dnsName":"api.example.com","targets":["5.6.7.8"],"recordType":"A"}],
                      "UpdateOld":null,"UpdateNew":null,"Delete":null}"#;

        let response = router(provider.clone())
            .oneshot(post("/records", Some(MEDIA_TYPE), None, body))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        let applied = provider.applied.lock().unwrap();
        assert_eq!(applied.len(), 1);
        assert_eq!(
            applied[0].create,
            vec![Endpoint::new("api.example.com", "A", vec!["5.6.7.8".into()])]
        );
        assert!(applied[0].delete.is_empty());
    }

    #[tokio::test]
    async fn test_apply_changes_without_content_type_is_415() {
        let provider = Arc::new(FakeProvider::default());

        let response = router(provider.clone())
            .oneshot(post("/records", None, None, "{}"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
        assert_eq!(body_text(response).await, "client must provide a content type");
        assert!(provider.applied.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_apply_changes_with_plain_json_is_415() {
        let response = router(Arc::default())
            .oneshot(post("/records", Some("application/json"), None, "{}"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    }

    #[tokio::test]
    async fn test_apply_changes_malformed_body_is_400() {
        let provider = Arc::new(FakeProvider::default());

        let response = router(provider.clone())
            .oneshot(post("/records", Some(MEDIA_TYPE), None, "{not json"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(provider.applied.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_apply_changes_provider_error_is_500() {
        let provider = Arc::new(FakeProvider {
            fail: true,
            ..FakeProvider::default()
        });

        let response = router(provider)
            .oneshot(post("/records", Some(MEDIA_TYPE), None, "{}"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    // =====================================================
    // POST /adjustendpoints
    // =====================================================

    #[tokio::test]
    async fn test_adjust_endpoints() {
        let body = r#"[{"dnsName":"a.example.com","targets":["1.1.1.1"],"recordType":"A"},
                      {"dnsName":"c.example.com","targets":["a.example.com"],"recordType":"CNAME"}]"#;

        let response = router(Arc::default())
            .oneshot(post("/adjustendpoints", Some(MEDIA_TYPE), Some(MEDIA_TYPE), body))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_json(response).await,
            json!([{"dnsName": "a.example.com", "targets": ["1.1.1.1"], "recordType": "A"}])
        );
    }

    #[tokio::test]
    async fn test_adjust_endpoints_requires_accept() {
        let response = router(Arc::default())
            .oneshot(post("/adjustendpoints", Some(MEDIA_TYPE), None, "[]"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_ACCEPTABLE);
    }

    // =====================================================
    // Health router
    // =====================================================

    #[tokio::test]
    async fn test_health_and_readiness() {
        for path in ["/healthz", "/readyz"] {
            let response = health_router().oneshot(get(path, None)).await.unwrap();
            assert_eq!(response.status(), StatusCode::OK);
            assert_eq!(body_text(response).await, "OK");
        }
    }

    // =====================================================
    // Timeouts
    // =====================================================

    #[tokio::test]
    async fn test_slow_handler_hits_write_timeout() {
        let slow = Router::new().route(
            "/slow",
            get_route(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                "late"
            }),
        );
        let app = with_timeouts(slow, Duration::from_secs(5), Duration::from_millis(50));

        let response = app.oneshot(get("/slow", None)).await.unwrap();

        assert_eq!(response.status(), StatusCode::REQUEST_TIMEOUT);
    }

    #[tokio::test]
    async fn test_timeouts_leave_fast_requests_alone() {
        let app = with_timeouts(
            health_router(),
            Duration::from_secs(5),
            Duration::from_secs(5),
        );

        let response = app.oneshot(get("/healthz", None)).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "OK");
    }

    #[tokio::test]
    async fn test_metrics_endpoint() {
        crate::metrics::record_change("create", "A");

        let response = health_router().oneshot(get("/metrics", None)).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response)
            .await
            .contains("opnsense_webhook_record_changes_total"));
    }
}
