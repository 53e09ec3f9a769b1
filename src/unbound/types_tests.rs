// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Tests for host override wire types (`HostOverride`, `HostOverrideList`, `MutationResponse`).

#[cfg(test)]
mod tests {
    use crate::codec::RecordType;
    use crate::endpoint::Endpoint;
    use crate::errors::UnboundError;
    use crate::unbound::types::{
        AddHostOverrideRequest, HostOverride, HostOverrideList, MutationResponse,
    };
    use serde_json::json;

    #[test]
    fn test_host_override_deserializes_listing_row() {
        let record: HostOverride = serde_json::from_value(json!({
            "uuid": "8d8f6e1c-0000-4000-8000-000000000001",
            "enabled": "1",
            "hostname": "www",
            "domain": "example.com",
            "rr": "A (IPv4 address)",
            "mxprio": "",
            "mx": "",
            "server": "1.2.3.4",
            "description": "managed"
        }))
        .unwrap();

        assert_eq!(record.id, "8d8f6e1c-0000-4000-8000-000000000001");
        assert!(record.enabled);
        assert_eq!(record.bare_type(), "A");
        assert_eq!(record.fqdn(), "www.example.com");
        assert_eq!(record.target, "1.2.3.4");
        assert_eq!(record.description, "managed");
    }

    #[test]
    fn test_enabled_flag_variants() {
        for (value, expected) in [
            (json!("1"), true),
            (json!("0"), false),
            (json!(true), true),
            (json!(0), false),
            (json!(1), true),
        ] {
            let record: HostOverride =
                serde_json::from_value(json!({"enabled": value, "hostname": "h"})).unwrap();
            assert_eq!(record.enabled, expected, "flag {value}");
        }
    }

    #[test]
    fn test_mxprio_accepts_numbers() {
        let record: HostOverride = serde_json::from_value(json!({
            "hostname": "example",
            "domain": "com",
            "rr": "MX",
            "mxprio": 10,
            "mx": "mail.example.com"
        }))
        .unwrap();
        assert_eq!(record.mxprio, "10");
        assert!(record.enabled);
    }

    #[test]
    fn test_create_body_shape() {
        let record = HostOverride::new("api", "example.com", RecordType::A, "5.6.7.8");
        let body = serde_json::to_value(AddHostOverrideRequest { host: &record }).unwrap();

        assert_eq!(
            body,
            json!({
                "host": {
                    "enabled": "1",
                    "hostname": "api",
                    "domain": "example.com",
                    "rr": "A",
                    "server": "5.6.7.8"
                }
            })
        );
    }

    #[test]
    fn test_from_endpoint_address_record() {
        let ep = Endpoint::new(
            "api.lab.example.com",
            "AAAA",
            vec!["2001:db8::1".into(), "2001:db8::2".into()],
        );
        let record = HostOverride::from_endpoint(&ep).unwrap();

        assert_eq!(record.hostname, "api");
        assert_eq!(record.domain, "lab.example.com");
        assert_eq!(record.record_type, "AAAA");
        assert_eq!(record.target, "2001:db8::1");
        assert!(record.enabled);
        assert!(record.id.is_empty());
    }

    #[test]
    fn test_from_endpoint_carries_set_identifier() {
        let mut ep = Endpoint::new("www.example.com", "A", vec!["1.2.3.4".into()]);
        ep.set_identifier = "cluster-a".into();
        let record = HostOverride::from_endpoint(&ep).unwrap();
        assert_eq!(record.description, "cluster-a");
    }

    #[test]
    fn test_from_endpoint_mx() {
        let ep = Endpoint::new("example.com", "MX", vec!["10 mail.example.com".into()]);
        let record = HostOverride::from_endpoint(&ep).unwrap();

        assert_eq!(record.hostname, "example");
        assert_eq!(record.domain, "com");
        assert_eq!(record.mxprio, "10");
        assert_eq!(record.mx, "mail.example.com");
        assert!(record.target.is_empty());
        assert_eq!(record.endpoint_target(), "10 mail.example.com");
    }

    #[test]
    fn test_from_endpoint_without_targets() {
        let ep = Endpoint::new("www.example.com", "A", vec![]);
        let err = HostOverride::from_endpoint(&ep).unwrap_err();
        assert!(matches!(err, UnboundError::InvalidEndpoint { .. }));
    }

    #[test]
    fn test_from_endpoint_unsupported_type() {
        let ep = Endpoint::new("www.example.com", "CNAME", vec!["other.example.com".into()]);
        let err = HostOverride::from_endpoint(&ep).unwrap_err();
        assert!(matches!(err, UnboundError::UnsupportedRecordType { .. }));
    }

    #[test]
    fn test_from_endpoint_malformed_mx() {
        let ep = Endpoint::new("example.com", "MX", vec!["mail.example.com".into()]);
        let err = HostOverride::from_endpoint(&ep).unwrap_err();
        assert!(err.to_string().contains("priority"));
    }

    #[test]
    fn test_to_endpoint() {
        let mut record = HostOverride::new("www", "example.com", RecordType::A, "1.2.3.4");
        record.record_type = "A (IPv4 address)".into();

        assert_eq!(
            record.to_endpoint(),
            Endpoint::new("www.example.com", "A", vec!["1.2.3.4".into()])
        );
    }

    #[test]
    fn test_set_identifier_round_trips_through_description() {
        let mut ep = Endpoint::new("api.example.com", "A", vec!["5.6.7.8".into()]);
        ep.set_identifier = "cluster-a".into();

        let mut listed = HostOverride::from_endpoint(&ep).unwrap();
        listed.id = "uuid-1".into();
        listed.record_type = "A (IPv4 address)".into();

        assert_eq!(listed.to_endpoint(), ep);
    }

    #[test]
    fn test_is_identified_by() {
        let mut record = HostOverride::new("www", "example.com", RecordType::A, "1.2.3.4");
        record.record_type = "A (IPv4 address)".into();

        assert!(record.is_identified_by("www", "example.com", "A"));
        assert!(!record.is_identified_by("www", "example.com", "AAAA"));
        assert!(!record.is_identified_by("WWW", "example.com", "A"));
        assert!(!record.is_identified_by("www", "example.org", "A"));
    }

    #[test]
    fn test_list_envelope_accepts_both_row_keys() {
        let lower: HostOverrideList = serde_json::from_value(json!({
            "rowCount": 1, "total": 1, "current": 1,
            "rows": [{"uuid": "a", "hostname": "www", "domain": "example.com", "rr": "A", "server": "1.2.3.4"}]
        }))
        .unwrap();
        let upper: HostOverrideList = serde_json::from_value(json!({
            "Rows": [{"uuid": "b", "hostname": "www", "domain": "example.com", "rr": "A", "server": "1.2.3.4"}]
        }))
        .unwrap();

        assert_eq!(lower.rows.len(), 1);
        assert_eq!(lower.row_count, 1);
        assert_eq!(upper.rows[0].id, "b");
        assert_eq!(upper.total, 0);
    }

    #[test]
    fn test_list_envelope_empty() {
        let list: HostOverrideList = serde_json::from_value(json!({})).unwrap();
        assert!(list.rows.is_empty());
    }

    #[test]
    fn test_mutation_response() {
        let saved: MutationResponse =
            serde_json::from_value(json!({"result": "saved", "uuid": "abc"})).unwrap();
        assert!(!saved.is_failed());
        assert_eq!(saved.uuid.as_deref(), Some("abc"));

        let failed: MutationResponse = serde_json::from_value(json!({
            "result": "failed",
            "validations": {"host.server": "A valid IPv4 address is required."}
        }))
        .unwrap();
        assert!(failed.is_failed());
        assert!(failed.details().contains("IPv4"));
    }
}
