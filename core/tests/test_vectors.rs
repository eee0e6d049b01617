//! Verify option merging and URL joining against JSON test vectors stored in
//! `test-vectors/`.
//!
//! Comparing parsed JSON (not raw strings) avoids false negatives from
//! field-ordering differences.

use serde_json::Value;
use service_connector::{Connector, ConnectorConfig, ConnectorRequest, Parameters, StaticCredentials};

fn credentials(raw: &Value) -> StaticCredentials {
    raw.as_object()
        .unwrap()
        .iter()
        .map(|(k, v)| (k.clone(), v.as_str().unwrap().to_string()))
        .collect()
}

// ---------------------------------------------------------------------------
// Merge
// ---------------------------------------------------------------------------

#[test]
fn merge_test_vectors() {
    let raw = include_str!("../../test-vectors/merge.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();

    let c = Connector::new(
        "Vectors",
        ConnectorConfig::new("https://api.example.com"),
        credentials(&vectors["credentials"]),
    );
    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let parameters = Parameters::try_from(case["parameters"].clone()).unwrap();
        let request = ConnectorRequest::new("/items")
            .accept(case["accept"].as_str().unwrap())
            .parameters(parameters);

        let options = Value::Object(c.build_options(&request).into_inner());
        assert_eq!(options, case["expected_options"], "{name}: options");
    }
}

// ---------------------------------------------------------------------------
// URL
// ---------------------------------------------------------------------------

#[test]
fn url_test_vectors() {
    let raw = include_str!("../../test-vectors/url.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let c = Connector::new(
            "Vectors",
            ConnectorConfig::new(case["host"].as_str().unwrap()),
            StaticCredentials::new(),
        );
        assert_eq!(
            c.url(case["path"].as_str().unwrap()),
            case["expected"].as_str().unwrap(),
            "{name}: url"
        );
    }
}
