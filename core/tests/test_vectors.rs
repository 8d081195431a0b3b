//! Verify query encoding, request building and response parsing against the
//! JSON vectors stored in `test-vectors/`.
//!
//! Parsed results are compared as `serde_json::Value` so field order in the
//! vector files does not matter.

use restpost_core::{
    build_request, configure, encode_query, parse_response, Client, HttpResponse, MediaType,
    Placement, RequestParams,
};
use serde_json::Value;

fn params(value: &Value) -> RequestParams {
    value.as_object().cloned().unwrap_or_default()
}

fn media_type(value: &Value) -> Option<MediaType> {
    value.as_str().map(|s| s.parse().unwrap())
}

fn client() -> Client {
    configure("UTF-8").unwrap()
}

// ---------------------------------------------------------------------------
// Query
// ---------------------------------------------------------------------------

#[test]
fn query_test_vectors() {
    let raw = include_str!("../../test-vectors/query.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let base_url = case["base_url"].as_str().unwrap();
        let url = encode_query(base_url, &params(&case["params"]));
        assert_eq!(url, case["expected"].as_str().unwrap(), "{name}");
    }
}

// ---------------------------------------------------------------------------
// Request
// ---------------------------------------------------------------------------

#[test]
fn request_test_vectors() {
    let raw = include_str!("../../test-vectors/request.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();
    let base_url = vectors["base_url"].as_str().unwrap();
    let client = client();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let body = params(&case["body_params"]);
        let query = params(&case["query_params"]);
        let placement = match case["placement"].as_str().unwrap() {
            "body" => Placement::Body(&body),
            "query" => Placement::Query(&query),
            "both" => Placement::Both(&body),
            "split" => Placement::Split {
                body: &body,
                query: &query,
            },
            other => panic!("unknown placement: {other}"),
        };
        let expected = &case["expected_request"];

        let req = build_request(client.converters(), base_url, placement, media_type(&case["media_type"])).unwrap();
        assert_eq!(
            req.url,
            format!("{base_url}{}", expected["url"].as_str().unwrap()),
            "{name}: url"
        );
        assert_eq!(
            req.header("content-type"),
            expected["content_type"].as_str(),
            "{name}: content type"
        );
        let req_body = req.body.map(|b| String::from_utf8(b).unwrap());
        assert_eq!(
            req_body.as_deref(),
            expected["body"].as_str(),
            "{name}: body"
        );
    }
}

// ---------------------------------------------------------------------------
// Response
// ---------------------------------------------------------------------------

#[test]
fn response_test_vectors() {
    let raw = include_str!("../../test-vectors/response.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();
    let client = client();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let sim = &case["simulated_response"];
        let response = HttpResponse {
            status: sim["status"].as_u64().unwrap() as u16,
            headers: sim["content_type"]
                .as_str()
                .map(|ct| vec![("content-type".to_string(), ct.to_string())])
                .unwrap_or_default(),
            body: sim["body"].as_str().unwrap().as_bytes().to_vec(),
        };

        let envelope = parse_response::<Value>(client.converters(), response).unwrap();
        assert_eq!(envelope.status as u64, sim["status"].as_u64().unwrap(), "{name}: status");
        assert_eq!(envelope.body, case["expected_result"], "{name}: parsed result");
    }
}
