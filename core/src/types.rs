//! Values passed into and returned from the dispatcher.
//!
//! # Design
//! `RequestParams` is a `serde_json` map so any serde-representable value can
//! be a parameter. Without the `preserve_order` feature the map is ordered by
//! key, which keeps query strings and request bodies deterministic.

use serde::{Deserialize, Serialize};

/// Body fields or query parameters, keyed by name.
pub type RequestParams = serde_json::Map<String, serde_json::Value>;

/// Where the params of a request end up.
#[derive(Debug, Clone, Copy)]
pub enum Placement<'a> {
    /// Serialized into the request body only.
    Body(&'a RequestParams),
    /// Appended to the URL only; the request body stays empty.
    Query(&'a RequestParams),
    /// The same mapping in both the body and the query string.
    Both(&'a RequestParams),
    /// One mapping for the body, an independent one for the query string.
    Split {
        body: &'a RequestParams,
        query: &'a RequestParams,
    },
}

impl<'a> Placement<'a> {
    pub fn body(&self) -> Option<&'a RequestParams> {
        match *self {
            Placement::Body(params) | Placement::Both(params) => Some(params),
            Placement::Split { body, .. } => Some(body),
            Placement::Query(_) => None,
        }
    }

    pub fn query(&self) -> Option<&'a RequestParams> {
        match *self {
            Placement::Query(params) | Placement::Both(params) => Some(params),
            Placement::Split { query, .. } => Some(query),
            Placement::Body(_) => None,
        }
    }
}

/// Status, headers and decoded body of one response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseEnvelope<T> {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: T,
}

impl<T> ResponseEnvelope<T> {
    /// First header value matching `name`, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn into_body(self) -> T {
        self.body
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn params(value: serde_json::Value) -> RequestParams {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn placement_projects_body_and_query() {
        let a = params(json!({"a": "1"}));
        let b = params(json!({"b": "2"}));

        assert!(Placement::Body(&a).query().is_none());
        assert_eq!(Placement::Body(&a).body(), Some(&a));
        assert!(Placement::Query(&a).body().is_none());
        assert_eq!(Placement::Both(&a).body(), Placement::Both(&a).query());

        let split = Placement::Split { body: &a, query: &b };
        assert_eq!(split.body(), Some(&a));
        assert_eq!(split.query(), Some(&b));
    }

    #[test]
    fn envelope_header_lookup_ignores_case() {
        let envelope = ResponseEnvelope {
            status: 200,
            headers: vec![("content-type".to_string(), "application/json".to_string())],
            body: (),
        };
        assert_eq!(envelope.header("Content-Type"), Some("application/json"));
        assert_eq!(envelope.header("accept"), None);
    }
}
