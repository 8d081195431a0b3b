//! HTTP requests and responses as plain data.
//!
//! # Design
//! The dispatcher builds an `HttpRequest` without touching the network, the
//! `Client` executes it and hands back an `HttpResponse`, and the dispatcher
//! parses that. Both halves stay deterministic and can be tested on their
//! own; only `Client::execute` does I/O. Every request is a POST, so no
//! method is carried.

/// A POST request described as plain data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
}

/// An HTTP response described as plain data. The body is kept as raw bytes
/// because the text converter decodes it with a configurable charset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl HttpRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }
}

impl HttpResponse {
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }
}

fn find_header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| value.as_str())
}
