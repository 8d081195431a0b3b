use std::collections::BTreeMap;

use axum::{
    body::Bytes,
    extract::{Path, Query},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;

pub type Fields = BTreeMap<String, String>;

/// What `/echo` saw: query and body parsed separately.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Echo {
    pub query: Fields,
    pub body: Fields,
    pub content_type: Option<String>,
    pub body_len: usize,
}

/// `café` in ISO-8859-1.
pub const LATIN1_TEXT: &[u8] = &[b'c', b'a', b'f', 0xE9];

pub const XML_ROOT: &str = "map";

pub fn app() -> Router {
    Router::new()
        .route("/map", post(echo_map))
        .route("/echo", post(echo))
        .route("/text", post(latin1_text))
        .route("/status/{code}", post(status))
        .route("/repeat/{len}", post(repeat))
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

/// Query and body fields merged, body winning, answered in the request's format.
async fn echo_map(
    Query(query): Query<Fields>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, StatusCode> {
    let content_type = request_content_type(&headers);
    let mut fields = query;
    fields.extend(parse_body(content_type.as_deref(), &body)?);

    if content_type.as_deref() == Some("application/xml") {
        let document = quick_xml::se::to_string_with_root(XML_ROOT, &fields)
            .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
        return Ok(([(header::CONTENT_TYPE, "application/xml")], document).into_response());
    }
    Ok(Json(fields).into_response())
}

async fn echo(
    Query(query): Query<Fields>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Echo>, StatusCode> {
    let content_type = request_content_type(&headers);
    let parsed = parse_body(content_type.as_deref(), &body)?;
    Ok(Json(Echo {
        query,
        body: parsed,
        content_type,
        body_len: body.len(),
    }))
}

async fn latin1_text() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/plain")], LATIN1_TEXT)
}

/// `len` bytes of `a` as plain text.
async fn repeat(Path(len): Path<usize>) -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/plain")], vec![b'a'; len])
}

async fn status(Path(code): Path<u16>) -> Result<(StatusCode, &'static str), StatusCode> {
    let status = StatusCode::from_u16(code).map_err(|_| StatusCode::BAD_REQUEST)?;
    Ok((status, "status requested"))
}

/// Lowercased `Content-Type` without parameters.
fn request_content_type(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(header::CONTENT_TYPE)?.to_str().ok()?;
    let essence = value.split(';').next().unwrap_or_default().trim();
    Some(essence.to_ascii_lowercase())
}

fn parse_body(content_type: Option<&str>, body: &[u8]) -> Result<Fields, StatusCode> {
    if body.is_empty() {
        return Ok(Fields::new());
    }
    match content_type {
        Some("application/json") => {
            let values: BTreeMap<String, serde_json::Value> =
                serde_json::from_slice(body).map_err(|_| StatusCode::BAD_REQUEST)?;
            Ok(values
                .into_iter()
                .map(|(key, value)| match value {
                    serde_json::Value::String(s) => (key, s),
                    other => (key, other.to_string()),
                })
                .collect())
        }
        Some("application/xml") => {
            let document = std::str::from_utf8(body).map_err(|_| StatusCode::BAD_REQUEST)?;
            quick_xml::de::from_str(document).map_err(|_| StatusCode::BAD_REQUEST)
        }
        Some("application/x-www-form-urlencoded") => {
            serde_urlencoded::from_bytes(body).map_err(|_| StatusCode::BAD_REQUEST)
        }
        _ => Err(StatusCode::UNSUPPORTED_MEDIA_TYPE),
    }
}
