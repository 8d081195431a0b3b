//! POST dispatch with body, query-string or split parameter placement.
//!
//! # Design
//! Every entry point goes through `post_for_entity`: build the request as
//! data, let the client execute it, parse the response. The named
//! `post_for_{entity,object}_*` functions only fix the placement and, for
//! the object variants, drop status and headers.
//!
//! The request's `Content-Type` comes from the caller; the converter used to
//! decode the response is picked from the response's own `Content-Type`.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::client::Client;
use crate::converter::ConverterRegistry;
use crate::error::{Error, Result};
use crate::http::{HttpRequest, HttpResponse};
use crate::media_type::MediaType;
use crate::query::encode_query;
use crate::types::{Placement, RequestParams, ResponseEnvelope};

/// POST to `url` with params placed per `placement` and return the whole
/// response envelope.
///
/// `media_type` sets the request `Content-Type` and picks the body writer.
/// Without it, a body is written by the registry's default writer.
pub fn post_for_entity<T: DeserializeOwned>(
    client: &Client,
    url: &str,
    placement: Placement<'_>,
    media_type: Option<MediaType>,
) -> Result<ResponseEnvelope<T>> {
    let request = build_request(client.converters(), url, placement, media_type)?;
    let response = client.execute(&request)?;
    parse_response(client.converters(), response)
}

/// Same request as `post_for_entity`, returning only the decoded body.
pub fn post_for_object<T: DeserializeOwned>(
    client: &Client,
    url: &str,
    placement: Placement<'_>,
    media_type: Option<MediaType>,
) -> Result<T> {
    post_for_entity(client, url, placement, media_type).map(ResponseEnvelope::into_body)
}

/// Build the POST request for `placement` without sending it.
pub fn build_request(
    converters: &ConverterRegistry,
    url: &str,
    placement: Placement<'_>,
    media_type: Option<MediaType>,
) -> Result<HttpRequest> {
    let url = match placement.query() {
        Some(query) => encode_query(url, query),
        None => url.to_string(),
    };

    let mut headers = Vec::new();
    let body = match placement.body() {
        Some(params) => {
            let writer = match media_type {
                Some(media_type) => converters.get(media_type).ok_or_else(|| Error::EncodeFailed {
                    media_type,
                    reason: "no converter registered".to_string(),
                })?,
                None => converters.default_writer().ok_or(Error::NoWriter)?,
            };
            headers.push(content_type(writer.media_type()));
            Some(writer.write(params)?)
        }
        None => {
            headers.extend(media_type.map(content_type));
            None
        }
    };

    if !converters.is_empty() {
        headers.push(("accept".to_string(), converters.accept_header()));
    }

    Ok(HttpRequest { url, headers, body })
}

fn content_type(media_type: MediaType) -> (String, String) {
    ("content-type".to_string(), media_type.as_str().to_string())
}

/// Decode `response` into an envelope with the converter matching its
/// `Content-Type`. An empty body decodes as JSON `null`.
pub fn parse_response<T: DeserializeOwned>(
    converters: &ConverterRegistry,
    response: HttpResponse,
) -> Result<ResponseEnvelope<T>> {
    let value = if response.body.is_empty() {
        Value::Null
    } else {
        let content_type = response.header("content-type");
        let converter = content_type
            .and_then(MediaType::from_content_type)
            .and_then(|media_type| converters.get(media_type))
            .ok_or_else(|| {
                Error::DecodeFailed(format!(
                    "no converter for content type {}",
                    content_type.unwrap_or("<none>")
                ))
            })?;
        converter.read(&response.body, content_type)?
    };

    let body = serde_json::from_value(value).map_err(|e| {
        Error::DecodeFailed(format!("not a valid {}: {e}", std::any::type_name::<T>()))
    })?;

    Ok(ResponseEnvelope {
        status: response.status,
        headers: response.headers,
        body,
    })
}

/// POST `params` as the request body.
pub fn post_for_entity_stream<T: DeserializeOwned>(
    client: &Client,
    url: &str,
    params: &RequestParams,
    media_type: Option<MediaType>,
) -> Result<ResponseEnvelope<T>> {
    post_for_entity(client, url, Placement::Body(params), media_type)
}

pub fn post_for_object_stream<T: DeserializeOwned>(
    client: &Client,
    url: &str,
    params: &RequestParams,
    media_type: Option<MediaType>,
) -> Result<T> {
    post_for_object(client, url, Placement::Body(params), media_type)
}

/// POST with `params` in the query string and an empty body.
pub fn post_for_entity_param<T: DeserializeOwned>(
    client: &Client,
    url: &str,
    params: &RequestParams,
    media_type: Option<MediaType>,
) -> Result<ResponseEnvelope<T>> {
    post_for_entity(client, url, Placement::Query(params), media_type)
}

pub fn post_for_object_param<T: DeserializeOwned>(
    client: &Client,
    url: &str,
    params: &RequestParams,
    media_type: Option<MediaType>,
) -> Result<T> {
    post_for_object(client, url, Placement::Query(params), media_type)
}

/// POST `params` both as the body and in the query string.
pub fn post_for_entity_stream_param<T: DeserializeOwned>(
    client: &Client,
    url: &str,
    params: &RequestParams,
    media_type: Option<MediaType>,
) -> Result<ResponseEnvelope<T>> {
    post_for_entity(client, url, Placement::Both(params), media_type)
}

pub fn post_for_object_stream_param<T: DeserializeOwned>(
    client: &Client,
    url: &str,
    params: &RequestParams,
    media_type: Option<MediaType>,
) -> Result<T> {
    post_for_object(client, url, Placement::Both(params), media_type)
}

/// POST `body` as the request body and `query` in the query string.
pub fn post_for_entity_stream_or_param<T: DeserializeOwned>(
    client: &Client,
    url: &str,
    body: &RequestParams,
    query: &RequestParams,
    media_type: Option<MediaType>,
) -> Result<ResponseEnvelope<T>> {
    post_for_entity(client, url, Placement::Split { body, query }, media_type)
}

pub fn post_for_object_stream_or_param<T: DeserializeOwned>(
    client: &Client,
    url: &str,
    body: &RequestParams,
    query: &RequestParams,
    media_type: Option<MediaType>,
) -> Result<T> {
    post_for_object(client, url, Placement::Split { body, query }, media_type)
}
