//! Content-type-aware POST helpers over a blocking HTTP client.
//!
//! # Overview
//! `configure` builds a `Client` whose text converter decodes with a chosen
//! charset and which can read and write JSON and XML. The dispatcher then
//! POSTs a parameter map as the request body, as the query string, or both,
//! and returns either the full `ResponseEnvelope` or just the decoded body.
//!
//! # Design
//! - Requests are built as plain data (`build_request`), executed by the
//!   client, and parsed as plain data (`parse_response`); only
//!   `Client::execute` touches the network.
//! - Converters live in a registry keyed by media type, at most one each.
//! - Query strings are appended verbatim, without percent-encoding.

pub mod client;
pub mod converter;
pub mod dispatch;
pub mod error;
pub mod http;
pub mod media_type;
pub mod query;
pub mod types;
mod xml;

pub use client::{apply_charset, configure, Client, ClientConfig};
pub use converter::{
    ConverterRegistry, FormConverter, JsonConverter, MessageConverter, TextConverter, XmlConverter,
};
pub use dispatch::{
    build_request, parse_response, post_for_entity, post_for_entity_param, post_for_entity_stream,
    post_for_entity_stream_or_param, post_for_entity_stream_param, post_for_object,
    post_for_object_param, post_for_object_stream, post_for_object_stream_or_param,
    post_for_object_stream_param,
};
pub use error::{Error, Result};
pub use http::{HttpRequest, HttpResponse};
pub use media_type::MediaType;
pub use query::encode_query;
pub use types::{Placement, RequestParams, ResponseEnvelope};
