//! Error types for the POST helper.
//!
//! # Design
//! One variant per failure site: charset lookup when a client is
//! configured, body serialization while a request is built, the transport
//! round-trip, and body decoding once a response arrives. Nothing is logged
//! or swallowed; every error goes straight back to the caller.

use thiserror::Error;

use crate::media_type::MediaType;

#[derive(Debug, Error)]
pub enum Error {
    /// The charset label is not known to the text codec.
    #[error("unknown charset: {0}")]
    InvalidEncoding(String),

    /// No converter can write the params for this media type, or writing failed.
    #[error("cannot encode request body as {media_type}: {reason}")]
    EncodeFailed { media_type: MediaType, reason: String },

    /// A body was to be sent without a media type and no registered
    /// converter can write a parameter map.
    #[error("no converter can write the request body")]
    NoWriter,

    /// Connection, URL or status failure reported by the transport.
    #[error("POST {url} failed: {source}")]
    RequestFailed {
        url: String,
        #[source]
        source: ureq::Error,
    },

    /// The response body could not be converted into the requested type.
    #[error("cannot decode response body: {0}")]
    DecodeFailed(String),
}

impl Error {
    /// HTTP status code when the transport rejected the response by status.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::RequestFailed {
                source: ureq::Error::StatusCode(code),
                ..
            } => Some(*code),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
