//! Message converters and the registry a `Client` keeps them in.
//!
//! # Design
//! A converter turns `RequestParams` into body bytes for one media type and
//! turns response bytes of that media type into a `serde_json::Value` tree.
//! The dispatcher then deserializes the tree into the caller's type, which
//! keeps the trait object-safe while still supporting any `DeserializeOwned`
//! target.
//!
//! The registry is keyed by media type, so "is there already a JSON
//! converter?" is a lookup and a second converter for the same media type
//! cannot be registered by accident.

use std::collections::BTreeMap;
use std::fmt;

use encoding_rs::Encoding;
use serde_json::{Map, Value};

use crate::error::{Error, Result};
use crate::media_type::{charset_param, MediaType};
use crate::query::display_value;
use crate::types::RequestParams;
use crate::xml;

pub trait MessageConverter: fmt::Debug + Send + Sync {
    fn media_type(&self) -> MediaType;

    /// Serialize request params into a body of this converter's media type.
    fn write(&self, params: &RequestParams) -> Result<Vec<u8>>;

    /// Decode a response body. `content_type` is the raw response header, if
    /// the server sent one.
    fn read(&self, body: &[u8], content_type: Option<&str>) -> Result<Value>;

    /// Change the charset used when a response does not name one. Returns
    /// `false` for converters without a charset setting.
    fn set_default_charset(&mut self, _charset: &'static Encoding) -> bool {
        false
    }

    fn default_charset(&self) -> Option<&'static Encoding> {
        None
    }
}

/// Plain text. Reads any body as a string; cannot write params.
#[derive(Debug, Clone)]
pub struct TextConverter {
    charset: &'static Encoding,
}

impl TextConverter {
    pub fn new(charset: &'static Encoding) -> Self {
        Self { charset }
    }
}

impl Default for TextConverter {
    /// ISO-8859-1, which the WHATWG encoding table resolves to windows-1252.
    fn default() -> Self {
        Self::new(encoding_rs::WINDOWS_1252)
    }
}

impl MessageConverter for TextConverter {
    fn media_type(&self) -> MediaType {
        MediaType::TextPlain
    }

    fn write(&self, _params: &RequestParams) -> Result<Vec<u8>> {
        Err(Error::EncodeFailed {
            media_type: MediaType::TextPlain,
            reason: "a parameter map has no plain-text form".to_string(),
        })
    }

    fn read(&self, body: &[u8], content_type: Option<&str>) -> Result<Value> {
        let charset = content_type
            .and_then(charset_param)
            .and_then(|label| Encoding::for_label(label.as_bytes()))
            .unwrap_or(self.charset);
        let (text, _) = charset.decode_without_bom_handling(body);
        Ok(Value::String(text.into_owned()))
    }

    fn set_default_charset(&mut self, charset: &'static Encoding) -> bool {
        self.charset = charset;
        true
    }

    fn default_charset(&self) -> Option<&'static Encoding> {
        Some(self.charset)
    }
}

#[derive(Debug, Clone, Default)]
pub struct JsonConverter;

impl MessageConverter for JsonConverter {
    fn media_type(&self) -> MediaType {
        MediaType::Json
    }

    fn write(&self, params: &RequestParams) -> Result<Vec<u8>> {
        serde_json::to_vec(params).map_err(|e| Error::EncodeFailed {
            media_type: MediaType::Json,
            reason: e.to_string(),
        })
    }

    fn read(&self, body: &[u8], _content_type: Option<&str>) -> Result<Value> {
        serde_json::from_slice(body).map_err(|e| Error::DecodeFailed(e.to_string()))
    }
}

#[derive(Debug, Clone, Default)]
pub struct XmlConverter;

impl MessageConverter for XmlConverter {
    fn media_type(&self) -> MediaType {
        MediaType::Xml
    }

    fn write(&self, params: &RequestParams) -> Result<Vec<u8>> {
        xml::write_document(params).map_err(|reason| Error::EncodeFailed {
            media_type: MediaType::Xml,
            reason,
        })
    }

    /// The charset comes from the response `Content-Type`, then the XML
    /// declaration, and defaults to UTF-8.
    fn read(&self, body: &[u8], content_type: Option<&str>) -> Result<Value> {
        let label = content_type
            .and_then(charset_param)
            .or_else(|| xml::declared_encoding(body));
        let charset = match label {
            Some(label) => Encoding::for_label(label.as_bytes())
                .ok_or_else(|| Error::DecodeFailed(format!("unknown charset: {label}")))?,
            None => encoding_rs::UTF_8,
        };
        let (document, _, malformed) = charset.decode(body);
        if malformed {
            return Err(Error::DecodeFailed(format!(
                "body is not valid {}",
                charset.name()
            )));
        }
        xml::read_document(&document).map_err(Error::DecodeFailed)
    }
}

/// `application/x-www-form-urlencoded`, values in their plain string form.
#[derive(Debug, Clone, Default)]
pub struct FormConverter;

impl MessageConverter for FormConverter {
    fn media_type(&self) -> MediaType {
        MediaType::FormUrlEncoded
    }

    fn write(&self, params: &RequestParams) -> Result<Vec<u8>> {
        let pairs: Vec<(&str, String)> = params
            .iter()
            .map(|(key, value)| (key.as_str(), display_value(value).into_owned()))
            .collect();
        serde_urlencoded::to_string(pairs)
            .map(String::into_bytes)
            .map_err(|e| Error::EncodeFailed {
                media_type: MediaType::FormUrlEncoded,
                reason: e.to_string(),
            })
    }

    fn read(&self, body: &[u8], _content_type: Option<&str>) -> Result<Value> {
        let pairs: Vec<(String, String)> =
            serde_urlencoded::from_bytes(body).map_err(|e| Error::DecodeFailed(e.to_string()))?;
        let fields: Map<String, Value> = pairs
            .into_iter()
            .map(|(key, value)| (key, Value::String(value)))
            .collect();
        Ok(Value::Object(fields))
    }
}

/// Converters of a client, at most one per media type.
#[derive(Debug, Default)]
pub struct ConverterRegistry {
    converters: BTreeMap<MediaType, Box<dyn MessageConverter>>,
}

impl ConverterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Text and form converters, the list a freshly created client starts
    /// with before JSON and XML support is ensured.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(TextConverter::default()));
        registry.register(Box::new(FormConverter));
        registry
    }

    /// Register `converter`, replacing and returning any previous converter
    /// for the same media type.
    pub fn register(&mut self, converter: Box<dyn MessageConverter>) -> Option<Box<dyn MessageConverter>> {
        log::trace!("registering {} converter", converter.media_type());
        self.converters.insert(converter.media_type(), converter)
    }

    /// Register `converter` unless its media type is already covered. Returns
    /// whether it was added.
    pub fn register_if_absent(&mut self, converter: Box<dyn MessageConverter>) -> bool {
        if self.contains(converter.media_type()) {
            return false;
        }
        self.register(converter);
        true
    }

    pub fn contains(&self, media_type: MediaType) -> bool {
        self.converters.contains_key(&media_type)
    }

    pub fn get(&self, media_type: MediaType) -> Option<&dyn MessageConverter> {
        self.converters.get(&media_type).map(|c| c.as_ref())
    }

    pub fn get_mut(&mut self, media_type: MediaType) -> Option<&mut (dyn MessageConverter + 'static)> {
        self.converters.get_mut(&media_type).map(|c| c.as_mut())
    }

    pub fn len(&self) -> usize {
        self.converters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.converters.is_empty()
    }

    pub fn media_types(&self) -> impl Iterator<Item = MediaType> + '_ {
        self.converters.keys().copied()
    }

    /// Writer used when a request body is sent without a media type: the first
    /// registered of JSON, XML and form.
    pub fn default_writer(&self) -> Option<&dyn MessageConverter> {
        [MediaType::Json, MediaType::Xml, MediaType::FormUrlEncoded]
            .into_iter()
            .find_map(|media_type| self.get(media_type))
    }

    /// `Accept` header value listing every readable media type.
    pub fn accept_header(&self) -> String {
        self.media_types()
            .map(|media_type| media_type.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}
