//! Client construction and charset configuration.
//!
//! # Design
//! A `Client` pairs a `ureq` agent with a converter registry. The registry
//! is filled while the client is configured and only read afterwards, so a
//! configured client can be shared between threads by reference.

use std::borrow::Cow;
use std::fmt;

use encoding_rs::Encoding;
use serde::{Deserialize, Serialize};

use crate::converter::{ConverterRegistry, JsonConverter, XmlConverter};
use crate::error::{Error, Result};
use crate::http::{HttpRequest, HttpResponse};
use crate::media_type::MediaType;

/// Settings for `Client::from_config`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Charset label used to decode text bodies that do not declare one.
    pub charset: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            charset: "UTF-8".to_string(),
        }
    }
}

/// A blocking HTTP client with its registered converters.
pub struct Client {
    agent: ureq::Agent,
    converters: ConverterRegistry,
}

impl Client {
    /// Client with the default converters (text and form) and a default agent.
    pub fn new() -> Self {
        Self::with_converters(default_agent(), ConverterRegistry::with_defaults())
    }

    /// Client over a caller-built agent, for transport settings such as
    /// timeouts or proxies.
    pub fn with_converters(agent: ureq::Agent, converters: ConverterRegistry) -> Self {
        Self { agent, converters }
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        configure(&config.charset)
    }

    pub fn converters(&self) -> &ConverterRegistry {
        &self.converters
    }

    pub fn converters_mut(&mut self) -> &mut ConverterRegistry {
        &mut self.converters
    }

    /// Send `request` as a POST and collect the whole response.
    ///
    /// Characters that may not appear in a URI (spaces, quotes, `<`, `>`,
    /// non-ASCII) are percent-encoded on the way out; `&`, `=` and `?` are
    /// sent as built. Connection failures, unparsable URLs and 4xx/5xx
    /// statuses all come back as `Error::RequestFailed`. The response body is
    /// read without a size cap.
    pub fn execute(&self, request: &HttpRequest) -> Result<HttpResponse> {
        let failed = |source: ureq::Error| Error::RequestFailed {
            url: request.url.clone(),
            source,
        };

        log::debug!(
            "POST {} ({} body bytes)",
            request.url,
            request.body.as_ref().map_or(0, Vec::len)
        );

        let target = transport_url(&request.url);
        let mut builder = self.agent.post(&*target);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        let mut response = match &request.body {
            Some(body) => builder.send(body.as_slice()),
            None => builder.send_empty(),
        }
        .map_err(failed)?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                let value = value.to_str().ok()?;
                Some((name.as_str().to_string(), value.to_string()))
            })
            .collect();
        let body = response
            .body_mut()
            .with_config()
            .limit(u64::MAX)
            .read_to_vec()
            .map_err(failed)?;

        log::debug!("POST {} -> {status}", request.url);
        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

impl Default for Client {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("converters", &self.converters)
            .finish_non_exhaustive()
    }
}

/// `raw` with URI-illegal characters percent-encoded. A URL that does not
/// parse is passed through so the transport reports it.
fn transport_url(raw: &str) -> Cow<'_, str> {
    match url::Url::parse(raw) {
        Ok(parsed) => Cow::Owned(parsed.into()),
        Err(_) => Cow::Borrowed(raw),
    }
}

fn default_agent() -> ureq::Agent {
    ureq::Agent::config_builder()
        .http_status_as_error(true)
        .build()
        .new_agent()
}

/// A default client whose text converter decodes with `charset` and which
/// has JSON and XML converters.
pub fn configure(charset: &str) -> Result<Client> {
    let mut client = Client::new();
    apply_charset(&mut client, charset)?;
    Ok(client)
}

/// Set the text converter's default charset, if there is a text converter,
/// and add JSON and XML converters where none are registered yet.
///
/// Applying this more than once never adds a second JSON or XML converter.
pub fn apply_charset(client: &mut Client, charset: &str) -> Result<()> {
    let encoding = Encoding::for_label(charset.trim().as_bytes())
        .ok_or_else(|| Error::InvalidEncoding(charset.to_string()))?;

    let converters = client.converters_mut();
    if let Some(text) = converters.get_mut(MediaType::TextPlain) {
        text.set_default_charset(encoding);
        log::debug!("text converter decodes with {}", encoding.name());
    }
    converters.register_if_absent(Box::new(XmlConverter));
    converters.register_if_absent(Box::new(JsonConverter));
    Ok(())
}
