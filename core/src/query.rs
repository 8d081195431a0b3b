//! Query-string construction.
//!
//! Values are written verbatim: nothing is percent-encoded, and an existing
//! query in the base URL is not merged with the new one. The client escapes
//! characters that are illegal in a URI before sending, but values containing
//! `&`, `=` or `#` still produce a URL the server reads differently.

use std::borrow::Cow;

use serde_json::Value;

use crate::types::RequestParams;

/// Append `?key=value&` for every entry of `params` to `base_url`.
///
/// The result always carries the `?`; it ends with `&` unless `params` is
/// empty.
pub fn encode_query(base_url: &str, params: &RequestParams) -> String {
    let mut url = String::with_capacity(base_url.len() + 1 + params.len() * 16);
    url.push_str(base_url);
    url.push('?');
    for (key, value) in params {
        url.push_str(key);
        url.push('=');
        url.push_str(&display_value(value));
        url.push('&');
    }
    url
}

/// The plain string form of a parameter value: strings unquoted, everything
/// else as its JSON text.
pub(crate) fn display_value(value: &Value) -> Cow<'_, str> {
    match value {
        Value::String(s) => Cow::Borrowed(s.as_str()),
        other => Cow::Owned(other.to_string()),
    }
}
