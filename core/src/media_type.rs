//! Content-type tags understood by the converter registry.

use std::fmt;
use std::str::FromStr;

/// A payload format, keyed by its canonical `Content-Type` value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MediaType {
    Json,
    Xml,
    TextPlain,
    FormUrlEncoded,
}

impl MediaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Json => "application/json",
            MediaType::Xml => "application/xml",
            MediaType::TextPlain => "text/plain",
            MediaType::FormUrlEncoded => "application/x-www-form-urlencoded",
        }
    }

    /// Classify a raw `Content-Type` header value, ignoring parameters.
    ///
    /// Structured-syntax suffixes (`+json`, `+xml`) map to their base format,
    /// `text/xml` is XML and any other `text/*` type is read as plain text.
    pub fn from_content_type(value: &str) -> Option<MediaType> {
        let essence = value
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();

        match essence.as_str() {
            "application/json" => Some(MediaType::Json),
            "application/xml" | "text/xml" => Some(MediaType::Xml),
            "application/x-www-form-urlencoded" => Some(MediaType::FormUrlEncoded),
            e if e.ends_with("+json") => Some(MediaType::Json),
            e if e.ends_with("+xml") => Some(MediaType::Xml),
            e if e.starts_with("text/") => Some(MediaType::TextPlain),
            _ => None,
        }
    }
}

/// Extract the `charset` parameter from a `Content-Type` value.
pub(crate) fn charset_param(content_type: &str) -> Option<&str> {
    content_type.split(';').skip(1).find_map(|param| {
        let (name, value) = param.split_once('=')?;
        name.trim()
            .eq_ignore_ascii_case("charset")
            .then(|| value.trim().trim_matches('"'))
    })
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MediaType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MediaType::from_content_type(s).ok_or_else(|| format!("unsupported media type: {s}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parameters_are_ignored() {
        assert_eq!(
            MediaType::from_content_type("application/json; charset=UTF-8"),
            Some(MediaType::Json)
        );
        assert_eq!(
            MediaType::from_content_type(" Application/XML "),
            Some(MediaType::Xml)
        );
    }

    #[test]
    fn suffixes_and_text_family() {
        assert_eq!(
            MediaType::from_content_type("application/problem+json"),
            Some(MediaType::Json)
        );
        assert_eq!(
            MediaType::from_content_type("application/atom+xml"),
            Some(MediaType::Xml)
        );
        assert_eq!(MediaType::from_content_type("text/xml"), Some(MediaType::Xml));
        assert_eq!(
            MediaType::from_content_type("text/html"),
            Some(MediaType::TextPlain)
        );
        assert_eq!(MediaType::from_content_type("application/octet-stream"), None);
    }

    #[test]
    fn charset_param_is_found() {
        assert_eq!(charset_param("text/plain; charset=\"ISO-8859-1\""), Some("ISO-8859-1"));
        assert_eq!(charset_param("text/plain;Charset=utf-8"), Some("utf-8"));
        assert_eq!(charset_param("text/plain"), None);
    }

    #[test]
    fn display_and_parse_agree() {
        for media_type in [
            MediaType::Json,
            MediaType::Xml,
            MediaType::TextPlain,
            MediaType::FormUrlEncoded,
        ] {
            assert_eq!(media_type.to_string().parse::<MediaType>(), Ok(media_type));
        }
    }
}
