//! Mapping between `serde_json` value trees and XML documents.
//!
//! Params are written as `<map>` with one child element per key. Arrays
//! repeat the element, objects nest, `null` becomes an empty element. Reading
//! goes the other way: an element with children becomes an object (repeated
//! names collect into an array), an element with only text becomes a string.
//! Attributes are ignored.

use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use serde_json::{Map, Value};

use crate::query::display_value;
use crate::types::RequestParams;

pub(crate) const ROOT_ELEMENT: &str = "map";

pub(crate) fn write_document(params: &RequestParams) -> Result<Vec<u8>, String> {
    let mut writer = Writer::new(Vec::new());
    emit(&mut writer, Event::Start(BytesStart::new(ROOT_ELEMENT)))?;
    for (key, value) in params {
        write_element(&mut writer, key, value)?;
    }
    emit(&mut writer, Event::End(BytesEnd::new(ROOT_ELEMENT)))?;
    Ok(writer.into_inner())
}

fn write_element(writer: &mut Writer<Vec<u8>>, name: &str, value: &Value) -> Result<(), String> {
    match value {
        Value::Null => emit(writer, Event::Empty(BytesStart::new(name))),
        Value::Array(items) => items
            .iter()
            .try_for_each(|item| write_element(writer, name, item)),
        Value::Object(fields) => {
            emit(writer, Event::Start(BytesStart::new(name)))?;
            for (key, field) in fields {
                write_element(writer, key, field)?;
            }
            emit(writer, Event::End(BytesEnd::new(name)))
        }
        scalar => {
            emit(writer, Event::Start(BytesStart::new(name)))?;
            emit(writer, Event::Text(BytesText::new(&display_value(scalar))))?;
            emit(writer, Event::End(BytesEnd::new(name)))
        }
    }
}

fn emit(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> Result<(), String> {
    writer.write_event(event).map_err(|e| e.to_string())
}

/// An element whose end tag has not been read yet.
struct Frame {
    name: String,
    fields: Map<String, Value>,
    text: String,
}

impl Frame {
    fn new(name: String) -> Self {
        Self {
            name,
            fields: Map::new(),
            text: String::new(),
        }
    }

    fn insert(&mut self, key: String, value: Value) {
        match self.fields.get_mut(&key) {
            Some(Value::Array(items)) => items.push(value),
            Some(existing) => {
                let first = existing.take();
                *existing = Value::Array(vec![first, value]);
            }
            None => {
                self.fields.insert(key, value);
            }
        }
    }

    fn into_value(self, is_root: bool) -> Value {
        if !self.fields.is_empty() {
            Value::Object(self.fields)
        } else if !self.text.is_empty() {
            Value::String(self.text)
        } else if is_root {
            Value::Object(Map::new())
        } else {
            Value::String(String::new())
        }
    }
}

pub(crate) fn read_document(document: &str) -> Result<Value, String> {
    let mut reader = Reader::from_str(document);
    reader.config_mut().trim_text(true);
    let mut stack: Vec<Frame> = Vec::new();

    loop {
        match reader.read_event().map_err(|e| e.to_string())? {
            Event::Start(start) => stack.push(Frame::new(element_name(&start)?)),
            Event::Empty(start) => {
                let name = element_name(&start)?;
                match stack.last_mut() {
                    Some(parent) => parent.insert(name, Value::String(String::new())),
                    None => return Ok(Value::Object(Map::new())),
                }
            }
            Event::Text(text) => {
                if let Some(frame) = stack.last_mut() {
                    frame.text.push_str(&text.unescape().map_err(|e| e.to_string())?);
                }
            }
            Event::CData(data) => {
                if let Some(frame) = stack.last_mut() {
                    let chunk = std::str::from_utf8(&data).map_err(|e| e.to_string())?;
                    frame.text.push_str(chunk);
                }
            }
            Event::End(_) => {
                let frame = stack.pop().ok_or("unbalanced end tag")?;
                let name = frame.name.clone();
                let value = frame.into_value(stack.is_empty());
                match stack.last_mut() {
                    Some(parent) => parent.insert(name, value),
                    None => return Ok(value),
                }
            }
            Event::Eof => return Err("document has no complete root element".to_string()),
            _ => {}
        }
    }
}

/// The `encoding` named in a leading `<?xml ...?>` declaration.
pub(crate) fn declared_encoding(document: &[u8]) -> Option<&str> {
    let rest = document.strip_prefix(b"<?xml")?;
    let end = rest.windows(2).position(|w| w == b"?>")?;
    let declaration = std::str::from_utf8(&rest[..end]).ok()?;
    let (_, after) = declaration.split_once("encoding")?;
    let value = after.trim_start().strip_prefix('=')?.trim_start();
    let quote = value.chars().next().filter(|c| *c == '"' || *c == '\'')?;
    value[1..].split(quote).next()
}

fn element_name(start: &BytesStart<'_>) -> Result<String, String> {
    std::str::from_utf8(start.local_name().as_ref())
        .map(str::to_string)
        .map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn params(value: Value) -> RequestParams {
        value.as_object().cloned().unwrap()
    }

    fn written(value: Value) -> String {
        String::from_utf8(write_document(&params(value)).unwrap()).unwrap()
    }

    #[test]
    fn flat_params_become_child_elements() {
        assert_eq!(
            written(json!({"a": "1", "b": 2})),
            "<map><a>1</a><b>2</b></map>"
        );
    }

    #[test]
    fn text_is_escaped() {
        assert_eq!(
            written(json!({"q": "a<b&c"})),
            "<map><q>a&lt;b&amp;c</q></map>"
        );
    }

    #[test]
    fn arrays_repeat_and_null_is_empty() {
        assert_eq!(
            written(json!({"tag": ["x", "y"], "none": null})),
            "<map><none/><tag>x</tag><tag>y</tag></map>"
        );
    }

    #[test]
    fn reads_flat_document() {
        let value = read_document("<?xml version=\"1.0\"?><map><parma>abc</parma></map>").unwrap();
        assert_eq!(value, json!({"parma": "abc"}));
    }

    #[test]
    fn reads_nested_and_repeated_elements() {
        let value =
            read_document("<HashMap><user><name>ann</name></user><tag>x</tag><tag>y</tag><empty/></HashMap>")
                .unwrap();
        assert_eq!(
            value,
            json!({"user": {"name": "ann"}, "tag": ["x", "y"], "empty": ""})
        );
    }

    #[test]
    fn empty_root_is_an_empty_object() {
        assert_eq!(read_document("<map/>").unwrap(), json!({}));
        assert_eq!(read_document("<map></map>").unwrap(), json!({}));
    }

    #[test]
    fn unescapes_text_and_reads_cdata() {
        let value = read_document("<map><a>x &amp; y</a><b><![CDATA[<raw>]]></b></map>").unwrap();
        assert_eq!(value, json!({"a": "x & y", "b": "<raw>"}));
    }

    #[test]
    fn declared_encoding_is_read_from_the_prolog() {
        assert_eq!(
            declared_encoding(b"<?xml version=\"1.0\" encoding=\"GBK\"?><map/>"),
            Some("GBK")
        );
        assert_eq!(
            declared_encoding(b"<?xml version='1.0' encoding = 'ISO-8859-1' ?><map/>"),
            Some("ISO-8859-1")
        );
        assert_eq!(declared_encoding(b"<?xml version=\"1.0\"?><map/>"), None);
        assert_eq!(declared_encoding(b"<map/>"), None);
    }

    #[test]
    fn rejects_truncated_document() {
        assert!(read_document("<map><a>1</a>").is_err());
        assert!(read_document("").is_err());
    }
}
