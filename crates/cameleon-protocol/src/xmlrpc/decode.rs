//! Response decoding: `<methodResponse>` bytes into a [`Value`].
//!
//! The parser is a small pull-event walk over the response. It tolerates
//! inter-element whitespace (the controller indents its output), accepts
//! `<i4>` as a synonym for `<int>`, and treats a bare `<value>text</value>`
//! as a string per the XML-RPC rules.

use chrono::NaiveDateTime;
use quick_xml::events::Event;
use quick_xml::Reader;

use super::{required, Value, DATETIME_WIRE_FORMAT, DATETIME_WIRE_FORMAT_HYPHENATED};
use crate::protocol::error::{CameleonError, Result};

pub(super) fn decode_response(data: &[u8]) -> Result<Value> {
    let text = std::str::from_utf8(data)
        .map_err(|e| CameleonError::Decode(format!("response is not valid UTF-8: {e}")))?;
    let mut parser = Parser::new(text);

    parser.expect_start("methodResponse")?;
    match parser.next_element()? {
        Event::Start(e) if e.name().as_ref() == b"params" => {
            parser.expect_start("param")?;
            let value = parser.parse_value()?;
            parser.expect_end("param")?;
            parser.expect_end("params")?;
            parser.expect_end("methodResponse")?;
            Ok(value)
        }
        Event::Start(e) if e.name().as_ref() == b"fault" => {
            let fault = parser.parse_value()?;
            let code = required(&fault, "faultCode")?;
            let message: String = required(&fault, "faultString")?;
            Err(CameleonError::Fault { code, message })
        }
        other => Err(unexpected("<params> or <fault>", &other)),
    }
}

struct Parser<'a> {
    reader: Reader<&'a [u8]>,
}

impl<'a> Parser<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            reader: Reader::from_str(text),
        }
    }

    /// Next event, with declarations, comments, PIs and doctypes skipped.
    fn next_event(&mut self) -> Result<Event<'a>> {
        loop {
            match self.reader.read_event().map_err(xml_err)? {
                Event::Decl(_) | Event::Comment(_) | Event::PI(_) | Event::DocType(_) => continue,
                event => return Ok(event),
            }
        }
    }

    /// Next structural event: like [`next_event`](Self::next_event) but also
    /// skipping whitespace-only text between elements.
    fn next_element(&mut self) -> Result<Event<'a>> {
        loop {
            match self.next_event()? {
                Event::Text(t) if t.unescape().map_err(xml_err)?.trim().is_empty() => continue,
                event => return Ok(event),
            }
        }
    }

    fn expect_start(&mut self, name: &str) -> Result<()> {
        match self.next_element()? {
            Event::Start(e) if e.name().as_ref() == name.as_bytes() => Ok(()),
            other => Err(unexpected(&format!("<{name}>"), &other)),
        }
    }

    fn expect_end(&mut self, name: &str) -> Result<()> {
        match self.next_element()? {
            Event::End(e) if e.name().as_ref() == name.as_bytes() => Ok(()),
            other => Err(unexpected(&format!("</{name}>"), &other)),
        }
    }

    /// Parse a full `<value>...</value>` element.
    fn parse_value(&mut self) -> Result<Value> {
        match self.next_element()? {
            Event::Start(e) if e.name().as_ref() == b"value" => self.parse_value_body(),
            Event::Empty(e) if e.name().as_ref() == b"value" => Ok(Value::String(String::new())),
            other => Err(unexpected("<value>", &other)),
        }
    }

    /// Parse the content of a `<value>` whose start tag is already consumed.
    ///
    /// Text with no type element is a string; text next to a type element
    /// must be whitespace.
    fn parse_value_body(&mut self) -> Result<Value> {
        let mut text = String::new();
        loop {
            match self.next_event()? {
                Event::Text(t) => text.push_str(&t.unescape().map_err(xml_err)?),
                Event::End(e) if e.name().as_ref() == b"value" => {
                    return Ok(Value::String(text));
                }
                Event::Start(e) => {
                    if !text.trim().is_empty() {
                        return Err(CameleonError::Decode(
                            "mixed text and element content in <value>".to_string(),
                        ));
                    }
                    let tag = e.name().as_ref().to_vec();
                    let value = self.parse_typed(&tag)?;
                    self.expect_end("value")?;
                    return Ok(value);
                }
                Event::Empty(e) => {
                    let tag = e.name().as_ref().to_vec();
                    let value = empty_typed(&tag)?;
                    self.expect_end("value")?;
                    return Ok(value);
                }
                other => return Err(unexpected("value content", &other)),
            }
        }
    }

    fn parse_typed(&mut self, tag: &[u8]) -> Result<Value> {
        match tag {
            b"string" => Ok(Value::String(self.read_text("string")?)),
            b"int" => self.parse_int("int"),
            b"i4" => self.parse_int("i4"),
            b"boolean" => {
                let text = self.read_text("boolean")?;
                match text.trim() {
                    "1" | "true" => Ok(Value::Bool(true)),
                    "0" | "false" => Ok(Value::Bool(false)),
                    other => Err(CameleonError::Decode(format!("invalid boolean `{other}`"))),
                }
            }
            b"double" => {
                let text = self.read_text("double")?;
                text.trim()
                    .parse::<f64>()
                    .map(Value::Double)
                    .map_err(|_| CameleonError::Decode(format!("invalid double `{text}`")))
            }
            b"dateTime.iso8601" => {
                let text = self.read_text("dateTime.iso8601")?;
                parse_datetime(text.trim()).map(Value::DateTime)
            }
            b"array" => self.parse_array(),
            b"struct" => self.parse_struct(),
            other => Err(CameleonError::Decode(format!(
                "unsupported value type `{}`",
                String::from_utf8_lossy(other)
            ))),
        }
    }

    fn parse_int(&mut self, tag: &str) -> Result<Value> {
        let text = self.read_text(tag)?;
        text.trim()
            .parse::<i32>()
            .map(Value::Int)
            .map_err(|_| CameleonError::Decode(format!("invalid int `{text}`")))
    }

    /// Accumulate the text content of `<tag>...</tag>`; the start tag is
    /// already consumed.
    fn read_text(&mut self, tag: &str) -> Result<String> {
        let mut text = String::new();
        loop {
            match self.next_event()? {
                Event::Text(t) => text.push_str(&t.unescape().map_err(xml_err)?),
                Event::End(e) if e.name().as_ref() == tag.as_bytes() => return Ok(text),
                other => return Err(unexpected(&format!("text in <{tag}>"), &other)),
            }
        }
    }

    /// Parse `<data><value>*</data></array>`; `<array>` is already consumed.
    fn parse_array(&mut self) -> Result<Value> {
        match self.next_element()? {
            Event::Start(e) if e.name().as_ref() == b"data" => {}
            Event::Empty(e) if e.name().as_ref() == b"data" => {
                self.expect_end("array")?;
                return Ok(Value::Array(Vec::new()));
            }
            other => return Err(unexpected("<data>", &other)),
        }
        let mut items = Vec::new();
        loop {
            match self.next_element()? {
                Event::Start(e) if e.name().as_ref() == b"value" => {
                    items.push(self.parse_value_body()?);
                }
                Event::Empty(e) if e.name().as_ref() == b"value" => {
                    items.push(Value::String(String::new()));
                }
                Event::End(e) if e.name().as_ref() == b"data" => break,
                other => return Err(unexpected("<value> or </data>", &other)),
            }
        }
        self.expect_end("array")?;
        Ok(Value::Array(items))
    }

    /// Parse `<member>*</struct>`; `<struct>` is already consumed.
    fn parse_struct(&mut self) -> Result<Value> {
        let mut members = std::collections::BTreeMap::new();
        loop {
            match self.next_element()? {
                Event::Start(e) if e.name().as_ref() == b"member" => {
                    self.expect_start("name")?;
                    let name = self.read_text("name")?;
                    let value = self.parse_value()?;
                    self.expect_end("member")?;
                    members.insert(name, value);
                }
                Event::End(e) if e.name().as_ref() == b"struct" => break,
                other => return Err(unexpected("<member> or </struct>", &other)),
            }
        }
        Ok(Value::Struct(members))
    }
}

fn empty_typed(tag: &[u8]) -> Result<Value> {
    match tag {
        b"string" => Ok(Value::String(String::new())),
        b"struct" => Ok(Value::Struct(std::collections::BTreeMap::new())),
        b"array" => Ok(Value::Array(Vec::new())),
        other => Err(CameleonError::Decode(format!(
            "empty `{}` element has no value",
            String::from_utf8_lossy(other)
        ))),
    }
}

fn parse_datetime(text: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(text, DATETIME_WIRE_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(text, DATETIME_WIRE_FORMAT_HYPHENATED))
        .map_err(|_| CameleonError::Decode(format!("invalid dateTime.iso8601 `{text}`")))
}

fn xml_err(e: impl std::fmt::Display) -> CameleonError {
    CameleonError::Decode(format!("invalid XML in response: {e}"))
}

fn unexpected(expected: &str, got: &Event<'_>) -> CameleonError {
    CameleonError::Decode(format!("expected {expected}, got {got:?}"))
}
