//! Request encoding: method name + ordered values into `<methodCall>` bytes.

use std::io::Write;

use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use super::{Value, DATETIME_WIRE_FORMAT};
use crate::protocol::error::Result;

pub(super) fn encode_request(method: &str, params: &[Value]) -> Result<Vec<u8>> {
    let mut writer = Writer::new(Vec::new());
    start(&mut writer, "methodCall")?;
    text_element(&mut writer, "methodName", method)?;
    // The controller's serializer omits <params> entirely for zero-argument
    // calls rather than sending an empty element.
    if !params.is_empty() {
        start(&mut writer, "params")?;
        for param in params {
            start(&mut writer, "param")?;
            write_value(&mut writer, param)?;
            end(&mut writer, "param")?;
        }
        end(&mut writer, "params")?;
    }
    end(&mut writer, "methodCall")?;
    Ok(writer.into_inner())
}

fn write_value<W: Write>(writer: &mut Writer<W>, value: &Value) -> Result<()> {
    start(writer, "value")?;
    match value {
        Value::Int(i) => text_element(writer, "int", &i.to_string())?,
        Value::Bool(b) => text_element(writer, "boolean", if *b { "1" } else { "0" })?,
        Value::String(s) => text_element(writer, "string", s)?,
        Value::Double(d) => text_element(writer, "double", &d.to_string())?,
        Value::DateTime(dt) => text_element(
            writer,
            "dateTime.iso8601",
            &dt.format(DATETIME_WIRE_FORMAT).to_string(),
        )?,
        Value::Array(items) => {
            start(writer, "array")?;
            start(writer, "data")?;
            for item in items {
                write_value(writer, item)?;
            }
            end(writer, "data")?;
            end(writer, "array")?;
        }
        Value::Struct(members) => {
            start(writer, "struct")?;
            for (name, member) in members {
                start(writer, "member")?;
                text_element(writer, "name", name)?;
                write_value(writer, member)?;
                end(writer, "member")?;
            }
            end(writer, "struct")?;
        }
    }
    end(writer, "value")
}

fn start<W: Write>(writer: &mut Writer<W>, name: &str) -> Result<()> {
    writer.write_event(Event::Start(BytesStart::new(name)))?;
    Ok(())
}

fn end<W: Write>(writer: &mut Writer<W>, name: &str) -> Result<()> {
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

fn text_element<W: Write>(writer: &mut Writer<W>, name: &str, text: &str) -> Result<()> {
    start(writer, name)?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    end(writer, name)
}
