/// XML record rendering.
///
/// Each record becomes a `<sequence>` element whose children mirror the
/// record's keys. Arrays become repeated `<item>` children, null becomes an
/// empty element, and keys that are not valid XML names are written as
/// `<key name="...">`. No declaration is written here; the batch prefix
/// carries the only one.
use quick_xml::Writer;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use serde_json::Value;

use super::RenderError;
use crate::types::ResponseRecord;

/// Root element of a single record.
pub const RECORD_ELEMENT: &str = "sequence";

const ITEM_ELEMENT: &str = "item";
const FALLBACK_ELEMENT: &str = "key";

/// Render a record as an indented `<sequence>` element.
///
/// # Errors
///
/// Returns `RenderError::Xml` if the writer fails.
pub fn render(record: &ResponseRecord) -> Result<String, RenderError> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 4);
    write_children(
        &mut writer,
        RECORD_ELEMENT,
        record.fields().iter().map(|(k, v)| (k.as_str(), v)),
    )?;
    Ok(String::from_utf8(writer.into_inner())?)
}

fn write_value(writer: &mut Writer<Vec<u8>>, name: &str, value: &Value) -> quick_xml::Result<()> {
    match value {
        Value::Null => writer.write_event(Event::Empty(element(name))),
        Value::Bool(b) => write_text(writer, name, if *b { "true" } else { "false" }),
        Value::Number(n) => write_text(writer, name, &n.to_string()),
        Value::String(s) => write_text(writer, name, s),
        Value::Array(items) => write_children(
            writer,
            name,
            items.iter().map(|item| (ITEM_ELEMENT, item)),
        ),
        Value::Object(map) => {
            write_children(writer, name, map.iter().map(|(k, v)| (k.as_str(), v)))
        }
    }
}

fn write_text(writer: &mut Writer<Vec<u8>>, name: &str, text: &str) -> quick_xml::Result<()> {
    if text.is_empty() {
        return writer.write_event(Event::Empty(element(name)));
    }
    writer.write_event(Event::Start(element(name)))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(BytesEnd::new(tag(name))))
}

fn write_children<'a>(
    writer: &mut Writer<Vec<u8>>,
    name: &str,
    children: impl ExactSizeIterator<Item = (&'a str, &'a Value)>,
) -> quick_xml::Result<()> {
    if children.len() == 0 {
        return writer.write_event(Event::Empty(element(name)));
    }
    writer.write_event(Event::Start(element(name)))?;
    for (child, value) in children {
        write_value(writer, child, value)?;
    }
    writer.write_event(Event::End(BytesEnd::new(tag(name))))
}

/// Opening tag for `name`, falling back to `<key name="...">`.
fn element(name: &str) -> BytesStart<'_> {
    let mut start = BytesStart::new(tag(name));
    if !is_xml_name(name) {
        start.push_attribute(("name", name));
    }
    start
}

fn tag(name: &str) -> &str {
    if is_xml_name(name) {
        name
    } else {
        FALLBACK_ELEMENT
    }
}

fn is_xml_name(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    (first.is_alphabetic() || first == '_')
        && chars.all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.'))
}
