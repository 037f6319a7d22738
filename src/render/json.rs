/// JSON record rendering: pretty-printed, four-space indent, insertion order.
use serde::Serialize;
use serde_json::Serializer;
use serde_json::ser::PrettyFormatter;

use super::RenderError;
use crate::types::ResponseRecord;

/// Render a record as a pretty-printed JSON object.
///
/// # Errors
///
/// Returns `RenderError::Json` if serialization fails.
pub fn render(record: &ResponseRecord) -> Result<String, RenderError> {
    let mut buf = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut ser = Serializer::with_formatter(&mut buf, formatter);
    record.serialize(&mut ser)?;
    Ok(String::from_utf8(buf)?)
}
