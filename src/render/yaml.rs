/// YAML record rendering: a named entry `sequence_<index>` under the batch mapping.
use super::RenderError;
use super::indent::indent_block;
use crate::types::ResponseRecord;

/// Name of the mapping entry for the record at `index`.
#[must_use]
pub fn entry_name(index: usize) -> String {
    format!("sequence_{index}")
}

/// Render a record as a `sequence_<index>:` entry with its fields nested one
/// level below the header.
///
/// # Errors
///
/// Returns `RenderError::Yaml` if serialization fails.
pub fn render(record: &ResponseRecord, index: usize) -> Result<String, RenderError> {
    let dumped = serde_yaml::to_string(record)?;
    let body = dumped.strip_suffix('\n').unwrap_or(&dumped);
    Ok(format!("{}:\n{}", entry_name(index), indent_block(body)))
}
