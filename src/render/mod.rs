/// Record formatting and batch framing for JSON, XML, and YAML.
pub mod frame;
pub mod indent;
pub mod json;
pub mod xml;
pub mod yaml;

use std::string::FromUtf8Error;

use thiserror::Error;

use crate::config::OutputFormat;
use crate::types::ResponseRecord;

pub use frame::{Framing, RECORD_TERMINATOR, framing};

/// Serialization failures while rendering a record.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("XML serialization error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("serializer produced invalid UTF-8: {0}")]
    Utf8(#[from] FromUtf8Error),
}

/// Render one record as a text block ready to sit inside the batch document.
///
/// `index` is the record's position in the batch and only affects YAML.
/// Every line of the result is indented one level below the batch container.
///
/// # Errors
///
/// Returns `RenderError` if the format's serializer fails.
pub fn format_record(
    record: &ResponseRecord,
    index: usize,
    format: OutputFormat,
) -> Result<String, RenderError> {
    let block = match format {
        OutputFormat::Json => json::render(record)?,
        OutputFormat::Xml => xml::render(record)?,
        OutputFormat::Yaml => yaml::render(record, index)?,
    };
    Ok(indent::indent_block(&block))
}
