/// Batch framing: the tokens that turn a run of record blocks into one document.
use crate::config::OutputFormat;

/// Prefix, separator, and suffix for one output format.
///
/// Written verbatim and never re-indented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Framing {
    /// Written once before the first record.
    pub prefix: &'static str,
    /// Written after every record but the last.
    pub separator: &'static str,
    /// Written once after the last record.
    pub suffix: &'static str,
}

/// Written after the last record in place of a separator.
pub const RECORD_TERMINATOR: &str = "\n";

const JSON: Framing = Framing {
    prefix: "[\n",
    separator: ",\n",
    suffix: "]",
};

const XML: Framing = Framing {
    prefix: "<?xml version=\"1.0\" ?>\n<sequence_group>\n",
    separator: "\n",
    suffix: "</sequence_group>",
};

const YAML: Framing = Framing {
    prefix: "sequence_group:\n",
    separator: "\n\n",
    suffix: "",
};

/// Framing tokens for `format`.
#[must_use]
pub const fn framing(format: OutputFormat) -> Framing {
    match format {
        OutputFormat::Json => JSON,
        OutputFormat::Xml => XML,
        OutputFormat::Yaml => YAML,
    }
}
