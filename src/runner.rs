/// Run controller: iterate identifiers, fetch, format, frame, emit.
///
/// Requests are issued one at a time in input order and each record is
/// written before the next request starts, so output order always matches
/// input order.
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};

use thiserror::Error;
use tracing::debug;

use crate::cli::DebugTimer;
use crate::config::{InputSpec, OutputFormat, RunConfiguration};
use crate::refget::{FetchError, MetadataSource};
use crate::render::{Framing, RECORD_TERMINATOR, RenderError, format_record, framing};

/// Errors that abort a run after validation succeeded.
#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl RunError {
    /// Return the CLI exit code for this error.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Fetch(err) => err.exit_code(),
            Self::Render(_) | Self::Io(_) => 1,
        }
    }
}

/// Counts reported once the document is complete.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Records written.
    pub records: usize,
    /// Records that are timeout placeholders.
    pub timeouts: usize,
}

/// Write one complete document for `config` to `out`.
///
/// # Errors
///
/// Returns `RunError` if a fetch fails for a reason other than a timeout,
/// if a record cannot be rendered, or on I/O failure.
pub fn run<S, W>(config: &RunConfiguration, source: &S, out: &mut W) -> Result<RunSummary, RunError>
where
    S: MetadataSource + ?Sized,
    W: Write,
{
    let mut emitter = Emitter {
        source,
        format: config.format,
        framing: framing(config.format),
        out,
        summary: RunSummary::default(),
    };

    emitter.write(emitter.framing.prefix)?;

    match &config.input {
        InputSpec::Single(id) => emitter.record(id, true)?,
        InputSpec::Batch(path) => {
            let reader = BufReader::new(File::open(path)?);
            let mut lines = reader.lines().peekable();
            while let Some(line) = lines.next() {
                let line = line?;
                let is_last = lines.peek().is_none();
                emitter.record(line.trim_end(), is_last)?;
            }
        }
    }

    emitter.write(emitter.framing.suffix)?;
    Ok(emitter.summary)
}

struct Emitter<'a, S: ?Sized, W> {
    source: &'a S,
    format: OutputFormat,
    framing: Framing,
    out: &'a mut W,
    summary: RunSummary,
}

impl<S: MetadataSource + ?Sized, W: Write> Emitter<'_, S, W> {
    /// Fetch, format, and write one record followed by its separator, or by
    /// the record terminator if it is the last one.
    fn record(&mut self, id: &str, is_last: bool) -> Result<(), RunError> {
        let index = self.summary.records;
        debug!(index, id, "fetching");

        let record = {
            let _t = DebugTimer::new("fetch", id);
            self.source.fetch(id)?
        };
        if record.is_timeout() {
            self.summary.timeouts += 1;
        }
        debug!(index, id = record.requested_id(), fields = record.fields().len(), "record ready");

        let block = format_record(&record, index, self.format)?;
        self.write(&block)?;
        self.write(if is_last {
            RECORD_TERMINATOR
        } else {
            self.framing.separator
        })?;
        self.summary.records += 1;
        Ok(())
    }

    fn write(&mut self, text: &str) -> io::Result<()> {
        self.out.write_all(text.as_bytes())?;
        self.out.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Sink;
    use crate::config::OutputSink;
    use crate::types::ResponseRecord;
    use serde_json::{Map, Value, json};
    use std::cell::RefCell;
    use std::path::PathBuf;
    use std::time::Duration;

    /// Answers every request from a canned payload and remembers the order.
    #[derive(Default)]
    struct StubSource {
        calls: RefCell<Vec<String>>,
        timeouts: Vec<&'static str>,
        failures: Vec<&'static str>,
    }

    impl MetadataSource for StubSource {
        fn fetch(&self, id: &str) -> Result<ResponseRecord, FetchError> {
            self.calls.borrow_mut().push(id.to_owned());
            if self.timeouts.iter().any(|t| *t == id) {
                return Ok(ResponseRecord::timeout(id));
            }
            if self.failures.iter().any(|f| *f == id) {
                return Err(FetchError::UnexpectedPayload {
                    id: id.to_owned(),
                    kind: "array",
                });
            }
            let mut record = ResponseRecord::with_status(id, 200);
            record.merge(
                json!({"metadata": {"id": id, "length": 42}})
                    .as_object()
                    .cloned()
                    .unwrap(),
            );
            Ok(record)
        }
    }

    fn config(input: InputSpec, format: OutputFormat) -> RunConfiguration {
        RunConfiguration {
            input,
            format,
            sink: OutputSink::Stdout,
            timeout: Duration::from_secs(10),
            base_url: String::new(),
        }
    }

    fn batch_file(contents: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ids.txt");
        std::fs::write(&path, contents).unwrap();
        (dir, path)
    }

    fn run_to_string(config: &RunConfiguration, source: &StubSource) -> (String, RunSummary) {
        let mut out = Vec::new();
        let summary = run(config, source, &mut out).unwrap();
        (String::from_utf8(out).unwrap(), summary)
    }

    #[test]
    fn test_single_json_is_array_of_one() {
        let source = StubSource::default();
        let (text, summary) = run_to_string(
            &config(InputSpec::Single("abc".into()), OutputFormat::Json),
            &source,
        );

        let doc: Vec<Map<String, Value>> = serde_json::from_str(&text).unwrap();
        assert_eq!(doc.len(), 1);
        assert_eq!(doc[0]["requested_id"], json!("abc"));
        assert_eq!(doc[0]["status_code"], json!(200));
        assert_eq!(doc[0]["metadata"]["length"], json!(42));
        assert!(text.starts_with("[\n    {\n"));
        assert!(text.ends_with("    }\n]"));
        assert_eq!(summary.records, 1);
    }

    #[test]
    fn test_batch_preserves_input_order() {
        let (_dir, path) = batch_file("c\na\nb\n");
        let source = StubSource::default();
        let (text, summary) =
            run_to_string(&config(InputSpec::Batch(path), OutputFormat::Json), &source);

        let doc: Vec<Map<String, Value>> = serde_json::from_str(&text).unwrap();
        let ids: Vec<&str> = doc.iter().map(|r| r["requested_id"].as_str().unwrap()).collect();
        assert_eq!(ids, ["c", "a", "b"]);
        assert_eq!(*source.calls.borrow(), ["c", "a", "b"]);
        assert_eq!(text.matches("    },\n").count(), 2);
        assert_eq!(summary.records, 3);
    }

    #[test]
    fn test_batch_without_trailing_newline() {
        let (_dir, path) = batch_file("a\nb");
        let source = StubSource::default();
        let (text, _) = run_to_string(&config(InputSpec::Batch(path), OutputFormat::Json), &source);
        let doc: Vec<Value> = serde_json::from_str(&text).unwrap();
        assert_eq!(doc.len(), 2);
    }

    #[test]
    fn test_batch_strips_trailing_whitespace_and_keeps_blank_lines() {
        let (_dir, path) = batch_file("a  \r\n\nb\t\n");
        let source = StubSource::default();
        run_to_string(&config(InputSpec::Batch(path), OutputFormat::Json), &source);
        assert_eq!(*source.calls.borrow(), ["a", "", "b"]);
    }

    #[test]
    fn test_empty_batch_is_empty_array() {
        let (_dir, path) = batch_file("");
        let source = StubSource::default();
        let (text, summary) =
            run_to_string(&config(InputSpec::Batch(path), OutputFormat::Json), &source);
        assert_eq!(text, "[\n]");
        let doc: Vec<Value> = serde_json::from_str(&text).unwrap();
        assert!(doc.is_empty());
        assert_eq!(summary.records, 0);
    }

    #[test]
    fn test_timeout_does_not_abort_batch() {
        let (_dir, path) = batch_file("a\nslow\nb\n");
        let source = StubSource {
            timeouts: vec!["slow"],
            ..StubSource::default()
        };
        let (text, summary) =
            run_to_string(&config(InputSpec::Batch(path), OutputFormat::Json), &source);

        let doc: Vec<Map<String, Value>> = serde_json::from_str(&text).unwrap();
        assert_eq!(doc.len(), 3);
        assert_eq!(doc[1]["status_code"], json!("408"));
        assert_eq!(doc[1]["error"], json!("connection timeout"));
        assert!(doc[1].get("metadata").is_none());
        assert_eq!(summary.timeouts, 1);
    }

    #[test]
    fn test_fetch_failure_aborts_run() {
        let (_dir, path) = batch_file("a\nbad\nb\n");
        let source = StubSource {
            failures: vec!["bad"],
            ..StubSource::default()
        };
        let mut out = Vec::new();
        let result = run(&config(InputSpec::Batch(path), OutputFormat::Json), &source, &mut out);
        assert!(matches!(result, Err(RunError::Fetch(_))));
        assert_eq!(*source.calls.borrow(), ["a", "bad"]);
    }

    #[test]
    fn test_xml_batch_document() {
        let (_dir, path) = batch_file("a\nb\n");
        let source = StubSource::default();
        let (text, _) = run_to_string(&config(InputSpec::Batch(path), OutputFormat::Xml), &source);

        assert!(text.starts_with("<?xml version=\"1.0\" ?>\n<sequence_group>\n    <sequence>\n"));
        assert!(text.ends_with("    </sequence>\n</sequence_group>"));
        assert_eq!(text.matches("<?xml").count(), 1);
        assert_eq!(text.matches("    </sequence>\n    <sequence>").count(), 1);
        assert!(text.contains("        <requested_id>a</requested_id>\n"));
        assert!(text.contains("            <length>42</length>\n"));
    }

    #[test]
    fn test_yaml_batch_document() {
        let (_dir, path) = batch_file("a\nb\n");
        let source = StubSource::default();
        let (text, _) = run_to_string(&config(InputSpec::Batch(path), OutputFormat::Yaml), &source);

        assert!(text.starts_with("sequence_group:\n    sequence_0:\n"));
        assert_eq!(text.matches("\n\n").count(), 1);
        let doc: serde_yaml::Value = serde_yaml::from_str(&text).unwrap();
        let group = &doc["sequence_group"];
        assert_eq!(group["sequence_0"]["requested_id"].as_str(), Some("a"));
        assert_eq!(group["sequence_1"]["requested_id"].as_str(), Some("b"));
        assert_eq!(group["sequence_1"]["metadata"]["length"].as_u64(), Some(42));
    }

    #[test]
    fn test_json_and_yaml_documents_agree() {
        let (_dir, path) = batch_file("a\nslow\n");
        let source = StubSource {
            timeouts: vec!["slow"],
            ..StubSource::default()
        };
        let (json_text, _) = run_to_string(
            &config(InputSpec::Batch(path.clone()), OutputFormat::Json),
            &source,
        );
        let (yaml_text, _) =
            run_to_string(&config(InputSpec::Batch(path), OutputFormat::Yaml), &source);

        let from_json: Vec<Value> = serde_json::from_str(&json_text).unwrap();
        let from_yaml: serde_yaml::Value = serde_yaml::from_str(&yaml_text).unwrap();
        for (i, record) in from_json.iter().enumerate() {
            let entry = &from_yaml["sequence_group"][format!("sequence_{i}").as_str()];
            let entry: Value = serde_yaml::from_value(entry.clone()).unwrap();
            assert_eq!(&entry, record);
        }
    }

    #[test]
    fn test_missing_batch_file_is_io_error() {
        let source = StubSource::default();
        let mut out = Vec::new();
        let result = run(
            &config(InputSpec::Batch("/no/such/ids.txt".into()), OutputFormat::Json),
            &source,
            &mut out,
        );
        assert!(matches!(result, Err(RunError::Io(_))));
        assert!(source.calls.borrow().is_empty());
    }

    #[test]
    fn test_timeout_run_completes_file_sink() {
        let (dir, path) = batch_file("a\nslow\n");
        let out_path = dir.path().join("out.json");
        std::fs::write(&out_path, "stale").unwrap();
        let source = StubSource {
            timeouts: vec!["a", "slow"],
            ..StubSource::default()
        };
        let mut config = config(InputSpec::Batch(path), OutputFormat::Json);
        config.sink = OutputSink::File(out_path.clone());

        let mut sink = Sink::open(&config.sink).unwrap();
        let summary = run(&config, &source, &mut sink).unwrap();
        sink.close().unwrap();

        assert_eq!(summary.timeouts, 2);
        let text = std::fs::read_to_string(&out_path).unwrap();
        assert!(text.ends_with("    }\n]"));
        let doc: Vec<Map<String, Value>> = serde_json::from_str(&text).unwrap();
        assert_eq!(doc.len(), 2);
        for record in &doc {
            assert_eq!(record["status_code"], json!("408"));
            assert_eq!(record["error"], json!("connection timeout"));
        }
    }
}
