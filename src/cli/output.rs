/// Output sink, diagnostics on stderr, and the debug timer.
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::time::Instant;

use clap::CommandFactory;
use tracing::debug;

use super::args::Cli;
use crate::config::{ConfigError, OutputSink};

/// The document destination: stdout or a freshly truncated file.
pub enum Sink {
    Stdout(io::StdoutLock<'static>),
    File(BufWriter<File>),
}

impl Sink {
    /// Open the sink. A file sink is created, or truncated if it exists.
    ///
    /// # Errors
    ///
    /// Returns the I/O error from creating the file.
    pub fn open(spec: &OutputSink) -> io::Result<Self> {
        match spec {
            OutputSink::Stdout => Ok(Self::Stdout(io::stdout().lock())),
            OutputSink::File(path) => Ok(Self::File(BufWriter::new(File::create(path)?))),
        }
    }

    /// Flush and release the sink.
    ///
    /// # Errors
    ///
    /// Returns the I/O error from the final flush.
    pub fn close(mut self) -> io::Result<()> {
        self.flush()
    }
}

impl Write for Sink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Self::Stdout(out) => out.write(buf),
            Self::File(out) => out.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Self::Stdout(out) => out.flush(),
            Self::File(out) => out.flush(),
        }
    }
}

// --- Error output ---

/// Write a configuration error followed by the full help text to stderr.
pub fn write_config_error(err: &ConfigError) {
    let help = Cli::command().render_help();
    let stderr = io::stderr();
    let mut out = stderr.lock();
    let _ = writeln!(out, "Error: {err}\n");
    let _ = write!(out, "{help}");
}

/// Write a run error to stderr.
pub fn write_error(err: &dyn std::error::Error) {
    eprintln!("Error: {err}");
}

// --- Debug timer ---

/// A RAII timer that logs elapsed milliseconds at debug level on drop.
pub struct DebugTimer {
    label: &'static str,
    subject: String,
    start: Instant,
}

impl DebugTimer {
    /// Start timing `label` for `subject`.
    #[must_use]
    pub fn new(label: &'static str, subject: &str) -> Self {
        Self {
            label,
            subject: subject.to_owned(),
            start: Instant::now(),
        }
    }
}

impl Drop for DebugTimer {
    fn drop(&mut self) {
        let ms = self.start.elapsed().as_secs_f64() * 1000.0;
        debug!(
            label = self.label,
            subject = %self.subject,
            elapsed_ms = ms,
            "timing"
        );
    }
}
