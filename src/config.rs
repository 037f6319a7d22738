/// Run configuration: built once from CLI input, immutable afterwards.
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

use crate::cli::Cli;

/// Serialization format for the whole output document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Json,
    Xml,
    Yaml,
}

impl OutputFormat {
    /// The literal token accepted on the command line.
    #[must_use]
    pub const fn token(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Xml => "xml",
            Self::Yaml => "yaml",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

impl FromStr for OutputFormat {
    type Err = ConfigError;

    /// Case-sensitive exact match against the format tokens.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "json" => Ok(Self::Json),
            "xml" => Ok(Self::Xml),
            "yaml" => Ok(Self::Yaml),
            other => Err(ConfigError::InvalidOutputFormat {
                value: other.to_owned(),
            }),
        }
    }
}

/// Where identifiers come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSpec {
    /// A single identifier given on the command line.
    Single(String),
    /// A newline-delimited file of identifiers.
    Batch(PathBuf),
}

/// Where the document goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputSink {
    Stdout,
    /// Truncated at run start, then written incrementally.
    File(PathBuf),
}

/// Everything a run needs, validated.
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfiguration {
    pub input: InputSpec,
    pub format: OutputFormat,
    pub sink: OutputSink,
    pub timeout: Duration,
    pub base_url: String,
}

/// Configuration errors, detected before any network activity.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Neither `-s` nor `-i` was given.
    #[error(
        "sequence id/input file not specified. Specify sequence id with -s or input file with -i"
    )]
    MissingIdentifierSource,

    /// Both `-s` and `-i` were given.
    #[error("sequence id and input file are mutually exclusive. Specify only one of -s or -i")]
    AmbiguousIdentifierSource,

    /// The batch input file does not exist.
    #[error("input file not found: {}", path.display())]
    InputFileNotFound {
        /// The path as given.
        path: PathBuf,
    },

    /// The format token is not one of json, xml, yaml.
    #[error("invalid output format '{value}', specify json, xml, or yaml")]
    InvalidOutputFormat {
        /// The rejected token.
        value: String,
    },

    /// The output file's parent directory does not exist.
    #[error("output directory does not exist: {}", path.display())]
    OutputDirectoryMissing {
        /// The missing directory.
        path: PathBuf,
    },

    /// The timeout is zero, negative, or not a finite number.
    #[error("invalid timeout '{value}', specify a positive number of seconds")]
    InvalidTimeout {
        /// The rejected value.
        value: f64,
    },
}

impl ConfigError {
    /// Return the CLI exit code for this error.
    #[must_use]
    #[allow(clippy::unused_self)]
    pub fn exit_code(&self) -> i32 {
        2
    }
}

/// Validate parsed CLI arguments into a `RunConfiguration`.
///
/// Rules are checked in order and the first failure wins: identifier
/// source, input file existence, output format, output directory, timeout.
///
/// # Errors
///
/// Returns the `ConfigError` for the first rule that fails.
pub fn validate(cli: &Cli) -> Result<RunConfiguration, ConfigError> {
    // An empty `-s` value counts as not supplied.
    let sequence_id = cli.sequence_id.as_deref().filter(|id| !id.is_empty());
    let input = match (sequence_id, &cli.input_file) {
        (Some(id), None) => InputSpec::Single(id.to_owned()),
        (None, Some(path)) => InputSpec::Batch(path.clone()),
        (None, None) => return Err(ConfigError::MissingIdentifierSource),
        (Some(_), Some(_)) => return Err(ConfigError::AmbiguousIdentifierSource),
    };

    if let InputSpec::Batch(path) = &input {
        if !path.exists() {
            return Err(ConfigError::InputFileNotFound { path: path.clone() });
        }
    }

    let format = match cli.output_format.as_deref() {
        Some(token) => token.parse()?,
        None => OutputFormat::default(),
    };

    let sink = match &cli.output_file {
        Some(path) => {
            if let Some(dir) = missing_parent(path) {
                return Err(ConfigError::OutputDirectoryMissing {
                    path: dir.to_path_buf(),
                });
            }
            OutputSink::File(path.clone())
        }
        None => OutputSink::Stdout,
    };

    let timeout = Duration::try_from_secs_f64(cli.timeout)
        .ok()
        .filter(|d| !d.is_zero())
        .ok_or(ConfigError::InvalidTimeout { value: cli.timeout })?;

    Ok(RunConfiguration {
        input,
        format,
        sink,
        timeout,
        base_url: cli.base_url.clone(),
    })
}

/// The parent directory of `path` if it is named and absent.
/// An empty parent means the current directory, which always exists.
fn missing_parent(path: &Path) -> Option<&Path> {
    path.parent()
        .filter(|dir| !dir.as_os_str().is_empty() && !dir.exists())
}
