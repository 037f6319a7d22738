/// CLI argument definitions via clap derive.
use std::path::PathBuf;

use clap::Parser;

use crate::refget::DEFAULT_BASE_URL;

/// Request timeout used when `--timeout` is not given.
pub const DEFAULT_TIMEOUT_SECS: f64 = 10.0;

/// enaclient — retrieve ENA sequence metadata through the refget API.
///
/// Format and output checks happen in `config::validate` rather than in
/// clap, so that configuration errors are reported in a fixed order.
#[derive(Debug, Parser)]
#[command(
    name = "enaclient",
    about = "Retrieve ENA sequence metadata through the refget API as JSON, XML, or YAML",
    version
)]
pub struct Cli {
    /// Sequence id, e.g. an md5 checksum (not compatible with -i).
    #[arg(
        short = 's',
        long = "sequence_id",
        value_name = "ID",
        conflicts_with = "input_file"
    )]
    pub sequence_id: Option<String>,

    /// File containing one sequence id per line (not compatible with -s).
    #[arg(short = 'i', long = "input_file", value_name = "PATH")]
    pub input_file: Option<PathBuf>,

    /// Output format: json, xml, or yaml (default: json).
    #[arg(short = 'f', long = "output_format", value_name = "FORMAT")]
    pub output_format: Option<String>,

    /// Path to output file (default: stdout).
    #[arg(short = 'o', long = "output_file", value_name = "PATH")]
    pub output_file: Option<PathBuf>,

    /// Per-request timeout in seconds.
    #[arg(short = 't', long, value_name = "SECS", default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout: f64,

    /// Base URL of the refget API.
    #[arg(
        long,
        value_name = "URL",
        env = "ENACLIENT_BASE_URL",
        default_value = DEFAULT_BASE_URL
    )]
    pub base_url: String,

    /// Log requests and timings to stderr.
    #[arg(long)]
    pub debug: bool,
}
