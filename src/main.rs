#![deny(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
//! enaclient — retrieve ENA sequence metadata through the refget API.

mod cli;
mod config;
mod refget;
mod render;
mod runner;
mod types;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Sink, write_config_error, write_error};
use config::RunConfiguration;
use refget::MetadataClient;
use runner::RunError;

fn main() {
    let cli = Cli::parse();
    init_logging(cli.debug);

    let config = match config::validate(&cli) {
        Ok(config) => config,
        Err(err) => {
            write_config_error(&err);
            std::process::exit(err.exit_code());
        }
    };

    if let Err(err) = execute(&config) {
        write_error(&err);
        std::process::exit(err.exit_code());
    }
}

/// Open the sink, write the whole document, close the sink.
fn execute(config: &RunConfiguration) -> Result<(), RunError> {
    let client = MetadataClient::new(&config.base_url, config.timeout)?;
    let mut sink = Sink::open(&config.sink)?;
    let summary = runner::run(config, &client, &mut sink)?;
    sink.close()?;
    info!(
        records = summary.records,
        timeouts = summary.timeouts,
        format = %config.format,
        "run complete"
    );
    Ok(())
}

/// Logs go to stderr so they never mix with a document on stdout.
/// `RUST_LOG` wins over `--debug`.
fn init_logging(debug: bool) {
    let default = if debug {
        concat!(env!("CARGO_CRATE_NAME"), "=debug")
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
