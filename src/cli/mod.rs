/// CLI layer: argument parsing, output sink, and diagnostics.
pub mod args;
pub mod output;

pub use args::Cli;
pub use output::{DebugTimer, Sink, write_config_error, write_error};
