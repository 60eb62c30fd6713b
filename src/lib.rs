//! Core library entry for the `goldthread` CLI.
//!
//! Builds a requirement-to-test traceability graph: requirements come from
//! YAML records, tests from annotations embedded in test sources, and every
//! node ends up classified as satisfied or as one kind of orphan.

pub mod adapters;
pub mod audit;
pub mod cli;
pub mod commands;
pub mod config;
pub mod context;
pub mod diagnostics;
pub mod loader;
pub mod logging;
pub mod model;
pub mod ports;
pub mod report;
pub mod scanner;
pub mod trace;

use clap::error::ErrorKind;
use clap::Parser;

pub use commands::Outcome;

/// Run the CLI with the provided arguments.
///
/// `--help` and `--version` print their text and count as success.
///
/// # Errors
///
/// Returns an error string when argument parsing fails or the command could
/// not run.
pub fn run<I, T>(args: I) -> Result<Outcome, String>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let cli = match cli::Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            print!("{err}");
            return Ok(Outcome::Success);
        }
        Err(err) => return Err(err.to_string()),
    };
    logging::init_cli_logging(cli.verbose);
    commands::dispatch(&cli.command)
}
