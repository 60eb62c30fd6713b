//! Logging setup for the command-line binary.

use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Maps `-v` occurrences to a default level.
#[must_use]
pub fn level_for(verbosity: u8) -> Level {
    match verbosity {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

/// Installs a stderr subscriber so stdout stays machine-readable.
///
/// `RUST_LOG` directives take precedence over the verbosity default. Calling
/// this again after a subscriber is installed is a no-op.
pub fn init_cli_logging(verbosity: u8) {
    let filter = EnvFilter::builder()
        .with_default_directive(level_for(verbosity).into())
        .from_env_lossy();
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
