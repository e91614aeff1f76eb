//! Logging and verbosity control

use std::str::FromStr;

use tracing::Level;

/// Pick the log level from CLI flags and the configured level
///
/// `--quiet` wins over `--verbose`; an unparseable configured level falls
/// back to `WARN`.
pub fn resolve_level(verbose: bool, quiet: bool, configured: &str) -> Level {
    if quiet {
        Level::ERROR
    } else if verbose {
        Level::DEBUG
    } else {
        Level::from_str(configured.trim()).unwrap_or(Level::WARN)
    }
}

/// Install the global subscriber, writing to stderr
pub fn init_logging(verbose: bool, quiet: bool, configured: &str) {
    let level = resolve_level(verbose, quiet, configured);
    let installed = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();

    if installed.is_err() {
        tracing::debug!("Logging already initialised");
    }
}
