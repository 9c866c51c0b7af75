//! Log output for the sixer binary.
//!
//! The library logs through the `log` facade. The binary installs a
//! `tracing-subscriber` formatter on standard error, which also bridges
//! `log` records, filtered by the `-v`/`-q` flags or by [`LOG_ENV`].

use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

/// Environment variable holding filter directives, like `sixer=trace`.
///
/// When set it replaces the level chosen on the command line.
pub const LOG_ENV: &str = "SIXER_LOG";

/// Map `-v` count and `-q` to a level filter.
///
/// ```
/// use sixer::logging::level_for;
/// use tracing_subscriber::filter::LevelFilter;
///
/// assert_eq!(level_for(0, false), LevelFilter::INFO);
/// assert_eq!(level_for(1, false), LevelFilter::DEBUG);
/// assert_eq!(level_for(3, false), LevelFilter::TRACE);
/// assert_eq!(level_for(0, true), LevelFilter::ERROR);
/// ```
#[must_use]
pub fn level_for(verbosity: u8, quiet: bool) -> LevelFilter {
    if quiet {
        return LevelFilter::ERROR;
    }
    match verbosity {
        0 => LevelFilter::INFO,
        1 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    }
}

/// Build the filter: [`LOG_ENV`] directives if set, `level` otherwise.
#[must_use]
pub fn env_filter(level: LevelFilter) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(level.into())
        .with_env_var(LOG_ENV)
        .from_env_lossy()
}

/// Install the global subscriber writing to standard error.
///
/// # Errors
///
/// Returns an error if a global subscriber or `log` bridge is already
/// installed.
pub fn init(level: LevelFilter) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(level))
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
}
