//! Logging setup on top of `tracing-subscriber`.
//!
//! All log output goes to stderr so that stdout stays reserved for command
//! output (keys, JSON documents, run listings).

use std::io;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Default filter directive for a verbosity level.
#[must_use]
pub fn default_directive(verbose: u8, quiet: bool) -> &'static str {
    if quiet {
        return "error";
    }
    match verbose {
        0 => "warn,reportpub=info",
        1 => "info,reportpub=debug",
        _ => "debug,reportpub=trace",
    }
}

/// Initialize the global subscriber.
///
/// `RUST_LOG` takes precedence over the verbosity flags when set.
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed.
pub fn init_logging(
    verbose: u8,
    quiet: bool,
    json: bool,
) -> Result<(), tracing_subscriber::util::TryInitError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose, quiet)));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(io::stderr),
            )
            .try_init()
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(verbose > 0)
                    .with_writer(io::stderr),
            )
            .try_init()
    }
}

/// Install a test-friendly subscriber once; later calls are no-ops.
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
        )
        .with_test_writer()
        .try_init();
}
