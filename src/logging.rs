//! Logging initialization
//!
//! Diagnostics go to stderr so stdout stays clean for CSV and JSON output.
//! `RUST_LOG` always wins; otherwise the configured filter is used, falling
//! back to a level chosen by `-q` / `-v`.

use tracing_subscriber::{fmt, EnvFilter};

/// Default filter for a verbosity setting
pub fn default_filter(quiet: bool, verbose: bool) -> &'static str {
    if quiet {
        "error"
    } else if verbose {
        "info"
    } else {
        "warn"
    }
}

/// Build the filter: `RUST_LOG`, then `configured`, then the verbosity default
pub fn build_filter(configured: Option<&str>, quiet: bool, verbose: bool) -> EnvFilter {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }
    configured
        .and_then(|directive| EnvFilter::try_new(directive).ok())
        .unwrap_or_else(|| EnvFilter::new(default_filter(quiet, verbose)))
}

/// Install the global subscriber
///
/// Safe to call more than once; later calls are ignored.
pub fn init(configured: Option<&str>, quiet: bool, verbose: bool) {
    let _ = fmt()
        .with_env_filter(build_filter(configured, quiet, verbose))
        .with_writer(std::io::stderr)
        .with_target(verbose)
        .without_time()
        .try_init();
}

/// Subscriber for tests, captured by the test harness
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}
