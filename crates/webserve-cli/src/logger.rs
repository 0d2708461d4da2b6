//! Logging setup using the `tracing` ecosystem.
//!
//! ```rust,no_run
//! use webserve_cli::logger::init_logger;
//! use tracing::info;
//!
//! init_logger(false, false, false);
//! info!("Listening on http://localhost:8080");
//! ```

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const VERBOSE_FILTER: &str = "webserve=debug,webserve_cli=debug,webserve_bundler=debug";
const QUIET_FILTER: &str = "webserve=error,webserve_cli=error,webserve_bundler=error";
const DEFAULT_FILTER: &str = "webserve=info,webserve_cli=info,webserve_bundler=info";

/// Pick the filter for the given verbosity flags.
///
/// Precedence: `--verbose`, then `--quiet`, then `RUST_LOG`, then info.
pub fn filter_for(verbose: bool, quiet: bool) -> EnvFilter {
    if verbose {
        EnvFilter::new(VERBOSE_FILTER)
    } else if quiet {
        EnvFilter::new(QUIET_FILTER)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
    }
}

/// Initialize the global tracing subscriber. Call once, before any logging.
pub fn init_logger(verbose: bool, quiet: bool, no_color: bool) {
    let fmt_layer = fmt::layer()
        .with_target(false)
        .with_level(true)
        .with_ansi(!no_color)
        .compact();

    tracing_subscriber::registry()
        .with(filter_for(verbose, quiet))
        .with(fmt_layer)
        .init();
}
