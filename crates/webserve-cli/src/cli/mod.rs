//! Command-line interface definition.
//!
//! - `webserve build` - run one build cycle and exit
//! - `webserve serve` - serve the output directory; in development mode also
//!   rebuild on change and live-reload connected browsers
//! - `webserve watch` - (hidden) the rebuild loop spawned by `serve`

mod commands;
mod tests;

use clap::Parser;

pub use commands::{BuildArgs, BuildCommandArgs, Command, ServeArgs, WatchArgs};

/// webserve - build a web bundle and serve it with live reload
#[derive(Parser, Debug)]
#[command(
    name = "webserve",
    version,
    about = "Build a web bundle and serve it with live reload",
    long_about = "webserve bundles a TypeScript/JSX entry point, composes it into an HTML\n\
                  template and serves the result. With ENVIRONMENT=DEVELOPMENT it rebuilds\n\
                  on every source change and reloads connected browsers."
)]
pub struct Cli {
    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}
