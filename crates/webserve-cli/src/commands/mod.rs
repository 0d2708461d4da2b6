//! Command implementations for the webserve CLI.
//!
//! - [`build`] - one build cycle, then exit
//! - [`serve`] - HTTP server, plus the watcher subprocess in development mode
//! - [`watch`] - the watcher subprocess: rebuilds in a fresh `build` process per change
//!
//! Each command provides an `execute` function that takes the parsed command
//! arguments and returns a Result.

pub mod build;
pub mod serve;
pub(crate) mod utils;
pub mod watch;

pub use build::execute as build_execute;
pub use serve::execute as serve_execute;
pub use watch::execute as watch_execute;
