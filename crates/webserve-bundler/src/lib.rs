//! webserve-bundler - the bundling boundary of webserve.
//!
//! Everything webserve knows about turning a source tree into script and
//! stylesheet text lives behind the [`Bundler`] trait. The orchestrator in
//! `webserve-cli` only ever sees a [`BundleRequest`] going in and a
//! [`BundleOutput`] (or an [`Error`]) coming out.
//!
//! The production implementation is [`RolldownBundler`], which drives Rolldown
//! with the webserve plugin chain:
//!
//! - [`plugins::CssModulesPlugin`] - compiles `.css` / `.module.css` with
//!   lightningcss and captures the CSS instead of emitting a file
//! - [`plugins::SvgComponentPlugin`] - turns `.svg` imports into components
//! - [`plugins::ExternalGlobalPlugin`] - rewrites configured externals to
//!   `window.<global>` references
//! - any [`NamedPlugin`] selected by name in the configuration
//!
//! # Example
//!
//! ```rust,no_run
//! use webserve_bundler::{BundleRequest, Bundler, RolldownBundler};
//!
//! # async fn run() -> webserve_bundler::Result<()> {
//! let request = BundleRequest::new("/project/src/main.tsx", "/project")
//!     .minify(true)
//!     .externals(["react", "react-dom"]);
//!
//! let output = RolldownBundler::new().bundle(&request).await?;
//! println!("{} bytes of script", output.script.len());
//! # Ok(()) }
//! ```

use std::path::PathBuf;

use async_trait::async_trait;

pub mod plugins;
mod rolldown;

pub use plugins::NamedPlugin;
pub use rolldown::RolldownBundler;

/// Error types for bundling operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Error reported by Rolldown (syntax, resolution, plugin failure).
    #[error("Rolldown bundler error: {0}")]
    Bundler(String),

    /// Entry file does not exist.
    #[error("Entry point not found: {}", .0.display())]
    EntryNotFound(PathBuf),
}

impl Error {
    /// Wrap a batched Rolldown diagnostic.
    pub fn from_rolldown_batch(error: &dyn std::fmt::Debug) -> Self {
        Error::Bundler(format!("{:?}", error))
    }
}

/// Result type for bundling operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Everything a bundler needs for one run.
///
/// A bundle is always produced in memory (`bundle = true`, `write = false`):
/// implementations never write to the output directory themselves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleRequest {
    /// Absolute path of the entry module
    pub entry: PathBuf,
    /// Directory used for module resolution
    pub cwd: PathBuf,
    /// Minify script and captured CSS
    pub minify: bool,
    /// Module names mapped to `window` globals instead of being bundled
    pub externals: Vec<String>,
    /// Optional plugins, in activation order
    pub plugins: Vec<NamedPlugin>,
}

impl BundleRequest {
    /// Create a request for `entry`, resolving modules from `cwd`.
    pub fn new(entry: impl Into<PathBuf>, cwd: impl Into<PathBuf>) -> Self {
        Self {
            entry: entry.into(),
            cwd: cwd.into(),
            minify: false,
            externals: Vec::new(),
            plugins: Vec::new(),
        }
    }

    /// Enable or disable minification.
    pub fn minify(mut self, enabled: bool) -> Self {
        self.minify = enabled;
        self
    }

    /// Set the external module names.
    pub fn externals<I, S>(mut self, externals: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.externals = externals.into_iter().map(Into::into).collect();
        self
    }

    /// Set the optional plugins.
    pub fn plugins(mut self, plugins: impl IntoIterator<Item = NamedPlugin>) -> Self {
        self.plugins = plugins.into_iter().collect();
        self
    }
}

/// In-memory result of a successful bundle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BundleOutput {
    /// Bundled script text
    pub script: String,
    /// Concatenated stylesheet text, empty when no CSS was imported
    pub styles: String,
}

/// The bundling step, treated as a black box by the orchestrator.
#[async_trait]
pub trait Bundler: Send + Sync {
    /// Bundle `request.entry` and everything it imports.
    async fn bundle(&self, request: &BundleRequest) -> Result<BundleOutput>;
}
