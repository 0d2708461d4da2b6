//! Error types for webserve.
//!
//! The hierarchy mirrors how failures are handled at runtime:
//!
//! - [`CliError`] is what a command returns. Anything reaching it ends the
//!   current command.
//! - [`ConfigError`] is fatal to the process that hits it (missing template,
//!   missing entry, unwritable output root, bad config file).
//! - [`BuildError`] ends one build cycle. The server keeps serving the last
//!   good output.
//! - [`AssetError`] is per asset. It is logged and recorded in the
//!   [`BuildReport`](crate::build::BuildReport), never propagated.
//! - [`SignalError`] is a failed reload callback. It is logged as a warning.
//!
//! A WebSocket send that fails is not an error at all: the registry treats the
//! connection as closed and prunes it.

mod report;

use std::path::PathBuf;
use thiserror::Error;

pub use report::{build_error_to_miette, cli_error_to_miette};

/// Top-level CLI error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A build cycle failed
    #[error("Build error: {0}")]
    Build(#[from] BuildError),

    /// Invalid command-line arguments or options
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// I/O errors from file system operations
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Development server errors
    #[error("Server error: {0}")]
    Server(String),

    /// File watching errors
    #[error("File watcher error: {0}")]
    Watch(#[from] notify::Error),

    /// Generic errors with custom messages
    #[error("{0}")]
    Custom(String),
}

/// Configuration errors. Fatal to the process that encounters them.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// HTML template is missing from the public root
    #[error("HTML template not found: {}\n\nHint: Create the template in the public directory or pass --public <dir>", .0.display())]
    TemplateNotFound(PathBuf),

    /// Entry file is missing from the source root
    #[error("Entry point not found: {}\n\nHint: Check the 'entry' field in webserve.config.json or the --entry argument", .0.display())]
    EntryNotFound(PathBuf),

    /// Output root cannot be created or written
    #[error("Output directory is not writable: {}\n\nHint: Check directory permissions or pass a different --out", .0.display())]
    OutputNotWritable(PathBuf),

    /// Layered configuration could not be extracted
    #[error("Failed to load configuration: {0}\n\nHint: Check webserve.config.json and WEBSERVE_* environment variables")]
    Load(String),

    /// Invalid value for a configuration option
    #[error("Invalid value for '{field}': {value}\n\nHint: {hint}")]
    InvalidValue {
        /// Name of the field with invalid value
        field: String,
        /// The invalid value
        value: String,
        /// Helpful hint for correct values
        hint: String,
    },

    /// I/O error while reading configuration input
    #[error("Failed to read configuration: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        ConfigError::Load(err.to_string())
    }
}

/// Failure of one build cycle.
#[derive(Debug, Error)]
pub enum BuildError {
    /// The bundling step failed (syntax, resolution, plugin)
    #[error("Bundling failed: {0}")]
    Bundle(#[from] webserve_bundler::Error),

    /// Writing an output file failed
    #[error("Failed to write {}: {source}\n\nHint: Check output directory permissions", .path.display())]
    WriteFailed {
        /// File that could not be written
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

/// Failure to process one asset. Never fatal.
#[derive(Debug, Error)]
pub enum AssetError {
    /// Asset could not be read
    #[error("Failed to read asset {}: {source}", .path.display())]
    Read {
        /// Asset path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// JSON asset does not parse
    #[error("Invalid JSON in asset {}: {source}", .path.display())]
    InvalidJson {
        /// Asset path
        path: PathBuf,
        /// Parse error
        #[source]
        source: serde_json::Error,
    },

    /// Copying a public file to the output root failed
    #[error("Failed to copy {}: {source}", .path.display())]
    Copy {
        /// Source path of the copy
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

/// Failure to deliver the reload callback to the dev server.
#[derive(Debug, Error)]
pub enum SignalError {
    /// Connection refused, timeout, DNS...
    #[error("Failed to reach {url}: {source}")]
    Request {
        /// Signal endpoint
        url: String,
        /// Underlying HTTP client error
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with a non-success status
    #[error("{url} answered with status {status}")]
    Status {
        /// Signal endpoint
        url: String,
        /// HTTP status code
        status: u16,
    },
}

/// Result type alias using `CliError` as the default error type.
pub type Result<T, E = CliError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_template_not_found() {
        let err = ConfigError::TemplateNotFound(PathBuf::from("public/index.html"));
        let msg = err.to_string();
        assert!(msg.contains("HTML template not found"));
        assert!(msg.contains("public/index.html"));
        assert!(msg.contains("Hint:"));
    }

    #[test]
    fn test_build_error_from_bundler_error() {
        let err: BuildError = webserve_bundler::Error::Bundler("unexpected token".into()).into();
        assert!(matches!(err, BuildError::Bundle(_)));
        assert!(err.to_string().contains("unexpected token"));
    }

    #[test]
    fn test_build_error_write_failed() {
        let err = BuildError::WriteFailed {
            path: PathBuf::from("build/index.html"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        let msg = err.to_string();
        assert!(msg.contains("build/index.html"));
        assert!(msg.contains("denied"));
    }

    #[test]
    fn test_asset_error_messages() {
        let err = AssetError::InvalidJson {
            path: PathBuf::from("assets/data.json"),
            source: serde_json::from_str::<serde_json::Value>("{").unwrap_err(),
        };
        assert!(err.to_string().contains("assets/data.json"));
    }

    #[test]
    fn test_signal_error_status() {
        let err = SignalError::Status {
            url: "http://localhost:8080/_bundler".to_string(),
            status: 404,
        };
        assert_eq!(
            err.to_string(),
            "http://localhost:8080/_bundler answered with status 404"
        );
    }

    #[test]
    fn test_cli_error_conversions() {
        let cli_err: CliError = ConfigError::EntryNotFound(PathBuf::from("src/main.tsx")).into();
        assert!(matches!(cli_err, CliError::Config(_)));

        let cli_err: CliError = BuildError::WriteFailed {
            path: PathBuf::from("build/index.html"),
            source: std::io::Error::other("boom"),
        }
        .into();
        assert!(matches!(cli_err, CliError::Build(_)));

        let cli_err: CliError = std::io::Error::other("boom").into();
        assert!(matches!(cli_err, CliError::Io(_)));
    }
}
