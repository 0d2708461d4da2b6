//! Conversion of CLI errors into miette reports for terminal rendering.

use miette::Report;

use crate::error::{BuildError, CliError};

/// Convert a [`CliError`] into a miette [`Report`].
pub fn cli_error_to_miette(err: CliError) -> Report {
    match err {
        CliError::Build(e) => build_error_to_miette(e),
        CliError::Config(e) => miette::miette!("Configuration error: {}", e),
        _ => miette::miette!("{}", err),
    }
}

/// Convert a [`BuildError`] into a miette [`Report`].
pub fn build_error_to_miette(err: BuildError) -> Report {
    match err {
        BuildError::Bundle(webserve_bundler::Error::EntryNotFound(path)) => miette::miette!(
            "Entry point not found: {}\n\nHint: Check the 'entry' field or --entry argument",
            path.display()
        ),
        BuildError::Bundle(webserve_bundler::Error::Bundler(diagnostics)) => {
            miette::miette!("Bundling failed:\n{}", diagnostics)
        }
        _ => miette::miette!("{}", err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_bundler_diagnostics_are_kept() {
        let err = BuildError::Bundle(webserve_bundler::Error::Bundler("bad import".into()));
        let report = build_error_to_miette(err);
        assert!(report.to_string().contains("bad import"));
    }

    #[test]
    fn test_entry_not_found_hint() {
        let err = CliError::Build(BuildError::Bundle(webserve_bundler::Error::EntryNotFound(
            PathBuf::from("src/main.tsx"),
        )));
        let report = cli_error_to_miette(err);
        assert!(report.to_string().contains("src/main.tsx"));
    }
}
