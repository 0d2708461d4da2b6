//! The build orchestrator: one build cycle end to end.
//!
//! ```text
//! template ─┐
//! bundler ──┼─> compose ─> inline (inline mode) ─> write ─> signal (dev)
//! envs ─────┘
//! ```
//!
//! A failing bundle returns before anything is written, so the previous
//! outputs keep being served.

mod output;

use std::path::PathBuf;
use std::time::{Duration, Instant};

use webserve_bundler::Bundler;

use crate::config::BuildConfig;
use crate::dev::send_reload_signal;
use crate::document::{SlotValues, compose, inline_assets};
use crate::error::{BuildError, ConfigError, Result};

pub use output::{WrittenFile, copy_public_tree, write_atomic};

/// File names inside the output directory.
pub const INDEX_FILE: &str = "index.html";
pub const BUNDLE_FILE: &str = "bundle.js";
pub const STYLES_FILE: &str = "styles.css";

/// In-memory result of one successful build cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildOutput {
    pub script: String,
    pub styles: String,
    /// Assets embedded into the document (inline mode only)
    pub assets: Vec<String>,
}

/// What one build cycle did.
#[derive(Debug, Clone, Default)]
pub struct BuildReport {
    pub output: BuildOutput,
    /// Files written to the output directory, in write order
    pub written: Vec<WrittenFile>,
    /// Non-fatal asset problems
    pub asset_warnings: Vec<String>,
    /// Whether the reload signal reached the server
    pub signal_delivered: bool,
    pub duration: Duration,
}

/// Run one build cycle.
pub async fn run_build(config: &BuildConfig, bundler: &dyn Bundler) -> Result<BuildReport> {
    let started = Instant::now();

    let template_path = config.template_path();
    let template = match tokio::fs::read_to_string(&template_path).await {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ConfigError::TemplateNotFound(template_path).into());
        }
        Err(e) => return Err(ConfigError::Io(e).into()),
    };

    let entry = config.entry_path();
    if !entry.is_file() {
        return Err(ConfigError::EntryNotFound(entry).into());
    }

    tokio::fs::create_dir_all(&config.out_dir)
        .await
        .map_err(|_| ConfigError::OutputNotWritable(config.out_dir.clone()))?;

    tracing::info!(entry = %entry.display(), inline = config.inline, "bundling");
    let bundle = bundler
        .bundle(&config.bundle_request())
        .await
        .map_err(BuildError::from)?;

    let slots = SlotValues {
        envs: config.envs.clone(),
        script: bundle.script,
        styles: bundle.styles,
        inline: config.inline,
        development: config.development,
    };
    let mut document = compose(&template, &slots);

    let mut report = BuildReport::default();

    if config.inline {
        let outcome = inline_assets(&document, &config.assets_dir(), &config.public_dir);
        document = outcome.document;
        report.output.assets = outcome.inlined;
        report
            .asset_warnings
            .extend(outcome.errors.iter().map(ToString::to_string));
    }

    for err in copy_public_tree(&config.public_dir, &config.out_dir, &template_path) {
        tracing::warn!("{}", err);
        report.asset_warnings.push(err.to_string());
    }

    let mut writes: Vec<(PathBuf, &[u8])> = Vec::new();
    if !config.inline {
        writes.push((config.out_dir.join(BUNDLE_FILE), slots.script.as_bytes()));
        if !slots.styles.is_empty() {
            writes.push((config.out_dir.join(STYLES_FILE), slots.styles.as_bytes()));
        }
    }
    writes.push((config.out_dir.join(INDEX_FILE), document.as_bytes()));

    // Writes are independent: one failing doesn't stop the others.
    let mut first_error = None;
    for (path, contents) in writes {
        match write_atomic(&path, contents) {
            Ok(written) => report.written.push(written),
            Err(err) => {
                tracing::error!("{}", err);
                first_error.get_or_insert(err);
            }
        }
    }
    if let Some(err) = first_error {
        return Err(err.into());
    }

    report.output.script = slots.script;
    report.output.styles = slots.styles;

    if config.development {
        if let Some(url) = &config.signal_url {
            match send_reload_signal(url).await {
                Ok(()) => report.signal_delivered = true,
                Err(err) => tracing::warn!("Reload signal not delivered: {}", err),
            }
        }
    }

    report.duration = started.elapsed();
    Ok(report)
}
