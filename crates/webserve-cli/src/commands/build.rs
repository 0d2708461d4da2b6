//! Build command implementation.
//!
//! Runs exactly one build cycle. Also the process `watch` spawns per change,
//! in which case the configuration arrives fully serialized through
//! `--envs-json` and the reload signal URL through `--signal-url`.

use webserve_bundler::RolldownBundler;

use crate::build::run_build;
use crate::cli::BuildCommandArgs;
use crate::config::BuildConfig;
use crate::error::Result;
use crate::ui;

/// Execute the build command.
///
/// # Errors
///
/// Returns errors for a missing template or entry, an unwritable output
/// directory, bundler failures and failed writes. The previous outputs are
/// left in place when bundling fails.
pub async fn execute(args: BuildCommandArgs) -> Result<()> {
    let config = BuildConfig::from_build_args(&args)?;

    tracing::debug!(?config, "resolved build configuration");
    if config.development {
        ui::info("Building in development mode");
    }

    let bundler = RolldownBundler::new();
    match run_build(&config, &bundler).await {
        Ok(report) => {
            ui::success(&format!(
                "Build completed in {}",
                ui::format_duration(report.duration)
            ));
            ui::print_build_report(&report);
            Ok(())
        }
        Err(e) => {
            ui::error(&format!("Build failed: {}", e));
            Err(e)
        }
    }
}
