//! Watcher subprocess.
//!
//! Performs an initial build, then waits for source changes and runs a fresh
//! `build` subprocess per debounced batch. Builds never overlap: the next
//! batch is only awaited once the previous child has exited.

use std::time::Duration;

use tokio::signal;

use crate::cli::WatchArgs;
use crate::commands::utils::spawn_self;
use crate::config::BuildConfig;
use crate::dev::{FileWatcher, next_batch};
use crate::error::Result;
use crate::ui;

/// Same-path events inside this window are dropped by the watcher.
const DEBOUNCE: Duration = Duration::from_millis(100);

/// A batch ends once no change arrived for this long.
const QUIET_PERIOD: Duration = Duration::from_millis(150);

/// Execute the hidden watch command.
pub async fn execute(args: WatchArgs) -> Result<()> {
    let config = BuildConfig::from_watch_args(&args)?;
    let build_args = config.to_args();

    rebuild(&build_args).await;

    let (watcher, mut changes) = FileWatcher::new(
        vec![config.src_dir.clone(), config.public_dir.clone()],
        vec![config.out_dir.clone()],
        DEBOUNCE,
    )?;

    for root in watcher.roots() {
        ui::info(&format!("Watching for changes in: {}", root.display()));
    }

    loop {
        tokio::select! {
            batch = next_batch(&mut changes, QUIET_PERIOD) => {
                let Some(batch) = batch else { break };
                for change in &batch {
                    tracing::debug!(?change, "source change");
                }
                ui::info(&format!(
                    "File changed: {}{}",
                    batch[0].path().display(),
                    if batch.len() > 1 {
                        format!(" (+{} more)", batch.len() - 1)
                    } else {
                        String::new()
                    }
                ));
                rebuild(&build_args).await;
            }
            _ = signal::ctrl_c() => break,
        }
    }

    Ok(())
}

/// Run one `build` subprocess to completion. Failures are reported and
/// swallowed; the last good output keeps being served.
async fn rebuild(build_args: &[String]) {
    let mut child = match spawn_self("build", build_args) {
        Ok(child) => child,
        Err(e) => {
            ui::error(&format!("{}", e));
            return;
        }
    };

    match child.wait().await {
        Ok(status) if status.success() => {}
        Ok(status) => ui::warning(&format!(
            "Build exited with {}; keeping the previous output",
            status
        )),
        Err(e) => ui::warning(&format!("Failed to wait for build: {}", e)),
    }
}
