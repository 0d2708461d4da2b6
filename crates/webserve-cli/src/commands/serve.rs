//! Serve command implementation.
//!
//! In development mode this also:
//! - spawns the `watch` subprocess, which rebuilds and calls back into the
//!   signal route after every successful build
//! - opens a browser after a short delay, unless a client connected first

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::signal;

use crate::cli::ServeArgs;
use crate::commands::utils::{open_browser, spawn_self};
use crate::config::ServeConfig;
use crate::dev::{ConnectionRegistry, DevServer, DevServerState, SharedRegistry};
use crate::error::{ConfigError, Result};
use crate::ui;

/// Grace period before the browser auto-open.
const OPEN_DELAY: Duration = Duration::from_millis(1000);

/// Execute the serve command.
pub async fn execute(args: ServeArgs) -> Result<()> {
    let config = ServeConfig::from_args(&args)?;
    let build = &config.build;

    std::fs::create_dir_all(&build.out_dir)
        .map_err(|_| ConfigError::OutputNotWritable(build.out_dir.clone()))?;

    let state = Arc::new(DevServerState::new(&build.out_dir, build.development));
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let server = DevServer::bind(addr, Arc::clone(&state)).await?;

    ui::success(&format!(
        "Serving {} at {}",
        build.out_dir.display(),
        config.server_url()
    ));

    let mut watcher = None;
    if build.development {
        let mut child_config = build.clone();
        child_config.signal_url = Some(config.signal_url());
        watcher = Some(spawn_self("watch", &child_config.to_args())?);

        if config.open {
            schedule_open(Arc::clone(&state.registry), config.server_url());
        }
    }

    ui::info("Press Ctrl+C to stop");

    let outcome = tokio::select! {
        result = server.run() => result,
        _ = signal::ctrl_c() => {
            ui::info("Shutting down...");
            Ok(())
        }
    };

    if let Some(mut child) = watcher {
        if let Err(e) = child.kill().await {
            tracing::debug!("watcher already gone: {}", e);
        }
    }

    outcome
}

/// Open the browser after [`OPEN_DELAY`] unless a client connected in the
/// meantime (a page already open reconnects on its own).
fn schedule_open(registry: SharedRegistry, url: String) {
    tokio::spawn(async move {
        tokio::time::sleep(OPEN_DELAY).await;
        if should_open_browser(&registry) {
            open_browser(&url);
        } else {
            tracing::debug!("client already connected, not opening a browser");
        }
    });
}

/// True until the first client has ever connected. A client that connected
/// and then left still counts.
fn should_open_browser(registry: &ConnectionRegistry) -> bool {
    registry.connected_total() == 0
}
