//! Process helpers shared by the commands.

use std::process::Stdio;

use tokio::process::{Child, Command};

use crate::error::{CliError, Result};

/// Spawn this executable with `subcommand` and `args`.
///
/// The child inherits stdio and is killed when its handle is dropped, so a
/// stopped parent never leaves a rebuild loop behind.
pub(crate) fn spawn_self(subcommand: &str, args: &[String]) -> Result<Child> {
    let exe = std::env::current_exe()?;

    tracing::debug!("spawning {} {} {}", exe.display(), subcommand, args.join(" "));

    Command::new(&exe)
        .arg(subcommand)
        .args(args)
        .stdin(Stdio::null())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| CliError::Custom(format!("Failed to spawn `{}`: {}", subcommand, e)))
}

/// Open `url` in the default browser.
pub(crate) fn open_browser(url: &str) {
    use std::process::Command;

    let result = if cfg!(target_os = "macos") {
        Command::new("open").arg(url).spawn()
    } else if cfg!(target_os = "windows") {
        Command::new("cmd").args(["/C", "start", url]).spawn()
    } else {
        Command::new("xdg-open").arg(url).spawn()
    };

    match result {
        Ok(_) => crate::ui::info(&format!("Opened browser at {}", url)),
        Err(e) => crate::ui::warning(&format!("Failed to open browser: {}", e)),
    }
}
