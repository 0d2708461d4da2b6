//! Terminal output: status lines and small formatting helpers.
//!
//! ```no_run
//! use webserve_cli::ui;
//!
//! ui::init_colors(false);
//! ui::success("Build complete");
//! ui::warning("Skipping unreadable asset");
//! ```

mod format;
mod messages;

pub use format::{format_duration, format_size, print_build_report};
pub use messages::{error, info, success, warning};

/// Check if color output should be enabled.
///
/// Respects `NO_COLOR` and `FORCE_COLOR`, then falls back to terminal detection.
pub fn should_use_color() -> bool {
    if std::env::var("NO_COLOR").is_ok() {
        return false;
    }

    if std::env::var("FORCE_COLOR").is_ok() {
        return true;
    }

    console::user_attended_stderr()
}

/// Initialize color support based on environment.
///
/// `owo-colors` honours the terminal on its own; with `--no-color` we also
/// turn off `console`'s styling so both crates agree.
pub fn init_colors(no_color: bool) {
    if no_color || !should_use_color() {
        console::set_colors_enabled(false);
        console::set_colors_enabled_stderr(false);
    }
}
