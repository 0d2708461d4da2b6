//! Formatting utilities for sizes, durations and build reports.

use std::time::Duration;

use owo_colors::OwoColorize;

use crate::build::BuildReport;

const KIB: u64 = 1024;
const MIB: u64 = KIB * 1024;
const GIB: u64 = MIB * 1024;

/// Byte count for the build report, one decimal above 1 KB.
///
/// ```
/// use webserve_cli::ui::format_size;
///
/// assert_eq!(format_size(0), "0 B");
/// assert_eq!(format_size(1024), "1.0 KB");
/// assert_eq!(format_size(1_572_864), "1.5 MB");
/// ```
pub fn format_size(bytes: u64) -> String {
    let scaled = |unit: u64| bytes as f64 / unit as f64;
    match bytes {
        b if b >= GIB => format!("{:.1} GB", scaled(GIB)),
        b if b >= MIB => format!("{:.1} MB", scaled(MIB)),
        b if b >= KIB => format!("{:.1} KB", scaled(KIB)),
        b => format!("{} B", b),
    }
}

/// Build time: whole milliseconds below a second, tenths of a second above.
pub fn format_duration(duration: Duration) -> String {
    match duration.as_millis() {
        ms @ 0..=999 => format!("{}ms", ms),
        _ => format!("{:.1}s", duration.as_secs_f64()),
    }
}

/// Print the files written by one build cycle, then its asset warnings.
pub fn print_build_report(report: &BuildReport) {
    for file in &report.written {
        eprintln!(
            "  {} {}",
            file.path.display().cyan(),
            format_size(file.bytes).dimmed()
        );
    }

    for warning in &report.asset_warnings {
        super::warning(warning);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_size_units() {
        assert_eq!(format_size(1023), "1023 B");
        assert_eq!(format_size(1536), "1.5 KB");
        assert_eq!(format_size(5 * GIB), "5.0 GB");
    }

    #[test]
    fn test_format_duration_boundaries() {
        assert_eq!(format_duration(Duration::from_millis(999)), "999ms");
        assert_eq!(format_duration(Duration::from_millis(1000)), "1.0s");
        assert_eq!(format_duration(Duration::from_secs(90)), "90.0s");
    }
}
