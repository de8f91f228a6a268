use std::fmt::Write as _;
use std::io::IsTerminal;
use std::path::Path;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;
use triage_core::batch::{run_batch, BatchReport};
use triage_core::config::TriageConfig;
use triage_core::layout::TriageLayout;

/// Log filter used when `RUST_LOG` is not set. Keeps the tool quiet unless
/// something goes wrong.
pub const DEFAULT_LOG_FILTER: &str = "warn";

/// Install the stderr log subscriber. Safe to call more than once.
pub fn init_logging() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// Triage `input_dir` into the `yay`/`nay` subdirectories of `output_dir`.
pub async fn triage_command(input_dir: &Path, output_dir: &Path) -> Result<BatchReport> {
    let layout = TriageLayout::new(input_dir, output_dir);
    run_batch(&layout, &TriageConfig::default()).await.with_context(|| {
        format!("Failed to triage {} into {}", input_dir.display(), output_dir.display())
    })
}

/// Render the per-file error summary, or `None` if the batch had no errors.
pub fn render_error_summary(report: &BatchReport) -> Option<String> {
    if !report.has_errors() {
        return None;
    }

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} error(s) while triaging {} file(s) ({} accepted, {} rejected, {} unreadable):",
        report.errors.len(),
        report.total(),
        report.accepted,
        report.rejected,
        report.unreadable
    );
    for err in &report.errors {
        let _ = writeln!(out, "  - {err}");
    }
    Some(out)
}

/// Print the per-file error summary to stderr, if there is one.
pub fn print_error_summary(report: &BatchReport) {
    if let Some(summary) = render_error_summary(report) {
        eprint!("{summary}");
    }
}
