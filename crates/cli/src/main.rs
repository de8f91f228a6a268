use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use json_triage::{init_logging, print_error_summary, triage_command};

/// Triage a directory of candidate JSON documents.
///
/// Every entry of INPUT_DIR is either accepted into OUTPUT_DIR/yay (original
/// bytes plus `.json_signing`, `.length`, and `.sha256` artifacts) or copied
/// verbatim into OUTPUT_DIR/nay. Both subdirectories must already exist.
///
/// This CLI is a thin wrapper around `triage-core`; set `RUST_LOG` for
/// per-file diagnostics on stderr.
#[derive(Parser, Debug)]
#[command(name = "json-triage", version, about = "Triage a JSON fuzzer corpus", long_about = None)]
struct Cli {
    /// Directory whose entries are triaged (not recursive).
    input_dir: PathBuf,

    /// Output root containing pre-existing `yay` and `nay` directories.
    output_dir: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    let report = triage_command(&cli.input_dir, &cli.output_dir).await?;
    // Per-file errors are reported but do not change the exit status.
    print_error_summary(&report);

    Ok(())
}
