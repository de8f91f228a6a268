//! Directory orchestration.
//!
//! Every entry of the input directory runs through its own pipeline: read,
//! classify, write. Pipelines are spawned onto a [`JoinSet`] and gated by a
//! [`Semaphore`]; a permit is taken before a pipeline starts and released
//! only after all of its writes have finished, so at most
//! `TriageConfig::concurrency` pipelines are ever in flight.
//!
//! Per-file read and write failures are collected into the [`BatchReport`]
//! and never stop the batch.

use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::Semaphore;
use tokio::task::{JoinError, JoinSet};
use tracing::{debug, info};

use crate::classify::{classify, plan_writes, Classification, PlannedWrite, WritePlan};
use crate::config::{ConfigError, TriageConfig};
use crate::layout::TriageLayout;

/// Fatal errors that prevent a batch from running at all.
#[derive(Debug, Error)]
pub enum BatchError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("output directory {} does not exist or is not a directory", .path.display())]
    MissingOutputDir { path: PathBuf },

    #[error("failed to list input directory {}: {source}", .path.display())]
    ListInput {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("concurrency limiter closed unexpectedly")]
    LimiterClosed,
}

/// A failure confined to a single file.
#[derive(Debug, Error)]
pub enum FileError {
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("file pipeline aborted: {0}")]
    Task(#[from] JoinError),
}

/// How a single file ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileOutcome {
    Accepted,
    Rejected,
    Unreadable,
}

/// Summary of one batch.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub accepted: usize,
    pub rejected: usize,
    pub unreadable: usize,
    /// Read and write failures, in completion order.
    pub errors: Vec<FileError>,
    /// Highest number of pipelines observed in flight at the same time.
    pub peak_in_flight: usize,
}

impl BatchReport {
    /// Number of entries that went through a pipeline.
    pub fn total(&self) -> usize {
        self.accepted + self.rejected + self.unreadable
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    fn record(&mut self, result: FileResult) {
        match result.outcome {
            FileOutcome::Accepted => self.accepted += 1,
            FileOutcome::Rejected => self.rejected += 1,
            FileOutcome::Unreadable => self.unreadable += 1,
        }
        self.errors.extend(result.errors);
    }
}

struct FileResult {
    outcome: FileOutcome,
    errors: Vec<FileError>,
}

/// Tracks how many pipelines are running and the highest count seen.
#[derive(Debug, Default)]
struct InFlight {
    current: AtomicUsize,
    peak: AtomicUsize,
}

impl InFlight {
    fn enter(&self) {
        let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
    }

    fn leave(&self) {
        self.current.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Triage every entry of `layout.input_dir` into `yay` or `nay`.
///
/// The output subdirectories must already exist. Entries are dispatched in
/// name order; completion order is unspecified.
pub async fn run_batch(
    layout: &TriageLayout,
    config: &TriageConfig,
) -> Result<BatchReport, BatchError> {
    config.validate()?;
    ensure_dir(&layout.accepted_dir).await?;
    ensure_dir(&layout.rejected_dir).await?;

    let file_names = list_entries(&layout.input_dir).await?;
    info!(
        input = %layout.input_dir.display(),
        output = %layout.output_root.display(),
        entries = file_names.len(),
        concurrency = config.concurrency,
        "starting triage batch"
    );

    let layout = Arc::new(layout.clone());
    let in_flight = Arc::new(InFlight::default());
    let sem = Arc::new(Semaphore::new(config.concurrency));
    let mut join_set = JoinSet::new();
    let mut report = BatchReport::default();

    for file_name in file_names {
        let permit = sem.clone().acquire_owned().await.map_err(|_| BatchError::LimiterClosed)?;
        let layout = layout.clone();
        let in_flight = in_flight.clone();
        join_set.spawn(async move {
            let _permit = permit;
            in_flight.enter();
            let result = process_file(&layout, file_name).await;
            in_flight.leave();
            result
        });

        // Fold in whatever already finished so results do not pile up.
        while let Some(joined) = join_set.try_join_next() {
            record_joined(&mut report, joined);
        }
    }

    while let Some(joined) = join_set.join_next().await {
        record_joined(&mut report, joined);
    }

    report.peak_in_flight = in_flight.peak.load(Ordering::SeqCst);
    info!(
        accepted = report.accepted,
        rejected = report.rejected,
        unreadable = report.unreadable,
        errors = report.errors.len(),
        "triage batch finished"
    );
    Ok(report)
}

fn record_joined(report: &mut BatchReport, joined: Result<FileResult, JoinError>) {
    match joined {
        Ok(result) => report.record(result),
        Err(err) => {
            debug!(error = %err, "file pipeline aborted");
            report.errors.push(FileError::Task(err));
        }
    }
}

async fn ensure_dir(path: &Path) -> Result<(), BatchError> {
    match tokio::fs::metadata(path).await {
        Ok(meta) if meta.is_dir() => Ok(()),
        _ => Err(BatchError::MissingOutputDir { path: path.to_path_buf() }),
    }
}

async fn list_entries(dir: &Path) -> Result<Vec<OsString>, BatchError> {
    let list_err = |source| BatchError::ListInput { path: dir.to_path_buf(), source };
    let mut entries = tokio::fs::read_dir(dir).await.map_err(list_err)?;
    let mut names = Vec::new();
    while let Some(entry) = entries.next_entry().await.map_err(list_err)? {
        names.push(entry.file_name());
    }
    names.sort();
    Ok(names)
}

/// Read, classify, and persist one input entry.
async fn process_file(layout: &TriageLayout, file_name: OsString) -> FileResult {
    let input_path = layout.input_path(&file_name);
    let bytes = match tokio::fs::read(&input_path).await {
        Ok(bytes) => bytes,
        Err(source) => {
            debug!(path = %input_path.display(), error = %source, "failed to read input file");
            return FileResult {
                outcome: FileOutcome::Unreadable,
                errors: vec![FileError::Read { path: input_path, source }],
            };
        }
    };

    let classification = classify(&bytes);
    let outcome = match &classification {
        Classification::Accepted(accepted) => {
            if accepted.digest.truncated_units > 0 {
                debug!(
                    path = %input_path.display(),
                    truncated = accepted.digest.truncated_units,
                    "signing encoding has code units above 0xFF; hashed by low byte"
                );
            }
            debug!(
                path = %input_path.display(),
                length = accepted.digest.length,
                sha256 = %accepted.digest.sha256_hex(),
                "accepted"
            );
            FileOutcome::Accepted
        }
        Classification::Rejected(reason) => {
            debug!(path = %input_path.display(), reason = %reason, "rejected");
            FileOutcome::Rejected
        }
    };

    let plan = plan_writes(layout, &file_name, &bytes, &classification);
    drop(bytes);
    let errors = execute_plan(plan).await;
    FileResult { outcome, errors }
}

/// Issue every write of a plan; the four writes of an accepted file run concurrently.
async fn execute_plan(plan: WritePlan) -> Vec<FileError> {
    let results = match plan {
        WritePlan::Accept([original, signing, length, sha256]) => {
            let (a, b, c, d) = tokio::join!(
                write_file(original),
                write_file(signing),
                write_file(length),
                write_file(sha256)
            );
            vec![a, b, c, d]
        }
        WritePlan::Reject(copy) => vec![write_file(copy).await],
    };
    results.into_iter().filter_map(Result::err).collect()
}

async fn write_file(write: PlannedWrite) -> Result<(), FileError> {
    tokio::fs::write(&write.path, &write.contents).await.map_err(|source| {
        debug!(path = %write.path.display(), error = %source, "failed to write artifact");
        FileError::Write { path: write.path, source }
    })
}
