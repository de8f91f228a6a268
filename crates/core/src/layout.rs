use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

/// Subdirectory of the output root receiving accepted files and their artifacts.
pub const ACCEPTED_DIR_NAME: &str = "yay";
/// Subdirectory of the output root receiving rejected files.
pub const REJECTED_DIR_NAME: &str = "nay";

pub const SIGNING_SUFFIX: &str = ".json_signing";
pub const LENGTH_SUFFIX: &str = ".length";
pub const SHA256_SUFFIX: &str = ".sha256";

/// Logical layout of one triage run.
///
/// This is derived from the input directory and output root. It does *not*
/// perform any IO itself; the orchestrator checks that the output
/// subdirectories exist before processing.
#[derive(Debug, Clone)]
pub struct TriageLayout {
    /// Directory whose entries are triaged.
    pub input_dir: PathBuf,
    /// Output root containing the `yay` and `nay` subdirectories.
    pub output_root: PathBuf,
    /// Accepted files and their artifacts (`<output>/yay`).
    pub accepted_dir: PathBuf,
    /// Rejected files (`<output>/nay`).
    pub rejected_dir: PathBuf,
}

/// Paths of the four artifacts written for an accepted file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub original: PathBuf,
    pub signing: PathBuf,
    pub length: PathBuf,
    pub sha256: PathBuf,
}

impl TriageLayout {
    pub fn new(input_dir: impl AsRef<Path>, output_root: impl AsRef<Path>) -> Self {
        let input_dir = input_dir.as_ref().to_path_buf();
        let output_root = output_root.as_ref().to_path_buf();
        let accepted_dir = output_root.join(ACCEPTED_DIR_NAME);
        let rejected_dir = output_root.join(REJECTED_DIR_NAME);

        Self { input_dir, output_root, accepted_dir, rejected_dir }
    }

    /// Path of an entry in the input directory.
    pub fn input_path(&self, file_name: &OsStr) -> PathBuf {
        self.input_dir.join(file_name)
    }

    /// Artifact paths for an accepted file, all sharing `yay/<file_name>` as base.
    pub fn artifact_paths(&self, file_name: &OsStr) -> ArtifactPaths {
        let original = self.accepted_dir.join(file_name);
        ArtifactPaths {
            signing: with_suffix(&original, SIGNING_SUFFIX),
            length: with_suffix(&original, LENGTH_SUFFIX),
            sha256: with_suffix(&original, SHA256_SUFFIX),
            original,
        }
    }

    /// Path of the verbatim copy for a rejected file.
    pub fn rejection_path(&self, file_name: &OsStr) -> PathBuf {
        self.rejected_dir.join(file_name)
    }
}

/// Append a suffix to the raw OS file name, without touching any extension.
fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name: OsString = path.as_os_str().to_owned();
    name.push(suffix);
    PathBuf::from(name)
}
