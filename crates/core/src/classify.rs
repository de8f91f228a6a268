//! Per-file classification.
//!
//! A file is accepted when its bytes are valid UTF-8 and the text passes the
//! strict decoder. Accepted files yield a signing encoding plus its length
//! and digest; everything else is rejected and copied verbatim. Nothing in
//! here performs IO: the result is a [`WritePlan`] the orchestrator executes.

use std::ffi::OsStr;
use std::path::PathBuf;
use std::str::Utf8Error;

use thiserror::Error;

use crate::digest::{digest_signing, SigningDigest};
use crate::json::{decode, encode_signing, DecodeError, Utf16String};
use crate::layout::TriageLayout;

/// Why a file was routed to the rejection area.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RejectReason {
    #[error("not valid UTF-8: {0}")]
    Text(#[from] Utf8Error),

    #[error(transparent)]
    Decode(#[from] DecodeError),
}

/// Signing encoding and derived values of an accepted file.
#[derive(Debug, Clone, PartialEq)]
pub struct AcceptedFile {
    pub signing: Utf16String,
    pub digest: SigningDigest,
}

impl AcceptedFile {
    /// UTF-8 bytes written to the `.json_signing` artifact.
    ///
    /// The encoder escapes unpaired surrogates, so this conversion is lossless.
    pub fn signing_bytes(&self) -> Vec<u8> {
        self.signing.to_string_lossy().into_bytes()
    }
}

/// Outcome of classifying one file.
#[derive(Debug, Clone, PartialEq)]
pub enum Classification {
    Accepted(AcceptedFile),
    Rejected(RejectReason),
}

impl Classification {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Classification::Accepted(_))
    }
}

/// Classify raw file contents.
pub fn classify(bytes: &[u8]) -> Classification {
    match accept(bytes) {
        Ok(accepted) => Classification::Accepted(accepted),
        Err(reason) => Classification::Rejected(reason),
    }
}

fn accept(bytes: &[u8]) -> Result<AcceptedFile, RejectReason> {
    let text = std::str::from_utf8(bytes)?;
    let value = decode(text)?;
    let signing = encode_signing(&value);
    let digest = digest_signing(&signing);
    Ok(AcceptedFile { signing, digest })
}

/// One file to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedWrite {
    pub path: PathBuf,
    pub contents: Vec<u8>,
}

/// Writes required to persist one classified file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WritePlan {
    /// Original copy, signing encoding, length, and hash, in that order.
    Accept([PlannedWrite; 4]),
    /// Verbatim copy into the rejection area.
    Reject(PlannedWrite),
}

impl WritePlan {
    pub fn writes(&self) -> &[PlannedWrite] {
        match self {
            WritePlan::Accept(writes) => writes,
            WritePlan::Reject(write) => std::slice::from_ref(write),
        }
    }
}

/// Build the write plan for a classified file.
pub fn plan_writes(
    layout: &TriageLayout,
    file_name: &OsStr,
    original: &[u8],
    classification: &Classification,
) -> WritePlan {
    match classification {
        Classification::Accepted(accepted) => {
            let paths = layout.artifact_paths(file_name);
            WritePlan::Accept([
                PlannedWrite { path: paths.original, contents: original.to_vec() },
                PlannedWrite { path: paths.signing, contents: accepted.signing_bytes() },
                PlannedWrite {
                    path: paths.length,
                    contents: accepted.digest.length_text().into_bytes(),
                },
                PlannedWrite { path: paths.sha256, contents: accepted.digest.sha256.to_vec() },
            ])
        }
        Classification::Rejected(_) => WritePlan::Reject(PlannedWrite {
            path: layout.rejection_path(file_name),
            contents: original.to_vec(),
        }),
    }
}
