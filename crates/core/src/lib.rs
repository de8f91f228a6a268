//! triage-core
//!
//! Core library for triaging a corpus of candidate JSON documents.
//!
//! Each input file is either accepted, in which case its original bytes are
//! stored next to a deterministic "signing" re-encoding, that encoding's
//! length, and its SHA-256 digest, or rejected and copied verbatim.
//!
//! - [`json`]: value model, strict decoder, signing encoder.
//! - [`digest`]: length and hash of a signing encoding.
//! - [`classify`]: per-file accept/reject decision and write plan.
//! - [`layout`]: output directory layout and artifact names.
//! - [`config`]: batch settings.
//! - [`batch`]: bounded-concurrency directory orchestration.
//!
//! The goal is to keep all substantive logic here so it is fully testable and
//! the CLI stays a thin wrapper.

pub mod batch;
pub mod classify;
pub mod config;
pub mod digest;
pub mod json;
pub mod layout;

/// Returns the library version as encoded at compile time.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
