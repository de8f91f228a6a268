//! Length and SHA-256 digest of a signing encoding.
//!
//! Both are defined over UTF-16 code units. The hash input is one byte per
//! code unit: the low eight bits of the unit (a "latin1" view of the text).
//! Units above 0xFF are truncated to their low byte, which keeps the digest
//! identical to what existing consumers of `.sha256` files compute.

use sha2::{Digest, Sha256};

use crate::json::Utf16String;

/// Length and digest computed from one signing encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SigningDigest {
    /// Number of UTF-16 code units in the encoding.
    pub length: usize,
    /// Raw SHA-256 over the latin1 view of the encoding.
    pub sha256: [u8; 32],
    /// How many code units exceeded 0xFF and were truncated for hashing.
    pub truncated_units: usize,
}

impl SigningDigest {
    /// Decimal text written to the `.length` artifact.
    pub fn length_text(&self) -> String {
        self.length.to_string()
    }

    /// Lowercase hex form of the digest, for logs.
    pub fn sha256_hex(&self) -> String {
        self.sha256.iter().map(|b| format!("{b:02x}")).collect()
    }
}

/// Compute length and digest of a signing encoding.
pub fn digest_signing(encoding: &Utf16String) -> SigningDigest {
    let (bytes, truncated_units) = latin1_bytes(encoding.units());
    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    let mut sha256 = [0u8; 32];
    sha256.copy_from_slice(&hasher.finalize());
    SigningDigest { length: encoding.len(), sha256, truncated_units }
}

/// One byte per code unit, keeping the low eight bits.
///
/// Returns the bytes and the number of units that did not fit.
pub fn latin1_bytes(units: &[u16]) -> (Vec<u8>, usize) {
    let mut truncated = 0;
    let bytes = units
        .iter()
        .map(|&unit| {
            if unit > 0xFF {
                truncated += 1;
            }
            (unit & 0xFF) as u8
        })
        .collect();
    (bytes, truncated)
}
