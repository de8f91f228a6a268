use std::ffi::OsStr;

use sha2::{Digest, Sha256};
use triage_core::classify::{classify, plan_writes, Classification, RejectReason, WritePlan};
use triage_core::digest::{digest_signing, latin1_bytes};
use triage_core::json::{DecodeError, Utf16String};
use triage_core::layout::TriageLayout;

fn sha256(bytes: &[u8]) -> [u8; 32] {
    let mut out = [0u8; 32];
    out.copy_from_slice(&Sha256::digest(bytes));
    out
}

#[test]
fn ascii_encoding_is_hashed_as_its_bytes() {
    let encoding = Utf16String::from("{\n  \"x\": 1\n}");
    let digest = digest_signing(&encoding);
    assert_eq!(digest.length, 12);
    assert_eq!(digest.length_text(), "12");
    assert_eq!(digest.sha256, sha256(b"{\n  \"x\": 1\n}"));
    assert_eq!(digest.truncated_units, 0);
    assert_eq!(digest.sha256_hex().len(), 64);
}

#[test]
fn latin1_range_units_hash_as_single_bytes_not_utf8() {
    let encoding = Utf16String::from("\"é\"");
    let digest = digest_signing(&encoding);
    assert_eq!(digest.length, 3);
    assert_eq!(digest.sha256, sha256(&[b'"', 0xE9, b'"']));
    assert_ne!(digest.sha256, sha256("\"é\"".as_bytes()));
}

#[test]
fn units_above_0xff_are_truncated_to_their_low_byte() {
    let (bytes, truncated) = latin1_bytes(&[0x41, 0x4E2D, 0xD83D, 0xDE00, 0xFF]);
    assert_eq!(bytes, vec![0x41, 0x2D, 0x3D, 0x00, 0xFF]);
    assert_eq!(truncated, 3);

    let digest = digest_signing(&Utf16String::from("中"));
    assert_eq!(digest.length, 1);
    assert_eq!(digest.truncated_units, 1);
    assert_eq!(digest.sha256, sha256(&[0x2D]));
}

#[test]
fn valid_document_is_accepted_with_consistent_artifacts() {
    match classify(br#"{"x": 1}"#) {
        Classification::Accepted(accepted) => {
            assert_eq!(accepted.signing_bytes(), b"{\n  \"x\": 1\n}".to_vec());
            assert_eq!(accepted.digest.length, accepted.signing.len());
            assert_eq!(accepted.digest.sha256, sha256(&accepted.signing_bytes()));
        }
        other => panic!("expected acceptance, got {other:?}"),
    }
}

#[test]
fn signing_bytes_are_utf8_even_when_length_counts_utf16_units() {
    match classify("[\"😀\"]".as_bytes()) {
        Classification::Accepted(accepted) => {
            let text = String::from_utf8(accepted.signing_bytes()).expect("utf-8");
            assert_eq!(text, "[\n  \"😀\"\n]");
            assert_eq!(accepted.digest.length, 10);
            assert_eq!(text.len(), 12);
        }
        other => panic!("expected acceptance, got {other:?}"),
    }
}

#[test]
fn malformed_utf8_is_rejected_before_parsing() {
    let classification = classify(b"{\"x\": \"\xff\"}");
    assert!(matches!(classification, Classification::Rejected(RejectReason::Text(_))));

    // Encoded surrogates are not valid UTF-8 either.
    let classification = classify(b"\"\xed\xa0\x80\"");
    assert!(matches!(classification, Classification::Rejected(RejectReason::Text(_))));
}

#[test]
fn invalid_documents_are_rejected_with_decode_reasons() {
    assert!(matches!(
        classify(b"not json"),
        Classification::Rejected(RejectReason::Decode(DecodeError::UnexpectedChar { .. }))
    ));
    assert!(matches!(
        classify(br#"{"n": -0}"#),
        Classification::Rejected(RejectReason::Decode(DecodeError::NegativeZero { .. }))
    ));
    assert!(matches!(
        classify(br#"["\uD800"]"#),
        Classification::Rejected(RejectReason::Decode(DecodeError::UnpairedSurrogate { .. }))
    ));
    assert!(!classify(b"").is_accepted());
}

#[test]
fn accepted_plan_writes_four_sibling_artifacts() {
    let layout = TriageLayout::new("/in", "/out");
    let original = br#"{"x": 1}"#;
    let classification = classify(original);
    let plan = plan_writes(&layout, OsStr::new("a.json"), original, &classification);

    let WritePlan::Accept([copy, signing, length, hash]) = &plan else {
        panic!("expected accept plan, got {plan:?}");
    };
    assert_eq!(copy.path, layout.accepted_dir.join("a.json"));
    assert_eq!(copy.contents, original.to_vec());
    assert_eq!(signing.path, layout.accepted_dir.join("a.json.json_signing"));
    assert_eq!(signing.contents, b"{\n  \"x\": 1\n}".to_vec());
    assert_eq!(length.path, layout.accepted_dir.join("a.json.length"));
    assert_eq!(length.contents, b"12".to_vec());
    assert_eq!(hash.path, layout.accepted_dir.join("a.json.sha256"));
    assert_eq!(hash.contents, sha256(b"{\n  \"x\": 1\n}").to_vec());
    assert_eq!(plan.writes().len(), 4);
}

#[test]
fn rejected_plan_copies_original_verbatim() {
    let layout = TriageLayout::new("/in", "/out");
    let original = b"not json";
    let plan = plan_writes(&layout, OsStr::new("b.json"), original, &classify(original));

    match &plan {
        WritePlan::Reject(copy) => {
            assert_eq!(copy.path, layout.rejected_dir.join("b.json"));
            assert_eq!(copy.contents, original.to_vec());
        }
        other => panic!("expected reject plan, got {other:?}"),
    }
    assert_eq!(plan.writes().len(), 1);
}

#[test]
fn layout_appends_suffixes_to_the_full_file_name() {
    let layout = TriageLayout::new("corpus", "triaged");
    let paths = layout.artifact_paths(OsStr::new("seed.tar.gz"));
    assert_eq!(paths.original, std::path::Path::new("triaged/yay/seed.tar.gz"));
    assert_eq!(paths.signing, std::path::Path::new("triaged/yay/seed.tar.gz.json_signing"));
    assert_eq!(paths.length, std::path::Path::new("triaged/yay/seed.tar.gz.length"));
    assert_eq!(paths.sha256, std::path::Path::new("triaged/yay/seed.tar.gz.sha256"));
    assert_eq!(layout.rejection_path(OsStr::new("x")), std::path::Path::new("triaged/nay/x"));
    assert_eq!(layout.input_path(OsStr::new("x")), std::path::Path::new("corpus/x"));
}
