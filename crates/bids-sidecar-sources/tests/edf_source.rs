// SPDX-License-Identifier: Apache-2.0

mod common;

use bids_sidecar_sources::{
    channel_info, parse_recording_file_name, read_edf_header, validate_recording_file,
    EdfHeaderSource, SourceAdapter, SourceErrorCode, EDF_HEADER_KEYS,
};
use serde_json::json;
use tempfile::tempdir;

use common::{write_edf, TEN_TWENTY};

#[test]
fn missing_recording_yields_all_null_placeholder() {
    let source = EdfHeaderSource::new();
    let mapping = source
        .get("/nonexistent/PRV-002-13UL-24.edf")
        .expect("missing file is not an error");
    assert!(mapping.is_all_absent());
    let keys = mapping.as_object().expect("object root");
    assert_eq!(keys.len(), EDF_HEADER_KEYS.len());
    assert_eq!(mapping, source.placeholder());
}

#[test]
fn header_fields_are_projected_without_annotation_channel() {
    let dir = tempdir().expect("tmp");
    let path = write_edf(dir.path(), "PRV-002-13UL-24.edf", &TEN_TWENTY);
    let source = EdfHeaderSource::new();
    let mapping = source.get(path.to_str().expect("utf8 path")).expect("parse");

    assert_eq!(mapping.resolve("sampling_frequency").value(), Some(&json!(256)));
    assert_eq!(mapping.resolve("recording_duration").value(), Some(&json!(300)));
    assert_eq!(mapping.resolve("number_of_channels").value(), Some(&json!(2)));
    assert_eq!(
        mapping.resolve("channel_names").value(),
        Some(&json!(["EEG Fp1-REF", "EEG Fp2-REF"]))
    );
    assert_eq!(
        mapping.resolve("recording_start_time").value(),
        Some(&json!("2024-03-14T09:30:05"))
    );
    assert_eq!(
        mapping.resolve("equipment_info").value(),
        Some(&json!("Natus XLTEK"))
    );
}

#[test]
fn truncated_header_is_malformed() {
    let dir = tempdir().expect("tmp");
    let path = dir.path().join("short.edf");
    let mut bytes = common::edf_header(&TEN_TWENTY);
    bytes.truncate(400);
    std::fs::write(&path, bytes).expect("write");

    let err = read_edf_header(&path).expect_err("truncated header must fail");
    assert_eq!(err.code, SourceErrorCode::Malformed);
    assert!(err.message.contains("signal headers truncated"));

    let err = EdfHeaderSource::new()
        .get(path.to_str().expect("utf8 path"))
        .expect_err("adapter propagates parse failure");
    assert_eq!(err.code, SourceErrorCode::Malformed);
}

#[test]
fn cached_source_survives_file_removal() {
    let dir = tempdir().expect("tmp");
    let path = write_edf(dir.path(), "rec.edf", &TEN_TWENTY);
    let key = path.to_str().expect("utf8 path").to_string();

    let cached = EdfHeaderSource::new();
    let first = cached.get(&key).expect("first read");
    std::fs::remove_file(&path).expect("remove");
    assert_eq!(cached.get(&key).expect("cached read"), first);

    let uncached = EdfHeaderSource::with_cache(false);
    assert!(uncached.get(&key).expect("placeholder").is_all_absent());
}

#[test]
fn channel_listing_reads_types_and_filters() {
    let dir = tempdir().expect("tmp");
    let path = write_edf(dir.path(), "rec.edf", &TEN_TWENTY);
    let header = read_edf_header(&path).expect("parse");
    let info = channel_info(&header);
    assert_eq!(info.channel_names, vec!["EEG Fp1-REF", "EEG Fp2-REF"]);
    assert_eq!(info.channel_types, vec!["EEG", "EEG"]);
}

#[test]
fn recording_file_names_split_into_identifiers() {
    let parsed = parse_recording_file_name(std::path::Path::new("/data/PRV-002-13UL-24.edf"))
        .expect("well-formed name");
    assert_eq!(parsed.study, "PRV");
    assert_eq!(parsed.site, "002");
    assert_eq!(parsed.patient_id, "13UL");
    assert_eq!(parsed.session, "24");
    assert!(parse_recording_file_name(std::path::Path::new("13UL.edf")).is_none());
}

#[test]
fn recording_validation_requires_existing_edf() {
    let dir = tempdir().expect("tmp");
    let edf = write_edf(dir.path(), "rec.EDF", &TEN_TWENTY);
    assert!(validate_recording_file(&edf));
    let txt = dir.path().join("rec.txt");
    std::fs::write(&txt, "x").expect("write");
    assert!(!validate_recording_file(&txt));
    assert!(!validate_recording_file(&dir.path().join("absent.edf")));
}
