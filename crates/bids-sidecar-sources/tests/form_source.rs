// SPDX-License-Identifier: Apache-2.0

mod common;

use bids_sidecar_sources::{CaseReportFormSource, FormView, SourceAdapter, SourceErrorCode};
use serde_json::{json, Value};

use common::fixture;

fn forms() -> CaseReportFormSource {
    CaseReportFormSource::new(Some(fixture("tests/fixtures/forms")))
}

#[test]
fn yaml_form_overlays_skeleton() {
    let mapping = forms().get("13UL").expect("form");
    assert_eq!(mapping.resolve("demographics.age").value(), Some(&json!(24)));
    assert_eq!(
        mapping.resolve("recording_parameters.task_description").value(),
        Some(&json!("resting state EEG"))
    );
    assert!(mapping.resolve("clinical_info.diagnosis").is_absent());
}

#[test]
fn json_form_is_accepted() {
    let mapping = forms().get("20AB").expect("form");
    assert_eq!(
        mapping.resolve("clinical_info.diagnosis").value(),
        Some(&json!("focal epilepsy"))
    );
    assert!(mapping.resolve("demographics.handedness").is_absent());
}

#[test]
fn unknown_patient_gets_skeleton_not_error() {
    let source = forms();
    let mapping = source.get("99ZZ").expect("skeleton");
    assert_eq!(mapping, source.placeholder());
    let no_dir = CaseReportFormSource::new(None);
    assert_eq!(no_dir.get("13UL").expect("skeleton"), source.placeholder());
}

#[test]
fn repeated_reads_are_identical_and_cached_once() {
    let source = forms();
    let first = source.get("13UL").expect("first");
    let second = source.get("13UL").expect("second");
    assert_eq!(first, second);
    assert_eq!(source.cached_entities(), 1);

    let uncached = forms().without_cache();
    assert_eq!(uncached.get("13UL").expect("uncached"), first);
    assert_eq!(uncached.cached_entities(), 0);
}

#[test]
fn non_mapping_form_is_malformed() {
    let err = forms().get("BAD1").expect_err("list root must fail");
    assert_eq!(err.code, SourceErrorCode::Malformed);
    assert!(err.message.contains("form root must be a mapping"));
}

#[test]
fn path_like_patient_id_is_rejected() {
    let err = forms().get("../forms/13UL").expect_err("traversal");
    assert_eq!(err.code, SourceErrorCode::InvalidKey);
}

#[test]
fn participants_view_is_flat() {
    let view = forms()
        .view("13UL", FormView::ParticipantsTsv)
        .expect("view");
    assert_eq!(view.root(), &json!({"age": 24, "sex": "F", "handedness": "R"}));
}

#[test]
fn custom_fields_keep_nulls_for_missing_paths() {
    let fields = forms()
        .custom_fields("20AB", &["demographics.sex", "study_info.site_code"])
        .expect("custom");
    let obj = fields.as_object().expect("object");
    assert_eq!(obj.get("sex"), Some(&json!("M")));
    assert_eq!(obj.get("site_code"), Some(&Value::Null));
}
