// SPDX-License-Identifier: Apache-2.0

use bids_sidecar_model::{SourceMapping, CRATE_NAME};
use serde_json::json;

#[test]
fn crate_name_matches_package() {
    assert_eq!(CRATE_NAME, env!("CARGO_PKG_NAME"));
}

#[test]
fn placeholder_header_resolves_every_key_absent() {
    let keys = [
        "sampling_frequency",
        "recording_duration",
        "number_of_channels",
        "channel_names",
    ];
    let mapping = SourceMapping::all_null(keys);
    for key in keys {
        assert!(mapping.resolve(key).is_absent(), "{key} should be absent");
    }
}

#[test]
fn source_mapping_is_transparent_json() {
    let mapping: SourceMapping =
        serde_json::from_value(json!({"study_info": {"visit_type": "baseline"}}))
            .expect("decode mapping");
    assert_eq!(
        mapping.resolve("study_info.visit_type").value(),
        Some(&json!("baseline"))
    );
    assert_eq!(
        serde_json::to_string(&mapping).expect("encode mapping"),
        r#"{"study_info":{"visit_type":"baseline"}}"#
    );
}
