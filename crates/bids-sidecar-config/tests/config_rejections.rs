// SPDX-License-Identifier: Apache-2.0

use bids_sidecar_config::parse_config_set_yaml;

const STRUCTURE: &str = r#"
schema_version: "1"
layout:
  subject_prefix: "sub-PRV-"
  task_label: "rest"
  session_prefix: "ses-"
sidecars:
  eeg_json:
    file_suffix: "eeg.json"
    fields:
      - name: TaskName
        level: required
      - name: SamplingFrequency
        level: required
      - name: PowerLineFrequency
        default: 60
"#;

const MAPPING: &str = r#"
schema_version: "1"
sidecars:
  eeg_json:
    rules:
      - source: f11_form
        field_mapping:
          TaskName: recording_parameters.task_description
      - source: edf_header
        field_mapping:
          SamplingFrequency: sampling_frequency
validation:
  eeg_json_required_fields: [TaskName, SamplingFrequency]
"#;

fn expect_error(structure: &str, mapping: &str, needle: &str) {
    let err = parse_config_set_yaml(structure, mapping).expect_err("config must be rejected");
    assert!(err.0.contains(needle), "expected `{needle}` in: {}", err.0);
}

#[test]
fn minimal_configuration_is_accepted() {
    let config = parse_config_set_yaml(STRUCTURE, MAPPING).expect("valid config");
    let plan = config.plan("eeg_json").expect("plan");
    assert_eq!(plan.rules.len(), 2);
    assert_eq!(
        config
            .layout()
            .sidecar_file_name("13UL", Some("24"), plan.file_suffix),
        "sub-PRV-13UL_ses-24_task-rest_eeg.json"
    );
}

#[test]
fn malformed_yaml_is_rejected() {
    expect_error("schema_version: [", MAPPING, "parse structure config failed");
}

#[test]
fn unsupported_schema_version_is_rejected() {
    let structure = STRUCTURE.replace("schema_version: \"1\"", "schema_version: \"2\"");
    expect_error(&structure, MAPPING, "parse structure config failed");
}

#[test]
fn duplicate_schema_field_is_rejected() {
    let structure = STRUCTURE.replace("name: PowerLineFrequency", "name: TaskName");
    expect_error(&structure, MAPPING, "fields.TaskName is duplicated");
}

#[test]
fn list_field_with_scalar_default_is_rejected() {
    let structure = STRUCTURE.replace(
        "      - name: PowerLineFrequency\n        default: 60",
        "      - name: PowerLineFrequency\n        shape: list\n        default: 60",
    );
    expect_error(&structure, MAPPING, "does not match declared shape list");
}

#[test]
fn rule_targeting_field_outside_schema_is_rejected() {
    let mapping = MAPPING.replace(
        "SamplingFrequency: sampling_frequency",
        "SamplingRate: sampling_frequency",
    );
    expect_error(STRUCTURE, &mapping, "maps SamplingRate");
}

#[test]
fn rule_with_empty_source_is_rejected() {
    let mapping = MAPPING.replace("source: edf_header", "source: \"\"");
    expect_error(STRUCTURE, &mapping, "source must be non-empty");
}

#[test]
fn rules_for_unknown_sidecar_are_rejected() {
    let mapping = MAPPING.replace("  eeg_json:\n    rules:", "  ieeg_json:\n    rules:");
    expect_error(STRUCTURE, &mapping, "unknown sidecar: ieeg_json");
}

#[test]
fn required_field_outside_schema_is_rejected() {
    let mapping = MAPPING.replace(
        "[TaskName, SamplingFrequency]",
        "[TaskName, EEGReference]",
    );
    expect_error(STRUCTURE, &mapping, "requires EEGReference");
}

#[test]
fn misnamed_validation_key_is_rejected() {
    let mapping = MAPPING.replace("eeg_json_required_fields", "eeg_json_required");
    expect_error(STRUCTURE, &mapping, "must be named <sidecar>_required_fields");
}

#[test]
fn unknown_keys_are_rejected() {
    let mapping = MAPPING.replace("schema_version: \"1\"", "schema_version: \"1\"\nextra: true");
    expect_error(STRUCTURE, &mapping, "parse mapping config failed");
}

#[test]
fn required_level_fields_are_required_without_validation_block() {
    let (mapping, _) = MAPPING.split_once("validation:").expect("validation block");
    let config = parse_config_set_yaml(STRUCTURE, mapping).expect("valid config");
    let plan = config.plan("eeg_json").expect("plan");
    assert_eq!(plan.required_fields, ["TaskName", "SamplingFrequency"]);
}

#[test]
fn explicit_list_may_require_more_than_the_required_level() {
    let mapping = MAPPING.replace(
        "[TaskName, SamplingFrequency]",
        "[TaskName, SamplingFrequency, PowerLineFrequency]",
    );
    let config = parse_config_set_yaml(STRUCTURE, &mapping).expect("valid config");
    let plan = config.plan("eeg_json").expect("plan");
    assert_eq!(plan.required_fields.len(), 3);
}

#[test]
fn explicit_list_omitting_required_level_field_is_rejected() {
    let mapping = MAPPING.replace("[TaskName, SamplingFrequency]", "[TaskName]");
    expect_error(
        STRUCTURE,
        &mapping,
        "omits SamplingFrequency, which the eeg_json schema marks level: required",
    );
}
