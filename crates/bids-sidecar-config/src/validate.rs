// SPDX-License-Identifier: Apache-2.0

use std::collections::BTreeSet;

use bids_sidecar_model::{FieldShape, FieldSpec};
use serde_json::Value;

use crate::schema::{MappingConfig, SidecarStructure, StructureConfig};

const REQUIRED_FIELDS_SUFFIX: &str = "_required_fields";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError(pub String);

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for ConfigError {}

#[must_use]
pub fn required_fields_key(kind: &str) -> String {
    format!("{kind}{REQUIRED_FIELDS_SUFFIX}")
}

pub fn validate_config_set(
    structure: &StructureConfig,
    mapping: &MappingConfig,
) -> Result<(), ConfigError> {
    if structure.layout.subject_prefix.trim().is_empty() {
        return Err(ConfigError("layout.subject_prefix must be non-empty".to_string()));
    }
    if structure.layout.task_label.trim().is_empty() {
        return Err(ConfigError("layout.task_label must be non-empty".to_string()));
    }
    if structure.sidecars.is_empty() {
        return Err(ConfigError("structure config declares no sidecars".to_string()));
    }
    for (kind, sidecar) in &structure.sidecars {
        validate_sidecar_structure(kind, sidecar)?;
    }

    for (kind, rules) in &mapping.sidecars {
        let sidecar = structure.sidecars.get(kind).ok_or_else(|| {
            ConfigError(format!("mapping rules declared for unknown sidecar: {kind}"))
        })?;
        let schema = field_names(&sidecar.fields);
        for (idx, rule) in rules.rules.iter().enumerate() {
            if rule.source.trim().is_empty() {
                return Err(ConfigError(format!(
                    "sidecars.{kind}.rules[{idx}].source must be non-empty"
                )));
            }
            if rule.field_mapping.is_empty() {
                return Err(ConfigError(format!(
                    "sidecars.{kind}.rules[{idx}].field_mapping must not be empty"
                )));
            }
            for (output, path) in &rule.field_mapping {
                if output.trim().is_empty() {
                    return Err(ConfigError(format!(
                        "sidecars.{kind}.rules[{idx}] maps an empty output field"
                    )));
                }
                if path.trim().is_empty() {
                    return Err(ConfigError(format!(
                        "sidecars.{kind}.rules[{idx}].field_mapping.{output} has an empty source path"
                    )));
                }
                if !schema.contains(output.as_str()) {
                    return Err(ConfigError(format!(
                        "sidecars.{kind}.rules[{idx}] maps {output}, which is not in the {kind} schema"
                    )));
                }
            }
        }
    }

    for (key, required) in &mapping.validation {
        let kind = key.strip_suffix(REQUIRED_FIELDS_SUFFIX).ok_or_else(|| {
            ConfigError(format!(
                "validation.{key} must be named <sidecar>{REQUIRED_FIELDS_SUFFIX}"
            ))
        })?;
        let sidecar = structure.sidecars.get(kind).ok_or_else(|| {
            ConfigError(format!("validation.{key} refers to unknown sidecar: {kind}"))
        })?;
        let schema = field_names(&sidecar.fields);
        let mut seen = BTreeSet::new();
        for field in required {
            if !schema.contains(field.as_str()) {
                return Err(ConfigError(format!(
                    "validation.{key} requires {field}, which is not in the {kind} schema"
                )));
            }
            if !seen.insert(field.as_str()) {
                return Err(ConfigError(format!("validation.{key} lists {field} twice")));
            }
        }
        let omitted = sidecar
            .fields
            .iter()
            .find(|f| f.is_required() && !seen.contains(f.name.as_str()));
        if let Some(spec) = omitted {
            return Err(ConfigError(format!(
                "validation.{key} omits {}, which the {kind} schema marks level: required",
                spec.name
            )));
        }
    }

    Ok(())
}

fn validate_sidecar_structure(kind: &str, sidecar: &SidecarStructure) -> Result<(), ConfigError> {
    if sidecar.file_suffix.trim().is_empty() {
        return Err(ConfigError(format!(
            "sidecars.{kind}.file_suffix must be non-empty"
        )));
    }
    if sidecar.fields.is_empty() {
        return Err(ConfigError(format!("sidecars.{kind}.fields must not be empty")));
    }
    let mut seen = BTreeSet::new();
    for field in &sidecar.fields {
        let name = field.name.trim();
        if name.is_empty() {
            return Err(ConfigError(format!(
                "sidecars.{kind}.fields contains an empty name"
            )));
        }
        if name != field.name {
            return Err(ConfigError(format!(
                "sidecars.{kind}.fields.{name} has surrounding whitespace"
            )));
        }
        if !seen.insert(name) {
            return Err(ConfigError(format!(
                "sidecars.{kind}.fields.{name} is duplicated"
            )));
        }
        validate_default_shape(kind, field)?;
    }
    Ok(())
}

fn validate_default_shape(kind: &str, field: &FieldSpec) -> Result<(), ConfigError> {
    let Some(default) = &field.default else {
        return Ok(());
    };
    let matches = match field.shape {
        FieldShape::Scalar => !matches!(default, Value::Array(_) | Value::Object(_)),
        FieldShape::List => default.is_array(),
        FieldShape::Object => default.is_object(),
    };
    if matches {
        Ok(())
    } else {
        Err(ConfigError(format!(
            "sidecars.{kind}.fields.{}: default does not match declared shape {}",
            field.name,
            field.shape.as_str()
        )))
    }
}

fn field_names(fields: &[FieldSpec]) -> BTreeSet<&str> {
    fields.iter().map(|f| f.name.as_str()).collect()
}
