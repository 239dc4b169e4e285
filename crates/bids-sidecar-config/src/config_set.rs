// SPDX-License-Identifier: Apache-2.0

use bids_sidecar_model::{FieldSpec, MappingRule};

use crate::schema::{LayoutConfig, MappingConfig, StructureConfig};
use crate::validate::{required_fields_key, validate_config_set, ConfigError};

/// Both configuration documents, validated against each other.
#[derive(Debug, Clone, PartialEq)]
pub struct SidecarConfigSet {
    pub structure: StructureConfig,
    pub mapping: MappingConfig,
}

/// Everything the engine needs to produce one sidecar kind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SidecarPlan<'a> {
    pub kind: &'a str,
    pub file_suffix: &'a str,
    pub schema: &'a [FieldSpec],
    pub rules: &'a [MappingRule],
    pub required_fields: &'a [String],
}

impl SidecarConfigSet {
    /// A sidecar kind without a `validation` entry requires exactly its
    /// `level: required` fields, in schema order.
    pub fn new(
        structure: StructureConfig,
        mut mapping: MappingConfig,
    ) -> Result<Self, ConfigError> {
        validate_config_set(&structure, &mapping)?;
        for (kind, sidecar) in &structure.sidecars {
            mapping
                .validation
                .entry(required_fields_key(kind))
                .or_insert_with(|| {
                    sidecar
                        .fields
                        .iter()
                        .filter(|f| f.is_required())
                        .map(|f| f.name.clone())
                        .collect()
                });
        }
        Ok(Self { structure, mapping })
    }

    #[must_use]
    pub fn layout(&self) -> &LayoutConfig {
        &self.structure.layout
    }

    pub fn kinds(&self) -> impl Iterator<Item = &str> + '_ {
        self.structure.sidecars.keys().map(String::as_str)
    }

    pub fn plan(&self, kind: &str) -> Result<SidecarPlan<'_>, ConfigError> {
        let (kind, structure) = self
            .structure
            .sidecars
            .get_key_value(kind)
            .ok_or_else(|| ConfigError(format!("sidecar kind is not configured: {kind}")))?;
        let rules = self
            .mapping
            .sidecars
            .get(kind)
            .map(|r| r.rules.as_slice())
            .unwrap_or(&[]);
        let required_fields = self
            .mapping
            .validation
            .get(&required_fields_key(kind))
            .map(Vec::as_slice)
            .unwrap_or(&[]);
        Ok(SidecarPlan {
            kind,
            file_suffix: &structure.file_suffix,
            schema: &structure.fields,
            rules,
            required_fields,
        })
    }
}

pub fn parse_config_set_yaml(
    structure_raw: &str,
    mapping_raw: &str,
) -> Result<SidecarConfigSet, ConfigError> {
    let structure: StructureConfig = serde_yaml::from_str(structure_raw)
        .map_err(|e| ConfigError(format!("parse structure config failed: {e}")))?;
    let mapping: MappingConfig = serde_yaml::from_str(mapping_raw)
        .map_err(|e| ConfigError(format!("parse mapping config failed: {e}")))?;
    SidecarConfigSet::new(structure, mapping)
}
