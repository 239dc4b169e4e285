// SPDX-License-Identifier: Apache-2.0

use std::collections::BTreeMap;

use bids_sidecar_model::{FieldSpec, MappingRule};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum ConfigSchemaVersion {
    #[serde(rename = "1")]
    V1,
}

impl ConfigSchemaVersion {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::V1 => "1",
        }
    }
}

/// `bids_structure.yaml`: directory layout plus the ordered field schema of
/// every sidecar kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StructureConfig {
    pub schema_version: ConfigSchemaVersion,
    pub layout: LayoutConfig,
    pub sidecars: BTreeMap<String, SidecarStructure>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LayoutConfig {
    pub subject_prefix: String,
    pub task_label: String,
    #[serde(default)]
    pub session_prefix: Option<String>,
}

impl LayoutConfig {
    /// `sub-PRV-13UL_task-rest_eeg.json`, or with a session entity when a
    /// session prefix is configured and a session label is given.
    #[must_use]
    pub fn sidecar_file_name(
        &self,
        patient_id: &str,
        session: Option<&str>,
        file_suffix: &str,
    ) -> String {
        let mut name = format!("{}{}", self.subject_prefix, patient_id.trim());
        if let (Some(prefix), Some(session)) = (self.session_prefix.as_deref(), session) {
            let session = session.trim();
            if !session.is_empty() {
                name.push('_');
                name.push_str(prefix);
                name.push_str(session);
            }
        }
        name.push_str("_task-");
        name.push_str(&self.task_label);
        name.push('_');
        name.push_str(file_suffix);
        name
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SidecarStructure {
    pub file_suffix: String,
    pub fields: Vec<FieldSpec>,
}

/// `sidecar_config.yaml`: ordered mapping rules per sidecar kind and the
/// advisory required-field lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MappingConfig {
    pub schema_version: ConfigSchemaVersion,
    pub sidecars: BTreeMap<String, SidecarRules>,
    #[serde(default)]
    pub validation: BTreeMap<String, Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SidecarRules {
    #[serde(default)]
    pub rules: Vec<MappingRule>,
}
