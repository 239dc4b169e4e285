// SPDX-License-Identifier: Apache-2.0

//! F11 case-report-form source.
//!
//! Forms are looked up as `<forms_dir>/<patient_id>.{json,yaml,yml}` and
//! overlaid on a fixed skeleton so every known section and field is always
//! present, null when the form does not provide it.

use std::fs;
use std::path::{Path, PathBuf};

use bids_sidecar_model::{resolve_path, SourceMapping, SOURCE_F11_FORM};
use serde_json::{json, Map, Value};

use crate::{EntityCache, SourceAdapter, SourceError, SourceErrorCode};

const FORM_EXTENSIONS: [&str; 3] = ["json", "yaml", "yml"];

/// Field subsets consumed by individual sidecar generators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormView {
    EegJson,
    ParticipantsTsv,
    SessionsTsv,
}

impl FormView {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::EegJson => "eeg_json",
            Self::ParticipantsTsv => "participants_tsv",
            Self::SessionsTsv => "sessions_tsv",
        }
    }

    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "eeg_json" => Some(Self::EegJson),
            "participants_tsv" => Some(Self::ParticipantsTsv),
            "sessions_tsv" => Some(Self::SessionsTsv),
            _ => None,
        }
    }

    #[must_use]
    pub const fn paths(self) -> &'static [&'static str] {
        match self {
            Self::EegJson => &[
                "recording_parameters.task_description",
                "recording_parameters.institution",
                "recording_parameters.equipment_manufacturer",
                "recording_parameters.equipment_model",
                "recording_parameters.sampling_rate",
                "recording_parameters.recording_duration",
            ],
            Self::ParticipantsTsv => &[
                "demographics.age",
                "demographics.sex",
                "demographics.handedness",
            ],
            Self::SessionsTsv => &[
                "study_info.visit_date",
                "study_info.visit_type",
                "study_info.protocol_version",
            ],
        }
    }
}

/// Every section and field a form may carry. Only the task description has a
/// study-wide default.
#[must_use]
pub fn form_skeleton() -> Value {
    json!({
        "demographics": {
            "age": null,
            "sex": null,
            "handedness": null,
            "date_of_birth": null
        },
        "recording_parameters": {
            "task_description": "resting state EEG",
            "institution": null,
            "equipment_manufacturer": null,
            "equipment_model": null,
            "sampling_rate": null,
            "recording_duration": null
        },
        "clinical_info": {
            "diagnosis": null,
            "medications": null,
            "clinical_notes": null
        },
        "study_info": {
            "visit_date": null,
            "visit_type": null,
            "protocol_version": null
        }
    })
}

#[derive(Debug, Default)]
pub struct CaseReportFormSource {
    forms_dir: Option<PathBuf>,
    cache: EntityCache,
}

impl CaseReportFormSource {
    #[must_use]
    pub fn new(forms_dir: Option<PathBuf>) -> Self {
        Self {
            forms_dir,
            cache: EntityCache::default(),
        }
    }

    #[must_use]
    pub fn without_cache(mut self) -> Self {
        self.cache = EntityCache::disabled();
        self
    }

    #[must_use]
    pub fn forms_dir(&self) -> Option<&Path> {
        self.forms_dir.as_deref()
    }

    #[must_use]
    pub fn cached_entities(&self) -> usize {
        self.cache.len()
    }

    /// Flat mapping of one consumer's fields, keyed by the last path segment.
    pub fn view(&self, patient_id: &str, view: FormView) -> Result<SourceMapping, SourceError> {
        self.custom_fields(patient_id, view.paths())
    }

    /// Flat mapping of arbitrary dotted paths, keyed by the last path segment.
    pub fn custom_fields(
        &self,
        patient_id: &str,
        paths: &[&str],
    ) -> Result<SourceMapping, SourceError> {
        let form = self.get(patient_id)?;
        let mut out = Map::new();
        for &path in paths {
            let key = path.rsplit('.').next().unwrap_or(path);
            let value = resolve_path(form.root(), path)
                .value()
                .cloned()
                .unwrap_or(Value::Null);
            out.insert(key.to_string(), value);
        }
        Ok(SourceMapping::from(out))
    }

    fn load(&self, patient_id: &str) -> Result<SourceMapping, SourceError> {
        let mut form = form_skeleton();
        match self.form_file(patient_id) {
            Some(path) => {
                let filled = read_form_file(&path)?;
                overlay(&mut form, filled);
                tracing::debug!(patient_id, path = %path.display(), "loaded F11 form");
            }
            None => {
                tracing::debug!(patient_id, "no F11 form on file; using skeleton");
            }
        }
        Ok(SourceMapping::new(form))
    }

    fn form_file(&self, patient_id: &str) -> Option<PathBuf> {
        let dir = self.forms_dir.as_ref()?;
        FORM_EXTENSIONS
            .iter()
            .map(|ext| dir.join(format!("{patient_id}.{ext}")))
            .find(|p| p.is_file())
    }
}

impl SourceAdapter for CaseReportFormSource {
    fn name(&self) -> &str {
        SOURCE_F11_FORM
    }

    fn get(&self, patient_id: &str) -> Result<SourceMapping, SourceError> {
        validate_patient_id(patient_id)?;
        self.cache
            .get_or_try_insert_with(patient_id, || self.load(patient_id))
    }

    fn placeholder(&self) -> SourceMapping {
        SourceMapping::new(form_skeleton())
    }
}

fn validate_patient_id(patient_id: &str) -> Result<(), SourceError> {
    let ok = !patient_id.is_empty()
        && patient_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if ok {
        Ok(())
    } else {
        Err(SourceError::new(
            SourceErrorCode::InvalidKey,
            format!("patient id must be non-empty [A-Za-z0-9_-]: {patient_id:?}"),
        ))
    }
}

fn read_form_file(path: &Path) -> Result<Value, SourceError> {
    let raw = fs::read_to_string(path).map_err(|e| {
        SourceError::new(
            SourceErrorCode::Io,
            format!("read form {} failed: {e}", path.display()),
        )
    })?;
    let is_json = path.extension().and_then(|e| e.to_str()) == Some("json");
    let value: Value = if is_json {
        serde_json::from_str(&raw).map_err(|e| form_malformed(path, &e.to_string()))?
    } else {
        serde_yaml::from_str(&raw).map_err(|e| form_malformed(path, &e.to_string()))?
    };
    if !value.is_object() {
        return Err(form_malformed(path, "form root must be a mapping"));
    }
    Ok(value)
}

fn form_malformed(path: &Path, detail: &str) -> SourceError {
    SourceError::new(
        SourceErrorCode::Malformed,
        format!("parse form {} failed: {detail}", path.display()),
    )
}

/// Objects merge key by key; any other value replaces the skeleton entry.
fn overlay(base: &mut Value, top: Value) {
    match (base, top) {
        (Value::Object(base_map), Value::Object(top_map)) => {
            for (k, v) in top_map {
                match base_map.get_mut(&k) {
                    Some(slot) => overlay(slot, v),
                    None => {
                        base_map.insert(k, v);
                    }
                }
            }
        }
        (slot, top) => *slot = top,
    }
}
