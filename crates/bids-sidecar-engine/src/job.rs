// SPDX-License-Identifier: Apache-2.0

use bids_sidecar_config::LayoutConfig;
use bids_sidecar_model::SourceMapping;
use bids_sidecar_sources::SourceAdapter;
use serde_json::{Map, Value};

/// Name of the synthetic source built from the request itself.
pub const REQUEST_SOURCE: &str = "request";

const DEFAULT_SESSION_PREFIX: &str = "ses-";

/// One sidecar to produce for one recording session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub sidecar: String,
    pub patient_id: String,
    pub session: Option<String>,
}

impl GenerationRequest {
    #[must_use]
    pub fn new(sidecar: &str, patient_id: &str, session: Option<&str>) -> Self {
        Self {
            sidecar: sidecar.to_string(),
            patient_id: patient_id.trim().to_string(),
            session: session
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
        }
    }

    /// `participant_id`, `session_id` and the raw identifiers, so rules can
    /// map request identity into documents like any other source.
    #[must_use]
    pub fn source_mapping(&self, layout: &LayoutConfig) -> SourceMapping {
        let session_prefix = layout
            .session_prefix
            .as_deref()
            .unwrap_or(DEFAULT_SESSION_PREFIX);
        let mut map = Map::new();
        map.insert(
            "participant_id".to_string(),
            Value::String(format!("{}{}", layout.subject_prefix, self.patient_id)),
        );
        map.insert(
            "session_id".to_string(),
            self.session
                .as_ref()
                .map_or(Value::Null, |s| Value::String(format!("{session_prefix}{s}"))),
        );
        map.insert(
            "patient_id".to_string(),
            Value::String(self.patient_id.clone()),
        );
        map.insert(
            "session".to_string(),
            self.session.clone().map_or(Value::Null, Value::String),
        );
        SourceMapping::from(map)
    }

    #[must_use]
    pub fn file_name(&self, layout: &LayoutConfig, file_suffix: &str) -> String {
        layout.sidecar_file_name(&self.patient_id, self.session.as_deref(), file_suffix)
    }
}

/// A source adapter paired with the entity key it is queried with.
#[derive(Clone, Copy)]
pub struct SourceBinding<'a> {
    pub adapter: &'a dyn SourceAdapter,
    pub entity_id: &'a str,
}

impl<'a> SourceBinding<'a> {
    #[must_use]
    pub fn new(adapter: &'a dyn SourceAdapter, entity_id: &'a str) -> Self {
        Self { adapter, entity_id }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        self.adapter.name()
    }
}

impl std::fmt::Debug for SourceBinding<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceBinding")
            .field("source", &self.adapter.name())
            .field("entity_id", &self.entity_id)
            .finish()
    }
}
