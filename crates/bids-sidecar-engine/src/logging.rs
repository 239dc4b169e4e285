// SPDX-License-Identifier: Apache-2.0

use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationStage {
    Prepare,
    Collect,
    Merge,
    Build,
    Validate,
    Finalize,
}

impl GenerationStage {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Prepare => "prepare",
            Self::Collect => "collect",
            Self::Merge => "merge",
            Self::Build => "build",
            Self::Validate => "validate",
            Self::Finalize => "finalize",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GenerationEvent {
    pub stage: GenerationStage,
    pub name: String,
    pub fields: BTreeMap<String, String>,
}

/// Stage events for one run. Every event is also forwarded to `tracing`.
#[derive(Debug, Default, Clone)]
pub struct GenerationLog {
    events: Vec<GenerationEvent>,
}

impl GenerationLog {
    pub fn emit(
        &mut self,
        stage: GenerationStage,
        name: impl Into<String>,
        fields: BTreeMap<String, String>,
    ) {
        let name = name.into();
        tracing::debug!(stage = stage.as_str(), event = name.as_str(), ?fields, "generation event");
        self.events.push(GenerationEvent {
            stage,
            name,
            fields,
        });
    }

    #[must_use]
    pub fn events(&self) -> &[GenerationEvent] {
        &self.events
    }

    #[must_use]
    pub fn into_events(self) -> Vec<GenerationEvent> {
        self.events
    }
}

/// Shorthand for event field maps.
pub(crate) fn fields<const N: usize>(pairs: [(&str, String); N]) -> BTreeMap<String, String> {
    pairs
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
}
