// SPDX-License-Identifier: Apache-2.0

use std::collections::BTreeMap;

use bids_sidecar_model::SourceMapping;

use crate::{SourceAdapter, SourceError};

/// In-memory source. Entities without an entry get the fallback mapping,
/// which defaults to an empty (all-absent) mapping.
#[derive(Debug, Clone)]
pub struct StaticSource {
    name: String,
    entries: BTreeMap<String, SourceMapping>,
    fallback: SourceMapping,
}

impl StaticSource {
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            entries: BTreeMap::new(),
            fallback: SourceMapping::empty(),
        }
    }

    /// Same mapping for every entity.
    #[must_use]
    pub fn constant(name: &str, mapping: SourceMapping) -> Self {
        Self {
            fallback: mapping,
            ..Self::new(name)
        }
    }

    #[must_use]
    pub fn with_entry(mut self, entity_id: &str, mapping: SourceMapping) -> Self {
        self.entries.insert(entity_id.to_string(), mapping);
        self
    }
}

impl SourceAdapter for StaticSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn get(&self, entity_id: &str) -> Result<SourceMapping, SourceError> {
        Ok(self
            .entries
            .get(entity_id)
            .cloned()
            .unwrap_or_else(|| self.fallback.clone()))
    }
}
