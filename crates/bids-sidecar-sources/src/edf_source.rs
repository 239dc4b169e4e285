// SPDX-License-Identifier: Apache-2.0

use std::path::Path;

use bids_sidecar_model::{SourceMapping, SOURCE_EDF_HEADER};

use crate::edf::{read_edf_header, EDF_HEADER_KEYS};
use crate::{EntityCache, SourceAdapter, SourceError};

/// Recording-header source keyed by EDF file path.
#[derive(Debug, Default)]
pub struct EdfHeaderSource {
    cache: EntityCache,
}

impl EdfHeaderSource {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_cache(enabled: bool) -> Self {
        Self {
            cache: EntityCache::new(enabled),
        }
    }

    /// All header keys present, all null.
    #[must_use]
    pub fn placeholder_mapping() -> SourceMapping {
        SourceMapping::all_null(EDF_HEADER_KEYS)
    }

    fn load(path: &Path) -> Result<SourceMapping, SourceError> {
        if !path.exists() {
            tracing::warn!(path = %path.display(), "EDF file not found; using placeholder header");
            return Ok(Self::placeholder_mapping());
        }
        let header = read_edf_header(path)?;
        tracing::debug!(
            path = %path.display(),
            signals = header.signals.len(),
            edf_plus = header.is_edf_plus(),
            "parsed EDF header"
        );
        Ok(header.to_mapping())
    }
}

impl SourceAdapter for EdfHeaderSource {
    fn name(&self) -> &str {
        SOURCE_EDF_HEADER
    }

    fn get(&self, entity_id: &str) -> Result<SourceMapping, SourceError> {
        self.cache
            .get_or_try_insert_with(entity_id, || Self::load(Path::new(entity_id)))
    }

    fn placeholder(&self) -> SourceMapping {
        Self::placeholder_mapping()
    }
}
