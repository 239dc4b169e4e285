// SPDX-License-Identifier: Apache-2.0

use std::collections::BTreeMap;
use std::sync::{Mutex, PoisonError};

use bids_sidecar_model::SourceMapping;

use crate::SourceError;

/// Per-entity memo of computed mappings. Purely an optimization: a disabled
/// cache recomputes on every call.
#[derive(Debug)]
pub struct EntityCache {
    enabled: bool,
    entries: Mutex<BTreeMap<String, SourceMapping>>,
}

impl Default for EntityCache {
    fn default() -> Self {
        Self::new(true)
    }
}

impl EntityCache {
    #[must_use]
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            entries: Mutex::new(BTreeMap::new()),
        }
    }

    #[must_use]
    pub fn disabled() -> Self {
        Self::new(false)
    }

    /// The lock is not held while `load` runs; if two callers race on the
    /// same key the first stored mapping wins and both return it.
    pub fn get_or_try_insert_with<F>(
        &self,
        key: &str,
        load: F,
    ) -> Result<SourceMapping, SourceError>
    where
        F: FnOnce() -> Result<SourceMapping, SourceError>,
    {
        if !self.enabled {
            return load();
        }
        if let Some(hit) = self.lock().get(key) {
            return Ok(hit.clone());
        }
        let loaded = load()?;
        Ok(self
            .lock()
            .entry(key.to_string())
            .or_insert(loaded)
            .clone())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeMap<String, SourceMapping>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
