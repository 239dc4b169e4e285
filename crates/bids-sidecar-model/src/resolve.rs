// SPDX-License-Identifier: Apache-2.0

use serde_json::Value;

use crate::source::{Resolution, SourceMapping};

/// Resolves a dotted path against a nested value.
///
/// Total: a missing key, a non-object intermediate, an empty path or an empty
/// segment all yield `Absent`.
#[must_use]
pub fn resolve_path<'a>(root: &'a Value, path: &str) -> Resolution<'a> {
    if path.is_empty() {
        return Resolution::Absent;
    }
    let mut cur = root;
    for seg in path.split('.') {
        if seg.is_empty() {
            return Resolution::Absent;
        }
        cur = match cur {
            Value::Object(map) => match map.get(seg) {
                Some(v) => v,
                None => return Resolution::Absent,
            },
            _ => return Resolution::Absent,
        };
    }
    Resolution::from_found(Some(cur))
}

impl SourceMapping {
    #[must_use]
    pub fn resolve(&self, path: &str) -> Resolution<'_> {
        resolve_path(self.root(), path)
    }
}
