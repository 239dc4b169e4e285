// SPDX-License-Identifier: Apache-2.0

use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One entry of the ordered rule list for a sidecar kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MappingRule {
    pub source: String,
    /// Output field name -> dotted path inside the source mapping.
    pub field_mapping: BTreeMap<String, String>,
}

impl MappingRule {
    #[must_use]
    pub fn new<K, V>(source: &str, pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            source: source.to_string(),
            field_mapping: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Provenance {
    pub source: String,
    pub path: String,
}

impl Provenance {
    #[must_use]
    pub fn new(source: &str, path: &str) -> Self {
        Self {
            source: source.to_string(),
            path: path.to_string(),
        }
    }
}

impl Display for Provenance {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.source, self.path)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResolvedField {
    pub name: String,
    pub value: Option<Value>,
    pub provenance: Option<Provenance>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum NoteKind {
    SourceUnavailable,
    SourceAllAbsent,
    MalformedSource,
}

impl NoteKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SourceUnavailable => "source_unavailable",
            Self::SourceAllAbsent => "source_all_absent",
            Self::MalformedSource => "malformed_source",
        }
    }
}

/// Non-fatal diagnostic attached to a merge. `rule_index` is `None` for notes
/// raised while collecting sources, before any rule runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResolutionNote {
    pub rule_index: Option<usize>,
    pub source: String,
    pub kind: NoteKind,
    pub message: String,
}

impl Display for ResolutionNote {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.rule_index {
            Some(idx) => write!(
                f,
                "rule {idx} ({}): {}: {}",
                self.source,
                self.kind.as_str(),
                self.message
            ),
            None => write!(f, "{}: {}: {}", self.source, self.kind.as_str(), self.message),
        }
    }
}
