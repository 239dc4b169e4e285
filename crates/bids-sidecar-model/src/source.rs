// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Nested metadata produced by one source collaborator for one entity.
///
/// The root is expected to be an object; anything else is treated as a
/// malformed source by the mapping engine rather than rejected here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SourceMapping(Value);

impl SourceMapping {
    #[must_use]
    pub fn new(root: Value) -> Self {
        Self(root)
    }

    #[must_use]
    pub fn empty() -> Self {
        Self(Value::Object(Map::new()))
    }

    /// Builds a flat mapping where every key is present but absent.
    #[must_use]
    pub fn all_null<'a>(keys: impl IntoIterator<Item = &'a str>) -> Self {
        let map = keys
            .into_iter()
            .map(|k| (k.to_string(), Value::Null))
            .collect::<Map<String, Value>>();
        Self(Value::Object(map))
    }

    #[must_use]
    pub fn root(&self) -> &Value {
        &self.0
    }

    #[must_use]
    pub fn as_object(&self) -> Option<&Map<String, Value>> {
        self.0.as_object()
    }

    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        self.0.is_object()
    }

    /// True when no leaf carries a value. Arrays count as values, even empty.
    #[must_use]
    pub fn is_all_absent(&self) -> bool {
        fn absent(value: &Value) -> bool {
            match value {
                Value::Null => true,
                Value::Object(map) => map.values().all(absent),
                _ => false,
            }
        }
        absent(&self.0)
    }
}

impl From<Map<String, Value>> for SourceMapping {
    fn from(map: Map<String, Value>) -> Self {
        Self(Value::Object(map))
    }
}

impl From<Value> for SourceMapping {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

/// Outcome of a path lookup. A stored `null` is reported as `Absent`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Resolution<'a> {
    Present(&'a Value),
    Absent,
}

impl<'a> Resolution<'a> {
    #[must_use]
    pub fn from_found(value: Option<&'a Value>) -> Self {
        match value {
            Some(Value::Null) | None => Self::Absent,
            Some(v) => Self::Present(v),
        }
    }

    #[must_use]
    pub const fn is_present(&self) -> bool {
        matches!(self, Self::Present(_))
    }

    #[must_use]
    pub const fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    #[must_use]
    pub fn value(&self) -> Option<&'a Value> {
        match self {
            Self::Present(v) => Some(v),
            Self::Absent => None,
        }
    }
}
