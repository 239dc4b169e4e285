// SPDX-License-Identifier: Apache-2.0

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::rule::Provenance;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldShape {
    #[default]
    Scalar,
    List,
    Object,
}

impl FieldShape {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Scalar => "scalar",
            Self::List => "list",
            Self::Object => "object",
        }
    }

    /// Value written when neither a source nor a default supplies the field.
    #[must_use]
    pub fn sentinel(self) -> Value {
        match self {
            Self::Scalar | Self::Object => Value::Null,
            Self::List => Value::Array(Vec::new()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldLevel {
    Required,
    Recommended,
    #[default]
    Optional,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldSpec {
    pub name: String,
    #[serde(default)]
    pub shape: FieldShape,
    #[serde(default)]
    pub level: FieldLevel,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
}

impl FieldSpec {
    #[must_use]
    pub fn scalar(name: &str) -> Self {
        Self {
            name: name.to_string(),
            shape: FieldShape::Scalar,
            level: FieldLevel::Optional,
            default: None,
        }
    }

    #[must_use]
    pub fn list(name: &str) -> Self {
        Self {
            shape: FieldShape::List,
            ..Self::scalar(name)
        }
    }

    #[must_use]
    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }

    #[must_use]
    pub fn with_level(mut self, level: FieldLevel) -> Self {
        self.level = level;
        self
    }

    #[must_use]
    pub fn is_required(&self) -> bool {
        self.level == FieldLevel::Required
    }
}

/// Where a document field's value came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "origin", rename_all = "snake_case")]
pub enum FieldOrigin {
    Source(Provenance),
    /// Merged value whose provenance was not recorded.
    Merged,
    Default,
    Sentinel,
}

/// Schema-closed output document. Field order is the schema's declared order
/// and is preserved through serialization and deserialization.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SidecarDocument {
    fields: Vec<(String, Value)>,
}

impl SidecarDocument {
    /// Later duplicates replace the earlier value in place.
    #[must_use]
    pub fn from_entries(entries: impl IntoIterator<Item = (String, Value)>) -> Self {
        let mut doc = Self::default();
        for (name, value) in entries {
            doc.upsert(name, value);
        }
        doc
    }

    fn upsert(&mut self, name: String, value: Value) {
        match self.fields.iter_mut().find(|(k, _)| *k == name) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((name, value)),
        }
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.iter().find(|(k, _)| k == name).map(|(_, v)| v)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.fields.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> + '_ {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl Serialize for SidecarDocument {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (k, v) in &self.fields {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

struct DocumentVisitor;

impl<'de> Visitor<'de> for DocumentVisitor {
    type Value = SidecarDocument;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a sidecar document object")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut doc = SidecarDocument::default();
        while let Some((k, v)) = access.next_entry::<String, Value>()? {
            doc.upsert(k, v);
        }
        Ok(doc)
    }
}

impl<'de> Deserialize<'de> for SidecarDocument {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(DocumentVisitor)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ValidationReport {
    pub missing_fields: Vec<String>,
}

impl ValidationReport {
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.missing_fields.is_empty()
    }
}
