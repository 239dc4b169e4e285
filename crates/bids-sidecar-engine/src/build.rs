// SPDX-License-Identifier: Apache-2.0

use std::collections::BTreeMap;

use bids_sidecar_model::{FieldOrigin, FieldSpec, Provenance, SidecarDocument};
use serde_json::Value;

/// Schema-closed document: exactly the schema's fields, in schema order.
/// Each field takes the merged value, else its default, else its shape's
/// sentinel. Merged keys outside the schema are dropped.
#[must_use]
pub fn build(schema: &[FieldSpec], merged: &BTreeMap<String, Value>) -> SidecarDocument {
    build_with_origins(schema, merged, &BTreeMap::new()).0
}

pub fn build_with_origins(
    schema: &[FieldSpec],
    merged: &BTreeMap<String, Value>,
    provenance: &BTreeMap<String, Provenance>,
) -> (SidecarDocument, BTreeMap<String, FieldOrigin>) {
    let mut origins = BTreeMap::new();
    let entries = schema
        .iter()
        .map(|spec| {
            let (value, origin) = match (merged.get(&spec.name), &spec.default) {
                (Some(value), _) => (
                    value.clone(),
                    provenance
                        .get(&spec.name)
                        .cloned()
                        .map_or(FieldOrigin::Merged, FieldOrigin::Source),
                ),
                (None, Some(default)) => (default.clone(), FieldOrigin::Default),
                (None, None) => (spec.shape.sentinel(), FieldOrigin::Sentinel),
            };
            origins.insert(spec.name.clone(), origin);
            (spec.name.clone(), value)
        })
        .collect::<Vec<_>>();
    (SidecarDocument::from_entries(entries), origins)
}
