// SPDX-License-Identifier: Apache-2.0

use std::collections::BTreeMap;

use bids_sidecar_model::{
    MappingRule, NoteKind, Provenance, ResolutionNote, ResolvedField, SourceMapping,
};
use serde::Serialize;
use serde_json::Value;

/// Result of applying an ordered rule list to a set of named sources.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct MergeOutcome {
    pub merged: BTreeMap<String, Value>,
    pub provenance: BTreeMap<String, Provenance>,
    pub notes: Vec<ResolutionNote>,
}

impl MergeOutcome {
    /// One entry per field that some rule resolved, in field-name order.
    #[must_use]
    pub fn resolved_fields(&self) -> Vec<ResolvedField> {
        self.merged
            .iter()
            .map(|(name, value)| ResolvedField {
                name: name.clone(),
                value: Some(value.clone()),
                provenance: self.provenance.get(name).cloned(),
            })
            .collect()
    }
}

/// Applies `rules` in order. For every output field the last rule that
/// resolves a present value wins; an absent resolution never clears an
/// earlier value.
#[must_use]
pub fn merge(sources: &BTreeMap<String, SourceMapping>, rules: &[MappingRule]) -> MergeOutcome {
    let mut out = MergeOutcome::default();
    for (rule_index, rule) in rules.iter().enumerate() {
        let Some(mapping) = sources.get(&rule.source) else {
            out.notes.push(note(
                rule_index,
                rule,
                NoteKind::SourceUnavailable,
                "source is not registered for this run",
            ));
            continue;
        };
        if !mapping.is_well_formed() {
            out.notes.push(note(
                rule_index,
                rule,
                NoteKind::MalformedSource,
                "source mapping root is not an object",
            ));
            continue;
        }
        if mapping.is_all_absent() {
            out.notes.push(note(
                rule_index,
                rule,
                NoteKind::SourceAllAbsent,
                "every field of the source is absent",
            ));
        }
        for (field, path) in &rule.field_mapping {
            match mapping.resolve(path).value() {
                Some(value) => {
                    tracing::debug!(
                        field = field.as_str(),
                        source = rule.source.as_str(),
                        path = path.as_str(),
                        "resolved field"
                    );
                    out.merged.insert(field.clone(), value.clone());
                    out.provenance
                        .insert(field.clone(), Provenance::new(&rule.source, path));
                }
                None => {
                    tracing::trace!(
                        field = field.as_str(),
                        source = rule.source.as_str(),
                        path = path.as_str(),
                        "field absent"
                    );
                }
            }
        }
    }
    out
}

fn note(rule_index: usize, rule: &MappingRule, kind: NoteKind, message: &str) -> ResolutionNote {
    ResolutionNote {
        rule_index: Some(rule_index),
        source: rule.source.clone(),
        kind,
        message: message.to_string(),
    }
}
