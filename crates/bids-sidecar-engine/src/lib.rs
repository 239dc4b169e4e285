// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]
//! Multi-source field resolution engine.
//!
//! `merge` applies ordered mapping rules to named source mappings, `build`
//! closes the result over a field schema, and `validate` reports required
//! fields that ended up empty. [`generate_sidecar`] runs all three for one
//! request and records the stages in a [`GenerationLog`].

mod build;
mod job;
mod logging;
mod merge;
mod validate;
mod write;

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::{Display, Formatter};

use bids_sidecar_config::SidecarConfigSet;
use bids_sidecar_core::{canonical, sha256_hex};
use bids_sidecar_model::{
    FieldOrigin, NoteKind, Provenance, ResolutionNote, SidecarDocument, SourceMapping,
    ValidationReport,
};
use serde::Serialize;

pub use bids_sidecar_model::{resolve_path, Resolution};
pub use build::{build, build_with_origins};
pub use job::{GenerationRequest, SourceBinding, REQUEST_SOURCE};
pub use logging::{GenerationEvent, GenerationLog, GenerationStage};
pub use merge::{merge, MergeOutcome};
pub use validate::validate;
pub use write::{render_document, write_document};

use logging::fields;

pub const CRATE_NAME: &str = "bids-sidecar-engine";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationError(pub String);

impl Display for GenerationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for GenerationError {}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationResult {
    pub sidecar: String,
    pub file_name: String,
    pub document: SidecarDocument,
    pub provenance: BTreeMap<String, Provenance>,
    pub origins: BTreeMap<String, FieldOrigin>,
    pub notes: Vec<ResolutionNote>,
    pub report: ValidationReport,
    /// sha256 of the rendered document bytes.
    pub document_sha256: String,
    /// sha256 of the canonical schema, rules and required-field list used.
    pub plan_sha256: String,
    pub events: Vec<GenerationEvent>,
}

/// Produces one sidecar document. Source failures degrade to the adapter's
/// placeholder plus a `source_unavailable` note; only configuration problems
/// are errors.
pub fn generate_sidecar(
    config: &SidecarConfigSet,
    request: &GenerationRequest,
    bindings: &[SourceBinding<'_>],
) -> Result<GenerationResult, GenerationError> {
    let mut log = GenerationLog::default();
    log.emit(
        GenerationStage::Prepare,
        "generate.start",
        fields([
            ("sidecar", request.sidecar.clone()),
            ("patient_id", request.patient_id.clone()),
        ]),
    );
    if request.patient_id.is_empty() {
        return Err(GenerationError("patient id must be non-empty".to_string()));
    }
    let plan = config
        .plan(&request.sidecar)
        .map_err(|e| GenerationError(e.to_string()))?;
    let plan_sha256 =
        canonical::stable_json_hash_hex(&(plan.schema, plan.rules, plan.required_fields))
            .map_err(|e| GenerationError(format!("hash sidecar plan failed: {e}")))?;

    let (sources, mut notes) = collect_sources(config, request, bindings, &mut log)?;

    let outcome = merge(&sources, plan.rules);
    log.emit(
        GenerationStage::Merge,
        "generate.merge.complete",
        fields([
            ("rules", plan.rules.len().to_string()),
            ("resolved", outcome.merged.len().to_string()),
            ("notes", outcome.notes.len().to_string()),
        ]),
    );
    for note in &outcome.notes {
        tracing::warn!(sidecar = plan.kind, "{note}");
    }
    notes.extend(outcome.notes);

    let (document, origins) = build_with_origins(plan.schema, &outcome.merged, &outcome.provenance);
    log.emit(
        GenerationStage::Build,
        "generate.build.complete",
        fields([("fields", document.len().to_string())]),
    );

    let report = validate(&document, plan.required_fields);
    if !report.is_complete() {
        tracing::warn!(
            sidecar = plan.kind,
            missing = ?report.missing_fields,
            "required fields missing"
        );
    }
    log.emit(
        GenerationStage::Validate,
        "generate.validate.complete",
        fields([("missing", report.missing_fields.join(","))]),
    );

    let document_sha256 = sha256_hex(&render_document(&document)?);
    let file_name = request.file_name(config.layout(), plan.file_suffix);
    log.emit(
        GenerationStage::Finalize,
        "generate.complete",
        fields([
            ("file_name", file_name.clone()),
            ("document_sha256", document_sha256.clone()),
        ]),
    );
    tracing::info!(
        sidecar = plan.kind,
        file_name = file_name.as_str(),
        missing = report.missing_fields.len(),
        "sidecar generated"
    );

    Ok(GenerationResult {
        sidecar: plan.kind.to_string(),
        file_name,
        document,
        provenance: outcome.provenance,
        origins,
        notes,
        report,
        document_sha256,
        plan_sha256,
        events: log.into_events(),
    })
}

fn collect_sources(
    config: &SidecarConfigSet,
    request: &GenerationRequest,
    bindings: &[SourceBinding<'_>],
    log: &mut GenerationLog,
) -> Result<(BTreeMap<String, SourceMapping>, Vec<ResolutionNote>), GenerationError> {
    let mut bound = BTreeSet::from([REQUEST_SOURCE]);
    for binding in bindings {
        if binding.name() == REQUEST_SOURCE {
            return Err(GenerationError(format!(
                "source name {REQUEST_SOURCE} is reserved for the request identity"
            )));
        }
        if !bound.insert(binding.name()) {
            return Err(GenerationError(format!(
                "source {} is bound more than once",
                binding.name()
            )));
        }
    }

    let mut sources = BTreeMap::new();
    let mut notes = Vec::new();
    sources.insert(
        REQUEST_SOURCE.to_string(),
        request.source_mapping(config.layout()),
    );
    for binding in bindings {
        let name = binding.name().to_string();
        let mapping = match binding.adapter.get(binding.entity_id) {
            Ok(mapping) => {
                log.emit(
                    GenerationStage::Collect,
                    "generate.source.loaded",
                    fields([
                        ("source", name.clone()),
                        ("entity_id", binding.entity_id.to_string()),
                    ]),
                );
                mapping
            }
            Err(err) => {
                tracing::warn!(
                    source = name.as_str(),
                    entity_id = binding.entity_id,
                    error = %err,
                    "source unavailable; using placeholder"
                );
                log.emit(
                    GenerationStage::Collect,
                    "generate.source.unavailable",
                    fields([("source", name.clone()), ("error", err.to_string())]),
                );
                notes.push(ResolutionNote {
                    rule_index: None,
                    source: name.clone(),
                    kind: NoteKind::SourceUnavailable,
                    message: err.to_string(),
                });
                binding.adapter.placeholder()
            }
        };
        sources.insert(name, mapping);
    }
    Ok((sources, notes))
}
