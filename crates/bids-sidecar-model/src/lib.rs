// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]
//! Sidecar model SSOT.
//!
//! Every crate in the workspace exchanges these types: source mappings as
//! produced by collaborators, mapping rules as loaded from configuration, and
//! the schema-closed document with its diagnostics.

mod document;
mod resolve;
mod rule;
mod source;

pub use document::{
    FieldLevel, FieldOrigin, FieldShape, FieldSpec, SidecarDocument, ValidationReport,
};
pub use resolve::resolve_path;
pub use rule::{MappingRule, NoteKind, Provenance, ResolutionNote, ResolvedField};
pub use source::{Resolution, SourceMapping};

pub const CRATE_NAME: &str = "bids-sidecar-model";

/// Well-known source names used by the bundled configuration.
pub const SOURCE_EDF_HEADER: &str = "edf_header";
pub const SOURCE_F11_FORM: &str = "f11_form";
