// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]
//! Metadata source collaborators.
//!
//! Each source turns an entity key (a recording path, a patient id) into a
//! nested [`SourceMapping`]. Unknown or not-yet-available fields are `null`
//! inside the mapping; errors are reserved for artifacts that exist but
//! cannot be read.

mod cache;
mod edf;
mod edf_source;
mod error;
mod form;
mod static_source;

use bids_sidecar_model::SourceMapping;

pub use cache::EntityCache;
pub use edf::{
    channel_info, parse_edf_header, parse_recording_file_name, read_edf_header,
    validate_recording_file, ChannelInfo, EdfHeader, RecordingFileName, SignalHeader,
    EDF_HEADER_KEYS, EDF_MAIN_HEADER_BYTES, EDF_SIGNAL_HEADER_BYTES,
};
pub use edf_source::EdfHeaderSource;
pub use error::{SourceError, SourceErrorCode};
pub use form::{form_skeleton, CaseReportFormSource, FormView};
pub use static_source::StaticSource;

pub const CRATE_NAME: &str = "bids-sidecar-sources";

/// Uniform shape every metadata source presents to the engine.
pub trait SourceAdapter: Send + Sync {
    /// Name referenced by mapping rules.
    fn name(&self) -> &str;

    /// Mapping for one entity. Must be read-idempotent within a run.
    fn get(&self, entity_id: &str) -> Result<SourceMapping, SourceError>;

    /// All-absent mapping substituted when `get` fails.
    fn placeholder(&self) -> SourceMapping {
        SourceMapping::empty()
    }
}
